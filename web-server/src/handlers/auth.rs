// web-server/src/handlers/auth.rs
use actix_web::{get, post, web, Either, Error, HttpResponse};
use common::{LoginRequest, RegisterRequest};

use super::redirect;
use crate::state::AppState;
use crate::views::Page;

const LOGIN_FAILED: &str = "Invalid credentials";
const REGISTRATION_FAILED: &str = "Registration failed";

/// Forms post urlencoded bodies; JSON is accepted as well. Extraction
/// faults reach the handler so they render the page like any other failure.
type Body<T> = Result<Either<web::Form<T>, web::Json<T>>, Error>;

fn into_inner<T>(body: Body<T>) -> Result<T, Error> {
    Ok(match body? {
        Either::Left(form) => form.into_inner(),
        Either::Right(json) => json.into_inner(),
    })
}

#[get("/")]
pub async fn login_page(state: web::Data<AppState>) -> HttpResponse {
    state.page(&Page::Login { error: None })
}

#[post("/login")]
pub async fn login(state: web::Data<AppState>, body: Body<LoginRequest>) -> HttpResponse {
    let credentials = match into_inner(body) {
        Ok(credentials) => credentials,
        Err(e) => {
            tracing::warn!("Unreadable login body: {}", e);
            return state.page(&Page::Login {
                error: Some(LOGIN_FAILED),
            });
        }
    };

    match state.upstream.login(&credentials).await {
        Ok(token) => {
            tracing::info!("Login succeeded");
            let mut response = redirect("/dashboard");
            state.tokens.set(&mut response, &token);
            response.finish()
        }
        Err(e) => {
            // Same message whatever the API said
            tracing::warn!("Login failed ({}): {}", e.kind(), e);
            state.page(&Page::Login {
                error: Some(LOGIN_FAILED),
            })
        }
    }
}

#[get("/register")]
pub async fn register_page(state: web::Data<AppState>) -> HttpResponse {
    state.page(&Page::Register { error: None })
}

#[post("/register")]
pub async fn register(state: web::Data<AppState>, body: Body<RegisterRequest>) -> HttpResponse {
    let registration = match into_inner(body) {
        Ok(registration) => registration,
        Err(e) => {
            tracing::warn!("Unreadable registration body: {}", e);
            return state.page(&Page::Register {
                error: Some(REGISTRATION_FAILED),
            });
        }
    };

    match state.upstream.register(&registration).await {
        // No token is issued here; the user logs in afterwards
        Ok(()) => {
            tracing::info!("Registration succeeded");
            redirect("/").finish()
        }
        Err(e) => {
            tracing::warn!("Registration failed ({}): {}", e.kind(), e);
            state.page(&Page::Register {
                error: Some(REGISTRATION_FAILED),
            })
        }
    }
}
