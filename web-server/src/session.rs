// web-server/src/session.rs
use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::dev::Payload;
use actix_web::http::{header, StatusCode};
use actix_web::{web, FromRequest, HttpRequest, HttpResponse, HttpResponseBuilder, ResponseError};
use common::{CookieConfig, SessionToken};
use futures_util::future::{ready, Ready};
use std::fmt;

use crate::state::AppState;

/// Cookie-backed holder for the API bearer token.
///
/// No server side session exists: the cookie value is the whole session.
#[derive(Clone, Debug)]
pub struct TokenStore {
    name: String,
    secure: bool,
    max_age: Option<CookieDuration>,
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new(&CookieConfig::default())
    }
}

impl TokenStore {
    pub fn new(config: &CookieConfig) -> Self {
        Self {
            name: config.name.clone(),
            secure: config.secure,
            max_age: config.max_age_secs.map(CookieDuration::seconds),
        }
    }

    pub fn get(&self, req: &HttpRequest) -> Option<SessionToken> {
        req.cookie(&self.name)
            .and_then(|cookie| SessionToken::new(cookie.value()))
    }

    pub fn set(&self, response: &mut HttpResponseBuilder, token: &SessionToken) {
        response.cookie(self.build(token.as_str().to_string(), self.max_age));
    }

    /// Expire the cookie, used once the API has rejected the stored token
    pub fn clear(&self, response: &mut HttpResponseBuilder) {
        response.cookie(self.build(String::new(), Some(CookieDuration::seconds(0))));
    }

    fn build(&self, value: String, max_age: Option<CookieDuration>) -> Cookie<'static> {
        let mut cookie = Cookie::build(self.name.clone(), value)
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .finish();

        if let Some(max_age) = max_age {
            cookie.set_max_age(max_age);
        }
        cookie
    }
}

/// Request had no usable token cookie; answered with a redirect to the login page
#[derive(Debug)]
pub struct Unauthenticated;

impl fmt::Display for Unauthenticated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No session token")
    }
}

impl ResponseError for Unauthenticated {
    fn status_code(&self) -> StatusCode {
        StatusCode::SEE_OTHER
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::SeeOther()
            .insert_header((header::LOCATION, "/"))
            .finish()
    }
}

/// Extractor for routes that need a logged-in user
#[derive(Debug, Clone)]
pub struct Authenticated(pub SessionToken);

impl Authenticated {
    pub fn token(&self) -> &SessionToken {
        &self.0
    }
}

impl FromRequest for Authenticated {
    type Error = Unauthenticated;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = match req.app_data::<web::Data<AppState>>() {
            Some(state) => state.tokens.get(req),
            None => TokenStore::default().get(req),
        };

        ready(match token {
            Some(token) => Ok(Authenticated(token)),
            None => {
                tracing::debug!("No session token on {}, redirecting to login", req.path());
                Err(Unauthenticated)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_get_reads_named_cookie() {
        let store = TokenStore::default();
        let req = TestRequest::default()
            .cookie(Cookie::new("token", "jwt-value"))
            .to_http_request();

        let token = store.get(&req).expect("token cookie should be read");
        assert_eq!(token.as_str(), "jwt-value");
    }

    #[test]
    fn test_missing_or_empty_cookie_is_absent() {
        let store = TokenStore::default();
        let req = TestRequest::default().to_http_request();
        assert!(store.get(&req).is_none());

        let req = TestRequest::default()
            .cookie(Cookie::new("token", ""))
            .to_http_request();
        assert!(store.get(&req).is_none());

        let req = TestRequest::default()
            .cookie(Cookie::new("other", "jwt-value"))
            .to_http_request();
        assert!(store.get(&req).is_none());
    }

    #[test]
    fn test_set_and_clear() {
        let store = TokenStore::new(&CookieConfig {
            name: "portal_token".into(),
            secure: true,
            max_age_secs: Some(3600),
        });
        let token = SessionToken::new("abc").unwrap();

        let mut builder = HttpResponse::SeeOther();
        store.set(&mut builder, &token);
        let response = builder.finish();
        let cookie = response.cookies().next().expect("cookie set");
        assert_eq!(cookie.name(), "portal_token");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.max_age(), Some(CookieDuration::seconds(3600)));

        let mut builder = HttpResponse::Ok();
        store.clear(&mut builder);
        let response = builder.finish();
        let cookie = response.cookies().next().expect("removal cookie set");
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(CookieDuration::seconds(0)));
    }

    #[test]
    fn test_unauthenticated_redirects_to_login() {
        let response = Unauthenticated.error_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/");
    }
}
