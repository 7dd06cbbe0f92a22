// web-server/src/handlers/mod.rs
pub mod auth;
pub mod certificates;

use actix_web::http::header;
use actix_web::{web, HttpResponse, HttpResponseBuilder};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::login_page)
        .service(auth::login)
        .service(auth::register_page)
        .service(auth::register)
        .service(certificates::dashboard)
        .service(certificates::download)
        .service(certificates::upload_page)
        .service(certificates::upload);
}

/// 303 so the browser follows a POST with a GET
pub(crate) fn redirect(location: &str) -> HttpResponseBuilder {
    let mut builder = HttpResponse::SeeOther();
    builder.insert_header((header::LOCATION, location));
    builder
}
