//! Browser front end for the certificate management API.
//!
//! Users log in against the API, and the bearer token it returns is kept in a
//! cookie. Certificate listing, upload and download are proxied with that
//! token attached.

pub mod handlers;
pub mod session;
pub mod state;
pub mod uploads;
pub mod upstream;
pub mod views;

pub use handlers::configure;
pub use state::AppState;
