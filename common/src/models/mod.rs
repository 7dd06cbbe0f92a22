pub mod auth;
pub mod certificate;
pub mod session;

pub use auth::*;
pub use certificate::*;
pub use session::*;
