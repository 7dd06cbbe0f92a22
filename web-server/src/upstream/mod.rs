//! Access to the certificate management API.
//!
//! Handlers depend on the [`Upstream`] trait only, so the HTTP client can be
//! swapped for a fake in tests. Every operation maps to one API call and
//! reports failures as an [`UpstreamError`]; nothing is retried.

mod client;
mod error;

pub use client::ApiClient;
pub use error::UpstreamError;

use async_trait::async_trait;
use bytes::Bytes;
use common::{CertificateRecord, LoginRequest, RegisterRequest, SessionToken};
use futures_util::Stream;
use mime::Mime;
use std::fmt;
use std::pin::Pin;

use crate::uploads::UploadPayload;

/// Lazily produced certificate body. Finite and consumed once.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, UpstreamError>> + Send + 'static>>;

pub struct CertificateDownload {
    pub content_type: Mime,
    pub body: ByteStream,
}

impl CertificateDownload {
    /// File extension presented to the browser, taken from the media subtype
    pub fn extension(&self) -> String {
        extension_for(&self.content_type)
    }
}

impl fmt::Debug for CertificateDownload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CertificateDownload")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

fn extension_for(content_type: &Mime) -> String {
    if content_type.essence_str() == mime::APPLICATION_OCTET_STREAM.essence_str() {
        return "bin".to_string();
    }
    // `subtype()` already excludes the `+xml` style suffix and any parameters
    content_type.subtype().as_str().to_ascii_lowercase()
}

#[async_trait]
pub trait Upstream: Send + Sync {
    async fn login(&self, credentials: &LoginRequest) -> Result<SessionToken, UpstreamError>;

    async fn register(&self, registration: &RegisterRequest) -> Result<(), UpstreamError>;

    async fn list_certificates(
        &self,
        token: &SessionToken,
    ) -> Result<Vec<CertificateRecord>, UpstreamError>;

    async fn download_certificate(
        &self,
        token: &SessionToken,
        id: &str,
    ) -> Result<CertificateDownload, UpstreamError>;

    async fn upload_certificate(
        &self,
        token: &SessionToken,
        payload: &UploadPayload,
    ) -> Result<(), UpstreamError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ext(content_type: &str) -> String {
        extension_for(&content_type.parse::<Mime>().unwrap())
    }

    #[test]
    fn test_extension_from_subtype() {
        assert_eq!(ext("application/pdf"), "pdf");
        assert_eq!(ext("image/png"), "png");
        assert_eq!(ext("application/x-pem-file"), "x-pem-file");
    }

    #[test]
    fn test_extension_ignores_parameters_and_suffix() {
        assert_eq!(ext("application/pdf; charset=binary"), "pdf");
        assert_eq!(ext("image/svg+xml"), "svg");
        assert_eq!(ext("Application/PDF"), "pdf");
    }

    #[test]
    fn test_octet_stream_is_bin() {
        assert_eq!(ext("application/octet-stream"), "bin");
    }
}
