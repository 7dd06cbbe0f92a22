//! reqwest implementation of [`Upstream`]

use async_trait::async_trait;
use common::{CertificateRecord, LoginRequest, LoginResponse, RegisterRequest, SessionToken};
use futures_util::TryStreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{header, Client, RequestBuilder, Response};
use std::time::Duration;
use tokio_util::io::ReaderStream;
use url::Url;

use super::{CertificateDownload, Upstream, UpstreamError};
use crate::uploads::UploadPayload;

/// HTTP client for the certificate API
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl ApiClient {
    pub fn new(base_url: Url, timeout: Duration) -> reqwest::Result<Self> {
        // Per-call timeouts are applied on each request so streamed
        // downloads are not cut off mid-body
        let client = Client::builder().connect_timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// Append path segments to the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| UpstreamError::Unavailable("API base URL cannot take a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send and turn any non-2xx status into a typed error
    async fn send(request: RequestBuilder) -> Result<Response, UpstreamError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(UpstreamError::from_status(status, &body))
    }

    fn authorized(request: RequestBuilder, token: &SessionToken) -> RequestBuilder {
        request.header(header::AUTHORIZATION, token.bearer())
    }
}

#[async_trait]
impl Upstream for ApiClient {
    async fn login(&self, credentials: &LoginRequest) -> Result<SessionToken, UpstreamError> {
        let url = self.endpoint(&["auth", "login"])?;
        let request = self.client.post(url).timeout(self.timeout).json(credentials);

        let body: LoginResponse = Self::send(request).await?.json().await?;
        SessionToken::new(body.token)
            .ok_or_else(|| UpstreamError::Unavailable("login response carried an empty token".to_string()))
    }

    async fn register(&self, registration: &RegisterRequest) -> Result<(), UpstreamError> {
        let url = self.endpoint(&["auth", "register"])?;
        let request = self.client.post(url).timeout(self.timeout).json(registration);

        Self::send(request).await?;
        Ok(())
    }

    async fn list_certificates(
        &self,
        token: &SessionToken,
    ) -> Result<Vec<CertificateRecord>, UpstreamError> {
        let url = self.endpoint(&["certificates"])?;
        let request = Self::authorized(self.client.get(url).timeout(self.timeout), token);

        let records = Self::send(request).await?.json().await?;
        Ok(records)
    }

    async fn download_certificate(
        &self,
        token: &SessionToken,
        id: &str,
    ) -> Result<CertificateDownload, UpstreamError> {
        let url = self.endpoint(&["certificates", id, "download"])?;
        let request = Self::authorized(self.client.get(url), token);

        // Bound the wait for headers only; the body is streamed afterwards
        let response = tokio::time::timeout(self.timeout, Self::send(request))
            .await
            .map_err(|_| UpstreamError::Unavailable("request timed out".to_string()))??;

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<mime::Mime>().ok())
            .unwrap_or(mime::APPLICATION_OCTET_STREAM);

        Ok(CertificateDownload {
            content_type,
            body: Box::pin(response.bytes_stream().map_err(UpstreamError::from)),
        })
    }

    async fn upload_certificate(
        &self,
        token: &SessionToken,
        payload: &UploadPayload,
    ) -> Result<(), UpstreamError> {
        let url = self.endpoint(&["certificates", "upload"])?;

        let file = payload.open().await.map_err(|e| {
            tracing::error!("Staged upload could not be reopened: {}", e);
            UpstreamError::Unavailable("staged upload could not be read".to_string())
        })?;

        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let part = Part::stream_with_length(body, payload.size())
            .file_name(payload.file_name().to_string())
            .mime_str(payload.content_type().as_ref())?;

        let form = Form::new()
            .part("certificate", part)
            .text("activityName", payload.activity_name().to_string());

        let request = Self::authorized(self.client.post(url).timeout(self.timeout), token).multipart(form);

        Self::send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(Url::parse(base).unwrap(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let api = client("http://api.local:8000/v1");
        assert_eq!(
            api.endpoint(&["auth", "login"]).unwrap().as_str(),
            "http://api.local:8000/v1/auth/login"
        );

        let api = client("http://api.local:8000/v1/");
        assert_eq!(
            api.endpoint(&["certificates"]).unwrap().as_str(),
            "http://api.local:8000/v1/certificates"
        );
    }

    #[test]
    fn test_endpoint_encodes_ids() {
        let api = client("http://api.local");
        let url = api.endpoint(&["certificates", "a b/../c", "download"]).unwrap();
        assert_eq!(url.path(), "/certificates/a%20b%2F..%2Fc/download");
    }
}
