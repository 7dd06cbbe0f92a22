// web-server/src/handlers/certificates.rs
use actix_multipart::Multipart;
use actix_web::http::header::{
    Charset, ContentDisposition, DispositionParam, DispositionType, ExtendedValue,
};
use actix_web::http::StatusCode;
use actix_web::{get, post, web, HttpResponse, ResponseError};
use std::fmt;

use super::redirect;
use crate::session::Authenticated;
use crate::state::AppState;
use crate::upstream::{CertificateDownload, UpstreamError};
use crate::views::Page;

const LIST_FAILED: &str = "Failed to load certificates";

/// Download could not be started; no body bytes have been sent yet
#[derive(Debug)]
pub struct DownloadFailed;

impl fmt::Display for DownloadFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to download the certificate.")
    }
}

impl ResponseError for DownloadFailed {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::InternalServerError()
            .content_type(mime::TEXT_PLAIN_UTF_8)
            .body(self.to_string())
    }
}

#[get("/dashboard")]
pub async fn dashboard(state: web::Data<AppState>, auth: Authenticated) -> HttpResponse {
    match state.upstream.list_certificates(auth.token()).await {
        Ok(certificates) => {
            tracing::info!("Loaded {} certificates", certificates.len());
            state.page(&Page::Dashboard {
                certificates: &certificates,
                error: None,
            })
        }
        Err(e) => {
            tracing::warn!("Failed to list certificates ({}): {}", e.kind(), e);
            let mut response = HttpResponse::Ok();
            if matches!(e, UpstreamError::Authentication) {
                state.tokens.clear(&mut response);
            }
            state.page_with(
                response,
                &Page::Dashboard {
                    certificates: &[],
                    error: Some(LIST_FAILED),
                },
            )
        }
    }
}

#[get("/certificates/{id}/download")]
pub async fn download(
    state: web::Data<AppState>,
    auth: Authenticated,
    path: web::Path<String>,
) -> Result<HttpResponse, DownloadFailed> {
    let certificate_id = path.into_inner();

    let download = state
        .upstream
        .download_certificate(auth.token(), &certificate_id)
        .await
        .map_err(|e| {
            tracing::error!(
                "Error downloading certificate {} ({}): {}",
                certificate_id,
                e.kind(),
                e
            );
            DownloadFailed
        })?;

    let filename = format!("certificate-{}.{}", certificate_id, download.extension());
    tracing::info!("Streaming {} ({})", filename, download.content_type);

    let CertificateDownload { content_type, body } = download;

    Ok(HttpResponse::Ok()
        .content_type(content_type)
        .insert_header(attachment(&filename))
        .streaming(body))
}

/// Attachment header for a download name built from a caller supplied id.
///
/// `filename` carries an ASCII fallback; names outside ASCII are also sent
/// as a UTF-8 `filename*` (RFC 6266). Control characters are dropped.
fn attachment(filename: &str) -> ContentDisposition {
    let printable: String = filename.chars().filter(|c| !c.is_control()).collect();
    let fallback: String = printable
        .chars()
        .map(|c| {
            if c == ' ' || (c.is_ascii_graphic() && c != '"' && c != '\\') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let mut parameters = vec![DispositionParam::Filename(fallback)];
    if !printable.is_ascii() {
        parameters.push(DispositionParam::FilenameExt(ExtendedValue {
            charset: Charset::Ext("UTF-8".to_string()),
            language_tag: None,
            value: printable.into_bytes(),
        }));
    }

    ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters,
    }
}

#[get("/upload")]
pub async fn upload_page(state: web::Data<AppState>, _auth: Authenticated) -> HttpResponse {
    state.page(&Page::Upload { error: None })
}

#[post("/upload")]
pub async fn upload(
    state: web::Data<AppState>,
    auth: Authenticated,
    multipart: Multipart,
) -> HttpResponse {
    let payload = match state.uploads.stage(multipart).await {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!("Rejected upload: {}", e);
            let message = format!("Upload failed: {}", e);
            return state.page(&Page::Upload {
                error: Some(message.as_str()),
            });
        }
    };

    tracing::info!(
        "Uploading {} ({} bytes) for activity {}",
        payload.file_name(),
        payload.size(),
        payload.activity_name()
    );

    let result = state.upstream.upload_certificate(auth.token(), &payload).await;
    // Removes the staged file before responding, on both outcomes
    drop(payload);

    match result {
        Ok(()) => redirect("/dashboard").finish(),
        Err(e) => {
            tracing::warn!("Upload rejected ({}): {}", e.kind(), e);
            let message = format!("Upload failed: {}", e.user_message());
            let mut response = HttpResponse::Ok();
            if matches!(e, UpstreamError::Authentication) {
                state.tokens.clear(&mut response);
            }
            state.page_with(
                response,
                &Page::Upload {
                    error: Some(message.as_str()),
                },
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_ascii_name() {
        let header = attachment("certificate-42.pdf").to_string();
        assert_eq!(header, "attachment; filename=\"certificate-42.pdf\"");
    }

    #[test]
    fn test_attachment_non_ascii_name_has_fallback() {
        let header = attachment("certificate-été.pdf");
        assert_eq!(header.get_filename(), Some("certificate-_t_.pdf"));
        let ext = header.get_filename_ext().unwrap();
        assert_eq!(ext.value, "certificate-été.pdf".as_bytes());
        assert!(header.to_string().is_ascii());
    }

    #[test]
    fn test_attachment_drops_control_characters() {
        let header = attachment("certificate-a\nb\"c.pdf");
        assert_eq!(header.get_filename(), Some("certificate-ab_c.pdf"));
        assert!(header.get_filename_ext().is_none());
    }
}
