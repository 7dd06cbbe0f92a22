// web-server/src/state.rs
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, HttpResponseBuilder};
use common::Config;
use std::io;
use std::sync::Arc;
use url::Url;

use crate::session::TokenStore;
use crate::uploads::UploadStaging;
use crate::upstream::{ApiClient, Upstream};
use crate::views::{HtmlRenderer, Page, Renderer};

/// Collaborators shared by every handler, built once at startup
#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<dyn Upstream>,
    pub renderer: Arc<dyn Renderer>,
    pub tokens: TokenStore,
    pub uploads: UploadStaging,
}

impl AppState {
    pub fn new(
        upstream: Arc<dyn Upstream>,
        renderer: Arc<dyn Renderer>,
        tokens: TokenStore,
        uploads: UploadStaging,
    ) -> Self {
        Self {
            upstream,
            renderer,
            tokens,
            uploads,
        }
    }

    /// Wire up the real API client and HTML renderer from configuration
    pub fn from_config(config: &Config) -> io::Result<Self> {
        let base_url = Url::parse(&config.api_url).map_err(io::Error::other)?;
        let client = ApiClient::new(base_url, config.upstream_timeout()).map_err(io::Error::other)?;

        let uploads = UploadStaging::new(&config.upload_dir, config.max_upload_bytes);
        uploads.ensure_dir()?;

        Ok(Self::new(
            Arc::new(client),
            Arc::new(HtmlRenderer::default()),
            TokenStore::new(&config.cookie),
            uploads,
        ))
    }

    /// 200 response with the rendered page
    pub fn page(&self, page: &Page<'_>) -> HttpResponse {
        self.page_with(HttpResponse::Ok(), page)
    }

    pub fn page_with(&self, mut builder: HttpResponseBuilder, page: &Page<'_>) -> HttpResponse {
        builder
            .content_type(ContentType::html())
            .body(self.renderer.render(page))
    }
}
