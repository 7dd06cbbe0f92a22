// web-server/src/views/mod.rs
mod html;

pub use html::HtmlRenderer;

use common::CertificateRecord;

/// View model handed to the renderer: page data plus an optional error line
#[derive(Debug, Clone, Copy)]
pub enum Page<'a> {
    Login {
        error: Option<&'a str>,
    },
    Register {
        error: Option<&'a str>,
    },
    Dashboard {
        certificates: &'a [CertificateRecord],
        error: Option<&'a str>,
    },
    Upload {
        error: Option<&'a str>,
    },
}

/// Turns a page into an HTML document
pub trait Renderer: Send + Sync {
    fn render(&self, page: &Page<'_>) -> String;
}
