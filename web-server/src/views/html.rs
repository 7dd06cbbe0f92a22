// web-server/src/views/html.rs
use common::CertificateRecord;
use serde_json::Value;
use std::fmt::Write;

use super::{Page, Renderer};

/// Built-in markup for the four portal pages
#[derive(Debug, Clone)]
pub struct HtmlRenderer {
    title: String,
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new("Certificate Portal")
    }
}

impl HtmlRenderer {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into() }
    }

    fn layout(&self, heading: &str, error: Option<&str>, body: &str) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{} - {}</title>\n</head>\n<body>\n<h1>{}</h1>\n",
            escape(heading),
            escape(&self.title),
            escape(heading)
        );
        if let Some(error) = error {
            let _ = writeln!(out, "<p class=\"error\" role=\"alert\">{}</p>", escape(error));
        }
        out.push_str(body);
        out.push_str("</body>\n</html>\n");
        out
    }

    fn certificate_list(certificates: &[CertificateRecord]) -> String {
        if certificates.is_empty() {
            return "<p class=\"empty\">No certificates yet.</p>\n".to_string();
        }

        let mut out = String::from("<ul class=\"certificates\">\n");
        for record in certificates {
            out.push_str("<li class=\"certificate\">");
            for (key, value) in record.fields() {
                if let Some(text) = scalar_text(value) {
                    let _ = write!(
                        out,
                        "<span data-field=\"{}\">{}</span> ",
                        escape(key),
                        escape(&text)
                    );
                }
            }
            if let Some(id) = record.id() {
                let _ = write!(
                    out,
                    "<a href=\"/certificates/{}/download\">Download</a>",
                    escape(&url_segment(&id))
                );
            }
            out.push_str("</li>\n");
        }
        out.push_str("</ul>\n");
        out
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, page: &Page<'_>) -> String {
        match page {
            Page::Login { error } => self.layout(
                "Log in",
                *error,
                concat!(
                    "<form method=\"post\" action=\"/login\">\n",
                    "<input type=\"email\" name=\"email\" required>\n",
                    "<input type=\"password\" name=\"password\" required>\n",
                    "<button type=\"submit\">Log in</button>\n",
                    "</form>\n",
                    "<a href=\"/register\">Create an account</a>\n"
                ),
            ),
            Page::Register { error } => self.layout(
                "Register",
                *error,
                concat!(
                    "<form method=\"post\" action=\"/register\">\n",
                    "<input type=\"text\" name=\"name\" required>\n",
                    "<input type=\"email\" name=\"email\" required>\n",
                    "<input type=\"password\" name=\"password\" required>\n",
                    "<button type=\"submit\">Register</button>\n",
                    "</form>\n",
                    "<a href=\"/\">Back to login</a>\n"
                ),
            ),
            Page::Dashboard { certificates, error } => {
                let mut body = Self::certificate_list(certificates);
                body.push_str("<a href=\"/upload\">Upload a certificate</a>\n");
                self.layout("Your certificates", *error, &body)
            }
            Page::Upload { error } => self.layout(
                "Upload a certificate",
                *error,
                concat!(
                    "<form method=\"post\" action=\"/upload\" enctype=\"multipart/form-data\">\n",
                    "<input type=\"text\" name=\"activityName\" required>\n",
                    "<input type=\"file\" name=\"certificate\" required>\n",
                    "<button type=\"submit\">Upload</button>\n",
                    "</form>\n",
                    "<a href=\"/dashboard\">Back to dashboard</a>\n"
                ),
            ),
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn url_segment(id: &str) -> String {
    url::form_urlencoded::byte_serialize(id.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
