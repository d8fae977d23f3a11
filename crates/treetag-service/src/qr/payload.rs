//! The URL printed on a tree's QR tag, and reading it back.

use qrcode::QrCode;
use qrcode::render::svg;

use treetag_core::error::{AppError, ErrorKind};
use treetag_core::result::AppResult;

/// Route segment of the tree detail page.
const TREE_ROUTE: &str = "/tree/";

/// Minimum width and height of rendered SVG tags, in pixels.
const SVG_MIN_DIMENSION: u32 = 240;

/// Contents of a QR tag: the public detail URL of one field record.
///
/// There is no checksum or signature; any decodable text is accepted as an
/// id when scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrPayload {
    url: String,
    id: String,
}

impl QrPayload {
    /// Payload for field record `id` under `base_url`.
    pub fn for_field_record(base_url: &str, id: &str) -> Self {
        Self {
            url: format!("{}{TREE_ROUTE}{id}", base_url.trim_end_matches('/')),
            id: id.to_string(),
        }
    }

    /// The encoded URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The field record id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Field record id from scanned text.
    ///
    /// A URL containing `/tree/` yields the segment after it; any other
    /// text is taken as the id itself.
    pub fn parse(text: &str) -> AppResult<String> {
        let text = text.trim();
        let id = match text.rfind(TREE_ROUTE) {
            Some(at) => {
                let rest = &text[at + TREE_ROUTE.len()..];
                rest.split(['/', '?', '#']).next().unwrap_or_default()
            }
            None => text,
        };
        if id.is_empty() {
            return Err(AppError::validation("Scanned code is empty"));
        }
        Ok(id.to_string())
    }

    /// Route the app navigates to after a scan.
    pub fn route(id: &str) -> String {
        format!("{TREE_ROUTE}{id}")
    }

    fn code(&self) -> AppResult<QrCode> {
        QrCode::new(self.url.as_bytes()).map_err(|e| {
            AppError::with_source(ErrorKind::Internal, "Failed to encode QR code", e)
        })
    }

    /// Printable SVG image.
    pub fn render_svg(&self) -> AppResult<String> {
        Ok(self
            .code()?
            .render::<svg::Color>()
            .min_dimensions(SVG_MIN_DIMENSION, SVG_MIN_DIMENSION)
            .build())
    }

    /// Terminal rendering, two characters per module.
    pub fn render_text(&self) -> AppResult<String> {
        Ok(self
            .code()?
            .render::<char>()
            .quiet_zone(true)
            .module_dimensions(2, 1)
            .build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_url() {
        let payload = QrPayload::for_field_record("https://treetag.example/", "f-42");
        assert_eq!(payload.url(), "https://treetag.example/tree/f-42");
        assert_eq!(QrPayload::parse(payload.url()).ok().as_deref(), Some("f-42"));
    }

    #[test]
    fn test_parse_accepts_any_text() {
        assert_eq!(QrPayload::parse("  abc123 ").ok().as_deref(), Some("abc123"));
        assert_eq!(
            QrPayload::parse("http://x/tree/9?ref=tag").ok().as_deref(),
            Some("9")
        );
        assert!(QrPayload::parse("   ").is_err());
        assert_eq!(QrPayload::route("9"), "/tree/9");
    }

    #[test]
    fn test_renders() {
        let payload = QrPayload::for_field_record("http://localhost:5173", "f-1");
        let svg = payload.render_svg().expect("svg");
        assert!(svg.contains("<svg"));
        let text = payload.render_text().expect("text");
        assert!(text.lines().count() > 10);
    }
}
