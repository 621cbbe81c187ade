//! Scannable-image seam.
//!
//! Rendering is a pure function of the code payload and produces no state;
//! the production renderer is an external service honoring this contract.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

pub trait CodeRenderer: Send + Sync {
    fn render(&self, payload: &str) -> Vec<u8>;
    fn content_type(&self) -> &'static str;
}

/// Minimal SVG rendition carrying the code as text. Codes are uppercase
/// alphanumeric, so the payload needs no XML escaping.
pub struct SvgCodeRenderer;

impl CodeRenderer for SvgCodeRenderer {
    fn render(&self, payload: &str) -> Vec<u8> {
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"300\" height=\"80\">\
             <rect width=\"100%\" height=\"100%\" fill=\"#FFFFFF\"/>\
             <text x=\"150\" y=\"45\" text-anchor=\"middle\" \
             font-family=\"monospace\" font-size=\"16\" fill=\"#000000\">{payload}</text>\
             </svg>"
        )
        .into_bytes()
    }

    fn content_type(&self) -> &'static str {
        "image/svg+xml"
    }
}

/// Base64 data URL of the rendered image, embedded in purchase responses so
/// clients can display the code without a second request.
pub fn data_url(renderer: &dyn CodeRenderer, payload: &str) -> String {
    format!(
        "data:{};base64,{}",
        renderer.content_type(),
        STANDARD.encode(renderer.render(payload))
    )
}

pub type SharedRenderer = Arc<dyn CodeRenderer>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_embeds_payload() {
        let bytes = SvgCodeRenderer.render("TKT123ABC");
        let svg = String::from_utf8(bytes).unwrap();
        assert!(svg.contains("TKT123ABC"));
        assert!(svg.starts_with("<svg"));
    }

    #[test]
    fn test_data_url_shape() {
        let url = data_url(&SvgCodeRenderer, "TKT123ABC");
        assert!(url.starts_with("data:image/svg+xml;base64,"));
    }
}
