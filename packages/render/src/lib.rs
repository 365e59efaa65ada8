#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Presentation layer for the crash dashboard.
//!
//! Turns report outputs into views: Plotly figure specifications
//! ([`figure`]), a Leaflet marker map ([`map`]) and plain tables
//! ([`table`]). [`views`] bundles them per dashboard section for the JSON
//! API, [`page`] embeds them in a server-rendered HTML page, [`export`]
//! writes the hourly CSV download and [`text`] prints a terminal summary.

pub mod export;
pub mod figure;
pub mod map;
pub mod page;
pub mod table;
pub mod text;
pub mod views;

pub use figure::Figure;
pub use map::MapSpec;
pub use table::TableView;
pub use views::DashboardView;

use thiserror::Error;

/// Errors that can occur while rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// CSV writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing to the output buffer failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Rendered output was not valid UTF-8.
    #[error("Encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Escapes text for inclusion in HTML content or attribute values.
#[must_use]
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_escape_handles_markup_characters() {
        assert_eq!(
            html_escape(r#"<a href="x">O'Brien & Co</a>"#),
            "&lt;a href=&quot;x&quot;&gt;O&#39;Brien &amp; Co&lt;/a&gt;"
        );
        assert_eq!(html_escape("plain"), "plain");
    }
}
