//! coattain-report: Rendered report artifacts.

pub mod html;

pub use html::{generate_html, write_html_report};
