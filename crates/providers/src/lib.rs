//! Remote text generator implementations for AppForge.
//!
//! All generators implement the `appforge_core::TextGenerator` trait.

pub mod extract;
pub mod responses_api;

pub use extract::extract_text;
pub use responses_api::ResponsesApiGenerator;
