//! Output generation for the rendered digest and its JSON form.
//!
//! # Submodules
//!
//! - [`html`]: Renders a [`SelectionResult`](crate::models::SelectionResult) as an inline-styled HTML digest
//! - [`json`]: Writes the selection to a dated JSON file
//!
//! The CSV archive of scored articles lives in [`crate::archive`].

pub mod html;
pub mod json;
