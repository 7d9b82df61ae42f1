//! Map persistence for `.tmf` files.
//!
//! A map file is an XML document holding the sheet image (PNG, base64
//! encoded), the sheet's segmentation parameters, and one record per grid
//! cell. Loading re-segments the embedded sheet, so the file only ever stores
//! catalogue indices.
//!
//! ## Module Structure
//!
//! - [`helpers`] - Path utilities (extension handling, directory creation)
//! - [`save`] - Document to XML
//! - [`load`] - XML to document, with validation
//!
//! Loading is all-or-nothing: a failed load returns an error and leaves any
//! document the caller already holds untouched.

mod helpers;
mod load;
mod save;


pub use helpers::{map_name, with_map_extension};
pub use load::{load_document, load_from_str};
pub use save::{save_document, save_to_string};
