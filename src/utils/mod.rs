//! Shared utility functions.
//!
//! - `url`: relative URL resolution against a page URL

pub mod url;

pub use self::url::resolve;
