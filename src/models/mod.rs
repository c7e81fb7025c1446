//! Data models for extracted content.

mod record;

pub use record::{FieldValue, Record, URL_FIELD};
