//! HTTP response models
//!
//! These types shape the JSON envelopes sent to clients and exist only in
//! the HTTP layer. Stored documents are carried as `serde_json::Value` after
//! field projection.

pub mod response;

pub use response::{Envelope, STATUS_SUCCESS, STATUS_UPDATED};
