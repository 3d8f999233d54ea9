//! HTTP transport for filedrop uploads.
//!
//! Sends the selected file as a single `multipart/form-data` POST with the
//! body streamed in chunks, reporting progress as chunks are handed to the
//! connection.

mod error;
mod transport;

pub use error::HttpTransportError;
pub use transport::{FORM_FIELD, HttpTransport};
