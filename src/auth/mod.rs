//! Credential exchange: API key to short-lived signed conversation URL.

pub mod signed_url;

pub use signed_url::{SignedUrlClient, SIGNED_URL_PATH};
