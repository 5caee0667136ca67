//! Request URI reconstruction.

mod encoding;
mod reconstruct;
mod reconstructed;

pub use encoding::contains_encoded_parts;
pub use reconstruct::{reconstruct, resolve_port, resolve_scheme};
pub use reconstructed::ReconstructedUri;

use thiserror::Error;

/// Errors that can occur while rewriting a request URI.
#[derive(Debug, Error)]
pub enum ReconstructError {
    #[error("reconstructed uri '{uri}' is invalid: {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: url::ParseError,
    },
}
