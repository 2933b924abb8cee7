//! # Entity Errors
//!
//! Failures while naming or decoding gateway entities. Validation failures
//! live in `apigw-schema`; these errors mean the input could not even be
//! turned into a typed entity.

use thiserror::Error;

/// Error decoding or classifying a gateway entity.
#[derive(Error, Debug)]
pub enum EntityError {
    /// The entity kind name is not one the control plane manages.
    #[error("unknown entity kind '{0}' (expected route, service, upstream, consumer or ssl)")]
    UnknownKind(String),

    /// `hash_on` holds a value outside the supported set.
    #[error("invalid hash_on type: {0}")]
    UnknownHashOn(String),

    /// The document does not decode into the requested entity kind.
    #[error("cannot decode {kind} document: {source}")]
    Decode {
        /// Entity kind the document was decoded as.
        kind: &'static str,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },
}
