//! Client construction errors

use thiserror::Error;

/// The engine client could not be built
///
/// Returned by [`HttpDocumentStore::connect`](crate::HttpDocumentStore::connect);
/// there is no partially constructed client.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("Failed to resolve engine address '{address}': {source}")]
    Resolve {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Engine address '{address}' resolved to no socket addresses")]
    NoAddress { address: String },

    #[error("Invalid engine URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
