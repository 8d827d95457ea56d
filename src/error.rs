//! Error types for the bundling pipeline.
//!
//! [`BundleError`] is fatal and aborts the run before anything is written.
//! [`FetchError`] is recoverable: the script inliner logs it and moves on.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for the pipeline.
pub type Result<T> = std::result::Result<T, BundleError>;

/// Fatal errors. Any of these stops the run without writing output.
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("empty {attribute} attribute on <{element}>")]
    EmptyReference {
        element: &'static str,
        attribute: &'static str,
    },

    #[error(
        "fragment '{}' loads an SVG but contains {found} comments; exactly one marker comment is required",
        path.display()
    )]
    MarkerComment { path: PathBuf, found: usize },
}

/// Errors from fetching a remote script body.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned {status}")]
    Status { url: String, status: u16 },
}
