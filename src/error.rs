// src/error.rs

use crate::features::Feature;

/// Errors produced while loading or analysing a history.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A feature-gated operation was called on a backend lacking the feature.
    #[error("{feature} is not supported by the {vcs} backend")]
    Unsupported { feature: Feature, vcs: &'static str },

    #[error("ref '{0}' could not be resolved")]
    RefNotFound(String),

    /// An adapter does not provide a part of the contract it was asked for.
    #[error("{operation} is not implemented by the {vcs} backend")]
    NotImplemented {
        operation: &'static str,
        vcs: &'static str,
    },

    #[error("no VCS registered for '{0}'")]
    UnknownVcs(String),

    #[error("invalid commit range '{0}'")]
    InvalidRange(String),

    #[error("'{location}' is not a valid {vcs} repository location")]
    InvalidLocation { location: String, vcs: &'static str },

    #[error("API request to {url} failed with status {status}: {message}")]
    Api {
        url: String,
        status: u16,
        message: String,
    },

    #[error(transparent)]
    Git(#[from] git2::Error),

    #[error(transparent)]
    Http(#[from] ureq::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn not_implemented(vcs: &'static str, operation: &'static str) -> Self {
        Self::NotImplemented { operation, vcs }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
