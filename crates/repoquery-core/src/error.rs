//! Error types for repoquery-core

/// Result type for repoquery-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in repoquery-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A provider was registered under an unusable name
    #[error("Invalid provider name: {name:?}")]
    InvalidProviderName { name: String },

    /// A package name was rejected by the provider's name grammar
    #[error("Ill-formed package name: {name:?}")]
    IllFormedName { name: String },

    /// A package name prefix was rejected by the provider's prefix grammar
    #[error("Ill-formed package name prefix: {prefix:?}")]
    IllFormedPrefix { prefix: String },

    /// A registration referenced a parent that could not be resolved
    #[error("Unknown parent provider {parent} for {child}")]
    ParentNotFound { parent: String, child: String },

    /// A query named a provider that is neither registered nor loadable
    #[error("Unknown provider: {name}")]
    UnknownProvider { name: String },

    /// A capability the provider does not implement was invoked
    #[error("Provider capability not implemented: {capability}")]
    NotImplemented { capability: &'static str },

    /// The underlying package tool failed
    #[error(transparent)]
    Exec(#[from] repoquery_exec::Error),
}

impl Error {
    pub(crate) fn not_implemented(capability: &'static str) -> Self {
        Error::NotImplemented { capability }
    }
}
