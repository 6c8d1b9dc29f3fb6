/// Convenience result type used across medialab.
pub type MediaLabResult<T> = Result<T, MediaLabError>;

/// Top-level error taxonomy used by transform and driver APIs.
#[derive(thiserror::Error, Debug)]
pub enum MediaLabError {
    /// Invalid user-provided parameters or buffer shapes, raised before any output is produced.
    #[error("validation error: {0}")]
    Validation(String),

    /// A frame source failed to decode a frame; terminal for the active run.
    #[error("decode error at frame {index}: {message}")]
    Decode {
        /// Index of the frame within its input sequence.
        index: u64,
        /// Collaborator-provided failure description.
        message: String,
    },

    /// Internal invariant violated while rendering.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Errors when parsing parameter documents.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MediaLabError {
    /// Build a [`MediaLabError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`MediaLabError::Decode`] value.
    pub fn decode(index: u64, msg: impl Into<String>) -> Self {
        Self::Decode {
            index,
            message: msg.into(),
        }
    }

    /// Build a [`MediaLabError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`MediaLabError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
