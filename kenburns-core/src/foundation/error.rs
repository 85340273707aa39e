use std::path::PathBuf;

/// Convenience result type used across the crate.
pub type KenBurnsResult<T> = Result<T, KenBurnsError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum KenBurnsError {
    /// Invalid settings or manifest data that cannot be repaired locally.
    #[error("validation error: {0}")]
    Validation(String),

    /// A source raster is missing, unreadable, or has no usable dimensions.
    #[error("image read error: '{}': {message}", path.display())]
    ImageRead {
        /// Source file that failed to load.
        path: PathBuf,
        /// Underlying decoder or IO message.
        message: String,
    },

    /// The requested codec is not available in the local ffmpeg build or hardware.
    #[error("encoder unavailable: {codec}: {message}")]
    EncoderUnavailable {
        /// Codec name passed to `-c:v`.
        codec: String,
        /// Trimmed ffmpeg stderr.
        message: String,
    },

    /// Any other failure while encoding or merging clips.
    #[error("encode error: {0}")]
    Encode(String),

    /// The clip timeline cannot be composed.
    #[error("composition error: {0}")]
    Composition(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KenBurnsError {
    /// Build a [`KenBurnsError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`KenBurnsError::ImageRead`] value.
    pub fn image_read(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::ImageRead {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Build a [`KenBurnsError::EncoderUnavailable`] value.
    pub fn encoder_unavailable(codec: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::EncoderUnavailable {
            codec: codec.into(),
            message: msg.into(),
        }
    }

    /// Build a [`KenBurnsError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`KenBurnsError::Composition`] value.
    pub fn composition(msg: impl Into<String>) -> Self {
        Self::Composition(msg.into())
    }

    /// Whether this error should trigger a retry with the software codec.
    pub fn is_encoder_unavailable(&self) -> bool {
        matches!(self, Self::EncoderUnavailable { .. })
    }

    /// Prefix the message with the pipeline stage that failed, keeping the variant.
    pub fn in_stage(self, stage: impl std::fmt::Display) -> Self {
        match self {
            Self::Validation(m) => Self::Validation(format!("{stage}: {m}")),
            Self::ImageRead { path, message } => Self::ImageRead {
                path,
                message: format!("{stage}: {message}"),
            },
            Self::EncoderUnavailable { codec, message } => Self::EncoderUnavailable {
                codec,
                message: format!("{stage}: {message}"),
            },
            Self::Encode(m) => Self::Encode(format!("{stage}: {m}")),
            Self::Composition(m) => Self::Composition(format!("{stage}: {m}")),
            Self::Other(e) => Self::Other(anyhow::anyhow!("{stage}: {e:#}")),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
