// Error type shared by every stage of the glosser.

/// Result type defaulting to [`GlossError`].
pub type Result<T, E = GlossError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum GlossError {
    /// Nothing was registered for training, so no inference is possible.
    #[error("no dictionary entries were registered; check the dictionary paths")]
    EmptyDictionary,

    /// Evaluation was requested but sampling withheld no forms.
    #[error("evaluation fraction {fraction} withheld no forms; increase the fraction")]
    EmptyHeldOut { fraction: f64 },

    #[error("invalid argument {arg}: {msg}")]
    InvalidArgument { arg: &'static str, msg: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GlossError {
    pub(crate) fn invalid_argument<S>(arg: &'static str, msg: S) -> Self
    where
        S: Into<String>,
    {
        Self::InvalidArgument {
            arg,
            msg: msg.into(),
        }
    }

    /// Process exit status for this error. 2 is left to usage errors.
    pub fn exit_code(&self) -> i32 {
        match self {
            GlossError::Io(_) => 1,
            GlossError::EmptyDictionary => 3,
            GlossError::EmptyHeldOut { .. } => 4,
            GlossError::InvalidArgument { .. } => 5,
        }
    }
}
