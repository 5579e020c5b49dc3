/// Convenience result type used across Framewire.
pub type FramewireResult<T> = Result<T, FramewireError>;

/// Top-level error taxonomy used by decoder and engine APIs.
///
/// All variants are structural parse/process failures: none of them is
/// transient, and nothing in this crate retries.
#[derive(thiserror::Error, Debug)]
pub enum FramewireError {
    /// A payload between markers was not valid base64. The buffer past this
    /// point is no longer reliably delimited, so the stream is aborted.
    #[error("decode error: {0}")]
    Decode(String),

    /// A data frame's pixel byte count does not match its declared
    /// width*height dimensions.
    #[error("frame size error: {0}")]
    FrameSize(String),

    /// Input ended while a marker pair was open, or with unconsumed content
    /// that can never form a frame.
    #[error("truncated stream: {0}")]
    Truncated(String),

    /// The renderer executable could not be spawned. Reported before any
    /// stream processing starts.
    #[error("renderer launch error: {0}")]
    Launch(String),

    /// The renderer exited with a nonzero status after its output streams
    /// were drained. Frames already delivered remain valid.
    #[error("renderer exited with nonzero status (code {code:?})")]
    Exit {
        /// Exit code, or `None` when the process was terminated by a signal.
        code: Option<i32>,
    },

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FramewireError {
    /// Build a [`FramewireError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`FramewireError::FrameSize`] value.
    pub fn frame_size(msg: impl Into<String>) -> Self {
        Self::FrameSize(msg.into())
    }

    /// Build a [`FramewireError::Truncated`] value.
    pub fn truncated(msg: impl Into<String>) -> Self {
        Self::Truncated(msg.into())
    }

    /// Build a [`FramewireError::Launch`] value.
    pub fn launch(msg: impl Into<String>) -> Self {
        Self::Launch(msg.into())
    }

    /// Build a [`FramewireError::Exit`] value.
    pub fn exit(code: Option<i32>) -> Self {
        Self::Exit { code }
    }
}
