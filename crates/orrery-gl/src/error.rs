use crate::transform::MatrixMode;

/// Contract violations of the immediate-mode protocol.
///
/// Every variant signals a deterministic caller bug, never an environmental
/// condition. Hosts must treat these as fatal — log and stop the frame loop,
/// never retry. No operation mutates state before returning one of these.
#[derive(Debug, thiserror::Error)]
pub enum GlError {
    /// `begin` was called while a recording session is already open.
    #[error("begin called while recording `{0}` is still open")]
    AlreadyRecording(String),

    /// `vertex` or `end` was called outside a begin/end session.
    #[error("attempt to operate outside begin/end")]
    NotRecording,

    /// `draw` was called while a recording session is open.
    #[error("draw called while recording `{0}` is still open")]
    DrawDuringRecording(String),

    /// `draw` was called with a name no recording is stored under.
    #[error("no recording named `{0}`")]
    UnknownRecording(String),

    /// Line recordings cannot carry per-vertex colors.
    #[error("per-vertex colors are not supported for line recordings")]
    LinesWithColors,

    /// `pop` on an empty matrix stack.
    #[error("popping an empty {0:?} matrix stack")]
    EmptyStackPop(MatrixMode),

    /// Nonzero stack depth at end-of-frame flush: mismatched push/pop.
    #[error("{depth} leftover matrices on the {mode:?} stack at flush")]
    UnbalancedStack { mode: MatrixMode, depth: usize },

    /// A shader module failed wgpu validation at context creation.
    #[error("shader `{name}` failed validation: {message}")]
    ShaderValidation { name: &'static str, message: String },
}
