//! Domain-specific errors.

use std::path::PathBuf;

use thiserror::Error;

/// Every way a push or pop invocation can fail.
///
/// Each variant is terminal for the invocation that hit it: the command
/// reports it and exits non-zero. None of them leave the stack file
/// partially written.
#[derive(Debug, Error)]
pub enum JumpError {
    /// The editor is not running, or this process was not launched from
    /// its scripting environment.
    #[error("editor unavailable: {0}")]
    EditorUnavailable(String),

    /// A scripting context exists but no saved document is focused.
    #[error("no active document to capture")]
    NoActiveDocument,

    /// The stack lock could not be acquired within the configured bound.
    #[error("timed out waiting for the stack lock at {}", path.display())]
    LockTimeout { path: PathBuf },

    /// The stack file exists but does not parse. The file is left exactly
    /// as it was found.
    #[error("stack file at {} is corrupt: {source}", path.display())]
    CorruptStack {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The stack file or its directory could not be read or written.
    #[error("stack storage unavailable: {0}")]
    StorageUnavailable(#[from] std::io::Error),

    /// A popped point refers to a file that no longer exists. The point
    /// has already been consumed from the stack.
    #[error("target file no longer exists: {}", path.display())]
    TargetMissing { path: PathBuf },
}
