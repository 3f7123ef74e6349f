use thiserror::Error;

/// Error taxonomy returned by the engine (spec §7).
///
/// Every public operation either fully succeeds or leaves the table
/// unchanged; callers never observe a half-applied mutation through an
/// `Err`, except the two residual cases `create`/`mv` document and close
/// (see `ops.rs`).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    #[error("path segment did not resolve")]
    NotFound,
    #[error("a parent in the path is not a directory")]
    NotADirectory,
    #[error("destination name already exists")]
    AlreadyExists,
    #[error("directory is not empty")]
    NotEmpty,
    #[error("inode table or directory is full")]
    NoSpace,
    #[error("invalid move")]
    InvalidMove,
    #[error("a lock was found poisoned by a panicking thread")]
    Locking,
}

impl FsError {
    /// The wire-compatible code for this error: a single negative value is
    /// sufficient (spec §7); callers that want the taxonomy use the `Err`
    /// variant itself, not this code.
    pub fn code(self) -> i32 {
        -1
    }
}
