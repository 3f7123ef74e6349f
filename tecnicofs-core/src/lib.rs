//! The concurrent hierarchical namespace engine.
//!
//! This crate has no I/O of its own: it is the in-memory tree plus the
//! locking discipline that makes concurrent operations on it safe. Transport
//! (`tecnicofs-proto`, `tecnicofs-server`, `tecnicofs-client`) lives in
//! separate crates that depend on this one.

pub mod config;
pub mod dir;
pub mod error;
pub mod ops;
pub mod path;
pub mod print;
pub mod resolve;
pub mod table;

pub use config::Config;
pub use error::FsError;
pub use ops::Engine;
pub use print::PrintError;
pub use table::{Kind, Mode, MAX_DIR_ENTRIES, MAX_FILE_NAME, MAX_INODES, MAX_INPUT_SIZE};
