//! Engine configuration (spec §12.3 of the expanded design).
//!
//! This crate never parses a command line itself — `tecnicofs-server` and
//! `tecnicofs-client` own their `clap` CLIs and build a `Config` from the
//! parsed flags. Keeping that boundary here means the engine stays usable
//! from a plain library call site, a `--script` replay, or a future
//! embedding with no CLI at all.

use crate::table::MAX_INODES;

/// Parameters the engine needs at startup. Everything else (file contents,
/// entry limits) is a fixed constant in `table`/`dir`, matching the original
/// system's compile-time sizing.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Number of inode slots, including the root. Must be at least 1.
    pub inode_table_size: usize,
}

impl Config {
    pub fn new(inode_table_size: usize) -> Self {
        Self { inode_table_size }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            inode_table_size: MAX_INODES,
        }
    }
}
