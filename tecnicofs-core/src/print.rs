//! Tree printer (spec §4.E `print_tree`, §4.F design note on print concurrency).
//!
//! Holding the root's WRITE lock is sufficient for a whole-tree snapshot:
//! every other operation's resolver must acquire (at least) a READ lock on
//! the root before touching anything else, so holding it exclusively blocks
//! every concurrent mutator before it can reach any other inode. Each
//! directory visited during the walk is still read-locked individually
//! (Rust's type system requires going through the `RwLock` to read a
//! `DirNode` at all), but those locks can never be contended while the root
//! write lock is held.

use std::io::Write;

use thiserror::Error;

use crate::error::FsError;
use crate::table::{Mode, Table, ROOT_INUMBER};

#[derive(Debug, Error)]
pub enum PrintError {
    #[error(transparent)]
    Fs(#[from] FsError),
    #[error("writing to the tree sink failed: {0}")]
    Io(#[from] std::io::Error),
}

pub fn print_tree<W: Write>(table: &Table, sink: &mut W) -> Result<(), PrintError> {
    // Held for the whole walk, not just this function's body: `write_entries`
    // below recurses into children while `root_guard` is still alive, which
    // is what actually gives the whole-tree snapshot its consistency. It
    // must never be re-acquired (even for reading) from in here — `RwLock`
    // is not reentrant, and a second `lock(ROOT_INUMBER, ..)` on this same
    // thread would deadlock against itself.
    let root_guard = table.lock(ROOT_INUMBER, Mode::Write)?;
    let entries = match root_guard.as_dir() {
        Some(dir) => dir.iter().map(|(name, i)| (name.to_owned(), i)).collect(),
        None => Vec::new(),
    };
    write_entries(table, "", entries, sink)
}

fn write_children<W: Write>(
    table: &Table,
    inumber: usize,
    path: &str,
    sink: &mut W,
) -> Result<(), PrintError> {
    let guard = table.lock(inumber, Mode::Read)?;
    let entries = match guard.as_dir() {
        Some(dir) => dir.iter().map(|(name, i)| (name.to_owned(), i)).collect(),
        None => return Ok(()),
    };
    drop(guard);
    write_entries(table, path, entries, sink)
}

fn write_entries<W: Write>(
    table: &Table,
    path: &str,
    entries: Vec<(String, usize)>,
    sink: &mut W,
) -> Result<(), PrintError> {
    for (name, child) in entries {
        let child_path = format!("{path}/{name}");
        writeln!(sink, "{child_path}")?;
        write_children(table, child, &child_path, sink)?;
    }
    Ok(())
}
