//! The path resolver (spec §4.D): hand-over-hand lookup that accumulates
//! locks, root to leaf, into a caller-owned `LockSet`.

use log::debug;

use crate::error::FsError;
use crate::path::tokenize;
use crate::table::{Mode, SlotGuard, Table, ROOT_INUMBER};

/// A caller-owned, ordered ledger of locks currently held by one operation.
/// Acts as both a deduplication set (spec: "an inumber already present in
/// lock_set is never re-locked") and the release point: every `SlotGuard`
/// it holds is dropped, and hence unlocked, when the `LockSet` itself drops.
pub struct LockSet<'a> {
    table: &'a Table,
    held: Vec<(usize, SlotGuard<'a>)>,
}

impl<'a> LockSet<'a> {
    pub fn new(table: &'a Table) -> Self {
        Self {
            table,
            held: Vec::new(),
        }
    }

    pub fn contains(&self, inumber: usize) -> bool {
        self.held.iter().any(|(i, _)| *i == inumber)
    }

    pub fn get(&self, inumber: usize) -> Option<&SlotGuard<'a>> {
        self.held
            .iter()
            .find(|(i, _)| *i == inumber)
            .map(|(_, g)| g)
    }

    pub fn get_mut(&mut self, inumber: usize) -> Option<&mut SlotGuard<'a>> {
        self.held
            .iter_mut()
            .find(|(i, _)| *i == inumber)
            .map(|(_, g)| g)
    }

    /// Appends an already-acquired guard. Used by `inode_create`, whose
    /// guard the table hands back already locked.
    pub fn adopt(&mut self, inumber: usize, guard: SlotGuard<'a>) {
        debug_assert!(!self.contains(inumber));
        self.held.push((inumber, guard));
    }

    /// Acquires `inumber` in `mode` and appends it, unless it is already
    /// held (the resolver's idempotence check, spec §4.D note 1).
    pub fn acquire(&mut self, inumber: usize, mode: Mode) -> Result<(), FsError> {
        if self.contains(inumber) {
            return Ok(());
        }
        let guard = self.table.lock(inumber, mode)?;
        self.held.push((inumber, guard));
        Ok(())
    }

    /// Takes ownership of an already-held guard, removing it from the
    /// ledger. Used when an operation needs to hand the guard to
    /// `Table::delete`, which consumes it.
    pub fn remove(&mut self, inumber: usize) -> Option<SlotGuard<'a>> {
        let pos = self.held.iter().position(|(i, _)| *i == inumber)?;
        Some(self.held.remove(pos).1)
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

/// Hand-over-hand path resolution (spec §4.D `lookup`).
///
/// Walks `path` from the root, acquiring each segment's lock into
/// `lock_set` as it goes (READ for every ancestor; WRITE for the final
/// segment iff `write_final`). On `NotFound`/`NotADirectory`, the caller
/// keeps whatever locks were accumulated so far — releasing them is the
/// caller's responsibility via `lock_set`'s `Drop`.
pub fn lookup(
    table: &Table,
    path: &str,
    lock_set: &mut LockSet<'_>,
    write_final: bool,
) -> Result<usize, FsError> {
    let mut segments = tokenize(path).peekable();
    let path_is_empty = segments.peek().is_none();

    let root_mode = if path_is_empty && write_final {
        Mode::Write
    } else {
        Mode::Read
    };
    lock_set.acquire(ROOT_INUMBER, root_mode)?;

    let mut current = ROOT_INUMBER;
    while let Some(segment) = segments.next() {
        let dir = lock_set
            .get(current)
            .and_then(|guard| guard.as_dir())
            .ok_or(FsError::NotADirectory)?;
        let next = dir.lookup(segment).ok_or(FsError::NotFound)?;

        let is_last = segments.peek().is_none();
        let mode = if is_last && write_final {
            Mode::Write
        } else {
            Mode::Read
        };
        lock_set.acquire(next, mode)?;
        debug!("lookup: resolved segment {segment:?} to inumber {next}");
        current = next;
    }
    Ok(current)
}
