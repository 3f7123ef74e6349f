//! The inode table (spec §4.A): a fixed-size array of inode slots, each
//! guarded by its own reader/writer lock. The allocation scan (finding the
//! first free slot) is additionally serialized by a coarse table-level
//! mutex, mirroring a `Spinlock<ArrayArena<..>>`-style allocator where one
//! lock protects the scan and each entry's own lock protects its contents.

use std::sync::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard, TryLockError};

use log::{debug, warn};

use crate::dir::DirNode;
use crate::error::FsError;

pub const MAX_INODES: usize = 50;
pub const MAX_DIR_ENTRIES: usize = 20;
pub const MAX_FILE_NAME: usize = 40;
pub const MAX_INPUT_SIZE: usize = 100;

/// Slot 0 is reserved for the root directory (spec §3, invariant 1).
pub const ROOT_INUMBER: usize = 0;

/// The kind of an allocated inode. `FREE` is represented by `Slot::Free`
/// rather than a third variant here, since an allocated slot's kind never
/// changes during its lifetime (spec §3, invariant 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    File,
    Dir,
}

/// The payload of a `Kind::File` inode. File contents are opaque bytes:
/// the engine never reads or writes them (spec §1 Non-goals).
#[derive(PartialEq)]
pub struct FileNode {
    pub data: Vec<u8>,
}

impl FileNode {
    fn empty() -> Self {
        Self { data: Vec::new() }
    }
}

#[derive(PartialEq)]
enum Slot {
    Free,
    Dir(DirNode),
    File(FileNode),
}

impl Slot {
    fn kind(&self) -> Option<Kind> {
        match self {
            Slot::Free => None,
            Slot::Dir(_) => Some(Kind::Dir),
            Slot::File(_) => Some(Kind::File),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Read,
    Write,
}

/// A held lock on one inode slot, in either mode. This is the Rust-idiomatic
/// reading of spec §9's "caller may prefer a scoped guard whose destructor
/// runs the release": dropping a `SlotGuard` unlocks the slot, so a
/// `LockSet` (see `resolve.rs`/`ops.rs`) needs no explicit `unlock_all` body.
pub enum SlotGuard<'a> {
    Read(RwLockReadGuard<'a, Slot>),
    Write(RwLockWriteGuard<'a, Slot>),
}

impl<'a> PartialEq for SlotGuard<'a> {
    fn eq(&self, other: &Self) -> bool {
        let this: &Slot = match self {
            SlotGuard::Read(g) => &**g,
            SlotGuard::Write(g) => &**g,
        };
        let that: &Slot = match other {
            SlotGuard::Read(g) => &**g,
            SlotGuard::Write(g) => &**g,
        };
        this == that
    }
}

impl<'a> SlotGuard<'a> {
    pub fn kind(&self) -> Option<Kind> {
        match self {
            SlotGuard::Read(g) => g.kind(),
            SlotGuard::Write(g) => g.kind(),
        }
    }

    pub fn as_dir(&self) -> Option<&DirNode> {
        match self {
            SlotGuard::Read(g) => match &**g {
                Slot::Dir(d) => Some(d),
                _ => None,
            },
            SlotGuard::Write(g) => match &**g {
                Slot::Dir(d) => Some(d),
                _ => None,
            },
        }
    }

    /// `Some` only when this guard is held in `Write` mode and the slot is
    /// a directory; mutation of directory entries always requires a write
    /// lock (spec §4.B: "caller holds its write lock").
    pub fn as_dir_mut(&mut self) -> Option<&mut DirNode> {
        match self {
            SlotGuard::Write(g) => match &mut **g {
                Slot::Dir(d) => Some(d),
                _ => None,
            },
            SlotGuard::Read(_) => None,
        }
    }

    fn free(&mut self) {
        match self {
            SlotGuard::Write(g) => **g = Slot::Free,
            SlotGuard::Read(_) => {
                debug_assert!(false, "freeing a slot requires a write lock");
            }
        }
    }
}

impl<'a> std::fmt::Debug for SlotGuard<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotGuard::Read(_) => f.debug_tuple("Read").finish(),
            SlotGuard::Write(_) => f.debug_tuple("Write").finish(),
        }
    }
}

/// Distinguishes "the lock was busy" from a fatal poisoning error, per
/// spec §4.A: "try_lock never blocks and returns a clear would-block
/// indicator distinct from other failures".
#[derive(Debug)]
pub enum TryLockOutcome<'a> {
    Acquired(SlotGuard<'a>),
    WouldBlock,
}

pub struct Table {
    slots: Vec<RwLock<Slot>>,
    alloc_lock: Mutex<()>,
}

impl Table {
    /// Builds a table with `capacity` slots and creates the root directory
    /// at slot 0, matching the C original's `init_fs`/`inode_table_init`
    /// (spec §3: "created at init and never destroyed").
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > ROOT_INUMBER, "table must have room for the root");
        let slots: Vec<_> = (0..capacity).map(|_| RwLock::new(Slot::Free)).collect();
        {
            let mut root = slots[ROOT_INUMBER]
                .write()
                .expect("root slot lock cannot be poisoned before use");
            *root = Slot::Dir(DirNode::empty());
        }
        Self {
            slots,
            alloc_lock: Mutex::new(()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Allocates the first free slot, initializes it as `kind`, and returns
    /// its inumber with the slot's lock already held in `Write` mode
    /// (spec §4.A `inode_create`). `NoSpace` when every slot is occupied.
    pub fn create(&self, kind: Kind) -> Result<(usize, SlotGuard<'_>), FsError> {
        let _alloc = self.alloc_lock.lock().map_err(|_| FsError::Locking)?;
        for (inumber, slot) in self.slots.iter().enumerate() {
            match slot.try_write() {
                Ok(mut guard) => {
                    if guard.kind().is_none() {
                        *guard = match kind {
                            Kind::Dir => Slot::Dir(DirNode::empty()),
                            Kind::File => Slot::File(FileNode::empty()),
                        };
                        debug!("inode_create: allocated inumber {inumber} as {kind:?}");
                        return Ok((inumber, SlotGuard::Write(guard)));
                    }
                    // Occupied; keep scanning.
                }
                Err(TryLockError::WouldBlock) => continue,
                Err(TryLockError::Poisoned(_)) => {
                    warn!("inode_create: slot {inumber} lock poisoned");
                    return Err(FsError::Locking);
                }
            }
        }
        Err(FsError::NoSpace)
    }

    /// Frees the slot the caller holds a write lock on (spec §4.A
    /// `inode_delete`). The slot is marked free; the guard is consumed, and
    /// its (now meaningless) lock is released when it drops.
    pub fn delete(&self, mut guard: SlotGuard<'_>) {
        guard.free();
    }

    /// Blocking lock acquisition (spec §4.A `lock`).
    pub fn lock(&self, inumber: usize, mode: Mode) -> Result<SlotGuard<'_>, FsError> {
        let slot = &self.slots[inumber];
        match mode {
            Mode::Read => slot.read().map(SlotGuard::Read).map_err(|_| FsError::Locking),
            Mode::Write => slot.write().map(SlotGuard::Write).map_err(|_| FsError::Locking),
        }
    }

    /// Non-blocking lock acquisition (spec §4.A `try_lock`). Used by the
    /// resolver's idempotence check, where the caller may already hold a
    /// conflicting lock on the same inode.
    pub fn try_lock(&self, inumber: usize, mode: Mode) -> Result<TryLockOutcome<'_>, FsError> {
        let slot = &self.slots[inumber];
        let outcome = match mode {
            Mode::Read => match slot.try_read() {
                Ok(g) => TryLockOutcome::Acquired(SlotGuard::Read(g)),
                Err(TryLockError::WouldBlock) => TryLockOutcome::WouldBlock,
                Err(TryLockError::Poisoned(_)) => return Err(FsError::Locking),
            },
            Mode::Write => match slot.try_write() {
                Ok(g) => TryLockOutcome::Acquired(SlotGuard::Write(g)),
                Err(TryLockError::WouldBlock) => TryLockOutcome::WouldBlock,
                Err(TryLockError::Poisoned(_)) => return Err(FsError::Locking),
            },
        };
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_a_directory_after_init() {
        let table = Table::new(MAX_INODES);
        let guard = table.lock(ROOT_INUMBER, Mode::Read).unwrap();
        assert_eq!(guard.kind(), Some(Kind::Dir));
    }

    #[test]
    fn create_allocates_first_free_slot() {
        let table = Table::new(4);
        let (a, _ga) = table.create(Kind::File).unwrap();
        let (b, _gb) = table.create(Kind::File).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, ROOT_INUMBER);
    }

    #[test]
    fn create_fails_when_table_is_full() {
        let table = Table::new(1); // only the root slot
        assert_eq!(table.create(Kind::File), Err(FsError::NoSpace));
    }

    #[test]
    fn delete_returns_slot_to_free_for_reuse() {
        let table = Table::new(2);
        let (inumber, guard) = table.create(Kind::File).unwrap();
        table.delete(guard);
        let (reused, _g) = table.create(Kind::Dir).unwrap();
        assert_eq!(reused, inumber);
    }

    #[test]
    fn try_lock_reports_would_block_distinctly() {
        let table = Table::new(2);
        let _held = table.lock(ROOT_INUMBER, Mode::Write).unwrap();
        let outcome = table.try_lock(ROOT_INUMBER, Mode::Read);
        match outcome {
            Ok(TryLockOutcome::WouldBlock) => {}
            other => panic!("expected WouldBlock, got {other:?}"),
        }
    }
}
