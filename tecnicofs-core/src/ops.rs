//! Operations (spec §4.E): create / delete / move / lookup / print, composed
//! over the inode table, directory entries, path utilities, and resolver.
//!
//! Every operation allocates its own `LockSet`, dispatches into the logic
//! below, and lets the `LockSet` drop at the end of the function — that
//! drop is the single release point spec §9 calls out as the only
//! correctness-critical teardown.

use std::io::Write;

use log::warn;

use crate::config::Config;
use crate::error::FsError;
use crate::path::{is_ancestor_path, split_parent_child};
use crate::print::{self, PrintError};
use crate::resolve::{lookup, LockSet};
use crate::table::{Kind, Mode, Table, MAX_INODES};

/// The concurrent tree engine: a shared inode table plus the operations
/// defined over it. Clone-free; share one `Engine` across worker threads
/// behind a plain reference (every lock lives inside the table itself).
pub struct Engine {
    table: Table,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            table: Table::new(MAX_INODES),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            table: Table::new(capacity),
        }
    }

    pub fn with_config(config: Config) -> Self {
        Self::with_capacity(config.inode_table_size)
    }

    /// `create(path, kind)` (spec §4.E).
    pub fn create(&self, path: &str, kind: Kind) -> Result<(), FsError> {
        let (parent_path, child_name) = split_parent_child(path);
        let mut locks = LockSet::new(&self.table);

        let parent = lookup(&self.table, parent_path, &mut locks, true)?;
        {
            let parent_guard = locks.get(parent).expect("just resolved");
            if parent_guard.kind() != Some(Kind::Dir) {
                return Err(FsError::NotADirectory);
            }
            if parent_guard.as_dir().unwrap().lookup(child_name).is_some() {
                return Err(FsError::AlreadyExists);
            }
        }

        let (child, guard) = self.table.create(kind)?;
        locks.adopt(child, guard);

        let added = locks
            .get_mut(parent)
            .unwrap()
            .as_dir_mut()
            .unwrap()
            .add_entry(child_name, child);

        if let Err(err) = added {
            // Residual close (spec §9): the child inode was allocated but
            // never linked in; free it rather than leaking the slot.
            let child_guard = locks.remove(child).expect("we just adopted it");
            self.table.delete(child_guard);
            warn!("create({path:?}): dir_add_entry failed, freed orphaned inode {child}");
            return Err(err);
        }
        Ok(())
    }

    /// `delete(path)` (spec §4.E).
    pub fn delete(&self, path: &str) -> Result<(), FsError> {
        let (parent_path, child_name) = split_parent_child(path);
        let mut locks = LockSet::new(&self.table);

        let parent = lookup(&self.table, parent_path, &mut locks, true)?;
        let child = {
            let parent_guard = locks.get(parent).expect("just resolved");
            if parent_guard.kind() != Some(Kind::Dir) {
                return Err(FsError::NotADirectory);
            }
            parent_guard
                .as_dir()
                .unwrap()
                .lookup(child_name)
                .ok_or(FsError::NotFound)?
        };

        locks.acquire(child, Mode::Write)?;
        {
            let child_guard = locks.get(child).unwrap();
            if child_guard.kind() == Some(Kind::Dir) && !child_guard.as_dir().unwrap().is_empty() {
                return Err(FsError::NotEmpty);
            }
        }

        locks
            .get_mut(parent)
            .unwrap()
            .as_dir_mut()
            .unwrap()
            .reset_entry(child)?;

        let child_guard = locks.remove(child).expect("acquired above");
        self.table.delete(child_guard);
        Ok(())
    }

    /// `lookup_public(path)` (spec §4.E). The returned inumber is advisory:
    /// by the time the caller observes it, a concurrent `delete` may have
    /// already invalidated it.
    pub fn lookup(&self, path: &str) -> Result<usize, FsError> {
        let mut locks = LockSet::new(&self.table);
        lookup(&self.table, path, &mut locks, false)
    }

    /// `move(old_path, new_path)` (spec §4.E), including the closed
    /// ancestor-cycle and partial-failure residuals from spec §9.
    pub fn mv(&self, old_path: &str, new_path: &str) -> Result<(), FsError> {
        if is_ancestor_path(old_path, new_path) {
            return Err(FsError::InvalidMove);
        }

        let (old_parent_path, old_child_name) = split_parent_child(old_path);
        let (new_parent_path, new_child_name) = split_parent_child(new_path);

        let mut locks = LockSet::new(&self.table);
        let (old_parent, new_parent) = if old_parent_path <= new_parent_path {
            let old_parent = lookup(&self.table, old_parent_path, &mut locks, true)?;
            let new_parent = lookup(&self.table, new_parent_path, &mut locks, true)?;
            (old_parent, new_parent)
        } else {
            let new_parent = lookup(&self.table, new_parent_path, &mut locks, true)?;
            let old_parent = lookup(&self.table, old_parent_path, &mut locks, true)?;
            (old_parent, new_parent)
        };

        if locks.get(new_parent).unwrap().kind() != Some(Kind::Dir) {
            return Err(FsError::NotADirectory);
        }
        if locks
            .get(new_parent)
            .unwrap()
            .as_dir()
            .unwrap()
            .lookup(new_child_name)
            .is_some()
        {
            return Err(FsError::AlreadyExists);
        }

        let moving = {
            let old_parent_guard = locks.get(old_parent).unwrap();
            if old_parent_guard.kind() != Some(Kind::Dir) {
                return Err(FsError::NotADirectory);
            }
            old_parent_guard
                .as_dir()
                .unwrap()
                .lookup(old_child_name)
                .ok_or(FsError::NotFound)?
        };
        if moving == new_parent {
            return Err(FsError::InvalidMove);
        }

        locks
            .get_mut(old_parent)
            .unwrap()
            .as_dir_mut()
            .unwrap()
            .reset_entry(moving)?;

        let added = locks
            .get_mut(new_parent)
            .unwrap()
            .as_dir_mut()
            .unwrap()
            .add_entry(new_child_name, moving);

        if let Err(err) = added {
            // Residual close (spec §9): reinstate the source entry rather
            // than leaving `moving` unreferenced.
            locks
                .get_mut(old_parent)
                .unwrap()
                .as_dir_mut()
                .unwrap()
                .add_entry(old_child_name, moving)
                .expect("the slot we just freed cannot be occupied again under our own lock");
            warn!("mv({old_path:?}, {new_path:?}): dir_add_entry failed, reinstated source entry");
            return Err(err);
        }
        Ok(())
    }

    /// `print_tree(sink)` (spec §4.E).
    pub fn print_tree<W: Write>(&self, sink: &mut W) -> Result<(), PrintError> {
        print::print_tree(&self.table, sink)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_s1_create_lookup_delete_lookup() {
        let engine = Engine::new();
        engine.create("/a", Kind::Dir).unwrap();
        engine.create("/a/b", Kind::File).unwrap();
        assert!(engine.lookup("/a/b").unwrap() >= 1);
        engine.delete("/a/b").unwrap();
        assert_eq!(engine.lookup("/a/b"), Err(FsError::NotFound));
    }

    #[test]
    fn scenario_s2_duplicate_create_fails() {
        let engine = Engine::new();
        engine.create("/a", Kind::Dir).unwrap();
        assert_eq!(engine.create("/a", Kind::Dir), Err(FsError::AlreadyExists));
    }

    #[test]
    fn scenario_s3_cannot_delete_nonempty_dir() {
        let engine = Engine::new();
        engine.create("/a", Kind::Dir).unwrap();
        engine.create("/a/b", Kind::Dir).unwrap();
        assert_eq!(engine.delete("/a"), Err(FsError::NotEmpty));
        engine.delete("/a/b").unwrap();
        engine.delete("/a").unwrap();
    }

    #[test]
    fn scenario_s4_move_across_directories() {
        let engine = Engine::new();
        engine.create("/a", Kind::Dir).unwrap();
        engine.create("/b", Kind::Dir).unwrap();
        engine.create("/a/x", Kind::File).unwrap();
        engine.mv("/a/x", "/b/y").unwrap();
        assert_eq!(engine.lookup("/a/x"), Err(FsError::NotFound));
        assert!(engine.lookup("/b/y").unwrap() >= 1);
    }

    #[test]
    fn scenario_s5_move_missing_source_fails() {
        let engine = Engine::new();
        engine.create("/a", Kind::Dir).unwrap();
        engine.create("/b", Kind::Dir).unwrap();
        engine.create("/b/x", Kind::File).unwrap();
        assert_eq!(engine.mv("/a/x", "/b/y"), Err(FsError::NotFound));
    }

    #[test]
    fn scenario_s6_move_into_own_descendant_fails() {
        let engine = Engine::new();
        engine.create("/a", Kind::Dir).unwrap();
        assert_eq!(engine.mv("/a", "/a/sub"), Err(FsError::InvalidMove));
    }

    #[test]
    fn move_into_deeper_descendant_fails() {
        let engine = Engine::new();
        engine.create("/a", Kind::Dir).unwrap();
        engine.create("/a/b", Kind::Dir).unwrap();
        engine.create("/a/b/c", Kind::Dir).unwrap();
        assert_eq!(engine.mv("/a", "/a/b/c/moved"), Err(FsError::InvalidMove));
    }

    #[test]
    fn move_same_inumber_preserved() {
        let engine = Engine::new();
        engine.create("/a", Kind::Dir).unwrap();
        engine.create("/a/x", Kind::File).unwrap();
        engine.create("/b", Kind::Dir).unwrap();
        let before = engine.lookup("/a/x").unwrap();
        engine.mv("/a/x", "/b/x").unwrap();
        let after = engine.lookup("/b/x").unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn create_frees_child_inode_when_dir_add_entry_fails() {
        // A directory with MAX_DIR_ENTRIES already full: creating one more
        // child must not leak the freshly allocated inode.
        let engine = Engine::with_capacity(64);
        engine.create("/d", Kind::Dir).unwrap();
        for i in 0..crate::table::MAX_DIR_ENTRIES {
            engine.create(&format!("/d/n{i}"), Kind::File).unwrap();
        }
        assert_eq!(engine.create("/d/overflow", Kind::File), Err(FsError::NoSpace));
        // The freed slot must be reusable: creating elsewhere still works.
        engine.create("/other", Kind::Dir).unwrap();
    }

    #[test]
    fn no_space_when_table_is_full() {
        let engine = Engine::with_capacity(2); // root + one more slot
        engine.create("/a", Kind::File).unwrap();
        assert_eq!(engine.create("/b", Kind::File), Err(FsError::NoSpace));
    }
}
