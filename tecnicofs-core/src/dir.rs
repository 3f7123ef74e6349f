//! Directory entries (spec §4.B).
//!
//! A directory's content is a fixed-capacity ordered sequence of slots, each
//! either free or holding one `(name, inumber)` pair. Order is an
//! implementation detail except for `print`, which walks entries in
//! insertion order.

use crate::error::FsError;
use crate::table::MAX_DIR_ENTRIES;

#[derive(Clone, PartialEq)]
struct DirEntry {
    name: String,
    inumber: usize,
}

/// The payload of a `Kind::Dir` inode.
#[derive(PartialEq)]
pub struct DirNode {
    entries: [Option<DirEntry>; MAX_DIR_ENTRIES],
}

impl DirNode {
    pub fn empty() -> Self {
        Self {
            entries: std::array::from_fn(|_| None),
        }
    }

    /// Linear scan for an entry by name (spec: `lookup_sub_node`).
    pub fn lookup(&self, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .flatten()
            .find(|entry| entry.name == name)
            .map(|entry| entry.inumber)
    }

    /// Writes a new `(name, inumber)` entry into the first free slot.
    /// Fails if `name` is already present or the directory is full.
    pub fn add_entry(&mut self, name: &str, inumber: usize) -> Result<(), FsError> {
        if self.lookup(name).is_some() {
            return Err(FsError::AlreadyExists);
        }
        let slot = self
            .entries
            .iter_mut()
            .find(|entry| entry.is_none())
            .ok_or(FsError::NoSpace)?;
        *slot = Some(DirEntry {
            name: name.to_owned(),
            inumber,
        });
        Ok(())
    }

    /// Frees the entry pointing at `inumber`. Fails if not found.
    pub fn reset_entry(&mut self, inumber: usize) -> Result<(), FsError> {
        let slot = self
            .entries
            .iter_mut()
            .find(|entry| matches!(entry, Some(e) if e.inumber == inumber))
            .ok_or(FsError::NotFound)?;
        *slot = None;
        Ok(())
    }

    /// SUCCESS (`true`) iff every slot is free.
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Option::is_none)
    }

    /// Entries in insertion (slot) order, for `print`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries
            .iter()
            .flatten()
            .map(|entry| (entry.name.as_str(), entry.inumber))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_lookup() {
        let mut dir = DirNode::empty();
        dir.add_entry("a", 1).unwrap();
        assert_eq!(dir.lookup("a"), Some(1));
        assert_eq!(dir.lookup("b"), None);
    }

    #[test]
    fn names_are_unique() {
        let mut dir = DirNode::empty();
        dir.add_entry("a", 1).unwrap();
        assert_eq!(dir.add_entry("a", 2), Err(FsError::AlreadyExists));
    }

    #[test]
    fn reset_entry_frees_slot_for_reuse() {
        let mut dir = DirNode::empty();
        dir.add_entry("a", 1).unwrap();
        dir.reset_entry(1).unwrap();
        assert_eq!(dir.lookup("a"), None);
        assert!(dir.is_empty());
    }

    #[test]
    fn full_directory_rejects_new_entries() {
        let mut dir = DirNode::empty();
        for i in 0..MAX_DIR_ENTRIES {
            dir.add_entry(&format!("n{i}"), i).unwrap();
        }
        assert_eq!(dir.add_entry("overflow", 999), Err(FsError::NoSpace));
    }

    #[test]
    fn insertion_order_is_preserved_after_reuse() {
        let mut dir = DirNode::empty();
        dir.add_entry("a", 1).unwrap();
        dir.add_entry("b", 2).unwrap();
        dir.reset_entry(1).unwrap();
        dir.add_entry("c", 3).unwrap();
        let names: Vec<_> = dir.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["c", "b"]);
    }
}
