use std::ffi::OsString;

use crate::util::fmt_bytes;

/// One immediate child of the listed directory.
///
/// `file_name` is the name exactly as the filesystem reported it and is what
/// paths are built from; `name` is its display form, lossily decoded.
/// `size_known` is only ever false for directories whose recursive size is
/// still being computed.
///
/// ```rust
/// use purge::model::Entry;
///
/// let file = Entry::file("notes.txt", 120);
/// assert!(file.size_known);
/// assert!(!file.is_selectable());
/// assert_eq!(file.name, "notes.txt");
///
/// let dir = Entry::directory("src");
/// assert!(!dir.size_known);
/// assert!(dir.is_selectable());
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry {
    pub name: String,
    pub file_name: OsString,
    pub size_bytes: u64,
    pub is_directory: bool,
    pub size_known: bool,
}

impl Entry {
    pub fn file(file_name: impl Into<OsString>, size_bytes: u64) -> Self {
        let file_name = file_name.into();
        Self {
            name: file_name.to_string_lossy().into_owned(),
            file_name,
            size_bytes,
            is_directory: false,
            size_known: true,
        }
    }

    /// A directory whose size has not been aggregated yet.
    pub fn directory(file_name: impl Into<OsString>) -> Self {
        let file_name = file_name.into();
        Self {
            name: file_name.to_string_lossy().into_owned(),
            file_name,
            size_bytes: 0,
            is_directory: true,
            size_known: false,
        }
    }

    /// A directory with an already aggregated size.
    pub fn sized_directory(file_name: impl Into<OsString>, size_bytes: u64) -> Self {
        Self {
            size_bytes,
            size_known: true,
            ..Self::directory(file_name)
        }
    }

    /// Whether the navigator can descend into this entry.
    pub fn is_selectable(&self) -> bool {
        self.is_directory
    }
}

/// Ordered children of a single directory, in enumeration order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EntryList {
    entries: Vec<Entry>,
}

impl EntryList {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[Entry] {
        &self.entries
    }

    /// Number of entries still waiting for their size.
    pub fn unknown_count(&self) -> usize {
        self.entries.iter().filter(|entry| !entry.size_known).count()
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Entry> {
        self.entries.get_mut(index)
    }

    pub(crate) fn remove(&mut self, index: usize) -> Entry {
        self.entries.remove(index)
    }

    pub(crate) fn into_vec(self) -> Vec<Entry> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a EntryList {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Recursive size of one top-level subdirectory, tagged with the listing
/// generation it was computed for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SizeResult {
    pub generation: u64,
    pub index: usize,
    pub size_bytes: u64,
}

/// One display row handed to the renderer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Row {
    pub left: String,
    pub right: String,
    pub highlighted: bool,
    pub is_directory: bool,
}

/// Space on the filesystem holding a directory.
///
/// ```rust
/// use purge::model::DiskSpace;
///
/// let space = DiskSpace { available: 1024, total: 4096 };
/// assert_eq!(space.used_percent(), 75);
/// assert_eq!(space.describe(), "1.0 KB available (75% used)");
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DiskSpace {
    pub available: u64,
    pub total: u64,
}

impl DiskSpace {
    pub fn used_percent(&self) -> u64 {
        if self.total == 0 {
            return 0;
        }
        let used = self.total.saturating_sub(self.available) as u128;
        (used * 100 / self.total as u128) as u64
    }

    pub fn describe(&self) -> String {
        format!(
            "{} available ({}% used)",
            fmt_bytes(self.available),
            self.used_percent()
        )
    }
}

/// Renderer-agnostic snapshot of the navigator.
///
/// `status` holds the current path (with sizing progress while any size is
/// outstanding), followed by the disk space line when it could be queried.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Buffer {
    pub rows: Vec<Row>,
    pub status: Vec<String>,
}
