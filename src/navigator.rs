use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use thiserror::Error;

use crate::fs::{FileSystem, NodeKind, normalize, parent_of};
use crate::model::{Buffer, DiskSpace, Entry, EntryList, Row, SizeResult};
use crate::scanner::Aggregator;
use crate::util::fmt_bytes;
use crate::viewport::{Window, next_window};

/// Appended to directory names in display rows.
pub const DIRECTORY_MARKER: &str = "/";
/// Shown in place of a size that is still being computed.
pub const CALCULATING: &str = "...";

/// Failures of navigation and deletion. State is untouched when one is returned.
#[derive(Debug, Error)]
pub enum NavError {
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("cannot open {}: {source}", path.display())]
    PathError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to delete {}: {source}", path.display())]
    RemovalFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("nothing is selected")]
    NothingSelected,
}

/// Display order applied to a listing.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SortPolicy {
    /// Filesystem enumeration order.
    #[default]
    Listing,
    /// Largest first, applied once every size is known. Ties keep listing order.
    SizeDescending,
}

impl SortPolicy {
    pub fn label(self) -> &'static str {
        match self {
            SortPolicy::Listing => "listing",
            SortPolicy::SizeDescending => "size",
        }
    }
}

/// Browsing state for one directory at a time.
///
/// The navigator owns the listing, the selection and the visible window.
/// Subdirectory sizes arrive asynchronously and are folded in by
/// [`Navigator::poll_results`] or [`Navigator::wait_for_result`] on the
/// caller's thread; results computed for an earlier listing are dropped.
pub struct Navigator {
    aggregator: Aggregator,
    results: Receiver<SizeResult>,
    current_path: PathBuf,
    entries: EntryList,
    // listing index each entry was enumerated at, kept in step with `entries`
    origins: Vec<usize>,
    selected: usize,
    pending: usize,
    window: Window,
    generation: u64,
    sort: SortPolicy,
    space: Option<DiskSpace>,
}

impl Navigator {
    /// Creates a navigator with no directory set.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            aggregator: Aggregator::new(fs, tx),
            results: rx,
            current_path: PathBuf::new(),
            entries: EntryList::default(),
            origins: Vec::new(),
            selected: 0,
            pending: 0,
            window: Window::EMPTY,
            generation: 0,
            sort: SortPolicy::Listing,
            space: None,
        }
    }

    pub fn with_sort_policy(mut self, sort: SortPolicy) -> Self {
        self.sort = sort;
        self
    }

    pub fn current_path(&self) -> &Path {
        &self.current_path
    }

    pub fn entries(&self) -> &EntryList {
        &self.entries
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_entry(&self) -> Option<&Entry> {
        self.entries.get(self.selected)
    }

    pub fn pending_count(&self) -> usize {
        self.pending
    }

    /// Window stored by the last [`Navigator::view`] call.
    pub fn window(&self) -> Window {
        self.window
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn sort_policy(&self) -> SortPolicy {
        self.sort
    }

    /// Space of the filesystem holding the current directory, as of the last
    /// directory change or deletion.
    pub fn disk_space(&self) -> Option<DiskSpace> {
        self.space
    }

    /// Sum of every size known so far.
    pub fn known_size(&self) -> u64 {
        self.entries
            .iter()
            .filter(|entry| entry.size_known)
            .map(|entry| entry.size_bytes)
            .sum()
    }

    /// Switches to `path` and starts sizing its subdirectories.
    ///
    /// Re-entering the current path rebuilds the listing as well.
    pub fn set_working_directory(&mut self, path: impl AsRef<Path>) -> Result<(), NavError> {
        let path = normalize(path.as_ref());
        match self.aggregator.file_system().kind(&path) {
            Ok(NodeKind::Directory) => {}
            Ok(NodeKind::Other) => return Err(NavError::NotADirectory(path)),
            Err(source) => return Err(NavError::PathError { path, source }),
        }

        let generation = self.generation.wrapping_add(1);
        let listing = match self.aggregator.compute_entries(&path, generation) {
            Ok(listing) => listing,
            Err(source) => return Err(NavError::PathError { path, source }),
        };

        tracing::info!(
            "entered {} ({} entries, {} directories sizing)",
            path.display(),
            listing.entries.len(),
            listing.pending
        );

        self.origins = (0..listing.entries.len()).collect();
        self.entries = listing.entries;
        self.pending = listing.pending;
        self.generation = generation;
        self.current_path = path;
        self.window = Window::EMPTY;
        self.sort_if_complete();
        self.selected = 0;
        self.refresh_space();
        Ok(())
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.entries.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.entries.len().saturating_sub(1);
    }

    /// Descends into the selected directory.
    pub fn enter_selected(&mut self) -> Result<(), NavError> {
        let entry = self.selected_entry().ok_or(NavError::NothingSelected)?;
        let target = self.current_path.join(&entry.file_name);
        if !entry.is_selectable() {
            return Err(NavError::NotADirectory(target));
        }
        self.set_working_directory(target)
    }

    /// Moves to the parent directory; does nothing at the root.
    pub fn ascend_to_parent(&mut self) -> Result<(), NavError> {
        match parent_of(&self.current_path) {
            Some(parent) => self.set_working_directory(parent),
            None => {
                tracing::debug!("{} has no parent", self.current_path.display());
                Ok(())
            }
        }
    }

    /// Removes the selected entry from disk and from the listing.
    ///
    /// The selection stays on the same index, which now holds the following
    /// sibling, or moves to the new last entry when the last one was removed.
    pub fn delete_selected(&mut self) -> Result<Entry, NavError> {
        let index = self.selected;
        let entry = self.entries.get(index).ok_or(NavError::NothingSelected)?;
        let path = self.current_path.join(&entry.file_name);

        if let Err(source) = self
            .aggregator
            .file_system()
            .remove(&path, entry.is_directory)
        {
            tracing::warn!("could not delete {}: {}", path.display(), source);
            return Err(NavError::RemovalFailed { path, source });
        }

        let removed = self.entries.remove(index);
        self.origins.remove(index);
        if !removed.size_known {
            self.pending -= 1;
        }
        if self.selected >= self.entries.len() {
            self.selected = self.entries.len().saturating_sub(1);
        }
        self.sort_if_complete();
        self.refresh_space();

        tracing::info!("deleted {}", path.display());
        Ok(removed)
    }

    /// Applies every size result that is already available.
    ///
    /// Returns how many of them changed the listing.
    pub fn poll_results(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(result) = self.results.try_recv() {
            if self.apply_size_result(result) {
                applied += 1;
            }
        }
        applied
    }

    /// Blocks up to `timeout` for the next size result and applies it.
    ///
    /// Returns false on timeout or when the result was stale.
    pub fn wait_for_result(&mut self, timeout: Duration) -> bool {
        match self.results.recv_timeout(timeout) {
            Ok(result) => self.apply_size_result(result),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Folds one size result into the listing if it belongs to it.
    pub fn apply_size_result(&mut self, result: SizeResult) -> bool {
        if result.generation != self.generation {
            tracing::debug!(
                "dropping size for listing {} (current {})",
                result.generation,
                self.generation
            );
            return false;
        }
        let Some(position) = self.origins.iter().position(|&origin| origin == result.index)
        else {
            tracing::debug!("dropping size for deleted entry #{}", result.index);
            return false;
        };
        let Some(entry) = self.entries.get_mut(position) else {
            return false;
        };
        if entry.size_known {
            return false;
        }

        entry.size_bytes = result.size_bytes;
        entry.size_known = true;
        self.pending -= 1;
        self.sort_if_complete();
        true
    }

    /// Builds the rows visible within `max_rows` and remembers the window.
    pub fn view(&mut self, max_rows: usize) -> Buffer {
        self.window = next_window(self.entries.len(), max_rows, self.window, self.selected);

        let rows = self.entries.as_slice()[self.window.start..self.window.end]
            .iter()
            .enumerate()
            .map(|(offset, entry)| {
                let mut left = entry.name.clone();
                if entry.is_directory {
                    left.push_str(DIRECTORY_MARKER);
                }
                let right = if entry.size_known {
                    fmt_bytes(entry.size_bytes)
                } else {
                    CALCULATING.to_string()
                };
                Row {
                    left,
                    right,
                    highlighted: self.window.start + offset == self.selected,
                    is_directory: entry.is_directory,
                }
            })
            .collect();

        Buffer {
            rows,
            status: self.status(),
        }
    }

    fn status(&self) -> Vec<String> {
        let path = self.current_path.display();
        let total = self.entries.len();
        let mut status = vec![if self.pending == 0 || total == 0 {
            path.to_string()
        } else {
            let percent = (total - self.pending) * 100 / total;
            format!("{path} ({percent}% sized)")
        }];
        if let Some(space) = self.space.filter(|space| space.total > 0) {
            status.push(space.describe());
        }
        status
    }

    // A failed query only hides the space line.
    fn refresh_space(&mut self) {
        self.space = match self.aggregator.file_system().space(&self.current_path) {
            Ok(space) => Some(space),
            Err(err) => {
                tracing::debug!(
                    "no space figures for {}: {}",
                    self.current_path.display(),
                    err
                );
                None
            }
        };
    }

    fn sort_if_complete(&mut self) {
        if self.pending > 0 || self.sort != SortPolicy::SizeDescending {
            return;
        }

        let selected_origin = self.origins.get(self.selected).copied();
        let entries = std::mem::take(&mut self.entries).into_vec();
        let mut paired: Vec<(Entry, usize)> =
            entries.into_iter().zip(self.origins.drain(..)).collect();
        // stable, so equal sizes keep their listing order
        paired.sort_by(|a, b| b.0.size_bytes.cmp(&a.0.size_bytes));
        let (entries, origins): (Vec<Entry>, Vec<usize>) = paired.into_iter().unzip();
        self.entries = EntryList::new(entries);
        self.origins = origins;

        if let Some(position) = selected_origin
            .and_then(|origin| self.origins.iter().position(|&value| value == origin))
        {
            self.selected = position;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::ffi::OsStr;
    use std::sync::Mutex;
    use std::time::Instant;

    use crate::fs::ChildInfo;

    /// In-memory tree. `None` size marks a directory; children list in insertion order.
    /// Free space is the capacity minus every stored file, once a capacity is set.
    #[derive(Default)]
    struct MemFs {
        nodes: Mutex<Vec<(PathBuf, Option<u64>)>>,
        locked: Mutex<HashSet<PathBuf>>,
        capacity: Mutex<Option<u64>>,
    }

    impl MemFs {
        fn with(nodes: &[(&str, Option<u64>)]) -> Arc<Self> {
            let fs = MemFs::default();
            {
                let mut guard = fs.nodes.lock().unwrap();
                guard.push((PathBuf::from("/"), None));
                for (path, size) in nodes {
                    guard.push((PathBuf::from(path), *size));
                }
            }
            Arc::new(fs)
        }

        fn set_capacity(&self, total: u64) {
            *self.capacity.lock().unwrap() = Some(total);
        }

        fn lock(&self, path: &str) {
            self.locked.lock().unwrap().insert(PathBuf::from(path));
        }

        fn exists(&self, path: &str) -> bool {
            let path = Path::new(path);
            self.nodes.lock().unwrap().iter().any(|(p, _)| p == path)
        }
    }

    impl FileSystem for MemFs {
        fn kind(&self, path: &Path) -> io::Result<NodeKind> {
            let guard = self.nodes.lock().unwrap();
            match guard.iter().find(|(p, _)| p == path) {
                Some((_, None)) => Ok(NodeKind::Directory),
                Some((_, Some(_))) => Ok(NodeKind::Other),
                None => Err(io::ErrorKind::NotFound.into()),
            }
        }

        fn list_children(&self, path: &Path) -> io::Result<Vec<ChildInfo>> {
            self.kind(path)?;
            let guard = self.nodes.lock().unwrap();
            Ok(guard
                .iter()
                .filter(|(p, _)| p.parent() == Some(path))
                .map(|(p, size)| ChildInfo {
                    name: p.file_name().map(OsStr::to_os_string).unwrap_or_default(),
                    is_directory: size.is_none(),
                })
                .collect())
        }

        fn file_size(&self, path: &Path) -> io::Result<u64> {
            let guard = self.nodes.lock().unwrap();
            match guard.iter().find(|(p, _)| p == path) {
                Some((_, Some(size))) => Ok(*size),
                _ => Err(io::ErrorKind::NotFound.into()),
            }
        }

        fn remove(&self, path: &Path, _is_directory: bool) -> io::Result<()> {
            if self.locked.lock().unwrap().contains(path) {
                return Err(io::ErrorKind::PermissionDenied.into());
            }
            self.nodes
                .lock()
                .unwrap()
                .retain(|(p, _)| !p.starts_with(path));
            Ok(())
        }

        fn space(&self, _path: &Path) -> io::Result<DiskSpace> {
            let Some(total) = *self.capacity.lock().unwrap() else {
                return Err(io::ErrorKind::Unsupported.into());
            };
            let used: u64 = self
                .nodes
                .lock()
                .unwrap()
                .iter()
                .filter_map(|(_, size)| *size)
                .sum();
            Ok(DiskSpace {
                available: total - used,
                total,
            })
        }
    }

    fn sample() -> Arc<MemFs> {
        MemFs::with(&[
            ("/sample", None),
            ("/sample/directory", None),
            ("/sample/directory/payload", Some(512_000)),
            ("/sample/file", Some(120)),
            ("/sample/small_file", Some(10)),
            ("/sample/empty_file", Some(0)),
            ("/sample/empty", None),
        ])
    }

    fn settle(navigator: &mut Navigator) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while navigator.pending_count() > 0 {
            assert!(Instant::now() < deadline, "sizes never arrived");
            navigator.wait_for_result(Duration::from_millis(50));
        }
    }

    fn names(navigator: &Navigator) -> Vec<String> {
        navigator
            .entries()
            .iter()
            .map(|entry| entry.name.clone())
            .collect()
    }

    fn opened(fs: Arc<MemFs>, path: &str) -> Navigator {
        let mut navigator = Navigator::new(fs);
        navigator
            .set_working_directory(path)
            .expect("directory should open");
        navigator
    }

    #[test]
    fn set_working_directory_lists_entries_and_sizes_directories() {
        let mut navigator = opened(sample(), "/sample");

        assert_eq!(navigator.current_path(), Path::new("/sample"));
        assert_eq!(
            names(&navigator),
            vec!["directory", "file", "small_file", "empty_file", "empty"]
        );
        assert_eq!(navigator.selected_index(), 0);
        assert_eq!(navigator.window(), Window::EMPTY);
        assert_eq!(navigator.pending_count(), 2);
        assert_eq!(navigator.entries().unknown_count(), 2);
        assert_eq!(navigator.entries().get(1), Some(&Entry::file("file", 120)));

        settle(&mut navigator);

        assert_eq!(
            navigator.entries().get(0),
            Some(&Entry::sized_directory("directory", 512_000))
        );
        assert_eq!(navigator.entries().unknown_count(), 0);
        assert_eq!(navigator.known_size(), 512_130);
    }

    #[test]
    fn set_working_directory_strips_trailing_separator() {
        let navigator = opened(sample(), "/sample/");
        assert_eq!(navigator.current_path(), Path::new("/sample"));
    }

    #[test]
    fn set_working_directory_resets_selection_and_window() {
        let mut navigator = opened(sample(), "/sample");
        navigator.select_next();
        navigator.view(1);
        assert_ne!(navigator.window(), Window::EMPTY);

        navigator
            .set_working_directory("/sample")
            .expect("re-entering should work");

        assert_eq!(navigator.selected_index(), 0);
        assert_eq!(navigator.window(), Window::EMPTY);
    }

    #[test]
    fn failed_directory_change_leaves_state_untouched() {
        let mut navigator = opened(sample(), "/sample");
        navigator.select_next();
        navigator.view(2);
        let generation = navigator.generation();
        let entries = navigator.entries().clone();
        let window = navigator.window();

        let err = navigator
            .set_working_directory("/sample/file")
            .expect_err("files cannot be entered");
        assert!(matches!(err, NavError::NotADirectory(_)));

        let err = navigator
            .set_working_directory("/asdf")
            .expect_err("missing paths cannot be entered");
        assert!(matches!(err, NavError::PathError { .. }));

        assert_eq!(navigator.current_path(), Path::new("/sample"));
        assert_eq!(navigator.entries(), &entries);
        assert_eq!(navigator.selected_index(), 1);
        assert_eq!(navigator.window(), window);
        assert_eq!(navigator.generation(), generation);
    }

    #[test]
    fn selection_is_clamped_to_the_listing() {
        let mut navigator = opened(sample(), "/sample");

        navigator.select_previous();
        assert_eq!(navigator.selected_index(), 0);

        for _ in 0..10 {
            navigator.select_next();
        }
        assert_eq!(navigator.selected_index(), 4);

        navigator.select_previous();
        assert_eq!(navigator.selected_index(), 3);

        navigator.select_first();
        assert_eq!(navigator.selected_index(), 0);

        navigator.select_last();
        assert_eq!(navigator.selected_index(), 4);
    }

    #[test]
    fn selection_moves_are_noops_without_entries() {
        let mut navigator = Navigator::new(sample());
        navigator.select_next();
        navigator.select_last();
        navigator.select_previous();
        assert_eq!(navigator.selected_index(), 0);
        assert!(navigator.selected_entry().is_none());

        let mut navigator = opened(sample(), "/sample/empty");
        navigator.select_next();
        navigator.select_last();
        assert_eq!(navigator.selected_index(), 0);
        assert!(navigator.selected_entry().is_none());
    }

    #[test]
    fn enter_selected_descends_only_into_directories() {
        let mut navigator = opened(sample(), "/sample");

        navigator.select_next();
        let err = navigator
            .enter_selected()
            .expect_err("file should not be enterable");
        assert!(matches!(err, NavError::NotADirectory(_)));
        assert_eq!(navigator.current_path(), Path::new("/sample"));
        assert_eq!(navigator.selected_index(), 1);

        navigator.select_first();
        navigator.enter_selected().expect("directory should open");
        assert_eq!(navigator.current_path(), Path::new("/sample/directory"));
        assert_eq!(names(&navigator), vec!["payload"]);
    }

    #[test]
    fn enter_selected_on_empty_listing_reports_nothing_selected() {
        let mut navigator = opened(sample(), "/sample/empty");
        assert!(matches!(
            navigator.enter_selected(),
            Err(NavError::NothingSelected)
        ));
    }

    #[test]
    fn ascend_to_parent_moves_up_and_stops_at_root() {
        let mut navigator = opened(sample(), "/sample/directory");

        navigator.ascend_to_parent().expect("parent should open");
        assert_eq!(navigator.current_path(), Path::new("/sample"));

        navigator.ascend_to_parent().expect("root should open");
        assert_eq!(navigator.current_path(), Path::new("/"));
        let generation = navigator.generation();

        navigator.ascend_to_parent().expect("root ascends to itself");
        assert_eq!(navigator.current_path(), Path::new("/"));
        assert_eq!(navigator.generation(), generation);
    }

    #[test]
    fn delete_selected_falls_forward_onto_next_sibling() {
        let fs = MemFs::with(&[
            ("/d", None),
            ("/d/1", Some(1)),
            ("/d/2", Some(2)),
            ("/d/3", Some(3)),
        ]);
        let mut navigator = opened(Arc::clone(&fs), "/d");

        let removed = navigator.delete_selected().expect("delete should work");

        assert_eq!(removed.name, "1");
        assert!(!fs.exists("/d/1"));
        assert_eq!(names(&navigator), vec!["2", "3"]);
        assert_eq!(navigator.selected_index(), 0);
        assert_eq!(
            navigator.selected_entry().map(|entry| entry.name.as_str()),
            Some("2")
        );
    }

    #[test]
    fn delete_selected_last_entry_selects_new_last() {
        let fs = MemFs::with(&[
            ("/d", None),
            ("/d/1", Some(1)),
            ("/d/2", Some(2)),
            ("/d/3", Some(3)),
        ]);
        let mut navigator = opened(fs, "/d");
        navigator.select_last();

        navigator.delete_selected().expect("delete should work");

        assert_eq!(navigator.selected_index(), 1);
        assert_eq!(
            navigator.selected_entry().map(|entry| entry.name.as_str()),
            Some("2")
        );
        assert!(!navigator.entries().contains_name("3"));
    }

    #[test]
    fn delete_selected_only_entry_leaves_empty_listing() {
        let fs = MemFs::with(&[("/d", None), ("/d/only", Some(1))]);
        let mut navigator = opened(fs, "/d");

        navigator.delete_selected().expect("delete should work");

        assert!(navigator.entries().is_empty());
        assert_eq!(navigator.selected_index(), 0);
        assert!(navigator.view(3).rows.is_empty());
        assert!(matches!(
            navigator.delete_selected(),
            Err(NavError::NothingSelected)
        ));
    }

    #[test]
    fn delete_failure_keeps_listing() {
        let fs = sample();
        fs.lock("/sample/file");
        let mut navigator = opened(Arc::clone(&fs), "/sample");
        navigator.select_next();
        let before = navigator.entries().clone();

        let err = navigator
            .delete_selected()
            .expect_err("locked file cannot be deleted");

        assert!(matches!(err, NavError::RemovalFailed { .. }));
        assert_eq!(navigator.entries(), &before);
        assert_eq!(navigator.selected_index(), 1);
        assert!(fs.exists("/sample/file"));
    }

    #[test]
    fn deleting_directory_removes_its_subtree() {
        let fs = sample();
        let mut navigator = opened(Arc::clone(&fs), "/sample");

        navigator.delete_selected().expect("delete should work");

        assert!(!fs.exists("/sample/directory"));
        assert!(!fs.exists("/sample/directory/payload"));
        assert_eq!(navigator.pending_count(), 1);
        settle(&mut navigator);
        assert_eq!(navigator.entries().unknown_count(), 0);
    }

    #[test]
    fn stale_results_are_discarded() {
        let mut navigator = opened(sample(), "/sample");
        let stale = navigator.generation();
        navigator
            .set_working_directory("/sample/directory")
            .expect("directory should open");

        assert!(!navigator.apply_size_result(SizeResult {
            generation: stale,
            index: 0,
            size_bytes: 99,
        }));
        assert_eq!(navigator.entries().get(0), Some(&Entry::file("payload", 512_000)));

        // the first listing's real results also arrive and must be ignored
        let deadline = Instant::now() + Duration::from_millis(300);
        while Instant::now() < deadline {
            assert!(!navigator.wait_for_result(Duration::from_millis(20)));
        }
        assert_eq!(navigator.pending_count(), 0);
    }

    #[test]
    fn results_follow_entries_across_deletions() {
        let fs = MemFs::with(&[
            ("/d", None),
            ("/d/first", None),
            ("/d/file", Some(4)),
            ("/d/second", None),
            ("/d/second/inner", Some(8)),
        ]);
        let mut navigator = opened(fs, "/d");
        let generation = navigator.generation();

        navigator.delete_selected().expect("delete should work");
        assert_eq!(navigator.pending_count(), 1);

        assert!(!navigator.apply_size_result(SizeResult {
            generation,
            index: 0,
            size_bytes: 1,
        }));
        assert!(navigator.apply_size_result(SizeResult {
            generation,
            index: 2,
            size_bytes: 8,
        }));

        assert_eq!(navigator.pending_count(), 0);
        assert_eq!(
            navigator.entries().get(1),
            Some(&Entry::sized_directory("second", 8))
        );
        // the real result for the same entry is a duplicate now
        let deadline = Instant::now() + Duration::from_millis(200);
        while Instant::now() < deadline {
            assert!(!navigator.wait_for_result(Duration::from_millis(20)));
        }
    }

    #[test]
    fn view_builds_rows_for_the_visible_window() {
        let mut navigator = opened(sample(), "/sample");

        let buffer = navigator.view(2);

        assert_eq!(navigator.window(), Window::new(0, 2));
        assert_eq!(buffer.rows.len(), 2);
        assert_eq!(buffer.rows[0].left, "directory/");
        assert!(buffer.rows[0].is_directory);
        assert!(buffer.rows[0].highlighted);
        assert_eq!(buffer.rows[1].left, "file");
        assert_eq!(buffer.rows[1].right, "120 bytes");
        assert!(!buffer.rows[1].highlighted);
        assert!(!buffer.rows[1].is_directory);
    }

    #[test]
    fn view_shows_placeholder_and_progress_while_sizing() {
        let mut navigator = opened(sample(), "/sample");
        let generation = navigator.generation();

        // nothing has been polled yet, so both subdirectories are still unknown
        let buffer = navigator.view(10);
        assert_eq!(navigator.pending_count(), 2);
        assert_eq!(buffer.rows[0].right, CALCULATING);
        assert_eq!(buffer.status, vec!["/sample (60% sized)".to_string()]);

        // both subdirectories resolved; drain whatever the workers send afterwards
        navigator.apply_size_result(SizeResult {
            generation,
            index: 0,
            size_bytes: 512_000,
        });
        navigator.apply_size_result(SizeResult {
            generation,
            index: 4,
            size_bytes: 0,
        });
        navigator.poll_results();

        let buffer = navigator.view(10);
        assert_eq!(buffer.status, vec!["/sample".to_string()]);
        assert_eq!(buffer.rows[0].right, "500.0 KB");
    }

    #[test]
    fn status_reports_disk_space_after_path() {
        let fs = sample();
        fs.set_capacity(2_048_000);
        let mut navigator = opened(Arc::clone(&fs), "/sample");

        assert_eq!(
            navigator.disk_space(),
            Some(DiskSpace {
                available: 1_535_870,
                total: 2_048_000,
            })
        );
        let status = navigator.view(10).status;
        assert_eq!(status.len(), 2);
        assert_eq!(status[1], "1499.9 KB available (25% used)");
    }

    #[test]
    fn deletion_refreshes_disk_space() {
        let fs = sample();
        fs.set_capacity(2_048_000);
        let mut navigator = opened(Arc::clone(&fs), "/sample");

        navigator.delete_selected().expect("delete should work");

        assert_eq!(
            navigator.disk_space().map(|space| space.available),
            Some(2_047_870)
        );
        assert_eq!(
            navigator.view(10).status[1],
            "1999.9 KB available (0% used)"
        );
    }

    #[test]
    fn unavailable_disk_space_leaves_only_the_path() {
        let mut navigator = opened(sample(), "/sample/empty");
        assert_eq!(navigator.disk_space(), None);
        assert_eq!(navigator.view(3).status, vec!["/sample/empty".to_string()]);
    }

    #[test]
    fn view_scrolls_minimally() {
        let mut navigator = opened(sample(), "/sample/");
        navigator.view(2);

        for _ in 0..3 {
            navigator.select_next();
        }
        let buffer = navigator.view(2);
        assert_eq!(navigator.window(), Window::new(2, 4));
        assert_eq!(buffer.rows[0].left, "small_file");
        assert!(buffer.rows[1].highlighted);

        navigator.select_previous();
        navigator.view(2);
        assert_eq!(navigator.window(), Window::new(2, 4));

        navigator.select_previous();
        let buffer = navigator.view(2);
        assert_eq!(navigator.window(), Window::new(1, 3));
        assert_eq!(buffer.rows[0].left, "file");
        assert!(buffer.rows[0].highlighted);
    }

    #[test]
    fn view_of_empty_directory_has_no_rows() {
        let mut navigator = opened(sample(), "/sample/empty");
        let buffer = navigator.view(1);
        assert!(buffer.rows.is_empty());
        assert_eq!(buffer.status, vec!["/sample/empty".to_string()]);
        assert_eq!(navigator.window(), Window::EMPTY);
    }

    #[test]
    fn view_after_deleting_last_visible_entry_keeps_selection_on_screen() {
        let fs = MemFs::with(&[
            ("/d", None),
            ("/d/a", Some(1)),
            ("/d/b", Some(2)),
            ("/d/c", Some(3)),
            ("/d/d", Some(4)),
        ]);
        let mut navigator = opened(fs, "/d");
        navigator.select_last();
        navigator.view(2);
        assert_eq!(navigator.window(), Window::new(2, 4));

        navigator.delete_selected().expect("delete should work");
        let buffer = navigator.view(2);

        assert_eq!(navigator.window(), Window::new(1, 3));
        assert_eq!(buffer.rows.len(), 2);
        assert!(buffer.rows[1].highlighted);
        assert_eq!(buffer.rows[1].left, "c");
    }

    #[test]
    fn size_sort_applies_once_all_sizes_are_known() {
        let fs = MemFs::with(&[
            ("/d", None),
            ("/d/small", Some(1)),
            ("/d/dir", None),
            ("/d/dir/blob", Some(50)),
            ("/d/tie_a", Some(7)),
            ("/d/tie_b", Some(7)),
        ]);
        let mut navigator =
            Navigator::new(fs).with_sort_policy(SortPolicy::SizeDescending);
        navigator
            .set_working_directory("/d")
            .expect("directory should open");
        assert_eq!(names(&navigator), vec!["small", "dir", "tie_a", "tie_b"]);

        navigator.select_next();
        settle(&mut navigator);

        assert_eq!(names(&navigator), vec!["dir", "tie_a", "tie_b", "small"]);
        assert_eq!(
            navigator.selected_entry().map(|entry| entry.name.as_str()),
            Some("dir")
        );
    }

    #[test]
    fn size_sort_of_fully_known_listing_keeps_selection_at_zero() {
        let fs = MemFs::with(&[("/d", None), ("/d/small", Some(1)), ("/d/big", Some(9))]);
        let navigator = {
            let mut navigator = Navigator::new(fs).with_sort_policy(SortPolicy::SizeDescending);
            navigator
                .set_working_directory("/d")
                .expect("directory should open");
            navigator
        };
        assert_eq!(names(&navigator), vec!["big", "small"]);
        assert_eq!(navigator.selected_index(), 0);
    }
}
