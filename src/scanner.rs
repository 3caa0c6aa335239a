use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::Sender;

use rayon::prelude::*;

use crate::fs::FileSystem;
use crate::model::{Entry, EntryList, SizeResult};

/// Sum of the sizes of every regular file below `path`.
///
/// Children that cannot be enumerated or stat'ed contribute zero. Nested
/// directories are walked in parallel on the rayon pool and the call returns
/// once every one of them has finished.
pub fn compute_size(fs: &dyn FileSystem, path: &Path) -> u64 {
    let children = match fs.list_children(path) {
        Ok(children) => children,
        Err(err) => {
            tracing::debug!("skipping unreadable directory {}: {}", path.display(), err);
            return 0;
        }
    };

    children
        .par_iter()
        .map(|child| {
            let child_path = path.join(&child.name);
            if child.is_directory {
                compute_size(fs, &child_path)
            } else {
                fs.file_size(&child_path).unwrap_or_else(|err| {
                    tracing::debug!("treating {} as empty: {}", child_path.display(), err);
                    0
                })
            }
        })
        .sum()
}

/// Entries of one directory plus the number of sizes still in flight.
#[derive(Debug)]
pub struct Listing {
    pub entries: EntryList,
    pub pending: usize,
}

/// Lists directories and sizes their subdirectories in the background.
///
/// Every result is delivered on the sender handed to [`Aggregator::new`].
#[derive(Clone)]
pub struct Aggregator {
    fs: Arc<dyn FileSystem>,
    results: Sender<SizeResult>,
}

impl Aggregator {
    pub fn new(fs: Arc<dyn FileSystem>, results: Sender<SizeResult>) -> Self {
        Self { fs, results }
    }

    pub fn file_system(&self) -> &dyn FileSystem {
        self.fs.as_ref()
    }

    /// Enumerates `path` once and starts one sizing task per subdirectory.
    ///
    /// Files are sized before returning. Each directory entry stays unknown
    /// until its `SizeResult { generation, index, .. }` arrives; exactly
    /// `pending` results are sent for this call.
    pub fn compute_entries(&self, path: &Path, generation: u64) -> io::Result<Listing> {
        let children = self.fs.list_children(path)?;

        let mut entries = Vec::with_capacity(children.len());
        let mut jobs: Vec<(usize, PathBuf)> = Vec::new();
        for (index, child) in children.into_iter().enumerate() {
            let child_path = path.join(&child.name);
            if child.is_directory {
                jobs.push((index, child_path));
                entries.push(Entry::directory(child.name));
            } else {
                let size = self.fs.file_size(&child_path).unwrap_or_else(|err| {
                    tracing::debug!("treating {} as empty: {}", child_path.display(), err);
                    0
                });
                entries.push(Entry::file(child.name, size));
            }
        }

        let pending = jobs.len();
        for (index, child_path) in jobs {
            let fs = Arc::clone(&self.fs);
            let tx = self.results.clone();
            rayon::spawn(move || {
                let size_bytes = compute_size(fs.as_ref(), &child_path);
                // The receiver only disappears when the whole browser shuts down.
                let _ = tx.send(SizeResult {
                    generation,
                    index,
                    size_bytes,
                });
            });
        }

        tracing::debug!(
            "listed {} ({} entries, {} sizing)",
            path.display(),
            entries.len(),
            pending
        );

        Ok(Listing {
            entries: EntryList::new(entries),
            pending,
        })
    }
}
