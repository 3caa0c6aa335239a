use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{MAIN_SEPARATOR, Path, PathBuf};

use crate::model::DiskSpace;

/// Name and type of one directory child, as reported by enumeration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChildInfo {
    pub name: OsString,
    pub is_directory: bool,
}

/// What a path resolves to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NodeKind {
    Directory,
    Other,
}

/// Filesystem primitives consumed by the aggregator and the navigator.
///
/// Implementations must be shareable across the worker pool.
pub trait FileSystem: Send + Sync {
    /// Resolves `path`, failing when it does not exist or cannot be inspected.
    fn kind(&self, path: &Path) -> io::Result<NodeKind>;

    /// Immediate children of `path`, without `.` or `..`.
    fn list_children(&self, path: &Path) -> io::Result<Vec<ChildInfo>>;

    fn file_size(&self, path: &Path) -> io::Result<u64>;

    /// Removes `path`, recursively when it is a directory.
    fn remove(&self, path: &Path, is_directory: bool) -> io::Result<()>;

    /// Free and total space of the filesystem holding `path`.
    fn space(&self, path: &Path) -> io::Result<DiskSpace>;
}

/// [`FileSystem`] backed by `std::fs`. Symbolic links are never followed.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalFs;

impl FileSystem for LocalFs {
    fn kind(&self, path: &Path) -> io::Result<NodeKind> {
        let meta = fs::metadata(path)?;
        Ok(if meta.is_dir() {
            NodeKind::Directory
        } else {
            NodeKind::Other
        })
    }

    fn list_children(&self, path: &Path) -> io::Result<Vec<ChildInfo>> {
        let entries = fs::read_dir(path)?.map(|entry| -> io::Result<ChildInfo> {
            let entry = entry?;
            // file_type() comes from the directory listing and does not traverse links
            let is_directory = entry
                .file_type()
                .map(|file_type| file_type.is_dir())
                .unwrap_or(false);
            Ok(ChildInfo {
                name: entry.file_name(),
                is_directory,
            })
        });
        Ok(readable_children(path, entries))
    }

    fn file_size(&self, path: &Path) -> io::Result<u64> {
        Ok(fs::symlink_metadata(path)?.len())
    }

    fn remove(&self, path: &Path, is_directory: bool) -> io::Result<()> {
        let result = remove_path(path, is_directory);
        let Err(err) = result else {
            return Ok(());
        };

        // Read-only files cannot be unlinked on some platforms; clear the flag and retry once.
        if let Ok(metadata) = fs::symlink_metadata(path) {
            let mut permissions = metadata.permissions();
            if permissions.readonly() {
                permissions.set_readonly(false);
                if fs::set_permissions(path, permissions).is_ok() {
                    return remove_path(path, is_directory);
                }
            }
        }
        Err(err)
    }

    fn space(&self, path: &Path) -> io::Result<DiskSpace> {
        let path = fs::canonicalize(path)?;
        let disks = sysinfo::Disks::new_with_refreshed_list();
        let mounts: Vec<(PathBuf, DiskSpace)> = disks
            .iter()
            .map(|disk| {
                (
                    disk.mount_point().to_path_buf(),
                    DiskSpace {
                        available: disk.available_space(),
                        total: disk.total_space(),
                    },
                )
            })
            .collect();

        containing_mount(&path, &mounts).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no mounted filesystem holds {}", path.display()),
            )
        })
    }
}

/// Keeps the children that could be read, logging the ones that could not.
fn readable_children(
    path: &Path,
    entries: impl IntoIterator<Item = io::Result<ChildInfo>>,
) -> Vec<ChildInfo> {
    entries
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(child) => Some(child),
            Err(err) => {
                tracing::debug!("skipping unreadable entry in {}: {}", path.display(), err);
                None
            }
        })
        .collect()
}

/// Space of the deepest mount point that `path` lies under.
fn containing_mount(path: &Path, mounts: &[(PathBuf, DiskSpace)]) -> Option<DiskSpace> {
    mounts
        .iter()
        .filter(|(mount_point, _)| path.starts_with(mount_point))
        .max_by_key(|(mount_point, _)| mount_point.components().count())
        .map(|(_, space)| *space)
}

fn remove_path(path: &Path, is_directory: bool) -> io::Result<()> {
    if is_directory {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

/// Strips a single trailing separator, leaving a bare root untouched.
///
/// ```rust
/// use purge::fs::normalize;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(normalize(Path::new("/tmp/sample/")), PathBuf::from("/tmp/sample"));
/// assert_eq!(normalize(Path::new("/tmp/sample")), PathBuf::from("/tmp/sample"));
/// assert_eq!(normalize(Path::new("/")), PathBuf::from("/"));
/// ```
pub fn normalize(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(text) if path.parent().is_some() && text.ends_with(['/', MAIN_SEPARATOR]) => {
            PathBuf::from(&text[..text.len() - 1])
        }
        Some(_) => path.to_path_buf(),
        None => path.components().collect(),
    }
}

/// Parent directory of `path`, or `None` at the root of a path.
///
/// ```rust
/// use purge::fs::parent_of;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(parent_of(Path::new("/tmp/sample")), Some(PathBuf::from("/tmp")));
/// assert_eq!(parent_of(Path::new("/")), None);
/// assert_eq!(parent_of(Path::new("relative")), None);
/// ```
pub fn parent_of(path: &Path) -> Option<PathBuf> {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
}
