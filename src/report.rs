use std::io::{self, Write};
use std::path::Path;

use crate::model::EntryList;
use crate::util::fmt_bytes;

/// Formats a byte count; re-exported for the frontends.
///
/// ```rust
/// use purge::report::format_size;
/// assert_eq!(format_size(1024), "1.0 KB");
/// ```
pub use crate::util::fmt_bytes as format_size;

/// Writes a table of `entries` under `path`, followed by nothing else.
///
/// Entries whose size is still unknown show a dash.
///
/// ```rust
/// use purge::model::{Entry, EntryList};
/// use purge::report::write_listing;
/// use std::path::Path;
///
/// let entries = EntryList::new(vec![Entry::file("notes.txt", 120)]);
/// let mut out = Vec::new();
/// write_listing(&mut out, Path::new("/data"), &entries).unwrap();
/// let text = String::from_utf8(out).unwrap();
/// assert!(text.contains("notes.txt"));
/// assert!(text.contains("120 bytes"));
/// ```
pub fn write_listing(out: &mut impl Write, path: &Path, entries: &EntryList) -> io::Result<()> {
    let total: u64 = entries
        .iter()
        .filter(|entry| entry.size_known)
        .map(|entry| entry.size_bytes)
        .sum();

    writeln!(out, "Target: {}", path.display())?;
    writeln!(out, "Total: {}", fmt_bytes(total))?;
    writeln!(out, "Items: {}", entries.len())?;
    writeln!(out, "-")?;
    writeln!(out, "{:<45} {:>5} {:>14} {:>8}", "Name", "Type", "Size", "%")?;
    writeln!(out, "{:-<45} {:-<5} {:-<14} {:-<8}", "", "", "", "")?;

    for entry in entries {
        let label = if entry.is_directory { "DIR" } else { "FILE" };
        let (size, percent) = if entry.size_known {
            let percent = if total == 0 {
                0.0
            } else {
                entry.size_bytes as f64 * 100.0 / total as f64
            };
            (fmt_bytes(entry.size_bytes), format!("{percent:.2}"))
        } else {
            (String::from("-"), String::from("-"))
        };
        writeln!(
            out,
            "{:<45} {:>5} {:>14} {:>8}",
            entry.name, label, size, percent
        )?;
    }
    Ok(())
}

/// Prints the listing table to STDOUT.
pub fn print_listing(path: &Path, entries: &EntryList) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_listing(&mut out, path, entries)?;
    out.flush()
}
