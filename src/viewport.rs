//! Decides which contiguous slice of entries is on screen.

/// Half-open range `[start, end)` of visible entry indices.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Window {
    pub start: usize,
    pub end: usize,
}

impl Window {
    pub const EMPTY: Window = Window { start: 0, end: 0 };

    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index < self.end
    }

    /// Shrinks the window so it never reaches past `entry_count`.
    pub fn clamp_to(self, entry_count: usize) -> Self {
        let end = self.end.min(entry_count);
        Self {
            start: self.start.min(end),
            end,
        }
    }
}

/// Computes the window to display after `previous`, moving it as little as
/// possible while keeping `selected` visible.
///
/// A previous window that still holds the selection at full height is kept
/// as-is. Otherwise the selection is pinned to the top when it moved above the
/// window, to the bottom when it lies beyond the first screenful, and the
/// window starts at zero in every other case.
///
/// This is stricter than keeping any previous window that contains the
/// selection: one is kept only when `previous.len() == min(entry_count,
/// max_rows)`. A shorter window (clamped after a deletion, or drawn for a
/// different height) still holding the selection is recomputed, so the
/// result never leaves rows empty while entries remain below it.
///
/// ```rust
/// use purge::viewport::{Window, next_window};
///
/// let window = next_window(4, 2, Window::new(0, 2), 3);
/// assert_eq!(window, Window::new(2, 4));
/// assert_eq!(next_window(4, 2, window, 1), Window::new(1, 3));
/// assert_eq!(next_window(0, 2, window, 0), Window::EMPTY);
/// ```
pub fn next_window(
    entry_count: usize,
    max_rows: usize,
    previous: Window,
    selected: usize,
) -> Window {
    let size = entry_count.min(max_rows);
    if size == 0 {
        return Window::EMPTY;
    }
    let selected = selected.min(entry_count - 1);
    let previous = previous.clamp_to(entry_count);

    if previous.end != 0 && previous.len() == size && previous.contains(selected) {
        return previous;
    }

    if previous.end != 0 && selected < previous.start {
        let end = (selected + size).min(entry_count);
        return Window::new(end - size, end);
    }

    if selected >= size {
        return Window::new(selected + 1 - size, selected + 1);
    }

    Window::new(0, size)
}
