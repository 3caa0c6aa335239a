/// Converts a byte count into a short human-readable string.
///
/// Counts below one kilobyte are printed exactly; anything larger gets one
/// decimal in binary units, topping out at terabytes.
///
/// ```rust
/// use purge::util::fmt_bytes;
/// assert_eq!(fmt_bytes(512), "512 bytes");
/// assert_eq!(fmt_bytes(2900), "2.8 KB");
/// ```
pub fn fmt_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{bytes} bytes");
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0usize;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}
