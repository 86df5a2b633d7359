//! Human-readable byte counts.

/// Decimal units, each 1000 times the previous one.
const BYTE_UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

/// Render a byte count with the largest unit keeping the value under 1000.
///
/// Plain bytes are printed as integers; scaled values use three significant
/// digits. A value that would round up to 1000 is promoted to the next unit.
///
/// ```rust
/// use parfetch::utils::format_bytes;
///
/// assert_eq!(format_bytes(0), "0 B");
/// assert_eq!(format_bytes(999), "999 B");
/// assert_eq!(format_bytes(1000), "1.00 KB");
/// assert_eq!(format_bytes(1_500_000), "1.50 MB");
/// ```
pub fn format_bytes(n: u64) -> String {
    if n < 1000 {
        return format!("{} {}", n, BYTE_UNITS[0]);
    }

    let mut size = n as f64;
    let mut unit = 0;
    while size >= 999.5 && unit < BYTE_UNITS.len() - 1 {
        size /= 1000.0;
        unit += 1;
    }

    let precision = if size < 9.995 {
        2
    } else if size < 99.95 {
        1
    } else {
        0
    };
    format!("{:.*} {}", precision, size, BYTE_UNITS[unit])
}
