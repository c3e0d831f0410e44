//! # Utility Module
//!
//! Small helpers shared by the editor and the document.

/// Clamps a value between a minimum and maximum (inclusive).
///
/// # Examples
///
/// ```
/// use tgmap::utils::util::clamp;
///
/// assert_eq!(clamp(5, 0, 9), 5);
/// assert_eq!(clamp(-1, 0, 9), 0);
/// assert_eq!(clamp(12, 0, 9), 9);
/// ```
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Trims `value` and returns `None` when nothing is left.
pub fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
