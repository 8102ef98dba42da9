//! Plain-text sheet export
//!
//! The report is handed to share/print facilities as-is, so its layout is a
//! stable contract:
//!
//! ```text
//! BPM: {bpm}
//!
//! Count {n}:
//! {8 characters}
//!
//! ```
//!
//! repeated for every eight-count, each block followed by a blank line.

use std::fmt::Write;

use crate::grid::BeatGrid;

/// Render `grid` as the export report
///
/// # Examples
///
/// ```
/// use ec_common::export::serialize_for_export;
/// use ec_common::grid::BeatGrid;
///
/// let grid = BeatGrid::build(8.0, 60).unwrap();
/// assert_eq!(serialize_for_export(&grid, 60), "BPM: 60\n\nCount 1:\n        \n\n");
/// ```
pub fn serialize_for_export(grid: &BeatGrid, bpm: u32) -> String {
    let mut content = format!("BPM: {}\n\n", bpm);
    for (index, eight_count) in grid.render() {
        // Writing into a String cannot fail
        let _ = write!(content, "Count {}:\n{}\n\n", index + 1, eight_count);
    }
    content
}
