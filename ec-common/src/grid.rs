//! Beat grid of 8-counts
//!
//! A [`BeatGrid`] lays a song out as consecutive 8-beat units. Each unit is an
//! [`EightCount`] of eight [`CountCell`]s that choreographers annotate with a
//! single character, or block out entirely.
//!
//! Cell state machine:
//! - `Blank` → `Labeled(c)` by a character edit
//! - `Labeled(c)` → `Labeled(d)` by a character edit
//! - `Blank` / `Labeled(c)` → `Blocked` by toggling
//! - `Blocked` → `Blank` by toggling
//!
//! Character edits on a `Blocked` cell are rejected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Number of beats (cells) in one eight-count
pub const BEATS_PER_EIGHT_COUNT: usize = 8;

/// Marker character for a blocked cell
pub const BLOCKED_MARKER: char = 'X';

/// Character used for a blank cell
pub const BLANK_MARKER: char = ' ';

/// Largest grid that will be built or restored (about 27 hours at 240 BPM)
pub const MAX_EIGHT_COUNTS: usize = 100_000;

const SECONDS_PER_MINUTE: f64 = 60.0;

/// One beat of an eight-count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CountCell {
    /// No annotation
    #[default]
    Blank,
    /// Not eligible for annotation until unblocked
    Blocked,
    /// Single-character choreography label
    Labeled(char),
}

impl CountCell {
    /// Normalize free-form user input to a cell value.
    ///
    /// Only the first character is kept. Empty or whitespace input clears
    /// the cell, and the blocked marker blocks it.
    pub fn from_input(input: &str) -> Self {
        match input.chars().next() {
            Some(c) => Self::from_char(c),
            None => CountCell::Blank,
        }
    }

    /// Decode a single stored character
    pub fn from_char(c: char) -> Self {
        match c {
            BLOCKED_MARKER => CountCell::Blocked,
            c if c.is_whitespace() => CountCell::Blank,
            c => CountCell::Labeled(c),
        }
    }

    /// Display/storage character for this cell
    pub fn as_char(&self) -> char {
        match self {
            CountCell::Blank => BLANK_MARKER,
            CountCell::Blocked => BLOCKED_MARKER,
            CountCell::Labeled(c) => *c,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, CountCell::Blank)
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, CountCell::Blocked)
    }
}

/// Eight consecutive beats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EightCount {
    cells: [CountCell; BEATS_PER_EIGHT_COUNT],
}

impl EightCount {
    /// An eight-count with every cell blank
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn cells(&self) -> &[CountCell; BEATS_PER_EIGHT_COUNT] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Option<CountCell> {
        self.cells.get(index).copied()
    }

    /// True when no cell carries a label or block
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(CountCell::is_blank)
    }
}

impl fmt::Display for EightCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cell in &self.cells {
            write!(f, "{}", cell.as_char())?;
        }
        Ok(())
    }
}

impl FromStr for EightCount {
    type Err = Error;

    /// Parse the stored 8-character form; any other length is rejected.
    fn from_str(s: &str) -> Result<Self> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != BEATS_PER_EIGHT_COUNT {
            return Err(Error::InvalidInput(format!(
                "eight-count must be exactly {} characters, got {} ({:?})",
                BEATS_PER_EIGHT_COUNT,
                chars.len(),
                s
            )));
        }

        let mut cells = [CountCell::Blank; BEATS_PER_EIGHT_COUNT];
        for (cell, c) in cells.iter_mut().zip(chars) {
            *cell = CountCell::from_char(c);
        }
        Ok(Self { cells })
    }
}

impl Serialize for EightCount {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EightCount {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Number of eight-counts needed to cover a song
///
/// `ceil(duration_seconds * (bpm / 60) / 8)`. Fails with
/// [`Error::InvalidInput`] unless both values are positive and finite and
/// the result fits within [`MAX_EIGHT_COUNTS`].
pub fn eight_count_total(duration_seconds: f64, bpm: u32) -> Result<usize> {
    if !duration_seconds.is_finite() || duration_seconds <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "song duration must be positive, got {}",
            duration_seconds
        )));
    }
    if bpm == 0 {
        return Err(Error::InvalidInput("BPM must be positive, got 0".to_string()));
    }

    let beats_per_second = bpm as f64 / SECONDS_PER_MINUTE;
    let total_beats = duration_seconds * beats_per_second;
    let total = (total_beats / BEATS_PER_EIGHT_COUNT as f64).ceil();
    if total > MAX_EIGHT_COUNTS as f64 {
        return Err(Error::InvalidInput(format!(
            "grid of {} eight-counts exceeds limit of {}",
            total, MAX_EIGHT_COUNTS
        )));
    }
    Ok(total as usize)
}

/// Ordered sequence of eight-counts spanning a song
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BeatGrid {
    eight_counts: Vec<EightCount>,
}

impl BeatGrid {
    /// Build an all-blank grid for a song of `duration_seconds` at `bpm`.
    ///
    /// This is the only way to size a grid from song parameters; changing
    /// either parameter means building a new grid.
    pub fn build(duration_seconds: f64, bpm: u32) -> Result<Self> {
        let total = eight_count_total(duration_seconds, bpm)?;
        Ok(Self {
            eight_counts: vec![EightCount::blank(); total],
        })
    }

    /// Restore a grid from its stored string form
    pub fn from_strings<S: AsRef<str>>(eight_counts: &[S]) -> Result<Self> {
        if eight_counts.len() > MAX_EIGHT_COUNTS {
            return Err(Error::InvalidInput(format!(
                "grid of {} eight-counts exceeds limit of {}",
                eight_counts.len(),
                MAX_EIGHT_COUNTS
            )));
        }
        let eight_counts = eight_counts
            .iter()
            .map(|s| s.as_ref().parse())
            .collect::<Result<Vec<EightCount>>>()?;
        Ok(Self { eight_counts })
    }

    /// Stored string form, one 8-character string per eight-count
    pub fn to_strings(&self) -> Vec<String> {
        self.eight_counts.iter().map(EightCount::to_string).collect()
    }

    pub fn len(&self) -> usize {
        self.eight_counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eight_counts.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&EightCount> {
        self.eight_counts.get(index)
    }

    /// Number of cells holding a label or block
    pub fn annotated_cells(&self) -> usize {
        self.eight_counts
            .iter()
            .flat_map(|ec| ec.cells.iter())
            .filter(|cell| !cell.is_blank())
            .count()
    }

    /// Read-only view of `(index, eight-count)` pairs in ascending order.
    ///
    /// Each call starts a fresh iteration.
    pub fn render(&self) -> impl Iterator<Item = (usize, &EightCount)> + '_ {
        self.eight_counts.iter().enumerate()
    }

    /// Current value of a cell
    pub fn cell(&self, eight_count: usize, cell: usize) -> Result<CountCell> {
        self.check_bounds(eight_count, cell)?;
        Ok(self.eight_counts[eight_count].cells[cell])
    }

    /// Apply a character edit to a cell.
    ///
    /// `value` is normalized with [`CountCell::from_input`], so only its first
    /// character counts. Blocked cells reject the edit. On error the grid is
    /// left unchanged.
    pub fn set_cell(&mut self, eight_count: usize, cell: usize, value: &str) -> Result<CountCell> {
        self.check_bounds(eight_count, cell)?;

        let slot = &mut self.eight_counts[eight_count].cells[cell];
        if slot.is_blocked() {
            return Err(Error::CellBlocked { eight_count, cell });
        }

        *slot = CountCell::from_input(value);
        Ok(*slot)
    }

    /// Flip a cell between blocked and blank.
    ///
    /// A labeled cell becomes blocked and its label is lost.
    pub fn toggle_blocked(&mut self, eight_count: usize, cell: usize) -> Result<CountCell> {
        self.check_bounds(eight_count, cell)?;

        let slot = &mut self.eight_counts[eight_count].cells[cell];
        *slot = if slot.is_blocked() {
            CountCell::Blank
        } else {
            CountCell::Blocked
        };
        Ok(*slot)
    }

    fn check_bounds(&self, eight_count: usize, cell: usize) -> Result<()> {
        if eight_count >= self.eight_counts.len() || cell >= BEATS_PER_EIGHT_COUNT {
            return Err(Error::OutOfRange {
                eight_count,
                cell,
                len: self.eight_counts.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_rounds_partial_eight_count_up() {
        // 30s at 120 BPM = 60 beats = 7.5 eight-counts
        let grid = BeatGrid::build(30.0, 120).unwrap();
        assert_eq!(grid.len(), 8);
        assert!(grid.render().all(|(_, ec)| ec.is_blank()));
    }

    #[test]
    fn test_build_exact_multiple() {
        // 240s at 120 BPM = 480 beats = 60 eight-counts
        assert_eq!(BeatGrid::build(240.0, 120).unwrap().len(), 60);
    }

    #[test]
    fn test_build_length_matches_formula() {
        for (duration, bpm) in [(1.0, 1), (3.5, 97), (187.4, 128), (61.0, 60), (0.01, 300)] {
            let expected = (duration * (bpm as f64 / 60.0) / 8.0).ceil() as usize;
            assert_eq!(BeatGrid::build(duration, bpm).unwrap().len(), expected);
        }
    }

    #[test]
    fn test_build_rejects_non_positive_input() {
        assert!(matches!(BeatGrid::build(0.0, 120), Err(Error::InvalidInput(_))));
        assert!(matches!(BeatGrid::build(60.0, 0), Err(Error::InvalidInput(_))));
        assert!(matches!(BeatGrid::build(-5.0, 120), Err(Error::InvalidInput(_))));
        assert!(matches!(BeatGrid::build(f64::NAN, 120), Err(Error::InvalidInput(_))));
        assert!(matches!(
            BeatGrid::build(f64::INFINITY, 120),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_build_rejects_oversized_grid() {
        assert!(matches!(BeatGrid::build(1e300, 120), Err(Error::InvalidInput(_))));
        assert!(matches!(BeatGrid::build(1e10, 120), Err(Error::InvalidInput(_))));
        assert!(matches!(
            eight_count_total(f64::MAX, u32::MAX),
            Err(Error::InvalidInput(_))
        ));

        // 240 BPM for 200 000 s is exactly the limit
        assert_eq!(eight_count_total(200_000.0, 240).unwrap(), MAX_EIGHT_COUNTS);
        assert!(eight_count_total(200_001.0, 240).is_err());
    }

    #[test]
    fn test_set_cell_keeps_first_character() {
        let mut grid = BeatGrid::build(30.0, 120).unwrap();
        assert_eq!(grid.set_cell(0, 3, "kick").unwrap(), CountCell::Labeled('k'));
        assert_eq!(grid.get(0).unwrap().to_string(), "   k    ");
    }

    #[test]
    fn test_set_cell_relabel_and_clear() {
        let mut grid = BeatGrid::build(30.0, 120).unwrap();
        grid.set_cell(1, 0, "a").unwrap();
        grid.set_cell(1, 0, "b").unwrap();
        assert_eq!(grid.cell(1, 0).unwrap(), CountCell::Labeled('b'));

        grid.set_cell(1, 0, "").unwrap();
        assert_eq!(grid.cell(1, 0).unwrap(), CountCell::Blank);
    }

    #[test]
    fn test_set_cell_marker_blocks() {
        let mut grid = BeatGrid::build(30.0, 120).unwrap();
        assert_eq!(grid.set_cell(0, 0, "X").unwrap(), CountCell::Blocked);
        // Lower-case x is an ordinary label
        assert_eq!(grid.set_cell(0, 1, "x").unwrap(), CountCell::Labeled('x'));
    }

    #[test]
    fn test_set_cell_out_of_range_leaves_grid_unchanged() {
        let mut grid = BeatGrid::build(30.0, 120).unwrap();
        grid.set_cell(2, 2, "s").unwrap();
        let before = grid.clone();

        for (ec, cell) in [(8, 0), (0, 8), (usize::MAX, 0), (0, usize::MAX), (100, 100)] {
            let err = grid.set_cell(ec, cell, "a").unwrap_err();
            assert!(matches!(err, Error::OutOfRange { len: 8, .. }));
            assert!(matches!(
                grid.toggle_blocked(ec, cell),
                Err(Error::OutOfRange { .. })
            ));
        }
        assert_eq!(grid, before);
    }

    #[test]
    fn test_set_cell_on_empty_grid_is_out_of_range() {
        let mut grid = BeatGrid::default();
        assert!(matches!(grid.set_cell(0, 0, "a"), Err(Error::OutOfRange { len: 0, .. })));
    }

    #[test]
    fn test_blocked_cell_rejects_edits() {
        let mut grid = BeatGrid::build(30.0, 120).unwrap();
        grid.toggle_blocked(0, 5).unwrap();

        let err = grid.set_cell(0, 5, "a").unwrap_err();
        assert!(matches!(err, Error::CellBlocked { eight_count: 0, cell: 5 }));
        assert_eq!(grid.cell(0, 5).unwrap(), CountCell::Blocked);
    }

    #[test]
    fn test_toggle_twice_returns_to_blank() {
        let mut grid = BeatGrid::build(30.0, 120).unwrap();
        assert_eq!(grid.toggle_blocked(3, 7).unwrap(), CountCell::Blocked);
        assert_eq!(grid.toggle_blocked(3, 7).unwrap(), CountCell::Blank);
        assert!(grid.get(3).unwrap().is_blank());
    }

    #[test]
    fn test_toggle_overwrites_label() {
        let mut grid = BeatGrid::build(30.0, 120).unwrap();
        grid.set_cell(0, 0, "t").unwrap();
        assert_eq!(grid.toggle_blocked(0, 0).unwrap(), CountCell::Blocked);
        // Unblocking does not bring the label back
        assert_eq!(grid.toggle_blocked(0, 0).unwrap(), CountCell::Blank);
    }

    #[test]
    fn test_render_is_ordered_and_restartable() {
        let mut grid = BeatGrid::build(60.0, 96).unwrap();
        grid.set_cell(4, 0, "z").unwrap();

        let first: Vec<usize> = grid.render().map(|(i, _)| i).collect();
        let second: Vec<usize> = grid.render().map(|(i, _)| i).collect();
        assert_eq!(first, (0..grid.len()).collect::<Vec<_>>());
        assert_eq!(first, second);

        let (index, ec) = grid.render().find(|(_, ec)| !ec.is_blank()).unwrap();
        assert_eq!(index, 4);
        assert_eq!(ec.cell(0), Some(CountCell::Labeled('z')));
    }

    #[test]
    fn test_string_form_round_trip() {
        let grid = BeatGrid::from_strings(&["a X  b  ", "        "]).unwrap();
        assert_eq!(grid.len(), 2);
        assert_eq!(grid.cell(0, 2).unwrap(), CountCell::Blocked);
        assert_eq!(grid.annotated_cells(), 3);
        assert_eq!(grid.to_strings(), vec!["a X  b  ", "        "]);
    }

    #[test]
    fn test_from_strings_rejects_wrong_width() {
        assert!(matches!(
            BeatGrid::from_strings(&["short"]),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            BeatGrid::from_strings(&["123456789"]),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_from_strings_rejects_oversized_grid() {
        let blank = "        ";
        let at_limit = vec![blank; MAX_EIGHT_COUNTS];
        assert_eq!(BeatGrid::from_strings(&at_limit).unwrap().len(), MAX_EIGHT_COUNTS);

        let over_limit = vec![blank; MAX_EIGHT_COUNTS + 1];
        assert!(matches!(
            BeatGrid::from_strings(&over_limit),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_multibyte_labels_count_as_one_cell() {
        let ec: EightCount = "é♪      ".parse().unwrap();
        assert_eq!(ec.cell(0), Some(CountCell::Labeled('é')));
        assert_eq!(ec.cell(1), Some(CountCell::Labeled('♪')));
        assert_eq!(ec.to_string(), "é♪      ");
    }

    #[test]
    fn test_grid_serializes_as_string_array() {
        let mut grid = BeatGrid::build(8.0, 60).unwrap();
        grid.set_cell(0, 1, "h").unwrap();
        let json = serde_json::to_string(&grid).unwrap();
        assert_eq!(json, r#"[" h      "]"#);

        let back: BeatGrid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, grid);
    }
}
