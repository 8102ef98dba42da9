//! Sheet records and the editing session
//!
//! [`SheetRecord`] is the plain shape exchanged with the sheet store.
//! [`SheetSession`] holds everything one editor works on: the song, its
//! tempo and the grid. It is owned by the caller and passed explicitly;
//! there is no process-wide sheet state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::grid::{BeatGrid, CountCell};
use crate::{Error, Result};

/// Tempo used before the user has tapped or entered one
pub const DEFAULT_BPM: u32 = 120;

/// Sheet as persisted by the sheet store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetRecord {
    pub title: String,
    pub bpm: u32,
    pub eight_counts: Vec<String>,
    pub song_uri: Option<String>,
    pub song_duration: Option<f64>,
}

impl SheetRecord {
    /// Check the record is internally consistent before it is stored or
    /// loaded into a session.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::InvalidInput("sheet title must not be blank".to_string()));
        }
        if self.bpm == 0 {
            return Err(Error::InvalidInput("BPM must be positive, got 0".to_string()));
        }
        if let Some(duration) = self.song_duration {
            if !duration.is_finite() || duration <= 0.0 {
                return Err(Error::InvalidInput(format!(
                    "song duration must be positive, got {}",
                    duration
                )));
            }
        }
        BeatGrid::from_strings(&self.eight_counts)?;
        Ok(())
    }

    /// Decode the stored eight-counts into a grid
    pub fn grid(&self) -> Result<BeatGrid> {
        BeatGrid::from_strings(&self.eight_counts)
    }
}

/// Entry in the saved-sheets listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetSummary {
    pub id: String,
    pub title: String,
}

/// A record together with its store identity and timestamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSheet {
    pub id: String,
    #[serde(flatten)]
    pub record: SheetRecord,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parse a manually entered BPM value.
///
/// Unparseable or zero input is rejected rather than replaced with a default.
pub fn parse_bpm(text: &str) -> Result<u32> {
    let bpm: u32 = text
        .trim()
        .parse()
        .map_err(|_| Error::InvalidInput(format!("BPM must be a whole number, got {:?}", text)))?;
    if bpm == 0 {
        return Err(Error::InvalidInput("BPM must be positive, got 0".to_string()));
    }
    Ok(bpm)
}

/// One editor's working sheet
#[derive(Debug, Clone)]
pub struct SheetSession {
    current_sheet_id: Option<String>,
    song_uri: Option<String>,
    song_duration: Option<f64>,
    bpm: u32,
    grid: BeatGrid,
}

impl Default for SheetSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SheetSession {
    pub fn new() -> Self {
        Self {
            current_sheet_id: None,
            song_uri: None,
            song_duration: None,
            bpm: DEFAULT_BPM,
            grid: BeatGrid::default(),
        }
    }

    pub fn current_sheet_id(&self) -> Option<&str> {
        self.current_sheet_id.as_deref()
    }

    /// Remember the store id assigned on first save
    pub fn set_current_sheet_id(&mut self, id: impl Into<String>) {
        self.current_sheet_id = Some(id.into());
    }

    pub fn song_uri(&self) -> Option<&str> {
        self.song_uri.as_deref()
    }

    pub fn song_duration(&self) -> Option<f64> {
        self.song_duration
    }

    pub fn bpm(&self) -> u32 {
        self.bpm
    }

    pub fn grid(&self) -> &BeatGrid {
        &self.grid
    }

    /// Select a song and rebuild the grid for it.
    ///
    /// Any annotations on the previous grid are discarded. Invalid input
    /// leaves the session untouched.
    pub fn set_song_info(&mut self, uri: impl Into<String>, duration_seconds: f64) -> Result<()> {
        let grid = BeatGrid::build(duration_seconds, self.bpm)?;
        self.replace_grid(grid);
        self.song_uri = Some(uri.into());
        self.song_duration = Some(duration_seconds);
        Ok(())
    }

    /// Change the tempo, rebuilding the grid if a song is loaded.
    pub fn set_bpm(&mut self, bpm: u32) -> Result<()> {
        if bpm == 0 {
            return Err(Error::InvalidInput("BPM must be positive, got 0".to_string()));
        }
        if let Some(duration) = self.song_duration {
            let grid = BeatGrid::build(duration, bpm)?;
            self.replace_grid(grid);
        }
        self.bpm = bpm;
        Ok(())
    }

    pub fn set_cell(&mut self, eight_count: usize, cell: usize, value: &str) -> Result<CountCell> {
        self.grid.set_cell(eight_count, cell, value)
    }

    pub fn toggle_blocked(&mut self, eight_count: usize, cell: usize) -> Result<CountCell> {
        self.grid.toggle_blocked(eight_count, cell)
    }

    /// Snapshot the session for saving under `title`
    pub fn to_record(&self, title: &str) -> Result<SheetRecord> {
        if self.song_duration.is_none() {
            return Err(Error::InvalidInput("no song loaded".to_string()));
        }
        let record = SheetRecord {
            title: title.trim().to_string(),
            bpm: self.bpm,
            eight_counts: self.grid.to_strings(),
            song_uri: self.song_uri.clone(),
            song_duration: self.song_duration,
        };
        record.validate()?;
        Ok(record)
    }

    /// Replace the session with a stored sheet
    pub fn load(&mut self, id: impl Into<String>, record: &SheetRecord) -> Result<()> {
        record.validate()?;
        let grid = record.grid()?;
        let id = id.into();
        debug!(sheet_id = %id, eight_counts = grid.len(), "Loaded sheet into session");

        self.current_sheet_id = Some(id);
        self.song_uri = record.song_uri.clone();
        self.song_duration = record.song_duration;
        self.bpm = record.bpm;
        self.grid = grid;
        Ok(())
    }

    fn replace_grid(&mut self, grid: BeatGrid) {
        let lost = self.grid.annotated_cells();
        if lost > 0 {
            warn!(
                annotated_cells = lost,
                old_len = self.grid.len(),
                new_len = grid.len(),
                "Rebuilding beat grid discards existing annotations"
            );
        }
        self.grid = grid;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SheetRecord {
        SheetRecord {
            title: "Opening".to_string(),
            bpm: 100,
            eight_counts: vec!["a   X   ".to_string(), "        ".to_string()],
            song_uri: Some("spotify:track:abc".to_string()),
            song_duration: Some(9.6),
        }
    }

    #[test]
    fn test_new_session_defaults() {
        let session = SheetSession::new();
        assert_eq!(session.bpm(), DEFAULT_BPM);
        assert!(session.grid().is_empty());
        assert!(session.current_sheet_id().is_none());
    }

    #[test]
    fn test_set_song_info_builds_grid() {
        let mut session = SheetSession::new();
        session.set_song_info("file:///song.mp3", 30.0).unwrap();
        assert_eq!(session.grid().len(), 8);
        assert_eq!(session.song_uri(), Some("file:///song.mp3"));
    }

    #[test]
    fn test_set_bpm_rebuilds_and_discards_annotations() {
        let mut session = SheetSession::new();
        session.set_song_info("file:///song.mp3", 30.0).unwrap();
        session.set_cell(0, 0, "a").unwrap();

        session.set_bpm(60).unwrap();
        assert_eq!(session.bpm(), 60);
        assert_eq!(session.grid().len(), 4);
        assert_eq!(session.grid().annotated_cells(), 0);
    }

    #[test]
    fn test_set_bpm_without_song_only_stores_tempo() {
        let mut session = SheetSession::new();
        session.set_bpm(90).unwrap();
        assert_eq!(session.bpm(), 90);
        assert!(session.grid().is_empty());
    }

    #[test]
    fn test_rejected_input_leaves_session_unchanged() {
        let mut session = SheetSession::new();
        session.set_song_info("file:///song.mp3", 30.0).unwrap();
        session.set_cell(1, 1, "q").unwrap();

        assert!(matches!(session.set_bpm(0), Err(Error::InvalidInput(_))));
        assert!(matches!(
            session.set_song_info("file:///other.mp3", 0.0),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            session.set_song_info("file:///endless.mp3", 1e300),
            Err(Error::InvalidInput(_))
        ));
        assert_eq!(session.bpm(), DEFAULT_BPM);
        assert_eq!(session.song_uri(), Some("file:///song.mp3"));
        assert_eq!(session.grid().cell(1, 1).unwrap(), CountCell::Labeled('q'));
    }

    #[test]
    fn test_to_record_requires_song_and_title() {
        let mut session = SheetSession::new();
        assert!(session.to_record("Untitled").is_err());

        session.set_song_info("file:///song.mp3", 4.0).unwrap();
        assert!(matches!(session.to_record("   "), Err(Error::InvalidInput(_))));

        session.toggle_blocked(0, 2).unwrap();
        let record = session.to_record("  Finale ").unwrap();
        assert_eq!(record.title, "Finale");
        assert_eq!(record.eight_counts, vec!["  X     ".to_string()]);
    }

    #[test]
    fn test_load_replaces_session() {
        let mut session = SheetSession::new();
        session.set_song_info("file:///song.mp3", 30.0).unwrap();

        session.load("sheet-1", &record()).unwrap();
        assert_eq!(session.current_sheet_id(), Some("sheet-1"));
        assert_eq!(session.bpm(), 100);
        assert_eq!(session.grid().len(), 2);
        assert_eq!(session.grid().cell(0, 4).unwrap(), CountCell::Blocked);
        assert_eq!(session.to_record("Opening").unwrap(), record());
    }

    #[test]
    fn test_load_rejects_malformed_record() {
        let mut session = SheetSession::new();
        let mut bad = record();
        bad.eight_counts.push("toolongvalue".to_string());
        assert!(matches!(session.load("x", &bad), Err(Error::InvalidInput(_))));
        assert!(session.current_sheet_id().is_none());
    }

    #[test]
    fn test_parse_bpm() {
        assert_eq!(parse_bpm("128").unwrap(), 128);
        assert_eq!(parse_bpm(" 95 ").unwrap(), 95);
        assert!(matches!(parse_bpm(""), Err(Error::InvalidInput(_))));
        assert!(matches!(parse_bpm("fast"), Err(Error::InvalidInput(_))));
        assert!(matches!(parse_bpm("0"), Err(Error::InvalidInput(_))));
        assert!(matches!(parse_bpm("-4"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_record_uses_camel_case_fields() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["eightCounts"][0], "a   X   ");
        assert_eq!(json["songUri"], "spotify:track:abc");
        assert_eq!(json["songDuration"], 9.6);
    }
}
