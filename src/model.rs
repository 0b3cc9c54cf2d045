/*!
 * Data model for subtitle banks.
 *
 * A `LanguageBank` holds every scene and speaker name for one language.
 * Scenes are keyed by name and hold their lines sorted by `(start, end)`.
 * All text is kept in the game's own encoding (`GameText`); conversion to
 * something displayable happens in `text_codec`, never here.
 */

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a language bank
pub type BankId = u32;

/// Text stored in the game's native encoding
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameText(String);

impl GameText {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<&str> for GameText {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl fmt::Display for GameText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// @struct: Single timed subtitle line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleLine {
    // @field: First frame the line is shown
    pub start: f32,

    // @field: Frame the line is hidden
    pub end: f32,

    // @field: Line text (game encoding)
    pub text: GameText,

    // @field: Speaker id, empty when unassigned
    #[serde(default)]
    pub speaker: String,

    // @field: Spoken by someone not on screen
    #[serde(default)]
    pub offscreen: bool,
}

impl SubtitleLine {
    pub fn new(
        start: f32,
        end: f32,
        text: GameText,
        speaker: impl Into<String>,
        offscreen: bool,
    ) -> Self {
        Self {
            start,
            end,
            text,
            speaker: speaker.into(),
            offscreen,
        }
    }

    /// Compare two lines by their `(start, end)` ordering key
    pub fn cmp_timing(&self, other: &Self) -> Ordering {
        self.start
            .total_cmp(&other.start)
            .then_with(|| self.end.total_cmp(&other.end))
    }

    pub fn has_speaker(&self) -> bool {
        !self.speaker.is_empty()
    }
}

/// One cutscene: an ordered list of timed lines
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "SceneFile")]
pub struct Scene {
    lines: Vec<SubtitleLine>,
}

/// Scene as written in a bank file, in whatever order the file has
#[derive(Deserialize)]
struct SceneFile {
    #[serde(default)]
    lines: Vec<SubtitleLine>,
}

impl From<SceneFile> for Scene {
    fn from(file: SceneFile) -> Self {
        Scene::from_lines(file.lines)
    }
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scene from arbitrary lines, sorting them by timing
    pub fn from_lines(mut lines: Vec<SubtitleLine>) -> Self {
        lines.sort_by(SubtitleLine::cmp_timing);
        Self { lines }
    }

    pub fn lines(&self) -> &[SubtitleLine] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&SubtitleLine> {
        self.lines.get(index)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// True if every line is ordered non-decreasingly by `(start, end)`
    pub fn is_sorted(&self) -> bool {
        self.lines
            .windows(2)
            .all(|pair| pair[0].cmp_timing(&pair[1]) != Ordering::Greater)
    }

    /// Insert after every line whose key is less than or equal to the new
    /// line's key, so equal keys keep insertion order.
    pub(crate) fn insert_sorted(&mut self, line: SubtitleLine) -> usize {
        let index = self
            .lines
            .partition_point(|existing| existing.cmp_timing(&line) != Ordering::Greater);
        self.lines.insert(index, line);
        index
    }

    pub(crate) fn line_mut(&mut self, index: usize) -> Option<&mut SubtitleLine> {
        self.lines.get_mut(index)
    }

    pub(crate) fn remove(&mut self, index: usize) -> SubtitleLine {
        self.lines.remove(index)
    }

    /// Stable re-sort after an edit changed a line's key
    pub(crate) fn resort(&mut self) {
        self.lines.sort_by(SubtitleLine::cmp_timing);
    }
}

/// Every scene and speaker name for one language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageBank {
    /// Language id
    pub lang: BankId,

    /// File the bank was loaded from, relative to the project directory
    pub file_path: String,

    /// Text format version, selects the codec for this bank's text
    #[serde(default)]
    pub text_version: String,

    /// Scenes by name
    #[serde(default)]
    pub scenes: BTreeMap<String, Scene>,

    /// Speaker display names by speaker id
    #[serde(default)]
    pub speakers: BTreeMap<String, GameText>,
}

impl LanguageBank {
    pub fn new(lang: BankId, file_path: impl Into<String>, text_version: impl Into<String>) -> Self {
        Self {
            lang,
            file_path: file_path.into(),
            text_version: text_version.into(),
            scenes: BTreeMap::new(),
            speakers: BTreeMap::new(),
        }
    }

    pub fn scene(&self, name: &str) -> Option<&Scene> {
        self.scenes.get(name)
    }

    pub fn has_scene(&self, name: &str) -> bool {
        self.scenes.contains_key(name)
    }

    /// Display name for a speaker id, if the bank defines one
    pub fn speaker_name(&self, speaker: &str) -> Option<&GameText> {
        self.speakers.get(speaker)
    }

    /// Label used in combo boxes, e.g. `[0] english.json`
    pub fn label(&self) -> String {
        format!("[{}] {}", self.lang, self.file_path)
    }
}
