/*!
 * In-memory subtitle editing model.
 *
 * `SubtitleEditingModel` is the single mutation point for loaded banks:
 * - Scene creation, copying and deletion
 * - Line insertion (kept sorted by `(start, end)`), editing and deletion
 * - Speaker display names
 * - Name filtering and the base-language view
 *
 * Callers only ever receive shared references. Every operation either
 * applies fully or returns an `EditError` and leaves the banks untouched.
 * The selection stores identifiers (bank id + scene name) and resolves
 * them on demand.
 */

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};

use crate::errors::{EditError, NotFound};
use crate::model::{BankId, GameText, LanguageBank, Scene, SubtitleLine};

/// Placeholder shown in an empty filter box; filtering by it matches all scenes
pub const DEFAULT_FILTER_PLACEHOLDER: &str = "Filter Scenes";

/// Stable reference to a scene inside a bank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneRef {
    pub bank: BankId,
    pub name: String,
}

/// Where a listed scene comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneOrigin {
    /// The scene lives in the bank being edited
    Current,
    /// The scene only exists in the base language
    BaseOnly,
}

/// A scene as listed for display
#[derive(Debug, Clone, Copy)]
pub struct ListedScene<'a> {
    pub name: &'a str,
    pub scene: &'a Scene,
    pub origin: SceneOrigin,
}

/// Display-side values of a line: the pending new-line input, or an edit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineDraft {
    pub start: f32,
    pub end: f32,
    /// Display text, converted to game text on submit
    pub text: String,
    pub speaker: String,
    pub offscreen: bool,
}

impl LineDraft {
    /// Whether the form holds a line `add_line` would accept
    pub fn is_submittable(&self) -> bool {
        self.start >= 0.0 && self.end >= 0.0 && !self.text.is_empty()
    }

    /// Fall back to the bank's first speaker when the chosen one is unknown
    pub fn adopt_bank_speaker(&mut self, bank: &LanguageBank) {
        if bank.speakers.contains_key(&self.speaker) {
            return;
        }
        if let Some(first) = bank.speakers.keys().next() {
            self.speaker = first.clone();
        }
    }
}

/// Transient editor state, never persisted
#[derive(Debug, Clone, Default)]
pub struct EditorSelection {
    current_bank: BankId,
    base_bank: BankId,
    current_scene: Option<SceneRef>,
    /// Pending line input
    pub new_line: LineDraft,
    /// Scene name filter
    pub filter: String,
    show_missing_from_base: bool,
}

impl EditorSelection {
    pub fn current_bank(&self) -> BankId {
        self.current_bank
    }

    pub fn base_bank(&self) -> BankId {
        self.base_bank
    }

    pub fn current_scene(&self) -> Option<&SceneRef> {
        self.current_scene.as_ref()
    }

    /// Whether base-language scenes missing from the current bank are listed
    pub fn show_missing_from_base(&self) -> bool {
        self.show_missing_from_base
    }

    fn is_selected(&self, bank: BankId, name: &str) -> bool {
        self.current_scene
            .as_ref()
            .is_some_and(|selected| selected.bank == bank && selected.name == name)
    }
}

/// Loaded banks plus the editing operations over them
#[derive(Debug, Clone)]
pub struct SubtitleEditingModel {
    banks: BTreeMap<BankId, LanguageBank>,
    selection: EditorSelection,
    filter_placeholder: String,
}

impl Default for SubtitleEditingModel {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl SubtitleEditingModel {
    /// Create a model over the given banks; both bank selections start at the
    /// lowest loaded id.
    pub fn new(banks: impl IntoIterator<Item = LanguageBank>) -> Self {
        let banks: BTreeMap<BankId, LanguageBank> =
            banks.into_iter().map(|bank| (bank.lang, bank)).collect();
        let first = banks.keys().next().copied().unwrap_or_default();
        let selection = EditorSelection {
            current_bank: first,
            base_bank: first,
            filter: DEFAULT_FILTER_PLACEHOLDER.to_string(),
            ..EditorSelection::default()
        };
        Self {
            banks,
            selection,
            filter_placeholder: DEFAULT_FILTER_PLACEHOLDER.to_string(),
        }
    }

    /// Use a different filter placeholder
    pub fn with_filter_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        let placeholder = placeholder.into();
        if self.selection.filter == self.filter_placeholder {
            self.selection.filter = placeholder.clone();
        }
        self.filter_placeholder = placeholder;
        self
    }

    // =========================================================================
    // Read access
    // =========================================================================

    pub fn banks(&self) -> impl Iterator<Item = &LanguageBank> {
        self.banks.values()
    }

    pub fn bank(&self, bank: BankId) -> Option<&LanguageBank> {
        self.banks.get(&bank)
    }

    pub fn scene(&self, bank: BankId, name: &str) -> Option<&Scene> {
        self.banks.get(&bank).and_then(|b| b.scene(name))
    }

    pub fn selection(&self) -> &EditorSelection {
        &self.selection
    }

    pub fn filter_placeholder(&self) -> &str {
        &self.filter_placeholder
    }

    /// Clone every bank, for handing to a store
    pub fn snapshot(&self) -> Vec<LanguageBank> {
        self.banks.values().cloned().collect()
    }

    fn bank_mut(&mut self, bank: BankId) -> Result<&mut LanguageBank, EditError> {
        self.banks
            .get_mut(&bank)
            .ok_or(EditError::NotFound(NotFound::Bank(bank)))
    }

    fn scene_mut(&mut self, bank: BankId, name: &str) -> Result<&mut Scene, EditError> {
        self.bank_mut(bank)?
            .scenes
            .get_mut(name)
            .ok_or_else(|| EditError::NotFound(NotFound::Scene { bank, name: name.to_string() }))
    }

    // =========================================================================
    // Scenes
    // =========================================================================

    /// True iff the bank has a scene with exactly this name
    pub fn scene_exists(&self, bank: BankId, name: &str) -> bool {
        self.banks.get(&bank).is_some_and(|b| b.has_scene(name))
    }

    pub fn add_scene(&mut self, bank: BankId, name: &str, scene: Scene) -> Result<(), EditError> {
        if self.scene_exists(bank, name) {
            warn!("Refusing to add scene '{}': already present in bank {}", name, bank);
            return Err(EditError::DuplicateScene { bank, name: name.to_string() });
        }
        let target = self.bank_mut(bank)?;
        target.scenes.insert(name.to_string(), scene);
        debug!("Added scene '{}' to bank {}", name, bank);
        Ok(())
    }

    /// Deep-copy a scene's lines from one bank into another
    pub fn copy_scene(&mut self, from: BankId, to: BankId, name: &str) -> Result<(), EditError> {
        if !self.banks.contains_key(&to) {
            return Err(NotFound::Bank(to).into());
        }
        if self.scene_exists(to, name) {
            warn!("Refusing to copy scene '{}': bank {} already has it", name, to);
            return Err(EditError::DuplicateScene { bank: to, name: name.to_string() });
        }
        let source = self
            .banks
            .get(&from)
            .ok_or(EditError::NotFound(NotFound::Bank(from)))?
            .scene(name)
            .ok_or_else(|| NotFound::Scene { bank: from, name: name.to_string() })?
            .clone();
        self.bank_mut(to)?.scenes.insert(name.to_string(), source);
        debug!("Copied scene '{}' from bank {} to bank {}", name, from, to);
        Ok(())
    }

    /// Remove a scene. Returns whether it existed; an absent scene is not an
    /// error. Clears the selection if it pointed at the removed scene.
    pub fn delete_scene(&mut self, bank: BankId, name: &str) -> Result<bool, EditError> {
        let removed = self.bank_mut(bank)?.scenes.remove(name).is_some();
        if self.selection.is_selected(bank, name) {
            self.selection.current_scene = None;
        }
        if removed {
            debug!("Deleted scene '{}' from bank {}", name, bank);
        }
        Ok(removed)
    }

    /// Remove several scenes collected during a read pass
    pub fn delete_scenes<S: AsRef<str>>(&mut self, bank: BankId, names: &[S]) -> Result<usize, EditError> {
        if !self.banks.contains_key(&bank) {
            return Err(NotFound::Bank(bank).into());
        }
        let mut removed = 0;
        for name in names {
            if self.delete_scene(bank, name.as_ref())? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    // =========================================================================
    // Lines
    // =========================================================================

    /// Insert a line keeping the scene sorted; returns the line's index
    pub fn add_line(
        &mut self,
        bank: BankId,
        scene_name: &str,
        line: SubtitleLine,
    ) -> Result<usize, EditError> {
        let scene = self.scene_mut(bank, scene_name)?;
        if !(line.start >= 0.0 && line.end >= 0.0) {
            return Err(EditError::InvalidRange { start: line.start, end: line.end });
        }
        if line.text.is_empty() {
            return Err(EditError::EmptyText);
        }
        let index = scene.insert_sorted(line);
        debug!("Added line {} to scene '{}' in bank {}", index, scene_name, bank);
        Ok(index)
    }

    /// Remove one line; a scene always keeps at least one
    pub fn delete_line(
        &mut self,
        bank: BankId,
        scene_name: &str,
        index: usize,
    ) -> Result<SubtitleLine, EditError> {
        let scene = self.scene_mut(bank, scene_name)?;
        if index >= scene.len() {
            return Err(NotFound::Line { scene: scene_name.to_string(), index }.into());
        }
        if scene.len() == 1 {
            warn!("Refusing to delete the only line of scene '{}'", scene_name);
            return Err(EditError::LastLineProtected { scene: scene_name.to_string() });
        }
        let removed = scene.remove(index);
        debug!("Deleted line {} from scene '{}' in bank {}", index, scene_name, bank);
        Ok(removed)
    }

    /// Remove lines marked during a read pass. All indices are checked
    /// before anything is removed.
    pub fn delete_lines(
        &mut self,
        bank: BankId,
        scene_name: &str,
        indices: &[usize],
    ) -> Result<usize, EditError> {
        let scene = self.scene_mut(bank, scene_name)?;
        let marked: BTreeSet<usize> = indices.iter().copied().collect();
        if let Some(&bad) = marked.iter().find(|&&i| i >= scene.len()) {
            return Err(NotFound::Line { scene: scene_name.to_string(), index: bad }.into());
        }
        if !marked.is_empty() && marked.len() >= scene.len() {
            warn!("Refusing to delete every line of scene '{}'", scene_name);
            return Err(EditError::LastLineProtected { scene: scene_name.to_string() });
        }
        for &index in marked.iter().rev() {
            scene.remove(index);
        }
        debug!("Deleted {} lines from scene '{}' in bank {}", marked.len(), scene_name, bank);
        Ok(marked.len())
    }

    /// Overwrite every field of a line, then restore the scene's ordering
    pub fn update_line(
        &mut self,
        bank: BankId,
        scene_name: &str,
        index: usize,
        updated: SubtitleLine,
    ) -> Result<(), EditError> {
        let scene = self.scene_mut(bank, scene_name)?;
        let line = scene
            .line_mut(index)
            .ok_or_else(|| NotFound::Line { scene: scene_name.to_string(), index })?;
        *line = updated;
        scene.resort();
        debug!("Updated line {} of scene '{}' in bank {}", index, scene_name, bank);
        Ok(())
    }

    // =========================================================================
    // Speakers
    // =========================================================================

    /// Set a speaker's display name; an empty name removes the speaker.
    /// Lines keep their speaker id either way.
    pub fn set_speaker_name(
        &mut self,
        bank: BankId,
        speaker: &str,
        display: GameText,
    ) -> Result<(), EditError> {
        let target = self.bank_mut(bank)?;
        if display.is_empty() {
            if target.speakers.remove(speaker).is_some() {
                debug!("Removed speaker '{}' from bank {}", speaker, bank);
            }
        } else {
            target.speakers.insert(speaker.to_string(), display);
            debug!("Set speaker '{}' in bank {}", speaker, bank);
        }
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Case-sensitive substring match; an empty or placeholder filter matches
    /// everything.
    pub fn scene_matches_filter(&self, name: &str, filter: &str) -> bool {
        filter.is_empty() || filter == self.filter_placeholder || name.contains(filter)
    }

    /// Scenes of a bank whose names contain `filter`, in bank order.
    /// Recomputed on every call; an unknown bank yields nothing.
    pub fn filter_scenes_by_name<'a>(
        &'a self,
        bank: BankId,
        filter: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a Scene)> + 'a {
        self.banks
            .get(&bank)
            .into_iter()
            .flat_map(|b| b.scenes.iter())
            .filter(move |(name, _)| self.scene_matches_filter(name, filter))
            .map(|(name, scene)| (name.as_str(), scene))
    }

    /// Scenes of the base bank that the current bank does not have yet
    pub fn merged_view<'a>(
        &'a self,
        current: BankId,
        base: BankId,
    ) -> impl Iterator<Item = ListedScene<'a>> + 'a {
        self.banks
            .get(&base)
            .into_iter()
            .flat_map(|b| b.scenes.iter())
            .filter(move |(name, _)| !self.scene_exists(current, name))
            .map(|(name, scene)| ListedScene {
                name: name.as_str(),
                scene,
                origin: SceneOrigin::BaseOnly,
            })
    }

    /// Scenes of the current bank matching the selection's filter
    pub fn current_listing(&self) -> impl Iterator<Item = ListedScene<'_>> {
        let bank = self.selection.current_bank;
        self.filter_scenes_by_name(bank, &self.selection.filter)
            .map(|(name, scene)| ListedScene { name, scene, origin: SceneOrigin::Current })
    }

    /// Base-only scenes matching the selection's filter; empty unless
    /// missing base scenes are shown
    pub fn base_listing(&self) -> impl Iterator<Item = ListedScene<'_>> {
        let filter = self.selection.filter.as_str();
        let shown = self.selection.show_missing_from_base;
        self.merged_view(self.selection.current_bank, self.selection.base_bank)
            .filter(move |listed| shown && self.scene_matches_filter(listed.name, filter))
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn set_current_bank(&mut self, bank: BankId) -> Result<(), EditError> {
        if !self.banks.contains_key(&bank) {
            return Err(NotFound::Bank(bank).into());
        }
        self.selection.current_bank = bank;
        Ok(())
    }

    pub fn set_base_bank(&mut self, bank: BankId) -> Result<(), EditError> {
        if !self.banks.contains_key(&bank) {
            return Err(NotFound::Bank(bank).into());
        }
        self.selection.base_bank = bank;
        Ok(())
    }

    pub fn select_scene(&mut self, bank: BankId, name: &str) -> Result<(), EditError> {
        if !self.scene_exists(bank, name) {
            return Err(NotFound::Scene { bank, name: name.to_string() }.into());
        }
        self.selection.current_scene = Some(SceneRef { bank, name: name.to_string() });
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection.current_scene = None;
    }

    /// Resolve the selected scene, if it still exists
    pub fn current_scene(&self) -> Option<(&SceneRef, &Scene)> {
        let selected = self.selection.current_scene.as_ref()?;
        self.scene(selected.bank, &selected.name)
            .map(|scene| (selected, scene))
    }

    pub fn set_filter(&mut self, filter: impl Into<String>) {
        self.selection.filter = filter.into();
    }

    pub fn set_show_missing_from_base(&mut self, show: bool) {
        self.selection.show_missing_from_base = show;
    }

    pub fn line_draft(&self) -> &LineDraft {
        &self.selection.new_line
    }

    pub fn line_draft_mut(&mut self) -> &mut LineDraft {
        &mut self.selection.new_line
    }

    /// Point the form's speaker at a speaker the current bank defines
    pub fn sync_new_line_speaker(&mut self) {
        if let Some(bank) = self.banks.get(&self.selection.current_bank) {
            self.selection.new_line.adopt_bank_speaker(bank);
        }
    }

    /// Swap in a freshly loaded bank set, keeping whatever selection still
    /// resolves.
    pub fn replace_banks(&mut self, banks: impl IntoIterator<Item = LanguageBank>) {
        self.banks = banks.into_iter().map(|bank| (bank.lang, bank)).collect();
        let first = self.banks.keys().next().copied().unwrap_or_default();
        if !self.banks.contains_key(&self.selection.current_bank) {
            self.selection.current_bank = first;
        }
        if !self.banks.contains_key(&self.selection.base_bank) {
            self.selection.base_bank = first;
        }
        let stale = self
            .selection
            .current_scene
            .as_ref()
            .is_some_and(|selected| !self.scene_exists(selected.bank, &selected.name));
        if stale {
            debug!("Selected scene vanished on reload, clearing selection");
            self.selection.current_scene = None;
        }
    }
}
