use log::{error, info, warn};

use crate::app_config::Config;
use crate::editor::{LineDraft, SubtitleEditingModel};
use crate::errors::{EditError, ReplError, StoreError};
use crate::model::{BankId, SubtitleLine};
use crate::repl::{self, ReplClient, TcpReplClient};
use crate::speakers::SpeakerRoster;
use crate::store::{BankStore, JsonBankStore};
use crate::text_codec::{PassthroughCodec, TextCodec};

// @module: Editing session wiring the model to its collaborators

/// Label for a speaker id the bank has no display name for
pub const UNRESOLVED_SPEAKER: &str = "N/A";

/// What happened to the rebuild request after a save
#[derive(Debug, Clone, PartialEq)]
pub enum RebuildOutcome {
    /// Not attempted (save failed, REPL offline, or auto-rebuild off)
    Skipped,
    /// Both rebuild forms were sent
    Requested,
    /// Sending the forms failed
    Failed(String),
}

/// Result of the last save, shown to the operator
#[derive(Debug, Clone, PartialEq)]
pub struct SaveStatus {
    pub saved: bool,
    pub rebuild: RebuildOutcome,
}

impl SaveStatus {
    pub fn message(&self) -> &'static str {
        if self.saved { "Saved!" } else { "Error!" }
    }

    /// Status message plus what happened to the rebuild
    pub fn summary(&self) -> String {
        match &self.rebuild {
            RebuildOutcome::Requested => format!("{} Game text rebuild requested", self.message()),
            RebuildOutcome::Skipped => self.message().to_string(),
            RebuildOutcome::Failed(reason) => format!("{} Rebuild failed: {}", self.message(), reason),
        }
    }
}

/// Editing session: the model plus the store, codec and REPL it talks to
pub struct EditorSession {
    // @field: Session configuration
    config: Config,
    model: SubtitleEditingModel,
    store: Box<dyn BankStore>,
    codec: Box<dyn TextCodec>,
    repl: Box<dyn ReplClient>,
    roster: SpeakerRoster,
    loaded: bool,
    last_save: Option<SaveStatus>,
}

impl EditorSession {
    // @method: Create a session with explicit collaborators
    pub fn new(config: Config, store: Box<dyn BankStore>, repl: Box<dyn ReplClient>) -> Self {
        let model = SubtitleEditingModel::default()
            .with_filter_placeholder(config.editor.filter_placeholder.clone());
        let roster = SpeakerRoster::new(config.editor.speakers.iter().cloned());
        Self {
            config,
            model,
            store,
            codec: Box::new(PassthroughCodec),
            repl,
            roster,
            loaded: false,
            last_save: None,
        }
    }

    /// Session backed by the JSON project directory and a TCP REPL
    pub fn from_config(config: Config) -> Self {
        let store = JsonBankStore::new(&config.project_dir);
        let repl = TcpReplClient::from_config(&config.repl);
        Self::new(config, Box::new(store), Box::new(repl))
    }

    pub fn with_codec(mut self, codec: Box<dyn TextCodec>) -> Self {
        self.codec = codec;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn model(&self) -> &SubtitleEditingModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut SubtitleEditingModel {
        &mut self.model
    }

    pub fn roster(&self) -> &SpeakerRoster {
        &self.roster
    }

    pub fn codec(&self) -> &dyn TextCodec {
        self.codec.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn last_save(&self) -> Option<&SaveStatus> {
        self.last_save.as_ref()
    }

    // =========================================================================
    // Persistence and REPL
    // =========================================================================

    /// Replace the in-memory banks with the store's; returns the bank count
    pub fn load(&mut self) -> Result<usize, StoreError> {
        let banks = self.store.load()?;
        let count = banks.len();
        self.model.replace_banks(banks);

        let editor = &self.config.editor;
        if let Err(e) = self.model.set_current_bank(editor.current_language) {
            warn!("Configured editor language unavailable ({}), using bank {}", e, self.model.selection().current_bank());
        }
        if let Err(e) = self.model.set_base_bank(editor.base_language) {
            warn!("Configured base language unavailable ({}), using bank {}", e, self.model.selection().base_bank());
        }

        self.loaded = true;
        info!("Loaded {} language banks", count);
        Ok(count)
    }

    /// Write every bank, then ask the game to reload its text.
    /// A failed save leaves the in-memory banks as they are.
    pub async fn save(&mut self) -> SaveStatus {
        let status = match self.store.save(&self.model.snapshot()) {
            Ok(()) => {
                info!("Saved subtitle banks");
                let rebuild = if self.config.repl.auto_rebuild && self.repl.is_connected() {
                    match repl::rebuild_text(self.repl.as_mut()).await {
                        Ok(()) => RebuildOutcome::Requested,
                        Err(e) => {
                            error!("Text rebuild failed: {}", e);
                            RebuildOutcome::Failed(e.to_string())
                        }
                    }
                } else {
                    RebuildOutcome::Skipped
                };
                SaveStatus { saved: true, rebuild }
            }
            Err(e) => {
                error!("Failed to save subtitle banks: {}", e);
                SaveStatus { saved: false, rebuild: RebuildOutcome::Skipped }
            }
        };
        self.last_save = Some(status.clone());
        status
    }

    pub fn repl_connected(&self) -> bool {
        self.repl.is_connected()
    }

    pub async fn connect_repl(&mut self) -> Result<(), ReplError> {
        if self.repl.is_connected() {
            return Ok(());
        }
        self.repl.connect().await
    }

    /// Send the rebuild sequence, connecting first if needed
    pub async fn rebuild(&mut self) -> Result<(), ReplError> {
        self.connect_repl().await?;
        repl::rebuild_text(self.repl.as_mut()).await
    }

    // =========================================================================
    // Editing through display text
    // =========================================================================

    /// Add an empty scene to the current bank, selecting it if configured to
    pub fn add_scene_named(&mut self, name: &str) -> Result<(), EditError> {
        if name.is_empty() {
            return Err(EditError::EmptySceneName);
        }
        let bank = self.model.selection().current_bank();
        self.model.add_scene(bank, name, Default::default())?;
        if self.config.editor.add_new_scene_as_current {
            self.model.select_scene(bank, name)?;
        }
        Ok(())
    }

    /// Add the pending new line to the selected scene
    pub fn submit_new_line(&mut self) -> Result<usize, EditError> {
        let selected = self
            .model
            .selection()
            .current_scene()
            .cloned()
            .ok_or(EditError::NoSceneSelected)?;
        let line = self.draft_to_line(&self.model.selection().new_line);
        self.model.add_line(selected.bank, &selected.name, line)
    }

    /// Overwrite a line with display-side values
    pub fn edit_line(
        &mut self,
        bank: BankId,
        scene: &str,
        index: usize,
        draft: &LineDraft,
    ) -> Result<(), EditError> {
        let line = self.draft_to_line(draft);
        self.model.update_line(bank, scene, index, line)
    }

    /// Display-side values of a stored line, for pre-filling an edit
    pub fn line_draft(&self, line: &SubtitleLine) -> LineDraft {
        LineDraft {
            start: line.start,
            end: line.end,
            text: self.codec.game_to_display(&line.text),
            speaker: line.speaker.clone(),
            offscreen: line.offscreen,
        }
    }

    /// Set a speaker's display name in the current bank; empty removes it
    pub fn set_speaker_display(&mut self, speaker: &str, display: &str) -> Result<(), EditError> {
        let bank = self.model.selection().current_bank();
        let encoded = self.codec.display_to_game(display, true);
        self.model.set_speaker_name(bank, speaker, encoded)
    }

    fn draft_to_line(&self, draft: &LineDraft) -> SubtitleLine {
        SubtitleLine::new(
            draft.start,
            draft.end,
            self.codec.display_to_game(&draft.text, true),
            draft.speaker.clone(),
            draft.offscreen,
        )
    }

    // =========================================================================
    // Display helpers
    // =========================================================================

    /// Decoded display name of a speaker in a bank
    pub fn speaker_display(&self, bank: BankId, speaker: &str) -> Option<String> {
        self.model
            .bank(bank)
            .and_then(|b| b.speaker_name(speaker))
            .map(|name| self.codec.game_to_display(name))
    }

    /// Speaker name for a line, `N/A` when it does not resolve
    pub fn speaker_label(&self, bank: BankId, line: &SubtitleLine) -> String {
        self.speaker_display(bank, &line.speaker)
            .unwrap_or_else(|| UNRESOLVED_SPEAKER.to_string())
    }

    /// One-line summary: `[start - end] Speaker: text`, cut to the configured
    /// width with "..."
    pub fn line_summary(&self, bank: BankId, line: &SubtitleLine) -> String {
        let text = self.codec.game_to_display(&line.text);
        let full = match self.speaker_display(bank, &line.speaker) {
            Some(speaker) => format!("{}: {}", speaker, text),
            None => text,
        };
        format!(
            "[{} - {}] {}",
            line.start,
            line.end,
            truncate_display(&full, self.config.editor.line_display_max_len)
        )
    }
}

/// Keep at most `max_len` characters, replacing the tail with "..." when cut
pub fn truncate_display(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
}
