/*!
 * # subbank - cutscene subtitle bank editor
 *
 * A Rust library for editing localized cutscene subtitles and pushing the
 * result to a running game.
 *
 * ## Features
 *
 * - Language banks of named scenes, each an ordered list of timed lines
 * - Scene creation, deletion and copying from a base language
 * - Line insertion and edits that keep scenes sorted by `(start, end)`
 * - Per-bank speaker display names
 * - JSON bank storage and a REPL rebuild trigger after saving
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `model`: Banks, scenes, lines and game text
 * - `editor`: The editing model and the editor selection
 * - `speakers`: Speaker roster lookups
 * - `text_codec`: Game text <-> display text conversion seam
 * - `store`: Loading and saving banks
 * - `repl`: Remote evaluation against the running game
 * - `session`: Editing session wiring the model to its collaborators
 * - `app_config`: Configuration management
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod editor;
pub mod errors;
pub mod model;
pub mod repl;
pub mod session;
pub mod speakers;
pub mod store;
pub mod text_codec;

// Re-export main types for easier usage
pub use app_config::Config;
pub use editor::{EditorSelection, LineDraft, ListedScene, SceneOrigin, SceneRef, SubtitleEditingModel};
pub use errors::{AppError, EditError, NotFound, ReplError, StoreError};
pub use model::{BankId, GameText, LanguageBank, Scene, SubtitleLine};
pub use session::{EditorSession, RebuildOutcome, SaveStatus};
