/*!
 * Conversion between game text and display text.
 *
 * The model never converts text itself; the session runs every string the
 * operator types through a `TextCodec` on the way in, and every stored
 * string through it on the way out.
 */

use std::fmt::Debug;

use crate::model::GameText;

/// Converts between the game's text encoding and UTF-8
pub trait TextCodec: Send + Sync + Debug {
    /// Decode stored game text for display
    fn game_to_display(&self, text: &GameText) -> String;

    /// Encode typed text for storage; `normalize` tidies operator input
    fn display_to_game(&self, text: &str, normalize: bool) -> GameText;
}

/// Codec for banks whose game text is already UTF-8
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughCodec;

impl TextCodec for PassthroughCodec {
    fn game_to_display(&self, text: &GameText) -> String {
        text.as_str().to_string()
    }

    fn display_to_game(&self, text: &str, normalize: bool) -> GameText {
        if normalize {
            GameText::new(text.trim_end())
        } else {
            GameText::new(text)
        }
    }
}
