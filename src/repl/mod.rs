/*!
 * Remote evaluation against the running game.
 *
 * This module contains the client seam used to tell a live game to pick up
 * saved text:
 * - `tcp`: plain TCP client for the game's REPL listener
 * - `mock`: scripted client recording every evaluated form
 *
 * The editor never builds forms itself beyond the fixed rebuild sequence in
 * `rebuild_text`.
 */

use async_trait::async_trait;
use log::info;
use std::fmt::Debug;

use crate::errors::ReplError;

/// Rebuilds the packed text asset from the saved bank files
pub const MAKE_TEXT_FORM: &str = "(make-text)";

/// Bumps the in-memory text's language id so the game sees it as stale
pub const BUMP_TEXT_VERSION_FORM: &str = "(1+! (-> *subtitle2-text* lang))";

/// Common trait for REPL connections
#[async_trait]
pub trait ReplClient: Send + Sync + Debug {
    /// Whether a connection is currently open
    fn is_connected(&self) -> bool;

    /// Open the connection
    ///
    /// # Returns
    /// * `Result<(), ReplError>` - Ok once connected, or why it failed
    async fn connect(&mut self) -> Result<(), ReplError>;

    /// Send one form for evaluation
    ///
    /// # Arguments
    /// * `form` - The expression to evaluate in the game
    async fn eval(&mut self, form: &str) -> Result<(), ReplError>;
}

/// Rebuild the text asset and force the game to reload it
pub async fn rebuild_text(client: &mut dyn ReplClient) -> Result<(), ReplError> {
    if !client.is_connected() {
        return Err(ReplError::NotConnected);
    }
    client.eval(MAKE_TEXT_FORM).await?;
    client.eval(BUMP_TEXT_VERSION_FORM).await?;
    info!("Requested text rebuild from the game");
    Ok(())
}

pub mod mock;
pub mod tcp;

pub use mock::MockReplClient;
pub use tcp::TcpReplClient;
