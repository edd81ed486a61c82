//! # Help Command
//!
//! Handles the `help` command.
//! Lists every command the bot answers to.

use crate::domain::traits::ChatProvider;
use anyhow::Result;

pub async fn handle_help(chat: &dyn ChatProvider, room_id: &str, prefix: &str) -> Result<()> {
    let text = crate::strings::help::help_text(prefix);
    chat.send_to_room(room_id, &text)
        .await
        .map(|_| ())
        .map_err(|e| anyhow::anyhow!(e))
}
