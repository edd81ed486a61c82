//! # Voteythumbs Command
//!
//! Handles `voteythumbs <text>` and `@room voteythumbs <text>`.
//! The vote is opened on the invoking message itself.

use crate::application::vote::VoteTracker;
use crate::domain::types::IncomingMessage;
use anyhow::Result;

pub async fn handle_voteythumbs(
    votes: &VoteTracker,
    msg: &IncomingMessage,
    text: &str,
) -> Result<()> {
    // Marker placement keeps running in the background.
    votes
        .register_vote(&msg.room_id, &msg.message_id, &msg.sender_id, text.trim())
        .await?;
    Ok(())
}
