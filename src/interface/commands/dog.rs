//! # Dog Command
//!
//! Like `cat`, but for dog people.

use crate::domain::traits::ChatProvider;
use anyhow::Result;

pub async fn handle_dog(chat: &dyn ChatProvider, room_id: &str) -> Result<()> {
    chat.send_to_room(room_id, crate::strings::messages::DOG)
        .await
        .map(|_| ())
        .map_err(|e| anyhow::anyhow!(e))
}
