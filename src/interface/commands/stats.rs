//! # Stats Command
//!
//! Handles `stats rooms|commands|<stat>` and `stats subscribe|unsubscribe <stat>`.
//! Every reply goes to the invoker's direct-message room.

use crate::application::stats::StatsAggregator;
use crate::domain::traits::ChatProvider;
use crate::strings::messages;
use anyhow::Result;

pub async fn handle_stats(
    stats: &StatsAggregator,
    chat: &dyn ChatProvider,
    user_id: &str,
    option: &str,
) -> Result<()> {
    let option = option.trim();
    let (head, rest) = match option.split_once(' ') {
        Some((head, rest)) => (head, rest.trim()),
        None => (option, ""),
    };

    let reply = match head {
        "" => messages::STATS_USAGE.to_string(),
        "subscribe" | "unsubscribe" if rest.is_empty() => messages::subscribe_usage(head),
        "subscribe" => messages::subscribed(&stats.subscribe(user_id, rest).await?),
        "unsubscribe" => messages::unsubscribed(&stats.unsubscribe(user_id, rest).await?),
        "rooms" | "commands" => stats.query(head).await?.render(),
        _ => stats.query(option).await?.render(),
    };

    chat.send_direct(user_id, &reply)
        .await
        .map(|_| ())
        .map_err(|e| anyhow::anyhow!(e))
}
