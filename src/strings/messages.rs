//! # Messages
//!
//! Contains constant strings and format functions for user-facing messages.
//! Includes mood replies, vote announcements, stats reports and subscription notices.

use crate::application::stats::{RankedReport, SubscriptionChange, format_percent};

pub const BRAIN_NOT_LOADED: &str = "Brain not loaded.";

// Mood

pub fn mood_emotionless(name: &str) -> String {
    format!("{name} is emotionless...")
}

pub fn mood_neutral(name: &str) -> String {
    format!("{name} is neutral.")
}

pub fn mood_happy(name: &str) -> String {
    format!("{name} is happy!")
}

pub fn mood_sad(name: &str) -> String {
    format!("{name} is sad... Try cheer them up!")
}

pub fn happiest(name: &str) -> String {
    format!("{name} was the happiest! YAY {name}!!!")
}

pub fn saddest(name: &str) -> String {
    format!("{name} was the saddest... Poor {name}... Everybody try cheer them up!")
}

pub const NO_MOODS: &str = "Nobody has shown any feelings today.";

// Voteythumbs

pub fn vote_passed(text: &str) -> String {
    format!("✅ Voteythumbs '{text}'. Passed ✅")
}

pub fn vote_failed(text: &str) -> String {
    format!("❌ Voteythumbs '{text}'. Failed ❌")
}

// Stats

pub const STATS_USAGE: &str = "Usage: `!stats (rooms|commands|<stat>)` or `!stats (subscribe|unsubscribe) <stat>`";

pub fn subscribe_usage(verb: &str) -> String {
    format!("Usage: `!stats {verb} (rooms|commands|<stat>)`")
}

pub fn rooms_report(report: &RankedReport) -> String {
    let mut message = format!(
        "_{} total message(s) in {} room(s) since Monday_\n\n",
        report.total,
        report.entries.len()
    );
    for entry in &report.entries {
        message.push_str(&format!(
            "**{}**: {} message(s) `({}%)`\n",
            entry.name,
            entry.count,
            format_percent(entry.tenths)
        ));
    }
    message
}

pub fn commands_report(report: &RankedReport) -> String {
    let mut message = format!("_{} total call(s) since Monday_\n\n", report.total);
    for entry in &report.entries {
        message.push_str(&format!(
            "**{}**: {} call(s) `({}%)`\n",
            entry.name,
            entry.count,
            format_percent(entry.tenths)
        ));
    }
    message
}

pub fn single_stat(name: &str, value: u64) -> String {
    format!("**{name}**: {value} since Monday")
}

pub fn stat_not_found(name: &str) -> String {
    format!("Could not find requested stat `{name}`")
}

pub fn weekly_header(subscriptions: &[String]) -> String {
    format!(
        "Here are your weekly subscriptions to `{}`!",
        subscriptions.join(", ")
    )
}

pub fn subscribed(change: &SubscriptionChange) -> String {
    let list = change.subscriptions.join(", ");
    if change.changed {
        format!("Subscribed to `{}`, you are now subscribed to `{list}`", change.stat)
    } else {
        format!(
            "Already subscribed to `{}`, you are currently subscribed to `{list}`",
            change.stat
        )
    }
}

pub fn unsubscribed(change: &SubscriptionChange) -> String {
    let list = change.subscriptions.join(", ");
    match (change.changed, list.is_empty()) {
        (true, false) => format!(
            "Unsubscribed from `{}`, you are still subscribed to `{list}`",
            change.stat
        ),
        (true, true) => format!(
            "Unsubscribed from `{}`, you have no remaining subscriptions",
            change.stat
        ),
        (false, false) => format!(
            "Could not find requested subscription `{}`, you are currently subscribed to `{list}`",
            change.stat
        ),
        (false, true) => format!(
            "Could not find requested subscription `{}`, you have no current subscriptions",
            change.stat
        ),
    }
}

// Dog

pub const DOG: &str = r#"```
                                __
         ,                    ," .`--o
        ((                   (  | __,'
         \\~----------------' \_;/
         (                      /
         /) ._______________.  )
        (( (               (( (         hjw
         ``-'               ``-'
```"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::stats::RankedReport;
    use std::collections::BTreeMap;

    #[test]
    fn test_rooms_report_layout() {
        let mut counts = BTreeMap::new();
        counts.insert("general".to_string(), 3);
        counts.insert("random".to_string(), 1);
        let text = rooms_report(&RankedReport::from_counts(&counts));
        assert_eq!(
            text,
            "_4 total message(s) in 2 room(s) since Monday_\n\n\
             **general**: 3 message(s) `(75%)`\n\
             **random**: 1 message(s) `(25%)`\n"
        );
    }

    #[test]
    fn test_empty_commands_report() {
        let text = commands_report(&RankedReport::from_counts(&BTreeMap::new()));
        assert_eq!(text, "_0 total call(s) since Monday_\n\n");
    }

    #[test]
    fn test_unsubscribe_wording() {
        let change = SubscriptionChange {
            stat: "rooms".into(),
            changed: false,
            subscriptions: vec![],
        };
        assert_eq!(
            unsubscribed(&change),
            "Could not find requested subscription `rooms`, you have no current subscriptions"
        );
    }
}
