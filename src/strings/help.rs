//! # Help Text
//!
//! The command listing shown by `help`.

/// One line per command: (usage, description).
pub const COMMANDS: &[(&str, &str)] = &[
    ("mood <username>", "Outputs the mood of the user"),
    ("happiest", "Outputs the happiest person"),
    ("saddest", "Outputs the saddest person"),
    ("voteythumbs <message>", "Starts a 👍/👎 vote on your message"),
    ("stats (rooms|commands|<stat>)", "Yields general chat statistics"),
    (
        "stats (subscribe|unsubscribe) <stat>",
        "Weekly stat reports, delivered every Monday",
    ),
    ("dog", "Like cat, but for dog people"),
    ("help", "Shows this list"),
];

pub fn help_text(prefix: &str) -> String {
    let mut text = String::from("**Commands**\n");
    for (usage, description) in COMMANDS {
        text.push_str(&format!("- `{prefix}{usage}` - {description}\n"));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_help_lists_every_command_with_prefix() {
        let text = help_text("!");
        assert!(text.contains("`!mood <username>`"));
        assert!(text.contains("`!dog`"));
        assert_eq!(text.lines().count(), COMMANDS.len() + 1);
    }
}
