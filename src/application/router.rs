//! # Command Router
//!
//! Fans every inbound chat event out to the plugins. Passive listeners ("hear") run on
//! every message; addressed commands ("respond") run when the message is directed at the
//! bot by prefix, by name, or by being sent in a direct-message room.

use anyhow::Result;
use regex::Regex;
use std::sync::Arc;

use crate::application::brain::BrainHandle;
use crate::application::mood::{Extreme, MoodLedger};
use crate::application::stats::StatsAggregator;
use crate::application::vote::{Outcome, VoteTracker};
use crate::domain::error::BrainError;
use crate::domain::traits::{ChatProvider, Directory};
use crate::domain::types::{IncomingMessage, ReactionEvent};
use crate::interface::commands;
use crate::strings::logs;

/// A command recognised in an addressed message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Mood(String),
    Extreme(Extreme),
    Voteythumbs(String),
    Stats(String),
    Dog,
    Help,
}

struct Patterns {
    sad: Regex,
    happy: Regex,
    room_vote: Regex,
    mood: Regex,
    extreme: Regex,
    vote: Regex,
    stats: Regex,
    dog: Regex,
    help: Regex,
}

impl Patterns {
    fn new() -> Self {
        let compile = |pattern: &str| Regex::new(pattern).expect("static pattern");
        Self {
            sad: compile(r":<|:\(|:'\("),
            happy: compile(r":>|:\)|:'\)"),
            room_vote: compile(r"@(?:room|channel) voteythumbs:? (.+)"),
            mood: compile(r"(?i)^mood (.+)"),
            extreme: compile(r"(?i)^(happiest|saddest)\b"),
            vote: compile(r"(?i)^voteythumbs:? (.+)"),
            stats: compile(r"(?i)^stats(?:\s+(.*))?$"),
            dog: compile(r"(?i)^dog\b"),
            help: compile(r"(?i)^help\b"),
        }
    }
}

pub struct CommandRouter {
    prefix: String,
    bot_name: String,
    chat: Arc<dyn ChatProvider>,
    directory: Arc<dyn Directory>,
    moods: Arc<MoodLedger>,
    votes: Arc<VoteTracker>,
    stats: Arc<StatsAggregator>,
    patterns: Patterns,
}

impl CommandRouter {
    pub fn new(
        prefix: &str,
        bot_name: &str,
        brain: Arc<BrainHandle>,
        chat: Arc<dyn ChatProvider>,
        directory: Arc<dyn Directory>,
    ) -> Self {
        Self {
            prefix: prefix.to_string(),
            bot_name: bot_name.to_lowercase(),
            moods: Arc::new(MoodLedger::new(brain.clone())),
            votes: Arc::new(VoteTracker::new(
                brain.clone(),
                chat.clone(),
                directory.clone(),
            )),
            stats: Arc::new(StatsAggregator::new(brain, prefix)),
            chat,
            directory,
            patterns: Patterns::new(),
        }
    }

    pub fn moods(&self) -> Arc<MoodLedger> {
        self.moods.clone()
    }

    pub fn votes(&self) -> Arc<VoteTracker> {
        self.votes.clone()
    }

    pub fn stats(&self) -> Arc<StatsAggregator> {
        self.stats.clone()
    }

    /// The text following the bot's address, if the message is addressed to it.
    pub fn addressed<'a>(&self, msg: &'a IncomingMessage) -> Option<&'a str> {
        let body = msg.body.trim();
        if let Some(rest) = body.strip_prefix(self.prefix.as_str()) {
            return Some(rest.trim_start());
        }

        let name_len = self.bot_name.len();
        if let Some(name) = body.get(..name_len)
            && name.eq_ignore_ascii_case(&self.bot_name)
            && let Some(rest) = body[name_len..]
                .strip_prefix(':')
                .or_else(|| body[name_len..].strip_prefix(','))
        {
            let rest = rest.trim_start();
            return Some(rest.strip_prefix(self.prefix.as_str()).unwrap_or(rest));
        }

        msg.is_direct.then_some(body)
    }

    pub fn parse_command(&self, text: &str) -> Option<Command> {
        let p = &self.patterns;
        if let Some(caps) = p.mood.captures(text) {
            return Some(Command::Mood(caps[1].trim().to_string()));
        }
        if let Some(caps) = p.extreme.captures(text) {
            let kind = if caps[1].eq_ignore_ascii_case("happiest") {
                Extreme::Happiest
            } else {
                Extreme::Saddest
            };
            return Some(Command::Extreme(kind));
        }
        if let Some(caps) = p.vote.captures(text) {
            return Some(Command::Voteythumbs(caps[1].to_string()));
        }
        if let Some(caps) = p.stats.captures(text) {
            let option = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            return Some(Command::Stats(option.to_string()));
        }
        if p.dog.is_match(text) {
            return Some(Command::Dog);
        }
        if p.help.is_match(text) {
            return Some(Command::Help);
        }
        None
    }

    /// Runs every listener and, when addressed, the matching command.
    pub async fn route(&self, msg: &IncomingMessage) -> Result<()> {
        let command = self.addressed(msg).and_then(|text| self.parse_command(text));
        let is_vote_command = matches!(command, Some(Command::Voteythumbs(_)));

        tracing::debug!(
            "Router dispatching message from '{}' in '{}' command={:?}",
            msg.sender_id,
            msg.room_id,
            command
        );

        futures::join!(
            self.hear_stats(msg),
            self.hear_mood(msg),
            self.hear_room_vote(msg, is_vote_command),
        );

        if let Some(command) = command {
            self.respond(msg, command).await?;
        }
        Ok(())
    }

    async fn respond(&self, msg: &IncomingMessage, command: Command) -> Result<()> {
        let chat = self.chat.as_ref();
        match command {
            Command::Mood(target) => {
                commands::mood::handle_mood(&self.moods, chat, &msg.room_id, &target).await
            }
            Command::Extreme(kind) => {
                commands::mood::handle_extreme(&self.moods, chat, &msg.room_id, kind).await
            }
            Command::Voteythumbs(text) => {
                commands::vote::handle_voteythumbs(&self.votes, msg, &text).await
            }
            Command::Stats(option) => {
                commands::stats::handle_stats(&self.stats, chat, &msg.sender_id, &option).await
            }
            Command::Dog => commands::dog::handle_dog(chat, &msg.room_id).await,
            Command::Help => commands::help::handle_help(chat, &msg.room_id, &self.prefix).await,
        }
    }

    async fn hear_stats(&self, msg: &IncomingMessage) {
        let room = match self.directory.room_info(&msg.room_id).await {
            Ok(room) => room,
            Err(e) => {
                tracing::debug!("{}", logs::handler_failed("stats", &e));
                return;
            }
        };
        if let Err(e) = self.stats.record_message(&room, msg.body.trim()).await {
            log_brain_error("stats", &e);
        }
    }

    async fn hear_mood(&self, msg: &IncomingMessage) {
        if self.patterns.sad.is_match(&msg.body)
            && let Err(e) = self.moods.record_negative(&msg.sender_name).await
        {
            log_brain_error("mood", &e);
        }
        if self.patterns.happy.is_match(&msg.body)
            && let Err(e) = self.moods.record_positive(&msg.sender_name).await
        {
            log_brain_error("mood", &e);
        }
    }

    async fn hear_room_vote(&self, msg: &IncomingMessage, already_handled: bool) {
        if already_handled {
            return;
        }
        let Some(caps) = self.patterns.room_vote.captures(&msg.body) else {
            return;
        };
        if let Err(e) = commands::vote::handle_voteythumbs(&self.votes, msg, &caps[1]).await {
            tracing::warn!("{}", logs::handler_failed("voteythumbs", &e.to_string()));
        }
    }

    pub async fn react(&self, event: &ReactionEvent) -> Option<Outcome> {
        match self.votes.apply_reaction(event).await {
            Ok(outcome) => outcome,
            Err(e) => {
                log_brain_error("reaction", &e);
                None
            }
        }
    }

    pub async fn retract(&self, reaction_id: &str, reactor_id: &str) -> Option<Outcome> {
        match self.votes.retract_reaction(reaction_id, reactor_id).await {
            Ok(outcome) => outcome,
            Err(e) => {
                log_brain_error("retraction", &e);
                None
            }
        }
    }
}

fn log_brain_error(handler: &str, err: &BrainError) {
    tracing::warn!("{}", logs::brain_unavailable(handler, &err.to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{FailingBrain, FakeDirectory, RecordingChat};
    use crate::application::vote::{VOTES_KEY, VoteBook};
    use crate::domain::types::{Polarity, ReactionKind, ReactionTarget};
    use crate::infrastructure::brain::MemoryBrain;
    use crate::strings::messages;

    const ROOM: &str = "!general:example.org";
    const DM: &str = "!dm:example.org";

    struct Harness {
        router: CommandRouter,
        brain: Arc<BrainHandle>,
        chat: Arc<RecordingChat>,
        next_id: std::sync::atomic::AtomicUsize,
    }

    impl Harness {
        fn new(humans: usize) -> Self {
            Self::with_store(humans, Arc::new(MemoryBrain::new()))
        }

        fn with_store(humans: usize, store: Arc<dyn crate::domain::traits::BrainStore>) -> Self {
            let chat = Arc::new(RecordingChat::default());
            let directory =
                FakeDirectory::with_humans(ROOM, humans).room(DM, "dm", false, None);
            let brain = Arc::new(BrainHandle::new(store));
            let router = CommandRouter::new(
                "!",
                "brainbot",
                brain.clone(),
                chat.clone(),
                Arc::new(directory),
            );
            Self {
                router,
                brain,
                chat,
                next_id: Default::default(),
            }
        }

        fn message(&self, room: &str, sender: &str, body: &str) -> IncomingMessage {
            let n = self
                .next_id
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            IncomingMessage {
                room_id: room.to_string(),
                message_id: format!("$m{n}"),
                sender_id: format!("@{sender}:example.org"),
                sender_name: sender.to_string(),
                body: body.to_string(),
                is_direct: room == DM,
            }
        }

        async fn say(&self, sender: &str, body: &str) -> IncomingMessage {
            let msg = self.message(ROOM, sender, body);
            self.router.route(&msg).await.unwrap();
            msg
        }
    }

    #[tokio::test]
    async fn test_addressing_rules() {
        let h = Harness::new(1);
        let prefixed = h.message(ROOM, "amy", "!mood bob");
        assert_eq!(h.router.addressed(&prefixed), Some("mood bob"));

        let named = h.message(ROOM, "amy", "BrainBot: !happiest");
        assert_eq!(h.router.addressed(&named), Some("happiest"));

        let comma = h.message(ROOM, "amy", "brainbot, dog");
        assert_eq!(h.router.addressed(&comma), Some("dog"));

        let direct = h.message(DM, "amy", "help");
        assert_eq!(h.router.addressed(&direct), Some("help"));

        let chatter = h.message(ROOM, "amy", "brainbots are neat");
        assert_eq!(h.router.addressed(&chatter), None);
    }

    #[test]
    fn test_parse_command() {
        let h = Harness::new(1);
        let r = &h.router;
        assert_eq!(r.parse_command("mood Bob"), Some(Command::Mood("Bob".into())));
        assert_eq!(r.parse_command("Happiest"), Some(Command::Extreme(Extreme::Happiest)));
        assert_eq!(r.parse_command("saddest"), Some(Command::Extreme(Extreme::Saddest)));
        assert_eq!(
            r.parse_command("voteythumbs: pizza friday"),
            Some(Command::Voteythumbs("pizza friday".into()))
        );
        assert_eq!(
            r.parse_command("stats subscribe rooms"),
            Some(Command::Stats("subscribe rooms".into()))
        );
        assert_eq!(r.parse_command("stats"), Some(Command::Stats(String::new())));
        assert_eq!(r.parse_command("dog"), Some(Command::Dog));
        assert_eq!(r.parse_command("doghouse"), None);
        assert_eq!(r.parse_command("statsy"), None);
    }

    #[tokio::test]
    async fn test_emoticons_drive_mood_replies() {
        let h = Harness::new(1);
        h.say("Bob", "great news :)").await;
        h.say("amy", "meh :( :<").await;
        h.say("cat", "mixed :) :(").await;
        h.say("amy", "!mood BOB").await;
        h.say("amy", "!mood amy").await;
        h.say("amy", "!mood cat").await;
        h.say("amy", "!mood dan").await;
        h.say("amy", "!happiest").await;
        h.say("amy", "!saddest").await;

        assert_eq!(
            h.chat.room_messages(ROOM).await,
            vec![
                messages::mood_happy("bob"),
                messages::mood_sad("amy"),
                messages::mood_neutral("cat"),
                messages::mood_emotionless("dan"),
                messages::happiest("bob"),
                messages::saddest("amy"),
            ]
        );
    }

    #[tokio::test]
    async fn test_extreme_with_no_moods() {
        let h = Harness::new(1);
        h.say("amy", "!happiest").await;
        assert_eq!(h.chat.room_messages(ROOM).await, vec![messages::NO_MOODS]);
    }

    #[tokio::test]
    async fn test_unavailable_brain_is_reported_for_queries() {
        let h = Harness::with_store(1, Arc::new(FailingBrain));
        h.say("amy", "hello :)").await;
        h.say("amy", "!mood amy").await;
        assert_eq!(
            h.chat.room_messages(ROOM).await,
            vec![messages::BRAIN_NOT_LOADED]
        );
    }

    #[tokio::test]
    async fn test_vote_flow_through_router() {
        let h = Harness::new(4);
        let msg = h.say("amy", "!voteythumbs pizza").await;

        let react = |who: &str| ReactionEvent {
            kind: ReactionKind::Added,
            polarity: Polarity::Up,
            target: ReactionTarget {
                room_id: ROOM.into(),
                message_id: msg.message_id.clone(),
                author_id: Some(msg.sender_id.clone()),
            },
            reactor_id: format!("@{who}:example.org"),
            reaction_id: Some(format!("$react-{who}")),
        };

        assert_eq!(h.router.react(&react("a")).await, None);
        assert_eq!(h.router.react(&react("b")).await, None);
        assert_eq!(h.router.retract("$react-b", "@b:example.org").await, None);
        assert_eq!(h.router.react(&react("c")).await, None);
        assert_eq!(h.router.react(&react("d")).await, Some(Outcome::Passed));
        assert_eq!(h.router.react(&react("e")).await, None);

        let announcements: Vec<String> = h
            .chat
            .room_messages(ROOM)
            .await
            .into_iter()
            .filter(|m| m.contains("Voteythumbs"))
            .collect();
        assert_eq!(announcements, vec![messages::vote_passed("pizza")]);
    }

    #[tokio::test]
    async fn test_room_mention_opens_vote_once() {
        let h = Harness::new(2);
        let msg = h.say("amy", "@room voteythumbs lunch?").await;
        let addressed = h.say("amy", "!voteythumbs: @room voteythumbs twice").await;

        let book: VoteBook = h.brain.load(VOTES_KEY).await.unwrap();
        assert_eq!(book.votes.len(), 2);
        let texts: Vec<&str> = book.votes.values().map(|v| v.text.as_str()).collect();
        assert!(texts.contains(&"lunch?"));
        assert!(texts.contains(&"@room voteythumbs twice"));
        assert!(book.votes.values().any(|v| v.id.message_id == msg.message_id));
        assert!(book.votes.values().any(|v| v.id.message_id == addressed.message_id));
    }

    #[tokio::test]
    async fn test_stats_replies_go_to_direct_messages() {
        let h = Harness::new(1);
        h.say("amy", "hi").await;
        h.say("amy", "!dog").await;
        h.say("amy", "!stats subscribe rooms").await;
        h.say("amy", "!stats subscribe rooms").await;
        h.say("amy", "!stats subscribe").await;
        h.say("amy", "!stats !dog").await;

        let dms = h.chat.direct_messages("@amy:example.org").await;
        assert_eq!(dms.len(), 4);
        assert!(dms[0].starts_with("Subscribed to `rooms`"));
        assert!(dms[1].starts_with("Already subscribed to `rooms`"));
        assert_eq!(dms[2], messages::subscribe_usage("subscribe"));
        assert_eq!(dms[3], messages::single_stat("!dog", 1));

        let room = h.chat.room_messages(ROOM).await;
        assert_eq!(room, vec![messages::DOG]);
    }

    #[tokio::test]
    async fn test_direct_messages_are_not_counted() {
        let h = Harness::new(1);
        let msg = h.message(DM, "amy", "stats rooms");
        h.router.route(&msg).await.unwrap();

        let dms = h.chat.direct_messages("@amy:example.org").await;
        assert_eq!(dms, vec!["_0 total message(s) in 0 room(s) since Monday_\n\n"]);
    }
}
