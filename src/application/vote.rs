//! # Threshold Vote Tracker ("voteythumbs")
//!
//! Keeps an up/down tally per posted item under the `voteythumbs` brain key.
//! After every counted reaction the tally is compared against half the room's eligible
//! members; the first threshold crossing is announced and the vote is marked resolved
//! in the same transaction, so an outcome is announced exactly once.

use crate::application::brain::BrainHandle;
use crate::domain::error::BrainError;
use crate::domain::traits::{ChatProvider, Directory};
use crate::domain::types::{Member, Polarity, ReactionEvent, ReactionKind, ReactionTarget};
use crate::strings::{logs, messages};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::task::JoinHandle;

pub const VOTES_KEY: &str = "voteythumbs";

/// Composite identity of a vote: where it was posted and by whom.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoteId {
    pub room_id: String,
    pub message_id: String,
    pub author_id: String,
}

impl VoteId {
    pub fn new(room_id: &str, message_id: &str, author_id: &str) -> Self {
        Self {
            room_id: room_id.to_string(),
            message_id: message_id.to_string(),
            author_id: author_id.to_string(),
        }
    }

    pub fn key(&self) -> String {
        format!("{}|{}|{}", self.room_id, self.message_id, self.author_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: VoteId,
    pub text: String,
    #[serde(default)]
    pub ups: u32,
    #[serde(default)]
    pub downs: u32,
    #[serde(default)]
    pub resolved: bool,
    /// Reactors currently counted, at most once per direction.
    #[serde(default)]
    pub voters: BTreeSet<(String, Polarity)>,
}

impl Vote {
    fn counter(&mut self, polarity: Polarity) -> &mut u32 {
        match polarity {
            Polarity::Up => &mut self.ups,
            Polarity::Down => &mut self.downs,
        }
    }

    /// Counts `reactor` in one direction. False when they were already counted.
    fn add_voter(&mut self, reactor: &str, polarity: Polarity) -> bool {
        if !self.voters.insert((reactor.to_string(), polarity)) {
            return false;
        }
        let counter = self.counter(polarity);
        *counter = counter.saturating_add(1);
        true
    }

    /// Uncounts `reactor` in one direction. False when they were not counted.
    fn remove_voter(&mut self, reactor: &str, polarity: Polarity) -> bool {
        if !self.voters.remove(&(reactor.to_string(), polarity)) {
            return false;
        }
        let counter = self.counter(polarity);
        *counter = counter.saturating_sub(1);
        true
    }
}

/// A reaction seen on a vote, indexed by its transport id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountedReaction {
    pub vote: String,
    pub polarity: Polarity,
    #[serde(default)]
    pub reactor: String,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct VoteBook {
    #[serde(default)]
    pub votes: BTreeMap<String, Vote>,
    #[serde(default)]
    pub reactions: BTreeMap<String, CountedReaction>,
}

impl VoteBook {
    /// Key of the vote a reaction target points at.
    pub fn find_key(&self, target: &ReactionTarget) -> Option<String> {
        if let Some(author) = &target.author_id {
            let key = VoteId::new(&target.room_id, &target.message_id, author).key();
            return self.votes.contains_key(&key).then_some(key);
        }
        self.votes
            .iter()
            .find(|(_, v)| v.id.room_id == target.room_id && v.id.message_id == target.message_id)
            .map(|(k, _)| k.clone())
    }

    fn is_open(&self, key: &str) -> bool {
        self.votes.get(key).is_some_and(|v| !v.resolved)
    }

    /// Whether `reactor` has another indexed reaction in this direction on the vote.
    fn still_reacting(&self, key: &str, reactor: &str, polarity: Polarity) -> bool {
        self.reactions
            .values()
            .any(|r| r.vote == key && r.reactor == reactor && r.polarity == polarity)
    }

    /// Applies a reaction to the vote at `key`. False when the tally did not change.
    pub fn record(&mut self, key: &str, event: &ReactionEvent) -> bool {
        if !self.is_open(key) {
            return false;
        }
        let reactor = event.reactor_id.as_str();
        if let Some(reaction_id) = &event.reaction_id {
            match event.kind {
                ReactionKind::Added => {
                    if self.reactions.contains_key(reaction_id) {
                        return false;
                    }
                    self.reactions.insert(
                        reaction_id.clone(),
                        CountedReaction {
                            vote: key.to_string(),
                            polarity: event.polarity,
                            reactor: reactor.to_string(),
                        },
                    );
                }
                ReactionKind::Removed => {
                    self.reactions.remove(reaction_id);
                }
            }
        }

        match event.kind {
            ReactionKind::Added => self
                .votes
                .get_mut(key)
                .is_some_and(|v| v.add_voter(reactor, event.polarity)),
            ReactionKind::Removed => {
                if self.still_reacting(key, reactor, event.polarity) {
                    return false;
                }
                self.votes
                    .get_mut(key)
                    .is_some_and(|v| v.remove_voter(reactor, event.polarity))
            }
        }
    }

    /// Forgets an indexed reaction. Returns the vote key when its tally changed.
    pub fn retract(&mut self, reaction_id: &str) -> Option<String> {
        let counted = self.reactions.remove(reaction_id)?;
        if !self.is_open(&counted.vote)
            || self.still_reacting(&counted.vote, &counted.reactor, counted.polarity)
        {
            return None;
        }
        let vote = self.votes.get_mut(&counted.vote)?;
        vote.remove_voter(&counted.reactor, counted.polarity)
            .then_some(counted.vote)
    }

    /// Drops resolved votes and the reactions that pointed at them.
    pub fn prune_resolved(&mut self) -> usize {
        let before = self.votes.len();
        self.votes.retain(|_, v| !v.resolved);
        let votes = &self.votes;
        self.reactions.retain(|_, r| votes.contains_key(&r.vote));
        before - self.votes.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed,
}

/// Members that may vote. A room without enumerable membership counts as one member.
pub fn eligible_count(members: Option<&[Member]>) -> usize {
    match members {
        Some(list) => list.iter().filter(|m| m.is_eligible()).count(),
        None => 1,
    }
}

/// Pass when more than half the eligible members voted up, fail when more than half voted down.
pub fn decide(ups: u32, downs: u32, eligible: usize) -> Option<Outcome> {
    let eligible = eligible as u64;
    if 2 * u64::from(ups) > eligible {
        Some(Outcome::Passed)
    } else if 2 * u64::from(downs) > eligible {
        Some(Outcome::Failed)
    } else {
        None
    }
}

pub struct Registered {
    pub id: VoteId,
    /// Completes once both reaction markers have been requested.
    pub markers: JoinHandle<()>,
}

pub struct VoteTracker {
    brain: Arc<BrainHandle>,
    chat: Arc<dyn ChatProvider>,
    directory: Arc<dyn Directory>,
}

impl VoteTracker {
    pub fn new(
        brain: Arc<BrainHandle>,
        chat: Arc<dyn ChatProvider>,
        directory: Arc<dyn Directory>,
    ) -> Self {
        Self {
            brain,
            chat,
            directory,
        }
    }

    /// Opens a vote on a message and starts attaching the 👍/👎 markers to it.
    pub async fn register_vote(
        &self,
        room_id: &str,
        message_id: &str,
        author_id: &str,
        text: &str,
    ) -> Result<Registered, BrainError> {
        let id = VoteId::new(room_id, message_id, author_id);
        let vote = Vote {
            id: id.clone(),
            text: text.to_string(),
            ups: 0,
            downs: 0,
            resolved: false,
            voters: BTreeSet::new(),
        };
        self.brain
            .transact(VOTES_KEY, |book: &mut VoteBook| {
                book.votes.insert(id.key(), vote);
            })
            .await?;
        tracing::info!("{}", logs::vote_registered(&id.key(), text));

        let chat = self.chat.clone();
        let (room, message) = (id.room_id.clone(), id.message_id.clone());
        let markers = tokio::spawn(async move { place_markers(chat.as_ref(), &room, &message).await });
        Ok(Registered { id, markers })
    }

    /// Counts a reaction and re-evaluates the vote it belongs to.
    pub async fn apply_reaction(&self, event: &ReactionEvent) -> Result<Option<Outcome>, BrainError> {
        if self.directory.is_bot(&event.reactor_id).await {
            return Ok(None);
        }

        let key = self
            .brain
            .transact(VOTES_KEY, |book: &mut VoteBook| {
                let key = book.find_key(&event.target)?;
                book.record(&key, event).then_some(key)
            })
            .await?;

        match key {
            Some(key) => self.evaluate(&key).await,
            None => Ok(None),
        }
    }

    /// Undoes a previously counted reaction identified only by its transport id.
    pub async fn retract_reaction(
        &self,
        reaction_id: &str,
        reactor_id: &str,
    ) -> Result<Option<Outcome>, BrainError> {
        if self.directory.is_bot(reactor_id).await {
            return Ok(None);
        }

        let key = self
            .brain
            .transact(VOTES_KEY, |book: &mut VoteBook| book.retract(reaction_id))
            .await?;

        match key {
            Some(key) => self.evaluate(&key).await,
            None => Ok(None),
        }
    }

    /// Compares a vote against its room's quorum and announces the first crossing.
    pub async fn evaluate(&self, key: &str) -> Result<Option<Outcome>, BrainError> {
        let book: VoteBook = self.brain.load(VOTES_KEY).await?;
        let room_id = match book.votes.get(key) {
            Some(vote) if !vote.resolved => vote.id.room_id.clone(),
            _ => return Ok(None),
        };

        let members = match self.directory.members(&room_id).await {
            Ok(members) => members,
            Err(e) => {
                tracing::warn!("{}", logs::membership_lookup_failed(&room_id, &e));
                return Ok(None);
            }
        };
        let eligible = eligible_count(members.as_deref());

        let decided = self
            .brain
            .transact(VOTES_KEY, |book: &mut VoteBook| {
                let vote = book.votes.get_mut(key)?;
                if vote.resolved {
                    return None;
                }
                let outcome = decide(vote.ups, vote.downs, eligible)?;
                vote.resolved = true;
                Some((outcome, vote.text.clone()))
            })
            .await?;

        let Some((outcome, text)) = decided else {
            return Ok(None);
        };

        let announcement = match outcome {
            Outcome::Passed => messages::vote_passed(&text),
            Outcome::Failed => messages::vote_failed(&text),
        };
        tracing::info!("{}", logs::vote_resolved(key, outcome == Outcome::Passed));
        if let Err(e) = self.chat.send_to_room(&room_id, &announcement).await {
            tracing::error!("{}", logs::send_failed(&room_id, &e));
        }
        Ok(Some(outcome))
    }

    /// Forgets resolved votes. Returns how many were dropped.
    pub async fn prune_resolved(&self) -> Result<usize, BrainError> {
        self.brain
            .transact(VOTES_KEY, |book: &mut VoteBook| book.prune_resolved())
            .await
    }
}

/// Attaches the 👍 marker and then the 👎 marker. The second request is only issued
/// once the first has completed, whether or not it succeeded.
pub async fn place_markers(chat: &dyn ChatProvider, room_id: &str, message_id: &str) {
    for polarity in [Polarity::Up, Polarity::Down] {
        if let Err(e) = chat.add_reaction(room_id, message_id, polarity.marker()).await {
            tracing::warn!("{}", logs::reaction_failed(room_id, &e));
        }
    }
}
