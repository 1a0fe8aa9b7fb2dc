//! Transient speech and thought bubbles
//!
//! A bubble is an ephemeral overlay tied to one actor. The board holds at
//! most one live bubble per actor; publishing replaces any existing one.
//! Removal is sequence-guarded: the timer that retires a bubble clears it
//! only if no newer bubble has replaced it in the meantime.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use super::Engine;
use super::actor::ActorId;
use super::instruction::Instruction;

/// Whether a bubble renders as speech or thought
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BubbleKind {
    /// Speech bubble
    Say,
    /// Thought bubble
    Think,
}

impl fmt::Display for BubbleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BubbleKind::Say => write!(f, "say"),
            BubbleKind::Think => write!(f, "think"),
        }
    }
}

/// A live bubble attached to one actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bubble {
    /// The actor this bubble floats above
    pub actor: ActorId,
    /// Displayed text
    pub text: String,
    /// Speech or thought
    pub kind: BubbleKind,
    /// When the bubble appeared
    pub created_at: DateTime<Utc>,
}

/// The set of currently live bubbles, one per actor at most
#[derive(Debug, Default)]
pub struct BubbleBoard {
    live: HashMap<ActorId, (Bubble, u64)>,
    next_seq: u64,
}

impl BubbleBoard {
    /// Create an empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a bubble for an actor, replacing any existing one
    ///
    /// Returns the sequence number to pass to [`BubbleBoard::clear_if`] when
    /// the bubble's duration elapses.
    pub fn publish(&mut self, actor: ActorId, text: String, kind: BubbleKind) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        let bubble = Bubble {
            actor,
            text,
            kind,
            created_at: Utc::now(),
        };
        self.live.insert(actor, (bubble, seq));
        seq
    }

    /// The live bubble for an actor, if any
    pub fn get(&self, actor: &ActorId) -> Option<&Bubble> {
        self.live.get(actor).map(|(bubble, _)| bubble)
    }

    /// Remove an actor's bubble unconditionally
    pub fn remove(&mut self, actor: &ActorId) {
        self.live.remove(actor);
    }

    /// Remove an actor's bubble only if it is still the one published as `seq`
    ///
    /// A stale timer firing after the bubble was replaced leaves the
    /// replacement alone.
    pub fn clear_if(&mut self, actor: &ActorId, seq: u64) -> bool {
        match self.live.get(actor) {
            Some((_, live_seq)) if *live_seq == seq => {
                self.live.remove(actor);
                true
            }
            _ => false,
        }
    }

    /// Drop every live bubble
    pub fn clear(&mut self) {
        self.live.clear();
    }
}

/// Extract the bubble payload of a Say or Think block
pub(crate) fn speech_payload(instruction: &Instruction) -> Option<(String, BubbleKind)> {
    match instruction {
        Instruction::Say { text, .. } => Some((text.clone(), BubbleKind::Say)),
        Instruction::Think { text, .. } => Some((text.clone(), BubbleKind::Think)),
        _ => None,
    }
}

impl Engine {
    /// Publish a bubble and schedule its sequence-guarded removal
    pub(crate) fn show_bubble(
        &self,
        actor: ActorId,
        text: String,
        kind: BubbleKind,
        duration: Duration,
    ) {
        if !self.inner.registry.read().contains(&actor) {
            tracing::debug!(%actor, "dropping bubble for vanished actor");
            return;
        }

        let seq = self.inner.bubbles.write().publish(actor, text, kind);
        let engine = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            engine.inner.bubbles.write().clear_if(&actor, seq);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_get() {
        let mut board = BubbleBoard::new();
        let actor = ActorId::new();

        board.publish(actor, "hi".to_string(), BubbleKind::Say);
        let bubble = board.get(&actor).unwrap();
        assert_eq!(bubble.text, "hi");
        assert_eq!(bubble.kind, BubbleKind::Say);
    }

    #[test]
    fn test_publish_replaces_rather_than_stacks() {
        let mut board = BubbleBoard::new();
        let actor = ActorId::new();

        board.publish(actor, "first".to_string(), BubbleKind::Say);
        board.publish(actor, "second".to_string(), BubbleKind::Think);

        let bubble = board.get(&actor).unwrap();
        assert_eq!(bubble.text, "second");
        assert_eq!(bubble.kind, BubbleKind::Think);
    }

    #[test]
    fn test_clear_if_matches_sequence() {
        let mut board = BubbleBoard::new();
        let actor = ActorId::new();

        let seq = board.publish(actor, "hi".to_string(), BubbleKind::Say);
        assert!(board.clear_if(&actor, seq));
        assert!(board.get(&actor).is_none());
    }

    #[test]
    fn test_stale_clear_leaves_replacement() {
        let mut board = BubbleBoard::new();
        let actor = ActorId::new();

        let old_seq = board.publish(actor, "old".to_string(), BubbleKind::Say);
        board.publish(actor, "new".to_string(), BubbleKind::Say);

        assert!(!board.clear_if(&actor, old_seq));
        assert_eq!(board.get(&actor).unwrap().text, "new");
    }

    #[test]
    fn test_speech_payload() {
        let say = Instruction::Say {
            text: "hello".to_string(),
            duration: "2".to_string(),
        };
        assert_eq!(
            speech_payload(&say),
            Some(("hello".to_string(), BubbleKind::Say))
        );

        let mv = Instruction::Move {
            steps: "10".to_string(),
        };
        assert_eq!(speech_payload(&mv), None);
    }
}
