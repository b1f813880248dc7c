use serde::{Deserialize, Serialize};

use crate::agent::AgentId;
use crate::role::Role;
use crate::PolicyCard;

/// Something that happened during a game. Some events are visible to every
/// agent (`is_public`); others are only ever handed to the agents named in
/// their payload (e.g. a role reveal). The log never redacts an event after
/// the fact — visibility is decided once, at append time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    RoleAssigned { agent: AgentId, role: Role },
    Nominated { captain: AgentId, nominee: AgentId },
    VoteCast { voter: AgentId, yes: bool },
    ElectionResult { captain: AgentId, first_mate: AgentId, passed: bool },
    FailedElectionStreak { count: u32 },
    TopCardAutoResolved { card: PolicyCard },
    CardsDealtToCaptain { captain: AgentId, count: usize },
    CardDiscardedByCaptain { captain: AgentId },
    /// Private to the captain: exactly which three cards were drawn and
    /// which one the captain chose to discard. The public log only ever
    /// records that *a* card was discarded (`CardDiscardedByCaptain`), never
    /// which one — only the captain is entitled to know the card identities
    /// in their own hand.
    CaptainCardDraw { captain: AgentId, drawn: [PolicyCard; 3], discarded: PolicyCard },
    /// Private to the first mate: the two cards handed down by the captain
    /// and which one went to discard after the first mate played the other.
    FirstMateCardReceive { first_mate: AgentId, received: [PolicyCard; 2], discarded: PolicyCard },
    CardPlayedByFirstMate { first_mate: AgentId, card: PolicyCard },
    DiscourseRemark { speaker: AgentId, addressed_to: Option<AgentId> },
    /// The public record of a directed question's answer — every agent is
    /// entitled to overhear it, not just the asker and the one who spoke.
    DirectedAnswer { asker: AgentId, responder: AgentId, response: String },
    GameOver { winning_team: crate::role::Team },
}

impl Event {
    /// Whether every agent at the table may see this event. Role
    /// assignments are the sole private case today.
    pub fn is_public(&self) -> bool {
        !matches!(
            self,
            Event::RoleAssigned { .. }
                | Event::CaptainCardDraw { .. }
                | Event::FirstMateCardReceive { .. }
        )
    }
}

/// Append-only record of everything that has happened in a game, with a
/// monotonically increasing sequence number per entry. `snapshot_for`
/// returns the events a given agent is entitled to see, in order.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    entries: Vec<(u64, Event)>,
    next_seq: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a public event, visible to every agent's snapshot.
    pub fn append_public(&mut self, event: Event) -> u64 {
        assert!(event.is_public(), "append_public called with a private event: {event:?}");
        self.push(event)
    }

    /// Appends a private event, visible only to agents it names.
    /// `owners` lists the agents entitled to see it.
    pub fn append_private(&mut self, event: Event, owners: &[AgentId]) -> u64 {
        assert!(!owners.is_empty(), "private event appended with no owners: {event:?}");
        self.push(event)
    }

    fn push(&mut self, event: Event) -> u64 {
        let seq = self.next_seq;
        self.entries.push((seq, event));
        self.next_seq = self
            .next_seq
            .checked_add(1)
            .expect("event sequence counter overflowed");
        seq
    }

    /// Every public event, plus private events naming `agent`, in append
    /// order.
    pub fn snapshot_for(&self, agent: AgentId) -> Vec<&Event> {
        self.entries
            .iter()
            .map(|(_, event)| event)
            .filter(|event| event.is_public() || Self::names(event, agent))
            .collect()
    }

    fn names(event: &Event, agent: AgentId) -> bool {
        match event {
            Event::RoleAssigned { agent: owner, .. } => *owner == agent,
            Event::CaptainCardDraw { captain, .. } => *captain == agent,
            Event::FirstMateCardReceive { first_mate, .. } => *first_mate == agent,
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
