use std::collections::HashMap;

use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};

use crate::agent::{Agent, AgentId};
use crate::deck::{Deck, PolicyCard};
use crate::event::EventLog;
use crate::history::AgentHistory;
use crate::message::GameConfig;
use crate::role::Role;

use super::phase::Phase;

/// All mutable state for one game in flight. Owned exclusively by the
/// orchestrator task driving that game; nothing outside ever touches it
/// directly.
pub struct GameState {
    pub game_id: u64,
    /// Seated agents indexed by `AgentId` (seat order, stable for the life
    /// of the game — not the shuffled captain rotation).
    pub seats: Vec<Agent>,
    /// The shuffled order captaincy rotates through, built independently
    /// of role assignment per §4.5.1 step 2.
    pub captain_rotation: Vec<AgentId>,
    pub deck: Deck,
    pub log: EventLog,
    pub histories: HashMap<AgentId, AgentHistory>,
    pub phase: Phase,
    pub captain: usize,
    pub failed_votes: u32,
    pub sabotage_played: u32,
    pub security_played: u32,
    pub promotion_threshold: u32,
    pub rounds_played: u32,
    /// Cards drawn for the current legislative session: dealt to the
    /// captain, narrowed by one discard, then handed to the first mate.
    pub pending_hand: Vec<PolicyCard>,
    pub first_mate: Option<AgentId>,
}

impl GameState {
    pub fn new(game_id: u64, config: &GameConfig) -> Self {
        let deck = match config.seed {
            Some(seed) => Deck::with_seed(config.total_sabotage, config.total_security, seed),
            None => Deck::new(config.total_sabotage, config.total_security),
        };

        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = rand::rngs::SmallRng::seed_from_u64(seed ^ 0xA11_DEED);

        let roles = assign_roles(config.policy_seat, config.impostor_oversample_prob, &mut rng);
        let seats: Vec<Agent> = roles
            .into_iter()
            .enumerate()
            .map(|(i, role)| Agent::new(AgentId(i), role, AgentId(i) == config.policy_seat))
            .collect();

        let mut captain_rotation: Vec<AgentId> = seats.iter().map(|a| a.id).collect();
        captain_rotation.shuffle(&mut rng);

        let mut log = EventLog::new();
        for agent in &seats {
            log.append_private(
                crate::event::Event::RoleAssigned { agent: agent.id, role: agent.role },
                &[agent.id],
            );
        }

        let histories = seats
            .iter()
            .map(|agent| (agent.id, AgentHistory::new(agent.id)))
            .collect();

        Self {
            game_id,
            seats,
            captain_rotation,
            deck,
            log,
            histories,
            phase: Phase::Setup,
            captain: 0,
            failed_votes: 0,
            sabotage_played: 0,
            security_played: 0,
            promotion_threshold: config.promotion_threshold,
            rounds_played: 0,
            pending_hand: Vec::new(),
            first_mate: None,
        }
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.seats.iter().find(|agent| agent.id == id)
    }

    pub fn captain_id(&self) -> AgentId {
        self.captain_rotation[self.captain]
    }

    pub fn advance_captain(&mut self) {
        self.captain = (self.captain + 1) % self.captain_rotation.len();
    }

    pub fn other_ids(&self, excluding: AgentId) -> Vec<AgentId> {
        self.seats.iter().map(|a| a.id).filter(|id| *id != excluding).collect()
    }

    pub fn master_impostor_is_first_mate(&self) -> bool {
        self.first_mate
            .and_then(|id| self.agent(id))
            .map(|agent| agent.role == Role::MasterImpostor)
            .unwrap_or(false)
    }
}

/// Deals the five roles to seats per §4.5.1: with probability
/// `oversample_prob`, the policy seat is forced onto the Impostor team
/// (uniformly between `Impostor` and `MasterImpostor`) and the remaining
/// four roles are shuffled among the other seats; otherwise all five roles
/// are shuffled uniformly, policy seat included. This is a variance-reduction
/// knob for RL sample efficiency, not a fairness mechanism — see
/// `DESIGN.md`.
fn assign_roles(policy_seat: AgentId, oversample_prob: f64, rng: &mut impl Rng) -> Vec<Role> {
    let oversampled = oversample_prob > 0.0 && rng.random_bool(oversample_prob);

    let mut roles = vec![Role::Crewmate; crate::N];

    if oversampled {
        let policy_role = *[Role::Impostor, Role::MasterImpostor].choose(rng).unwrap();
        let mut remaining: Vec<Role> = Role::DEAL.to_vec();
        let drawn_at = remaining.iter().position(|r| *r == policy_role).expect("DEAL contains every role");
        remaining.remove(drawn_at);
        remaining.shuffle(rng);

        roles[policy_seat.0] = policy_role;
        let mut leftover = remaining.into_iter();
        for (i, slot) in roles.iter_mut().enumerate() {
            if i != policy_seat.0 {
                *slot = leftover.next().expect("one leftover role per non-policy seat");
            }
        }
    } else {
        roles = Role::DEAL.to_vec();
        roles.shuffle(rng);
    }

    roles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversampling_always_seats_the_policy_on_the_impostor_team() {
        let mut rng = rand::rngs::SmallRng::seed_from_u64(1);
        for _ in 0..50 {
            let roles = assign_roles(AgentId(2), 1.0, &mut rng);
            assert_eq!(roles[2].team(), crate::role::Team::Impostor);
            let masters = roles.iter().filter(|r| **r == Role::MasterImpostor).count();
            let impostors = roles.iter().filter(|r| **r == Role::Impostor).count();
            assert_eq!(masters, 1);
            assert_eq!(impostors, 1);
        }
    }

    #[test]
    fn zero_probability_never_forces_the_policy_seat() {
        let mut rng = rand::rngs::SmallRng::seed_from_u64(2);
        let roles = assign_roles(AgentId(0), 0.0, &mut rng);
        assert_eq!(roles.len(), crate::N);
    }
}
