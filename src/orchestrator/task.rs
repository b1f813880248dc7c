use crate::agent::AgentId;
use crate::deck::PolicyCard;
use crate::event::Event;
use crate::message::{GameConfig, TerminalState};
use crate::role::Team;
use crate::schema::Tool;

use super::discourse::run_discourse;
use super::error::OrchestratorError;
use super::phase::Phase;
use super::policy_link::PolicyLink;
use super::round::{ask_tool_call, ask_tool_calls_concurrently, Opponents};
use super::state::GameState;

/// How many sabotage (resp. security) cards enacted wins the game outright
/// for that card's team, independent of promotion. Sized the way Secret
/// Hitler's own liberal/fascist tracks are for a five-player table.
pub const SABOTAGE_TRACK_TARGET: u32 = 6;
pub const SECURITY_TRACK_TARGET: u32 = 5;

/// Drives one game from setup to terminal state. Spawned as its own task
/// by the registry; `policy_link` is this game's half of the suspension
/// protocol with whoever is driving the trainable policy seat. Never
/// returns an error: `ProtocolError`, `AgentNotFound`, and
/// `OpponentUnavailable` are caught here and converted into a terminal
/// state with `reward = -1.0`, per §7's propagation policy — the external
/// caller sees every such failure as an ordinary terminal, never an
/// exception. A deck invariant violation (draw exceeding what `draw` +
/// `discard` can supply) is not one of those three kinds; it indicates a
/// bug in this module and is left to panic, matching §4.5.6's "should be
/// unreachable" framing.
///
/// Mirrors `original_source/src/engine/engine.py::run`'s loop structure
/// exactly: nominate, discourse, vote, on-failure auto-resolve, on-success
/// legislative session, discourse, advance captain, repeat until a win
/// condition fires.
pub async fn run_to_end(
    game_id: u64,
    config: GameConfig,
    mut policy_link: PolicyLink,
    mut opponents: Opponents,
) -> TerminalState {
    let mut state = GameState::new(game_id, &config);
    state.phase = Phase::Nomination;

    match drive(&mut state, &mut policy_link, &mut opponents).await {
        Ok(terminal) => terminal,
        Err(err) => error_terminal(&state, err),
    }
}

async fn drive(
    state: &mut GameState,
    policy_link: &mut PolicyLink,
    opponents: &mut Opponents,
) -> Result<TerminalState, OrchestratorError> {
    loop {
        state.rounds_played += 1;

        let nominee = run_nomination(state, policy_link, opponents).await?;

        state.phase = Phase::Discourse;
        run_discourse(state, policy_link, opponents).await?;

        state.phase = Phase::Vote;
        let passed = run_vote(state, policy_link, opponents, nominee).await?;

        state.log.append_public(Event::ElectionResult {
            captain: state.captain_id(),
            first_mate: nominee,
            passed,
        });

        if !passed {
            state.failed_votes += 1;
            state.log.append_public(Event::FailedElectionStreak { count: state.failed_votes });
            if state.failed_votes >= crate::MAX_FAILED_VOTES {
                auto_resolve_top_card(state);
                state.failed_votes = 0;
            }
            state.advance_captain();
            if let Some(terminal) = check_game_over(state) {
                return Ok(terminal);
            }
            continue;
        }

        state.failed_votes = 0;
        state.first_mate = Some(nominee);

        state.phase = Phase::Legislative;
        run_legislative_session(state, policy_link, opponents).await?;

        if state.sabotage_played >= state.promotion_threshold && state.master_impostor_is_first_mate() {
            state.log.append_public(Event::GameOver { winning_team: Team::Impostor });
            return Ok(win_terminal(state, Team::Impostor, true));
        }

        if let Some(terminal) = check_game_over(state) {
            return Ok(terminal);
        }

        state.advance_captain();
        state.phase = Phase::Nomination;
    }
}

async fn run_nomination(
    state: &mut GameState,
    policy_link: &mut PolicyLink,
    opponents: &mut Opponents,
) -> Result<AgentId, OrchestratorError> {
    let captain = state.captain_id();
    let eligible = state.other_ids(captain);
    let call = ask_tool_call(
        state,
        policy_link,
        opponents,
        captain,
        Tool::PresidentPickChancellor,
        &eligible,
        "As captain this round, nominate a first mate.".into(),
    )
    .await?;

    let nominee_raw = call
        .arguments
        .get("agent_id")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| OrchestratorError::Protocol("nomination missing agent_id".into()))?;
    let nominee = AgentId(nominee_raw as usize);

    if !eligible.contains(&nominee) {
        return Err(OrchestratorError::Protocol(format!(
            "captain nominated ineligible agent {nominee}"
        )));
    }

    state.log.append_public(Event::Nominated { captain, nominee });
    Ok(nominee)
}

async fn run_vote(
    state: &mut GameState,
    policy_link: &mut PolicyLink,
    opponents: &mut Opponents,
    nominee: AgentId,
) -> Result<bool, OrchestratorError> {
    let voters: Vec<AgentId> = state.seats.iter().map(|a| a.id).collect();

    let calls = ask_tool_calls_concurrently(
        state,
        policy_link,
        opponents,
        &voters,
        Tool::VoteChancellorYesNo,
        |_| Vec::new(),
        |_| format!("Vote on seating agent {nominee} as first mate."),
    )
    .await?;

    let mut yes_votes = 0usize;
    for (voter, call) in calls {
        let yes = call.arguments.get("vote").and_then(|v| v.as_bool()).unwrap_or(false);
        state.log.append_public(Event::VoteCast { voter, yes });
        if yes {
            yes_votes += 1;
        }
    }

    Ok(yes_votes > voters.len() / 2)
}

async fn run_legislative_session(
    state: &mut GameState,
    policy_link: &mut PolicyLink,
    opponents: &mut Opponents,
) -> Result<(), OrchestratorError> {
    let captain = state.captain_id();
    let first_mate = state.first_mate.expect("first mate set once election passes");

    let dealt = state
        .deck
        .draw(3)
        .expect("deck conservation (P3) guarantees 3 cards are always drawable here");
    state.log.append_public(Event::CardsDealtToCaptain { captain, count: dealt.len() });
    let drawn: [PolicyCard; 3] = dealt.try_into().expect("drew exactly 3 cards");
    state.pending_hand = drawn.to_vec();

    let discard_call = ask_tool_call(
        state,
        policy_link,
        opponents,
        captain,
        Tool::PresidentChooseCardToDiscard,
        &[],
        format!(
            "Your hand is {}. Choose one card to discard (index into that list); the other two pass to the first mate.",
            describe_hand(&state.pending_hand)
        ),
    )
    .await?;
    let discard_index = discard_call
        .arguments
        .get("card_index")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| OrchestratorError::Protocol("discard missing card_index".into()))?
        as usize;
    if discard_index >= state.pending_hand.len() {
        return Err(OrchestratorError::Protocol("discard index out of range".into()));
    }
    let discarded = state.pending_hand.remove(discard_index);
    state.deck.add_to_discard(discarded);
    state.log.append_public(Event::CardDiscardedByCaptain { captain });
    state.log.append_private(
        Event::CaptainCardDraw { captain, drawn, discarded },
        &[captain],
    );

    let play_call = ask_tool_call(
        state,
        policy_link,
        opponents,
        first_mate,
        Tool::ChancellorPlayPolicy,
        &[],
        format!(
            "The captain passed you {}. Choose one card to enact (index into that list); the other goes to discard.",
            describe_hand(&state.pending_hand)
        ),
    )
    .await?;
    let play_index = play_call
        .arguments
        .get("card_index")
        .and_then(|v| v.as_u64())
        .ok_or_else(|| OrchestratorError::Protocol("play missing card_index".into()))?
        as usize;
    if play_index >= state.pending_hand.len() {
        return Err(OrchestratorError::Protocol("play index out of range".into()));
    }
    let received: [PolicyCard; 2] =
        state.pending_hand.clone().try_into().expect("first mate receives exactly 2 cards");
    let played = state.pending_hand.remove(play_index);
    for remaining in state.pending_hand.drain(..) {
        state.deck.add_to_discard(remaining);
    }
    let unplayed = received.into_iter().find(|card| *card != played).unwrap_or(played);
    state.log.append_private(
        Event::FirstMateCardReceive { first_mate, received, discarded: unplayed },
        &[first_mate],
    );

    match played {
        PolicyCard::Sabotage => state.sabotage_played += 1,
        PolicyCard::Security => state.security_played += 1,
    }
    state.log.append_public(Event::CardPlayedByFirstMate { first_mate, card: played });

    Ok(())
}

/// Renders a hand of cards as a human-readable, index-addressable list for
/// the prompt text handed to whichever agent must choose by index, e.g.
/// `"[0: Security, 1: Sabotage, 2: Sabotage]"`.
fn describe_hand(hand: &[PolicyCard]) -> String {
    let entries: Vec<String> =
        hand.iter().enumerate().map(|(i, card)| format!("{i}: {card:?}")).collect();
    format!("[{}]", entries.join(", "))
}

fn auto_resolve_top_card(state: &mut GameState) {
    let drawn = state
        .deck
        .draw(1)
        .expect("deck conservation (P3) guarantees a card is always drawable here");
    let card = drawn[0];
    match card {
        PolicyCard::Sabotage => state.sabotage_played += 1,
        PolicyCard::Security => state.security_played += 1,
    }
    state.log.append_public(Event::TopCardAutoResolved { card });
}

fn check_game_over(state: &GameState) -> Option<TerminalState> {
    if state.sabotage_played >= SABOTAGE_TRACK_TARGET {
        Some(win_terminal(state, Team::Impostor, false))
    } else if state.security_played >= SECURITY_TRACK_TARGET {
        Some(win_terminal(state, Team::Crewmate, false))
    } else {
        None
    }
}

/// Builds the terminal state for a clean win: `winners` is every seated
/// agent on `winning_team` (per `_get_winners()` in the original engine,
/// not just the trainable policy — see `DESIGN.md`), and `reward` is `1.0`
/// when the policy seat is among them, `0.0` otherwise.
fn win_terminal(state: &GameState, winning_team: Team, promotion_occurred: bool) -> TerminalState {
    let winners: Vec<AgentId> =
        state.seats.iter().filter(|a| a.role.team() == winning_team).map(|a| a.id).collect();
    let reward = if state.seats.iter().any(|a| a.is_policy && winners.contains(&a.id)) {
        1.0
    } else {
        0.0
    };

    TerminalState {
        game_id: state.game_id,
        winners,
        winning_team: Some(winning_team),
        reward,
        sabotage_cards_played: state.sabotage_played,
        security_cards_played: state.security_played,
        promotion_occurred,
        rounds_played: state.rounds_played,
        metadata: serde_json::json!({}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::GameConfig;
    use crate::opponent::{OpponentAdapter, RandomOpponent};

    fn opponents_for(state: &GameState) -> Opponents {
        state
            .seats
            .iter()
            .filter(|a| !a.is_policy)
            .map(|a| (a.id, Box::new(RandomOpponent) as Box<dyn OpponentAdapter>))
            .collect()
    }

    fn unused_policy_link() -> PolicyLink {
        let (tx, _rx_req_unused) = tokio::sync::mpsc::unbounded_channel();
        let (_tx_reply_unused, rx) = tokio::sync::mpsc::unbounded_channel();
        PolicyLink { requests: tx, replies: rx }
    }

    /// A legislative session's card identities are private: the captain
    /// learns its three-card draw and discard, the first mate learns its
    /// two-card hand and the unplayed card, and nobody else's snapshot
    /// carries either event (P2).
    #[tokio::test]
    async fn legislative_session_emits_private_card_events_scoped_to_captain_and_first_mate() {
        let config = GameConfig { seed: Some(11), ..GameConfig::default() };
        let mut state = GameState::new(0, &config);
        let mut opponents = opponents_for(&state);

        let captain = state.seats.iter().find(|a| !a.is_policy).unwrap().id;
        let first_mate =
            state.seats.iter().find(|a| !a.is_policy && a.id != captain).unwrap().id;
        state.captain_rotation = vec![captain];
        state.captain = 0;
        state.first_mate = Some(first_mate);

        let mut link = unused_policy_link();
        run_legislative_session(&mut state, &mut link, &mut opponents).await.unwrap();

        let captain_view = state.log.snapshot_for(captain);
        let first_mate_view = state.log.snapshot_for(first_mate);
        let bystander = state
            .seats
            .iter()
            .map(|a| a.id)
            .find(|id| *id != captain && *id != first_mate)
            .unwrap();
        let bystander_view = state.log.snapshot_for(bystander);

        assert!(captain_view.iter().any(|e| matches!(e, Event::CaptainCardDraw { .. })));
        assert!(first_mate_view.iter().any(|e| matches!(e, Event::FirstMateCardReceive { .. })));
        assert!(!bystander_view
            .iter()
            .any(|e| matches!(e, Event::CaptainCardDraw { .. } | Event::FirstMateCardReceive { .. })));
    }

    /// The triple-failed-vote auto-resolve path draws one card straight onto
    /// a track without ever dealing a hand, so it must never emit either
    /// private card event.
    #[test]
    fn auto_resolve_top_card_never_emits_private_card_events() {
        let config = GameConfig { seed: Some(12), ..GameConfig::default() };
        let mut state = GameState::new(0, &config);
        auto_resolve_top_card(&mut state);

        let any_seat = state.seats[0].id;
        assert!(!state
            .log
            .snapshot_for(any_seat)
            .iter()
            .any(|e| matches!(e, Event::CaptainCardDraw { .. } | Event::FirstMateCardReceive { .. })));
    }
}

/// Builds the terminal state for one of §7's three orchestrator-caught
/// error kinds: no winners, no winning team, `reward = -1.0`, and a
/// diagnostic error code under `metadata`.
fn error_terminal(state: &GameState, err: OrchestratorError) -> TerminalState {
    let error_code = match err {
        OrchestratorError::Protocol(_) => "protocol_error",
        OrchestratorError::AgentNotFound(_) => "agent_not_found",
        OrchestratorError::OpponentUnavailable(_) => "opponent_unavailable",
    };
    log::warn!("game-{} terminated on {}: {}", state.game_id, error_code, err);

    TerminalState {
        game_id: state.game_id,
        winners: Vec::new(),
        winning_team: None,
        reward: -1.0,
        sabotage_cards_played: state.sabotage_played,
        security_cards_played: state.security_played,
        promotion_occurred: false,
        rounds_played: state.rounds_played,
        metadata: serde_json::json!({ "error_code": error_code, "detail": err.to_string() }),
    }
}
