/// Where a game currently sits in the round loop. Documentation/testing
/// clarity only — because the sequence of phases is itself dynamic (it
/// loops until the game-over predicate fires, unlike a linear street
/// progression), the orchestrator's driver is a `run_to_end` state machine
/// matching on this enum rather than a chain of typestate-consuming
/// methods. See `crates/rbp-gameroom/src/engine.rs`'s `Engine<Phase>` for
/// the pattern this deliberately does not adopt at the top level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Setup,
    Nomination,
    Discourse,
    Vote,
    Legislative,
    Terminal,
}
