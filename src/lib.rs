pub mod agent;
pub mod deck;
pub mod event;
pub mod history;
pub mod message;
pub mod opponent;
pub mod orchestrator;
pub mod parser;
pub mod registry;
pub mod role;
pub mod schema;

pub use agent::{Agent, AgentId};
pub use deck::{Deck, DeckError, PolicyCard};
pub use event::{Event, EventLog};
pub use message::{GameConfig, ModelInput, ModelOutput, TerminalState, ToolCallTarget};
pub use orchestrator::error::OrchestratorError;
pub use registry::{Registry, RegistryError};
pub use role::Role;

/// Number of seats in every game this core drives.
pub const N: usize = 5;

/// After this many sabotage resolutions, seating the MasterImpostor as
/// First Mate wins the game outright for the Impostor team.
pub const DEFAULT_PROMOTION_THRESHOLD: u32 = 3;

/// Three failed nominations in a row auto-resolve the top card of the deck.
pub const MAX_FAILED_VOTES: u32 = 3;

/// initialize structured logging. Mirrors the teacher's combined
/// term+file logger, minus the file sink: the core is a library, not a
/// process with a `logs/` directory of its own to manage.
#[cfg(feature = "native")]
pub fn init_logging() {
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    let _ = simplelog::CombinedLogger::init(vec![term]);
}
