pub mod channel;
pub mod discourse;
pub mod error;
pub mod phase;
pub mod policy_link;
pub mod round;
pub mod state;
pub mod task;

pub use channel::Channel;
pub use error::OrchestratorError;
pub use phase::Phase;
pub use policy_link::PolicyLink;
pub use round::Opponents;
pub use state::GameState;
pub use task::{run_to_end, SABOTAGE_TRACK_TARGET, SECURITY_TRACK_TARGET};
