use serde::{Deserialize, Serialize};

use crate::role::Role;

/// Stable identifier for a seat at the table. Indexes `0..N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub usize);

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "agent-{}", self.0)
    }
}

/// One seated participant: its role assignment and whether it's the
/// trainable policy this rollout exists to exercise. Exactly one `Agent`
/// per game has `is_policy == true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub role: Role,
    pub is_policy: bool,
}

impl Agent {
    pub fn new(id: AgentId, role: Role, is_policy: bool) -> Self {
        Self { id, role, is_policy }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_stable() {
        assert_eq!(AgentId(3).to_string(), "agent-3");
    }
}
