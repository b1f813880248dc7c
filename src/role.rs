use serde::{Deserialize, Serialize};

/// A hidden team assignment. Exactly one `MasterImpostor`, one `Impostor`,
/// and three `Crewmate`s are dealt out per five-player game. Assigned once
/// at setup and immutable for the life of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Crewmate,
    Impostor,
    MasterImpostor,
}

impl Role {
    /// The five roles dealt out in a standard game, in no particular order.
    pub const DEAL: [Role; crate::N] = [
        Role::MasterImpostor,
        Role::Impostor,
        Role::Crewmate,
        Role::Crewmate,
        Role::Crewmate,
    ];

    pub fn team(&self) -> Team {
        match self {
            Role::Crewmate => Team::Crewmate,
            Role::Impostor | Role::MasterImpostor => Team::Impostor,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Crewmate => write!(f, "crewmate"),
            Role::Impostor => write!(f, "impostor"),
            Role::MasterImpostor => write!(f, "master-impostor"),
        }
    }
}

/// The two win conditions. A `Role` belongs to exactly one `Team`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Crewmate,
    Impostor,
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Team::Crewmate => write!(f, "crewmate"),
            Team::Impostor => write!(f, "impostor"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deal_has_exactly_one_of_each_impostor_role() {
        let masters = Role::DEAL.iter().filter(|r| **r == Role::MasterImpostor).count();
        let impostors = Role::DEAL.iter().filter(|r| **r == Role::Impostor).count();
        let crewmates = Role::DEAL.iter().filter(|r| **r == Role::Crewmate).count();
        assert_eq!(masters, 1);
        assert_eq!(impostors, 1);
        assert_eq!(crewmates, 3);
    }

    #[test]
    fn team_mapping() {
        assert_eq!(Role::Crewmate.team(), Team::Crewmate);
        assert_eq!(Role::Impostor.team(), Team::Impostor);
        assert_eq!(Role::MasterImpostor.team(), Team::Impostor);
    }
}
