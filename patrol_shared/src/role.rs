//! Player roles.

use serde::{Deserialize, Serialize};

/// Which side of the chase a player is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerRole {
    Cop,
    Thief,
}

impl PlayerRole {
    pub fn is_thief(self) -> bool {
        self == PlayerRole::Thief
    }

    pub fn opponent(self) -> Self {
        match self {
            PlayerRole::Cop => PlayerRole::Thief,
            PlayerRole::Thief => PlayerRole::Cop,
        }
    }

    /// Prefix of this role's sprite sheet keys, e.g. `cop_up`.
    pub fn sheet_prefix(self) -> &'static str {
        match self {
            PlayerRole::Cop => "cop",
            PlayerRole::Thief => "thief",
        }
    }
}
