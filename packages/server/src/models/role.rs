use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Citizen, // 市民
    Mafia,   // マフィア
}

impl Role {
    pub fn is_covert(&self) -> bool {
        matches!(self, Role::Mafia)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Citizen => write!(f, "citizen"),
            Role::Mafia => write!(f, "mafia"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "citizen" => Ok(Role::Citizen),
            "mafia" => Ok(Role::Mafia),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}
