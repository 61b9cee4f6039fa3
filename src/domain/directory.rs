use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Traveler,
    Approver,
    Agent,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub company: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl Employee {
    pub fn can_approve(&self) -> bool {
        self.role == Role::Approver
    }

    pub fn is_agent(&self) -> bool {
        self.role == Role::Agent
    }
}

/// A hotel known to the catalog that confirmed bookings must reference.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Hotel {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub city_code: Option<String>,
}
