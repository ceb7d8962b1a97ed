use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Live user profile row, as matched by email lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Group owned by a user (`created_by` = user id)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub parent: Option<String>,
}

/// Company under a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub parent: String,
}

/// Location under a company. Leaf of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub parent: String,
}

/// The four soft-deletable tables, root first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Group,
    Company,
    Location,
}

impl EntityKind {
    /// Fully qualified table name
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::User => "saastack_user_v1.user_profile",
            EntityKind::Group => "saastack_group_v1.groups",
            EntityKind::Company => "saastack_company_v1.company",
            EntityKind::Location => "saastack_location_v1.location",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::Group => "group",
            EntityKind::Company => "company",
            EntityKind::Location => "location",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
