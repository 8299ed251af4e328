//! Read-only view of the shopper's authentication state.
//!
//! The session is owned by the auth provider; this crate only consults it to decide
//! whether member-specific UI applies.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    member: Option<Member>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { member: None }
    }

    pub fn signed_in(member: Member) -> Self {
        Self { member: Some(member) }
    }

    pub fn is_member(&self) -> bool {
        self.member.is_some()
    }

    /// Name to greet the shopper with; `None` for guests.
    pub fn display_name(&self) -> Option<&str> {
        self.member.as_ref().map(|m| m.name.as_str())
    }
}
