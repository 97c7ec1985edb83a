//! User registry record
//!
//! The engine checks user existence on every client request; the record
//! itself is plain contact data.

use crate::ids::UserId;
use serde::{Deserialize, Serialize};

/// A registered trading user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub name: String,
    pub phone: String,
    pub email: String,
}

impl User {
    /// Create a new user with a fresh id
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            user_id: UserId::new(),
            name: name.into(),
            phone: phone.into(),
            email: email.into(),
        }
    }

    /// All identity fields must be non-empty
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.phone.trim().is_empty()
            && !self.email.trim().is_empty()
    }
}
