//! Command structs for engine operations.
//!
//! Create commands carry every required field. Patch commands carry only
//! `Option`s: `None` leaves the stored value untouched.

use chrono::{DateTime, Utc};

use crate::{Amount, Role};

/// Register a new user.
#[derive(Clone, Debug)]
pub struct NewUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub password: String,
    pub currency: String,
}

/// Partial update of a user.
///
/// `role` may only be set by an admin.
#[derive(Clone, Debug, Default)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub currency: Option<String>,
    pub role: Option<Role>,
}

#[derive(Clone, Debug)]
pub struct NewAccount {
    pub name: String,
    pub user_id: i64,
}

#[derive(Clone, Debug, Default)]
pub struct AccountPatch {
    pub name: Option<String>,
    /// Moves the account (and its records) to another user.
    pub user_id: Option<i64>,
}

#[derive(Clone, Debug)]
pub struct NewCategory {
    pub name: String,
    pub icon: String,
    pub color: String,
}

#[derive(Clone, Debug, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

/// Create a record on an account.
#[derive(Clone, Debug)]
pub struct NewRecord {
    pub amount: Amount,
    pub label: String,
    pub note: Option<String>,
    pub date: DateTime<Utc>,
    pub account_id: i64,
    pub category_id: Option<i64>,
}

impl NewRecord {
    #[must_use]
    pub fn new(
        account_id: i64,
        amount: Amount,
        label: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            amount,
            label: label.into(),
            note: None,
            date,
            account_id,
            category_id: None,
        }
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn category_id(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct RecordPatch {
    pub amount: Option<Amount>,
    pub label: Option<String>,
    pub note: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub account_id: Option<i64>,
    pub category_id: Option<i64>,
}
