//! Users table.
//!
//! A user owns accounts; the password is stored as an argon2 PHC string and
//! never leaves the engine.

use sea_orm::entity::prelude::*;

use crate::{EngineError, Role};

/// A registered user, without credentials.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub role: Role,
    pub currency: String,
    /// Ids of the owned accounts, ascending.
    pub account_ids: Vec<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[sea_orm(unique)]
    pub email: String,
    pub password: String,
    pub role: String,
    pub currency: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::accounts::Entity")]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub(crate) fn role(&self) -> Result<Role, EngineError> {
        Role::try_from(self.role.as_str())
    }
}

impl TryFrom<(Model, Vec<i64>)> for User {
    type Error = EngineError;

    fn try_from((model, account_ids): (Model, Vec<i64>)) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            role: model.role()?,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            currency: model.currency,
            account_ids,
        })
    }
}
