//! The module contains `Account` and its table.
//!
//! An account is a named container of records (a bank account, a wallet, a
//! credit card). It belongs to exactly one user.

use sea_orm::entity::prelude::*;

/// An account together with the ids of its records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub user_id: i64,
    pub record_ids: Vec<i64>,
}

/// The view of an account embedded in other payloads, without its records.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountRef {
    pub id: i64,
    pub name: String,
    pub user_id: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    /// `name` folded for case-insensitive search.
    pub name_norm: String,
    pub user_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::records::Entity")]
    Records,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Records.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Model> for AccountRef {
    fn from(model: &Model) -> Self {
        Self {
            id: model.id,
            name: model.name.clone(),
            user_id: model.user_id,
        }
    }
}

impl Account {
    pub(crate) fn from_model(model: Model, record_ids: Vec<i64>) -> Self {
        Self {
            id: model.id,
            name: model.name,
            user_id: model.user_id,
            record_ids,
        }
    }

    /// The reduced view of this account.
    pub fn reduced(&self) -> AccountRef {
        AccountRef {
            id: self.id,
            name: self.name.clone(),
            user_id: self.user_id,
        }
    }
}
