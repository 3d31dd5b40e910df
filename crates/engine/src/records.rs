//! Record primitives.
//!
//! A `Record` is a single financial transaction booked on an account. The
//! table only stores foreign keys; the account and category views are joined
//! in when a record is read.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::{AccountRef, Amount, Category};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub id: i64,
    pub amount: Amount,
    pub label: String,
    pub note: Option<String>,
    pub date: DateTime<Utc>,
    pub account: AccountRef,
    pub category: Option<Category>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "records")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Signed amount in cents.
    pub amount: i64,
    pub label: String,
    pub label_norm: String,
    pub note: Option<String>,
    pub note_norm: Option<String>,
    pub date: DateTimeUtc,
    pub account_id: i64,
    pub category_id: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Account,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Category,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Record {
    pub(crate) fn from_parts(model: Model, account: AccountRef, category: Option<Category>) -> Self {
        Self {
            id: model.id,
            amount: Amount::new(model.amount),
            label: model.label,
            note: model.note,
            date: model.date,
            account,
            category,
        }
    }
}
