use std::collections::HashMap;

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
    sea_query::Expr,
};

use crate::{
    Account, AccountPatch, NewAccount, Page, Pagination, Principal, ResultEngine, accounts,
    records,
    util::{NAME_MAX_LEN, fold_text, validate_len},
};

use super::{Engine, contains_pattern, fetch_page, with_tx};

/// Filters for listing accounts.
#[derive(Clone, Debug, Default)]
pub struct AccountFilter {
    /// Owner. Only admins may name a user other than themselves.
    pub user_id: Option<i64>,
    /// Case-insensitive substring of the name.
    pub name: Option<String>,
}

fn account_sort_column(field: &str) -> Option<accounts::Column> {
    match field {
        "id" => Some(accounts::Column::Id),
        "name" => Some(accounts::Column::Name),
        _ => None,
    }
}

impl Engine {
    /// Create an account for `new.user_id`. Self or admin only.
    pub async fn create_account(
        &self,
        principal: &Principal,
        new: NewAccount,
    ) -> ResultEngine<Account> {
        let name = validate_len(&new.name, "name", 1, NAME_MAX_LEN)?;
        with_tx!(self, |db_tx| {
            self.check_self_or_admin(&db_tx, principal, new.user_id)
                .await?;
            let model = accounts::ActiveModel {
                id: ActiveValue::NotSet,
                name_norm: ActiveValue::Set(fold_text(&name)),
                name: ActiveValue::Set(name),
                user_id: ActiveValue::Set(new.user_id),
            }
            .insert(&db_tx)
            .await?;
            Ok(Account::from_model(model, Vec::new()))
        })
    }

    pub async fn account(&self, principal: &Principal, account_id: i64) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, principal, account_id).await?;
            self.account_with_records(&db_tx, model).await
        })
    }

    /// List accounts visible to the principal.
    pub async fn list_accounts(
        &self,
        principal: &Principal,
        filter: &AccountFilter,
        pagination: &Pagination,
    ) -> ResultEngine<Page<Account>> {
        pagination.validate()?;
        with_tx!(self, |db_tx| {
            let owner = self.owner_scope(&db_tx, principal, filter.user_id).await?;

            let mut query = accounts::Entity::find();
            if let Some(user_id) = owner {
                query = query.filter(accounts::Column::UserId.eq(user_id));
            }
            if let Some(pattern) = contains_pattern(filter.name.as_deref()) {
                query = query.filter(
                    Expr::col((accounts::Entity, accounts::Column::NameNorm)).like(pattern),
                );
            }
            let query = pagination.order(query, accounts::Column::Id, account_sort_column)?;
            let page = fetch_page(&db_tx, query, pagination).await?;

            let ids: Vec<i64> = page.items.iter().map(|a| a.id).collect();
            let mut record_ids = self.record_ids_by_account(&db_tx, &ids).await?;
            Ok(page.map(|model| {
                let owned = record_ids.remove(&model.id).unwrap_or_default();
                Account::from_model(model, owned)
            }))
        })
    }

    /// Rename an account or move it to another user.
    ///
    /// Moving requires the principal to be allowed on both the current and the
    /// new owner.
    pub async fn update_account(
        &self,
        principal: &Principal,
        account_id: i64,
        patch: AccountPatch,
    ) -> ResultEngine<Account> {
        let name = patch
            .name
            .as_deref()
            .map(|v| validate_len(v, "name", 1, NAME_MAX_LEN))
            .transpose()?;
        with_tx!(self, |db_tx| {
            let model = self.require_account(&db_tx, principal, account_id).await?;
            if let Some(user_id) = patch.user_id {
                self.check_self_or_admin(&db_tx, principal, user_id).await?;
            }

            let mut active: accounts::ActiveModel = model.clone().into();
            if let Some(name) = name {
                active.name_norm = ActiveValue::Set(fold_text(&name));
                active.name = ActiveValue::Set(name);
            }
            if let Some(user_id) = patch.user_id {
                active.user_id = ActiveValue::Set(user_id);
            }
            let model = if active.is_changed() {
                active.update(&db_tx).await?
            } else {
                model
            };
            self.account_with_records(&db_tx, model).await
        })
    }

    /// Delete an account and every record booked on it.
    pub async fn delete_account(&self, principal: &Principal, account_id: i64) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_account(&db_tx, principal, account_id).await?;
            records::Entity::delete_many()
                .filter(records::Column::AccountId.eq(account_id))
                .exec(&db_tx)
                .await?;
            accounts::Entity::delete_by_id(account_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    async fn account_with_records(
        &self,
        db: &DatabaseTransaction,
        model: accounts::Model,
    ) -> ResultEngine<Account> {
        let owned = self
            .record_ids_by_account(db, &[model.id])
            .await?
            .remove(&model.id)
            .unwrap_or_default();
        Ok(Account::from_model(model, owned))
    }

    async fn record_ids_by_account(
        &self,
        db: &DatabaseTransaction,
        account_ids: &[i64],
    ) -> ResultEngine<HashMap<i64, Vec<i64>>> {
        let rows: Vec<(i64, i64)> = records::Entity::find()
            .select_only()
            .column(records::Column::AccountId)
            .column(records::Column::Id)
            .filter(records::Column::AccountId.is_in(account_ids.iter().copied()))
            .order_by_asc(records::Column::Id)
            .into_tuple()
            .all(db)
            .await?;

        let mut out: HashMap<i64, Vec<i64>> = HashMap::new();
        for (account_id, record_id) in rows {
            out.entry(account_id).or_default().push(record_id);
        }
        Ok(out)
    }
}
