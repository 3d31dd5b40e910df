//! Authorization policy.
//!
//! Lookups always run before ownership checks: a missing target reports its
//! own not-found error even when the caller would not be allowed to see it.

use sea_orm::{DatabaseTransaction, prelude::*};

use crate::{EngineError, Principal, ResultEngine, accounts, categories, records, users};

use super::Engine;

impl Engine {
    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: i64,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or(EngineError::UserNotFound(user_id))
    }

    /// Fails with `UserNotFound` if `user_id` does not exist, then with
    /// `AccessDenied` unless the principal is an admin or is that user.
    pub(super) async fn check_self_or_admin(
        &self,
        db: &DatabaseTransaction,
        principal: &Principal,
        user_id: i64,
    ) -> ResultEngine<users::Model> {
        let user = self.require_user(db, user_id).await?;
        if !principal.is_self_or_admin(user.id) {
            return Err(EngineError::AccessDenied(format!(
                "user {} cannot access data of user {user_id}",
                principal.id
            )));
        }
        Ok(user)
    }

    pub(super) async fn require_account(
        &self,
        db: &DatabaseTransaction,
        principal: &Principal,
        account_id: i64,
    ) -> ResultEngine<accounts::Model> {
        let account = accounts::Entity::find_by_id(account_id)
            .one(db)
            .await?
            .ok_or(EngineError::AccountNotFound(account_id))?;
        self.check_self_or_admin(db, principal, account.user_id)
            .await?;
        Ok(account)
    }

    /// Resolves a record and the account it belongs to, checking access on
    /// the account owner.
    pub(super) async fn require_record(
        &self,
        db: &DatabaseTransaction,
        principal: &Principal,
        record_id: i64,
    ) -> ResultEngine<(records::Model, accounts::Model)> {
        let record = records::Entity::find_by_id(record_id)
            .one(db)
            .await?
            .ok_or(EngineError::RecordNotFound(record_id))?;
        let account = self
            .require_account(db, principal, record.account_id)
            .await?;
        Ok((record, account))
    }

    pub(super) async fn require_category(
        &self,
        db: &DatabaseTransaction,
        category_id: i64,
    ) -> ResultEngine<categories::Model> {
        categories::Entity::find_by_id(category_id)
            .one(db)
            .await?
            .ok_or(EngineError::CategoryNotFound(category_id))
    }

    /// Resolves which owner a listing is restricted to.
    ///
    /// Admins get exactly what they asked for (`None` = every user). Other
    /// principals are always pinned to themselves; asking for somebody else
    /// is denied.
    pub(super) async fn owner_scope(
        &self,
        db: &DatabaseTransaction,
        principal: &Principal,
        requested: Option<i64>,
    ) -> ResultEngine<Option<i64>> {
        if let Some(user_id) = requested {
            self.check_self_or_admin(db, principal, user_id).await?;
            return Ok(Some(user_id));
        }
        if principal.is_admin() {
            return Ok(None);
        }
        Ok(Some(principal.id))
    }
}
