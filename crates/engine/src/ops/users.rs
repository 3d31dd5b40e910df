use std::collections::HashMap;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, QuerySelect, SqlErr,
    TransactionTrait, prelude::*,
};

use crate::{
    EngineError, NewUser, Page, Pagination, Principal, ResultEngine, Role, User, UserPatch,
    accounts, records, users,
    util::{NAME_MAX_LEN, validate_email, validate_len, validate_optional_text, validate_password},
};

use super::{Engine, fetch_page, with_tx};

fn hash_password(password: &str) -> ResultEngine<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| EngineError::PasswordHash(err.to_string()))
}

fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Maps a unique-index violation on `users.email` to `UserAlreadyExists`.
///
/// The explicit lookup in `require_email_free` covers the common case; this
/// catches a concurrent insert of the same email that slipped past it.
fn email_conflict(err: DbErr, email: &str) -> EngineError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            EngineError::UserAlreadyExists(email.to_string())
        }
        _ => EngineError::Database(err),
    }
}

fn user_sort_column(field: &str) -> Option<users::Column> {
    match field {
        "id" => Some(users::Column::Id),
        "email" => Some(users::Column::Email),
        "firstName" | "first_name" => Some(users::Column::FirstName),
        "lastName" | "last_name" => Some(users::Column::LastName),
        _ => None,
    }
}

impl Engine {
    /// Registers a new user with role `USER`.
    pub async fn register(&self, new: NewUser) -> ResultEngine<User> {
        self.create_user(new, Role::User).await
    }

    /// Creates a user with an explicit role.
    ///
    /// Not reachable over HTTP; used by operator tooling to bootstrap admins.
    pub async fn create_user(&self, new: NewUser, role: Role) -> ResultEngine<User> {
        let email = validate_email(&new.email)?;
        let first_name = validate_optional_text(new.first_name.as_deref(), "firstName", NAME_MAX_LEN)?;
        let last_name = validate_optional_text(new.last_name.as_deref(), "lastName", NAME_MAX_LEN)?;
        let currency = validate_len(&new.currency, "currency", 1, NAME_MAX_LEN)?;
        let password = hash_password(validate_password(&new.password)?)?;

        with_tx!(self, |db_tx| {
            self.require_email_free(&db_tx, &email, None).await?;

            let model = users::ActiveModel {
                id: ActiveValue::NotSet,
                first_name: ActiveValue::Set(first_name),
                last_name: ActiveValue::Set(last_name),
                email: ActiveValue::Set(email.clone()),
                password: ActiveValue::Set(password),
                role: ActiveValue::Set(role.as_str().to_string()),
                currency: ActiveValue::Set(currency),
            }
            .insert(&db_tx)
            .await
            .map_err(|err| email_conflict(err, &email))?;

            User::try_from((model, Vec::new()))
        })
    }

    /// Checks an email/password pair.
    ///
    /// Unknown emails and wrong passwords are indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> ResultEngine<User> {
        let email = email.trim().to_lowercase();
        with_tx!(self, |db_tx| {
            let model = users::Entity::find()
                .filter(users::Column::Email.eq(email))
                .one(&db_tx)
                .await?
                .ok_or(EngineError::InvalidCredentials)?;
            if !verify_password(password, &model.password) {
                return Err(EngineError::InvalidCredentials);
            }
            self.user_with_accounts(&db_tx, model).await
        })
    }

    /// Resolves the principal for an authenticated user id.
    ///
    /// The role is read from the database on every call so that role changes
    /// apply to tokens that are already issued.
    pub async fn principal(&self, user_id: i64) -> ResultEngine<Principal> {
        with_tx!(self, |db_tx| {
            let model = self.require_user(&db_tx, user_id).await?;
            Ok(Principal::new(model.id, model.role()?))
        })
    }

    /// Return a user. Self or admin only.
    pub async fn user(&self, principal: &Principal, user_id: i64) -> ResultEngine<User> {
        with_tx!(self, |db_tx| {
            let model = self.check_self_or_admin(&db_tx, principal, user_id).await?;
            self.user_with_accounts(&db_tx, model).await
        })
    }

    /// List every user. Admin only.
    pub async fn list_users(
        &self,
        principal: &Principal,
        pagination: &Pagination,
    ) -> ResultEngine<Page<User>> {
        principal.require_admin()?;
        pagination.validate()?;
        with_tx!(self, |db_tx| {
            let query = pagination.order(users::Entity::find(), users::Column::Id, user_sort_column)?;
            let page = fetch_page(&db_tx, query, pagination).await?;

            let ids: Vec<i64> = page.items.iter().map(|u| u.id).collect();
            let mut account_ids = self.account_ids_by_user(&db_tx, &ids).await?;
            let mut items = Vec::with_capacity(page.items.len());
            for model in page.items {
                let owned = account_ids.remove(&model.id).unwrap_or_default();
                items.push(User::try_from((model, owned))?);
            }

            Ok(Page {
                items,
                page: page.page,
                size: page.size,
                total_items: page.total_items,
                total_pages: page.total_pages,
            })
        })
    }

    /// Partially update a user. Self or admin; changing the role needs admin.
    pub async fn update_user(
        &self,
        principal: &Principal,
        user_id: i64,
        patch: UserPatch,
    ) -> ResultEngine<User> {
        let email = patch.email.as_deref().map(validate_email).transpose()?;
        let first_name = patch
            .first_name
            .as_deref()
            .map(|v| validate_optional_text(Some(v), "firstName", NAME_MAX_LEN))
            .transpose()?;
        let last_name = patch
            .last_name
            .as_deref()
            .map(|v| validate_optional_text(Some(v), "lastName", NAME_MAX_LEN))
            .transpose()?;
        let currency = patch
            .currency
            .as_deref()
            .map(|v| validate_len(v, "currency", 1, NAME_MAX_LEN))
            .transpose()?;
        let password = patch
            .password
            .as_deref()
            .map(|v| validate_password(v).and_then(hash_password))
            .transpose()?;

        with_tx!(self, |db_tx| {
            let model = self.check_self_or_admin(&db_tx, principal, user_id).await?;
            if patch.role.is_some() {
                principal.require_admin()?;
            }
            if let Some(email) = &email {
                self.require_email_free(&db_tx, email, Some(user_id)).await?;
            }

            let mut active: users::ActiveModel = model.clone().into();
            if let Some(first_name) = first_name {
                active.first_name = ActiveValue::Set(first_name);
            }
            if let Some(last_name) = last_name {
                active.last_name = ActiveValue::Set(last_name);
            }
            if let Some(email) = &email {
                active.email = ActiveValue::Set(email.clone());
            }
            if let Some(currency) = currency {
                active.currency = ActiveValue::Set(currency);
            }
            if let Some(password) = password {
                active.password = ActiveValue::Set(password);
            }
            if let Some(role) = patch.role {
                active.role = ActiveValue::Set(role.as_str().to_string());
            }

            let model = if active.is_changed() {
                active.update(&db_tx).await.map_err(|err| match &email {
                    Some(email) => email_conflict(err, email),
                    None => EngineError::Database(err),
                })?
            } else {
                model
            };
            self.user_with_accounts(&db_tx, model).await
        })
    }

    /// Delete a user with its accounts and their records. Admin only.
    pub async fn delete_user(&self, principal: &Principal, user_id: i64) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            principal.require_admin()?;

            let account_ids: Vec<i64> = accounts::Entity::find()
                .select_only()
                .column(accounts::Column::Id)
                .filter(accounts::Column::UserId.eq(user_id))
                .into_tuple()
                .all(&db_tx)
                .await?;

            records::Entity::delete_many()
                .filter(records::Column::AccountId.is_in(account_ids))
                .exec(&db_tx)
                .await?;
            accounts::Entity::delete_many()
                .filter(accounts::Column::UserId.eq(user_id))
                .exec(&db_tx)
                .await?;
            users::Entity::delete_by_id(user_id).exec(&db_tx).await?;

            Ok(())
        })
    }

    async fn require_email_free(
        &self,
        db: &DatabaseTransaction,
        email: &str,
        except_user_id: Option<i64>,
    ) -> ResultEngine<()> {
        let mut query = users::Entity::find().filter(users::Column::Email.eq(email));
        if let Some(id) = except_user_id {
            query = query.filter(users::Column::Id.ne(id));
        }
        if query.one(db).await?.is_some() {
            return Err(EngineError::UserAlreadyExists(email.to_string()));
        }
        Ok(())
    }

    async fn user_with_accounts(
        &self,
        db: &DatabaseTransaction,
        model: users::Model,
    ) -> ResultEngine<User> {
        let owned = self
            .account_ids_by_user(db, &[model.id])
            .await?
            .remove(&model.id)
            .unwrap_or_default();
        User::try_from((model, owned))
    }

    async fn account_ids_by_user(
        &self,
        db: &DatabaseTransaction,
        user_ids: &[i64],
    ) -> ResultEngine<HashMap<i64, Vec<i64>>> {
        let rows: Vec<(i64, i64)> = accounts::Entity::find()
            .select_only()
            .column(accounts::Column::UserId)
            .column(accounts::Column::Id)
            .filter(accounts::Column::UserId.is_in(user_ids.iter().copied()))
            .order_by_asc(accounts::Column::Id)
            .into_tuple()
            .all(db)
            .await?;

        let mut out: HashMap<i64, Vec<i64>> = HashMap::new();
        for (user_id, account_id) in rows {
            out.entry(user_id).or_default().push(account_id);
        }
        Ok(out)
    }
}
