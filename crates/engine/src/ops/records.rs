use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, JoinType, QueryFilter, QuerySelect, TransactionTrait,
    prelude::*,
    sea_query::{Expr, LikeExpr, SimpleExpr},
};

use crate::{
    AccountRef, Amount, Category, EngineError, NewRecord, Page, Pagination, Principal, Record,
    RecordPatch, ResultEngine, accounts, categories, records,
    util::{NAME_MAX_LEN, NOTE_MAX_LEN, fold_text, validate_len, validate_optional_text},
};

use super::{Engine, contains_pattern, fetch_page, with_tx};

/// Filters for listing records. All present filters must match.
///
/// `date_ge` is inclusive and `date_lt` is exclusive (`[date_ge, date_lt)`).
#[derive(Clone, Debug, Default)]
pub struct RecordFilter {
    /// Case-insensitive substring of the label.
    pub label: Option<String>,
    /// Case-insensitive substring of the note.
    pub note: Option<String>,
    pub date_ge: Option<DateTime<Utc>>,
    pub date_lt: Option<DateTime<Utc>>,
    pub account_id: Option<i64>,
    pub category_id: Option<i64>,
    /// Owner of the account. Only admins may name a user other than themselves.
    pub user_id: Option<i64>,
    pub amount_lt: Option<Amount>,
    pub amount_gt: Option<Amount>,
}

fn validate_record_filter(filter: &RecordFilter) -> ResultEngine<()> {
    if let (Some(ge), Some(lt)) = (filter.date_ge, filter.date_lt)
        && ge >= lt
    {
        return Err(EngineError::Validation(
            "invalid range: dateGe must be before dateLt".to_string(),
        ));
    }
    Ok(())
}

fn folded_like(column: records::Column, pattern: LikeExpr) -> SimpleExpr {
    Expr::col((records::Entity, column)).like(pattern)
}

trait ApplyRecordFilters: QueryFilter + Sized {
    fn apply_record_filters(self, filter: &RecordFilter) -> Self;
}

impl<T> ApplyRecordFilters for T
where
    T: QueryFilter + Sized,
{
    fn apply_record_filters(mut self, filter: &RecordFilter) -> Self {
        if let Some(pattern) = contains_pattern(filter.label.as_deref()) {
            self = self.filter(folded_like(records::Column::LabelNorm, pattern));
        }
        if let Some(pattern) = contains_pattern(filter.note.as_deref()) {
            self = self.filter(folded_like(records::Column::NoteNorm, pattern));
        }
        if let Some(ge) = filter.date_ge {
            self = self.filter(records::Column::Date.gte(ge));
        }
        if let Some(lt) = filter.date_lt {
            self = self.filter(records::Column::Date.lt(lt));
        }
        if let Some(account_id) = filter.account_id {
            self = self.filter(records::Column::AccountId.eq(account_id));
        }
        if let Some(category_id) = filter.category_id {
            self = self.filter(records::Column::CategoryId.eq(category_id));
        }
        if let Some(amount) = filter.amount_lt {
            self = self.filter(records::Column::Amount.lt(amount.cents()));
        }
        if let Some(amount) = filter.amount_gt {
            self = self.filter(records::Column::Amount.gt(amount.cents()));
        }
        self
    }
}

fn record_sort_column(field: &str) -> Option<records::Column> {
    match field {
        "id" => Some(records::Column::Id),
        "amount" => Some(records::Column::Amount),
        "label" => Some(records::Column::Label),
        "note" => Some(records::Column::Note),
        "date" => Some(records::Column::Date),
        _ => None,
    }
}

impl Engine {
    /// Book a record on an account.
    ///
    /// The account and the category are resolved before the ownership check,
    /// so a missing one reports its own not-found error.
    pub async fn create_record(
        &self,
        principal: &Principal,
        new: NewRecord,
    ) -> ResultEngine<Record> {
        let label = validate_len(&new.label, "label", 1, NAME_MAX_LEN)?;
        let note = validate_optional_text(new.note.as_deref(), "note", NOTE_MAX_LEN)?;

        with_tx!(self, |db_tx| {
            let account = accounts::Entity::find_by_id(new.account_id)
                .one(&db_tx)
                .await?
                .ok_or(EngineError::AccountNotFound(new.account_id))?;
            let category = match new.category_id {
                Some(id) => Some(self.require_category(&db_tx, id).await?),
                None => None,
            };
            self.check_self_or_admin(&db_tx, principal, account.user_id)
                .await?;

            let model = records::ActiveModel {
                id: ActiveValue::NotSet,
                amount: ActiveValue::Set(new.amount.cents()),
                label_norm: ActiveValue::Set(fold_text(&label)),
                label: ActiveValue::Set(label),
                note_norm: ActiveValue::Set(note.as_deref().map(fold_text)),
                note: ActiveValue::Set(note),
                date: ActiveValue::Set(new.date),
                account_id: ActiveValue::Set(account.id),
                category_id: ActiveValue::Set(category.as_ref().map(|c| c.id)),
            }
            .insert(&db_tx)
            .await?;

            Ok(Record::from_parts(
                model,
                AccountRef::from(&account),
                category.map(Category::from),
            ))
        })
    }

    pub async fn record(&self, principal: &Principal, record_id: i64) -> ResultEngine<Record> {
        with_tx!(self, |db_tx| {
            let (model, account) = self.require_record(&db_tx, principal, record_id).await?;
            let category = self.optional_category(&db_tx, model.category_id).await?;
            Ok(Record::from_parts(model, AccountRef::from(&account), category))
        })
    }

    /// List records visible to the principal, filtered and paginated.
    pub async fn list_records(
        &self,
        principal: &Principal,
        filter: &RecordFilter,
        pagination: &Pagination,
    ) -> ResultEngine<Page<Record>> {
        validate_record_filter(filter)?;
        pagination.validate()?;
        with_tx!(self, |db_tx| {
            let owner = self.owner_scope(&db_tx, principal, filter.user_id).await?;

            let mut query = records::Entity::find()
                .join(JoinType::InnerJoin, records::Relation::Account.def())
                .apply_record_filters(filter);
            if let Some(user_id) = owner {
                query = query.filter(accounts::Column::UserId.eq(user_id));
            }
            let query = pagination.order(query, records::Column::Id, record_sort_column)?;
            let page = fetch_page(&db_tx, query, pagination).await?;

            let items = self.hydrate_records(&db_tx, page.items).await?;
            Ok(Page {
                items,
                page: page.page,
                size: page.size,
                total_items: page.total_items,
                total_pages: page.total_pages,
            })
        })
    }

    /// Partially update a record. Moving it to another account checks access
    /// on the target account too.
    pub async fn update_record(
        &self,
        principal: &Principal,
        record_id: i64,
        patch: RecordPatch,
    ) -> ResultEngine<Record> {
        let label = patch
            .label
            .as_deref()
            .map(|v| validate_len(v, "label", 1, NAME_MAX_LEN))
            .transpose()?;
        // Some(blank) clears the note.
        let note = patch
            .note
            .as_deref()
            .map(|v| validate_optional_text(Some(v), "note", NOTE_MAX_LEN))
            .transpose()?;

        with_tx!(self, |db_tx| {
            let (model, mut account) = self.require_record(&db_tx, principal, record_id).await?;

            if let Some(account_id) = patch.account_id
                && account_id != account.id
            {
                account = self.require_account(&db_tx, principal, account_id).await?;
            }
            let category = match patch.category_id {
                Some(id) => Some(self.require_category(&db_tx, id).await?),
                None => None,
            };

            let mut active: records::ActiveModel = model.clone().into();
            if let Some(amount) = patch.amount {
                active.amount = ActiveValue::Set(amount.cents());
            }
            if let Some(label) = label {
                active.label_norm = ActiveValue::Set(fold_text(&label));
                active.label = ActiveValue::Set(label);
            }
            if let Some(note) = note {
                active.note_norm = ActiveValue::Set(note.as_deref().map(fold_text));
                active.note = ActiveValue::Set(note);
            }
            if let Some(date) = patch.date {
                active.date = ActiveValue::Set(date);
            }
            if account.id != model.account_id {
                active.account_id = ActiveValue::Set(account.id);
            }
            if let Some(category) = &category {
                active.category_id = ActiveValue::Set(Some(category.id));
            }

            let model = if active.is_changed() {
                active.update(&db_tx).await?
            } else {
                model
            };
            let category = match category {
                Some(category) => Some(Category::from(category)),
                None => self.optional_category(&db_tx, model.category_id).await?,
            };
            Ok(Record::from_parts(model, AccountRef::from(&account), category))
        })
    }

    pub async fn delete_record(&self, principal: &Principal, record_id: i64) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_record(&db_tx, principal, record_id).await?;
            records::Entity::delete_by_id(record_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    async fn optional_category(
        &self,
        db: &DatabaseTransaction,
        category_id: Option<i64>,
    ) -> ResultEngine<Option<Category>> {
        match category_id {
            Some(id) => Ok(categories::Entity::find_by_id(id)
                .one(db)
                .await?
                .map(Category::from)),
            None => Ok(None),
        }
    }

    /// Attach account and category views to a page of records with one query
    /// per table.
    async fn hydrate_records(
        &self,
        db: &DatabaseTransaction,
        models: Vec<records::Model>,
    ) -> ResultEngine<Vec<Record>> {
        let account_ids: HashSet<i64> = models.iter().map(|r| r.account_id).collect();
        let category_ids: HashSet<i64> = models.iter().filter_map(|r| r.category_id).collect();

        let account_refs: HashMap<i64, AccountRef> = accounts::Entity::find()
            .filter(accounts::Column::Id.is_in(account_ids))
            .all(db)
            .await?
            .iter()
            .map(|a| (a.id, AccountRef::from(a)))
            .collect();
        let category_views: HashMap<i64, Category> = categories::Entity::find()
            .filter(categories::Column::Id.is_in(category_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, Category::from(c)))
            .collect();

        models
            .into_iter()
            .map(|model| {
                let account = account_refs
                    .get(&model.account_id)
                    .cloned()
                    .ok_or(EngineError::AccountNotFound(model.account_id))?;
                let category = model
                    .category_id
                    .and_then(|id| category_views.get(&id).cloned());
                Ok(Record::from_parts(model, account, category))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn date_range_must_be_increasing() {
        let feb = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let mar = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        let ok = RecordFilter {
            date_ge: Some(feb),
            date_lt: Some(mar),
            ..RecordFilter::default()
        };
        assert!(validate_record_filter(&ok).is_ok());

        let empty = RecordFilter {
            date_ge: Some(feb),
            date_lt: Some(feb),
            ..RecordFilter::default()
        };
        assert!(validate_record_filter(&empty).is_err());
    }

    #[test]
    fn open_ranges_are_valid() {
        let filter = RecordFilter {
            date_lt: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            ..RecordFilter::default()
        };
        assert!(validate_record_filter(&filter).is_ok());
    }
}
