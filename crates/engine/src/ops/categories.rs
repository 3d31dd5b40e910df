use sea_orm::{
    ActiveValue, QueryFilter, TransactionTrait,
    prelude::*,
    sea_query::Expr,
};

use crate::{
    Category, CategoryPatch, NewCategory, Page, Pagination, Principal, ResultEngine, categories,
    records,
    util::{NAME_MAX_LEN, fold_text, validate_hex_color, validate_len},
};

use super::{Engine, contains_pattern, fetch_page, with_tx};

/// Filters for listing categories.
#[derive(Clone, Debug, Default)]
pub struct CategoryFilter {
    /// Case-insensitive substring of the name.
    pub name: Option<String>,
}

fn category_sort_column(field: &str) -> Option<categories::Column> {
    match field {
        "id" => Some(categories::Column::Id),
        "name" => Some(categories::Column::Name),
        _ => None,
    }
}

impl Engine {
    /// Return a category. Categories are global, any principal can read them.
    pub async fn category(&self, category_id: i64) -> ResultEngine<Category> {
        with_tx!(self, |db_tx| {
            self.require_category(&db_tx, category_id)
                .await
                .map(Category::from)
        })
    }

    pub async fn list_categories(
        &self,
        filter: &CategoryFilter,
        pagination: &Pagination,
    ) -> ResultEngine<Page<Category>> {
        pagination.validate()?;
        with_tx!(self, |db_tx| {
            let mut query = categories::Entity::find();
            if let Some(pattern) = contains_pattern(filter.name.as_deref()) {
                query = query.filter(
                    Expr::col((categories::Entity, categories::Column::NameNorm)).like(pattern),
                );
            }
            let query = pagination.order(query, categories::Column::Id, category_sort_column)?;
            let page = fetch_page(&db_tx, query, pagination).await?;
            Ok(page.map(Category::from))
        })
    }

    /// Admin only.
    pub async fn create_category(
        &self,
        principal: &Principal,
        new: NewCategory,
    ) -> ResultEngine<Category> {
        principal.require_admin()?;
        let name = validate_len(&new.name, "name", 1, NAME_MAX_LEN)?;
        let icon = validate_len(&new.icon, "icon", 1, NAME_MAX_LEN)?;
        let color = validate_hex_color(&new.color)?;

        with_tx!(self, |db_tx| {
            let model = categories::ActiveModel {
                id: ActiveValue::NotSet,
                name_norm: ActiveValue::Set(fold_text(&name)),
                name: ActiveValue::Set(name),
                icon: ActiveValue::Set(icon),
                color: ActiveValue::Set(color),
            }
            .insert(&db_tx)
            .await?;
            Ok(Category::from(model))
        })
    }

    /// Admin only.
    pub async fn update_category(
        &self,
        principal: &Principal,
        category_id: i64,
        patch: CategoryPatch,
    ) -> ResultEngine<Category> {
        let name = patch
            .name
            .as_deref()
            .map(|v| validate_len(v, "name", 1, NAME_MAX_LEN))
            .transpose()?;
        let icon = patch
            .icon
            .as_deref()
            .map(|v| validate_len(v, "icon", 1, NAME_MAX_LEN))
            .transpose()?;
        let color = patch.color.as_deref().map(validate_hex_color).transpose()?;

        with_tx!(self, |db_tx| {
            let model = self.require_category(&db_tx, category_id).await?;
            principal.require_admin()?;
            let mut active: categories::ActiveModel = model.clone().into();
            if let Some(name) = name {
                active.name_norm = ActiveValue::Set(fold_text(&name));
                active.name = ActiveValue::Set(name);
            }
            if let Some(icon) = icon {
                active.icon = ActiveValue::Set(icon);
            }
            if let Some(color) = color {
                active.color = ActiveValue::Set(color);
            }
            let model = if active.is_changed() {
                active.update(&db_tx).await?
            } else {
                model
            };
            Ok(Category::from(model))
        })
    }

    /// Admin only. Records in the category become uncategorized.
    pub async fn delete_category(&self, principal: &Principal, category_id: i64) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_category(&db_tx, category_id).await?;
            principal.require_admin()?;
            records::Entity::update_many()
                .col_expr(
                    records::Column::CategoryId,
                    Expr::value(Option::<i64>::None),
                )
                .filter(records::Column::CategoryId.eq(category_id))
                .exec(&db_tx)
                .await?;
            categories::Entity::delete_by_id(category_id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
