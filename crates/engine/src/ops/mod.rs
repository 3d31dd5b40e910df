use sea_orm::{
    DatabaseConnection, DatabaseTransaction, EntityTrait, PaginatorTrait, Select,
    sea_query::LikeExpr,
};

use crate::{Page, Pagination, ResultEngine, util::fold_text};

mod access;
mod accounts;
mod categories;
mod records;
mod users;

pub use accounts::AccountFilter;
pub use categories::CategoryFilter;
pub use records::RecordFilter;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// Fetch one page of `query` together with the totals.
async fn fetch_page<E>(
    db_tx: &DatabaseTransaction,
    query: Select<E>,
    pagination: &Pagination,
) -> ResultEngine<Page<E::Model>>
where
    E: EntityTrait,
    E::Model: Sync,
{
    let paginator = query.paginate(db_tx, pagination.size);
    let totals = paginator.num_items_and_pages().await?;
    let items = paginator.fetch_page(pagination.page).await?;
    Ok(Page {
        items,
        page: pagination.page,
        size: pagination.size,
        total_items: totals.number_of_items,
        total_pages: totals.number_of_pages,
    })
}

/// `%needle%` LIKE pattern over the folded search columns.
///
/// The needle is folded with [`fold_text`]; backslash, `%` and `_` are
/// escaped so they only ever match literally. `None` when the needle is
/// blank, so an empty query parameter does not filter anything.
fn contains_pattern(value: Option<&str>) -> Option<LikeExpr> {
    let needle = value.map(str::trim).filter(|v| !v.is_empty())?;
    let mut pattern = String::from("%");
    for ch in fold_text(needle).chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    Some(LikeExpr::new(pattern).escape('\\'))
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
