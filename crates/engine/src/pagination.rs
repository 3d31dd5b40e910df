//! Offset pagination shared by every listing.
//!
//! Pages are 0-based. Without an explicit sort, rows come back in insertion
//! order (`id ASC`); an explicit sort always gets `id ASC` appended so page
//! boundaries are stable.

use std::str::FromStr;

use sea_orm::{EntityTrait, Order, QueryOrder, Select};

use crate::{EngineError, ResultEngine};

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// A `field[,asc|desc]` sort specification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

impl FromStr for Sort {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = match s.split_once(',') {
            Some((field, direction)) => (field, Some(direction)),
            None => (s, None),
        };
        let field = field.trim();
        if field.is_empty() {
            return Err(EngineError::Validation("sort field must not be empty".to_string()));
        }
        let direction = match direction.map(|d| d.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("asc") => SortDirection::Asc,
            Some("desc") => SortDirection::Desc,
            Some(other) => {
                return Err(EngineError::Validation(format!(
                    "invalid sort direction: {other}"
                )));
            }
        };
        Ok(Self {
            field: field.to_string(),
            direction,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub size: u64,
    pub sort: Option<Sort>,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: None,
        }
    }
}

impl Pagination {
    #[must_use]
    pub fn new(page: u64, size: u64) -> Self {
        Self {
            page,
            size,
            sort: None,
        }
    }

    #[must_use]
    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub(crate) fn validate(&self) -> ResultEngine<()> {
        if self.size == 0 || self.size > MAX_PAGE_SIZE {
            return Err(EngineError::Validation(format!(
                "page size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok(())
    }

    /// Applies the requested ordering to `query`.
    ///
    /// `resolve` maps a public field name to a column of `E`; unknown names
    /// are rejected.
    pub(crate) fn order<E, F>(
        &self,
        mut query: Select<E>,
        id: E::Column,
        resolve: F,
    ) -> ResultEngine<Select<E>>
    where
        E: EntityTrait,
        F: Fn(&str) -> Option<E::Column>,
    {
        if let Some(sort) = &self.sort {
            let column = resolve(sort.field.as_str()).ok_or_else(|| {
                EngineError::Validation(format!("cannot sort by '{}'", sort.field))
            })?;
            let order = match sort.direction {
                SortDirection::Asc => Order::Asc,
                SortDirection::Desc => Order::Desc,
            };
            query = query.order_by(column, order);
        }
        Ok(query.order_by_asc(id))
    }
}

/// One page of results.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}
