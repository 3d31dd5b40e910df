//! Domain engine for Moneybag.
//!
//! The engine owns the database schema mapping (sea-orm entities), the input
//! validation rules and the authorization policy. Every public operation lives
//! on [`Engine`] and runs inside a single database transaction.

pub use accounts::{Account, AccountRef};
pub use categories::Category;
pub use commands::{
    AccountPatch, CategoryPatch, NewAccount, NewCategory, NewRecord, NewUser, RecordPatch,
    UserPatch,
};
pub use error::EngineError;
pub use money::Amount;
pub use ops::{AccountFilter, CategoryFilter, Engine, EngineBuilder, RecordFilter};
pub use pagination::{Page, Pagination, Sort, SortDirection};
pub use principal::{Principal, Role};
pub use records::Record;
pub use users::User;

mod accounts;
mod categories;
mod commands;
mod error;
mod money;
mod ops;
mod pagination;
mod principal;
mod records;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
