//! Wire types of the HTTP API.
//!
//! Every payload is camelCase JSON. Amounts and roles reuse the engine value
//! types so their serde representation is defined in one place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use engine::{Amount, Role};

pub mod date {
    //! Dates accepted as `YYYY-MM-DD` (midnight UTC) or RFC 3339.

    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{Deserialize, Deserializer, de};

    pub fn parse(input: &str) -> Option<DateTime<Utc>> {
        let input = input.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(input, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid date: '{raw}'")))
    }

    /// Like [`deserialize`], mapping an empty string to `None`.
    pub fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) if raw.trim().is_empty() => Ok(None),
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid date: '{raw}'"))),
        }
    }
}

pub mod error {
    use super::*;

    /// Body of every non-2xx response.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ErrorResponse {
        pub message: String,
    }
}

pub mod page {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PageResponse<T> {
        pub content: Vec<T>,
        pub page: u64,
        pub size: u64,
        pub total_elements: u64,
        pub total_pages: u64,
    }

    /// Paging parameters alone, for listings without filters.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PageQuery {
        pub page: Option<u64>,
        pub size: Option<u64>,
        /// `field` or `field,asc|desc`.
        pub sort: Option<String>,
    }
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserDto {
        pub id: i64,
        pub first_name: Option<String>,
        pub last_name: Option<String>,
        pub email: String,
        pub role: Role,
        pub currency: String,
        pub account_ids: Vec<i64>,
    }

    /// Partial update. Absent or `null` fields are left unchanged.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserUpdate {
        pub first_name: Option<String>,
        pub last_name: Option<String>,
        pub email: Option<String>,
        pub password: Option<String>,
        pub currency: Option<String>,
        /// Admin only.
        pub role: Option<Role>,
    }
}

pub mod auth {
    use super::*;
    use crate::user::UserDto;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RegisterRequest {
        pub first_name: Option<String>,
        pub last_name: Option<String>,
        pub email: String,
        pub password: String,
        pub currency: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginRequest {
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuthResponse {
        /// Bearer token for the `Authorization` header.
        pub token: String,
        pub user: UserDto,
    }
}

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AccountDto {
        pub id: i64,
        pub name: String,
        pub user_id: i64,
        pub record_ids: Vec<i64>,
    }

    /// Account as embedded in a record.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AccountReducedDto {
        pub id: i64,
        pub name: String,
        pub user_id: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AccountNew {
        pub name: String,
        /// Owner; defaults to the caller.
        pub user_id: Option<i64>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AccountUpdate {
        pub name: Option<String>,
        pub user_id: Option<i64>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct AccountListQuery {
        pub page: Option<u64>,
        pub size: Option<u64>,
        pub sort: Option<String>,
        pub user_id: Option<i64>,
        pub name: Option<String>,
    }
}

pub mod category {
    use super::*;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CategoryDto {
        pub id: i64,
        pub name: String,
        pub icon: String,
        pub color: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        pub icon: String,
        /// `#RGB` or `#RRGGBB`.
        pub color: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub name: Option<String>,
        pub icon: Option<String>,
        pub color: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryListQuery {
        pub page: Option<u64>,
        pub size: Option<u64>,
        pub sort: Option<String>,
        pub name: Option<String>,
    }
}

pub mod record {
    use super::*;
    use crate::{account::AccountReducedDto, category::CategoryDto};

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RecordDto {
        pub id: i64,
        pub amount: Amount,
        pub label: String,
        pub note: Option<String>,
        pub date: DateTime<Utc>,
        pub account: AccountReducedDto,
        pub category: Option<CategoryDto>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RecordNew {
        pub amount: Amount,
        pub label: String,
        pub note: Option<String>,
        #[serde(deserialize_with = "crate::date::deserialize")]
        pub date: DateTime<Utc>,
        pub account_id: i64,
        pub category_id: Option<i64>,
    }

    /// Partial update. Absent or `null` fields are left unchanged; an empty
    /// `note` clears it.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RecordUpdate {
        pub amount: Option<Amount>,
        pub label: Option<String>,
        pub note: Option<String>,
        #[serde(default, deserialize_with = "crate::date::deserialize_optional")]
        pub date: Option<DateTime<Utc>>,
        pub account_id: Option<i64>,
        pub category_id: Option<i64>,
    }

    /// Query string of `GET /records`. Every filter is optional and they
    /// combine with AND.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RecordListQuery {
        pub page: Option<u64>,
        pub size: Option<u64>,
        pub sort: Option<String>,
        pub label: Option<String>,
        pub note: Option<String>,
        #[serde(default, deserialize_with = "crate::date::deserialize_optional")]
        pub date_ge: Option<DateTime<Utc>>,
        #[serde(default, deserialize_with = "crate::date::deserialize_optional")]
        pub date_lt: Option<DateTime<Utc>>,
        pub account_id: Option<i64>,
        pub category_id: Option<i64>,
        pub user_id: Option<i64>,
        pub amount_lt: Option<Amount>,
        pub amount_gt: Option<Amount>,
    }
}
