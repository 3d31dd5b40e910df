#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use sea_orm::Database;

use engine::{
    Account, Amount, Category, Engine, NewAccount, NewCategory, NewUser, Principal, Role,
};
use migration::MigratorTrait;

pub async fn engine() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

pub fn new_user(email: &str) -> NewUser {
    NewUser {
        first_name: Some("Test".to_string()),
        last_name: None,
        email: email.to_string(),
        password: "password123".to_string(),
        currency: "EUR".to_string(),
    }
}

pub async fn user(engine: &Engine, email: &str) -> Principal {
    let user = engine.register(new_user(email)).await.unwrap();
    Principal::new(user.id, user.role)
}

pub async fn admin(engine: &Engine, email: &str) -> Principal {
    let user = engine
        .create_user(new_user(email), Role::Admin)
        .await
        .unwrap();
    Principal::new(user.id, user.role)
}

pub async fn account(engine: &Engine, owner: &Principal, name: &str) -> Account {
    engine
        .create_account(
            owner,
            NewAccount {
                name: name.to_string(),
                user_id: owner.id,
            },
        )
        .await
        .unwrap()
}

pub async fn category(engine: &Engine, admin: &Principal, name: &str) -> Category {
    engine
        .create_category(
            admin,
            NewCategory {
                name: name.to_string(),
                icon: "tag".to_string(),
                color: "#1a2b3c".to_string(),
            },
        )
        .await
        .unwrap()
}

pub fn day(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
}

pub fn amount(value: &str) -> Amount {
    value.parse().unwrap()
}
