mod common;

use engine::{
    AccountFilter, AccountPatch, EngineError, NewAccount, NewRecord, Pagination, RecordFilter,
    Sort,
};

use common::{account, admin, amount, day, engine, user};

#[tokio::test]
async fn users_only_see_their_own_accounts() {
    let engine = engine().await;
    let root = admin(&engine, "root@example.com").await;
    let alice = user(&engine, "alice@example.com").await;
    let bob = user(&engine, "bob@example.com").await;
    account(&engine, &alice, "Bank").await;
    account(&engine, &alice, "Cash").await;
    let bobs = account(&engine, &bob, "Savings").await;

    let page = engine
        .list_accounts(&bob, &AccountFilter::default(), &Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total_items, 1);
    assert_eq!(page.items[0].id, bobs.id);

    let err = engine
        .list_accounts(
            &bob,
            &AccountFilter {
                user_id: Some(alice.id),
                ..AccountFilter::default()
            },
            &Pagination::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::AccessDenied(_)));

    let all = engine
        .list_accounts(&root, &AccountFilter::default(), &Pagination::default())
        .await
        .unwrap();
    assert_eq!(all.total_items, 3);

    let alices = engine
        .list_accounts(
            &root,
            &AccountFilter {
                user_id: Some(alice.id),
                ..AccountFilter::default()
            },
            &Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(alices.total_items, 2);
    assert!(alices.items.iter().all(|a| a.user_id == alice.id));
}

#[tokio::test]
async fn name_filter_is_case_insensitive_substring() {
    let engine = engine().await;
    let alice = user(&engine, "alice@example.com").await;
    account(&engine, &alice, "Main Bank").await;
    account(&engine, &alice, "Cash").await;
    account(&engine, &alice, "bank of mum").await;

    let page = engine
        .list_accounts(
            &alice,
            &AccountFilter {
                name: Some("BANK".to_string()),
                ..AccountFilter::default()
            },
            &Pagination::default(),
        )
        .await
        .unwrap();
    let names: Vec<_> = page.items.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["Main Bank", "bank of mum"]);
}

#[tokio::test]
async fn name_filter_folds_non_ascii_letters() {
    let engine = engine().await;
    let alice = user(&engine, "alice@example.com").await;
    let savings = account(&engine, &alice, "ÉPARGNE").await;
    account(&engine, &alice, "Girokonto").await;

    let find = |needle: &str| AccountFilter {
        name: Some(needle.to_string()),
        ..AccountFilter::default()
    };
    for needle in ["ÉPARGNE", "épargne", "Épar"] {
        let page = engine
            .list_accounts(&alice, &find(needle), &Pagination::default())
            .await
            .unwrap();
        assert_eq!(page.items, [savings.clone()], "name {needle}");
    }

    engine
        .update_account(
            &alice,
            savings.id,
            AccountPatch {
                name: Some("Übersee".to_string()),
                ..AccountPatch::default()
            },
        )
        .await
        .unwrap();
    let page = engine
        .list_accounts(&alice, &find("übersee"), &Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total_items, 1);
}

#[tokio::test]
async fn pages_are_sized_and_sorted() {
    let engine = engine().await;
    let alice = user(&engine, "alice@example.com").await;
    for name in ["C", "A", "E", "B", "D"] {
        account(&engine, &alice, name).await;
    }

    let pagination = Pagination::new(1, 2).sort("name,desc".parse::<Sort>().unwrap());
    let page = engine
        .list_accounts(&alice, &AccountFilter::default(), &pagination)
        .await
        .unwrap();
    assert_eq!(page.total_items, 5);
    assert_eq!(page.total_pages, 3);
    let names: Vec<_> = page.items.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["C", "B"]);

    let last = engine
        .list_accounts(&alice, &AccountFilter::default(), &Pagination::new(2, 2))
        .await
        .unwrap();
    assert_eq!(last.items.len(), 1);

    let err = engine
        .list_accounts(
            &alice,
            &AccountFilter::default(),
            &Pagination::new(0, 2).sort("balance".parse::<Sort>().unwrap()),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}

#[tokio::test]
async fn creating_for_someone_else_is_denied() {
    let engine = engine().await;
    let alice = user(&engine, "alice@example.com").await;
    let bob = user(&engine, "bob@example.com").await;

    let err = engine
        .create_account(
            &bob,
            NewAccount {
                name: "Sneaky".to_string(),
                user_id: alice.id,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::AccessDenied(_)));

    let err = engine
        .create_account(
            &bob,
            NewAccount {
                name: "Ghost".to_string(),
                user_id: 999,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::UserNotFound(999));
}

#[tokio::test]
async fn moving_an_account_needs_access_to_the_new_owner() {
    let engine = engine().await;
    let root = admin(&engine, "root@example.com").await;
    let alice = user(&engine, "alice@example.com").await;
    let bob = user(&engine, "bob@example.com").await;
    let wallet = account(&engine, &alice, "Wallet").await;

    let move_to_bob = AccountPatch {
        user_id: Some(bob.id),
        ..AccountPatch::default()
    };
    let err = engine
        .update_account(&alice, wallet.id, move_to_bob.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::AccessDenied(_)));

    let moved = engine
        .update_account(&root, wallet.id, move_to_bob)
        .await
        .unwrap();
    assert_eq!(moved.user_id, bob.id);
    assert_eq!(moved.name, "Wallet");

    let renamed = engine
        .update_account(
            &bob,
            wallet.id,
            AccountPatch {
                name: Some("Pocket".to_string()),
                ..AccountPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Pocket");
}

#[tokio::test]
async fn deleting_an_account_removes_its_records() {
    let engine = engine().await;
    let alice = user(&engine, "alice@example.com").await;
    let wallet = account(&engine, &alice, "Wallet").await;
    let bank = account(&engine, &alice, "Bank").await;
    for target in [wallet.id, wallet.id, bank.id] {
        engine
            .create_record(
                &alice,
                NewRecord::new(target, amount("1"), "Item", day(2024, 1, 1)),
            )
            .await
            .unwrap();
    }
    assert_eq!(
        engine.account(&alice, wallet.id).await.unwrap().record_ids.len(),
        2
    );

    engine.delete_account(&alice, wallet.id).await.unwrap();

    let records = engine
        .list_records(&alice, &RecordFilter::default(), &Pagination::default())
        .await
        .unwrap();
    assert_eq!(records.total_items, 1);
    assert_eq!(records.items[0].account.id, bank.id);
    assert_eq!(
        engine.delete_account(&alice, wallet.id).await.unwrap_err(),
        EngineError::AccountNotFound(wallet.id)
    );
}
