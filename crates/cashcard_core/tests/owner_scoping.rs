use cashcard_core::db::open_db_in_memory;
use cashcard_core::{
    CallerIdentity, CardRepository, CardService, CardServiceError, Decimal, PageRequest,
    PageSettings, SqliteCardRepository,
};
use rusqlite::Connection;

#[test]
fn owner_reads_own_card() {
    let conn = seeded_db();
    let service = service(&conn);

    let card = service.find_by_id(99, &caller("sarah1")).unwrap();
    assert_eq!(card.id, 99);
    assert_eq!(card.amount, amount("123.45"));
    assert_eq!(card.owner, "sarah1");
}

#[test]
fn foreign_and_missing_cards_are_indistinguishable() {
    let conn = seeded_db();
    let service = service(&conn);

    let foreign = service.find_by_id(102, &caller("sarah1")).unwrap_err();
    let missing = service.find_by_id(1000, &caller("sarah1")).unwrap_err();

    assert!(matches!(foreign, CardServiceError::NotFound(102)));
    assert!(matches!(missing, CardServiceError::NotFound(1000)));
    assert_eq!(foreign.to_string(), "cash card not found: 102");
}

#[test]
fn create_stamps_caller_as_owner() {
    let conn = seeded_db();
    let service = service(&conn);

    let created = service.create(amount("250.00"), &caller("sarah1")).unwrap();
    assert_eq!(created.owner, "sarah1");
    assert_eq!(created.amount, amount("250"));

    let loaded = service.find_by_id(created.id, &caller("sarah1")).unwrap();
    assert_eq!(loaded, created);
    assert!(service.find_by_id(created.id, &caller("kumar2")).is_err());
}

#[test]
fn list_never_returns_foreign_cards() {
    let conn = seeded_db();
    let service = service(&conn);

    let sarah = service
        .list(&PageRequest::default(), &caller("sarah1"))
        .unwrap();
    assert_eq!(sarah.items.len(), 3);
    assert!(sarah.items.iter().all(|card| card.owner == "sarah1"));

    let kumar = service
        .list(&PageRequest::default(), &caller("kumar2"))
        .unwrap();
    let ids: Vec<_> = kumar.items.iter().map(|card| card.id).collect();
    assert_eq!(ids, vec![102]);

    let nobody = service
        .list(&PageRequest::default(), &caller("hank-owns-no-cards"))
        .unwrap();
    assert!(nobody.items.is_empty());
}

#[test]
fn update_changes_amount_only() {
    let conn = seeded_db();
    let service = service(&conn);

    service
        .update(99, amount("19.99"), &caller("sarah1"))
        .unwrap();

    let card = service.find_by_id(99, &caller("sarah1")).unwrap();
    assert_eq!(card.id, 99);
    assert_eq!(card.amount, amount("19.99"));
    assert_eq!(card.owner, "sarah1");
}

#[test]
fn update_of_foreign_card_leaves_it_untouched() {
    let conn = seeded_db();
    let service = service(&conn);

    let err = service
        .update(102, amount("333.33"), &caller("sarah1"))
        .unwrap_err();
    assert!(matches!(err, CardServiceError::NotFound(102)));

    let untouched = service.find_by_id(102, &caller("kumar2")).unwrap();
    assert_eq!(untouched.amount, amount("200"));
}

#[test]
fn update_of_missing_card_is_not_found() {
    let conn = seeded_db();
    let service = service(&conn);

    let err = service
        .update(99999, amount("1"), &caller("sarah1"))
        .unwrap_err();
    assert!(matches!(err, CardServiceError::NotFound(99999)));
}

#[test]
fn update_rejects_unrepresentable_amount() {
    let conn = seeded_db();
    let service = service(&conn);

    let err = service
        .update(99, amount("0.000001"), &caller("sarah1"))
        .unwrap_err();
    assert!(matches!(err, CardServiceError::Validation(_)));
    assert_eq!(
        service.find_by_id(99, &caller("sarah1")).unwrap().amount,
        amount("123.45")
    );
}

#[test]
fn delete_then_get_is_not_found() {
    let conn = seeded_db();
    let service = service(&conn);

    service.delete(99, &caller("sarah1")).unwrap();
    let err = service.find_by_id(99, &caller("sarah1")).unwrap_err();
    assert!(matches!(err, CardServiceError::NotFound(99)));

    let again = service.delete(99, &caller("sarah1")).unwrap_err();
    assert!(matches!(again, CardServiceError::NotFound(99)));
}

#[test]
fn delete_of_foreign_card_keeps_it() {
    let conn = seeded_db();
    let service = service(&conn);

    let err = service.delete(102, &caller("sarah1")).unwrap_err();
    assert!(matches!(err, CardServiceError::NotFound(102)));

    let repo = SqliteCardRepository::try_new(&conn).unwrap();
    assert!(repo.get_card(102).unwrap().is_some());
}

fn service(conn: &Connection) -> CardService<SqliteCardRepository<'_>> {
    let repo = SqliteCardRepository::try_new(conn).unwrap();
    CardService::new(repo, PageSettings::default())
}

fn seeded_db() -> Connection {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO cash_cards (id, amount_units, owner) VALUES
            (99, 1234500, 'sarah1'),
            (100, 10000, 'sarah1'),
            (101, 1500000, 'sarah1'),
            (102, 2000000, 'kumar2');",
    )
    .unwrap();
    conn
}

fn caller(name: &str) -> CallerIdentity {
    CallerIdentity::new(name).unwrap()
}

fn amount(value: &str) -> Decimal {
    value.parse().unwrap()
}
