use cashcard_core::{CardPayload, CashCard, Decimal};
use serde_json::{json, Value};

#[test]
fn card_serializes_amount_as_number() {
    let card = sample_card(99, "123.45");

    let value: Value = serde_json::to_value(&card).unwrap();
    assert_eq!(value, json!({ "id": 99, "amount": 123.45, "owner": "sarah1" }));
    assert!(value["amount"].is_number());
}

#[test]
fn card_deserializes_from_wire_shape() {
    let card: CashCard =
        serde_json::from_str(r#"{"id": 1000, "amount": 67.89, "owner": "sarah1"}"#).unwrap();

    assert_eq!(card.id, 1000);
    assert_eq!(card.amount, "67.89".parse::<Decimal>().unwrap());
    assert_eq!(card.owner, "sarah1");
}

#[test]
fn card_list_serializes_as_array() {
    let cards = vec![
        sample_card(99, "123.45"),
        sample_card(100, "1.00"),
        sample_card(101, "150.00"),
    ];

    let value: Value = serde_json::to_value(&cards).unwrap();
    assert_eq!(
        value,
        json!([
            { "id": 99, "amount": 123.45, "owner": "sarah1" },
            { "id": 100, "amount": 1.0, "owner": "sarah1" },
            { "id": 101, "amount": 150.0, "owner": "sarah1" }
        ])
    );
}

#[test]
fn payload_without_id_or_owner_is_accepted() {
    let payload: CardPayload = serde_json::from_str(r#"{"amount": -25.5}"#).unwrap();

    assert_eq!(payload.id, None);
    assert_eq!(payload.owner, None);
    assert_eq!(payload.amount, "-25.5".parse::<Decimal>().unwrap());
}

#[test]
fn payload_rejects_non_numeric_amount() {
    let result = serde_json::from_str::<CardPayload>(r#"{"amount": "lots"}"#);
    assert!(result.is_err());
}

fn sample_card(id: i64, amount: &str) -> CashCard {
    CashCard {
        id,
        amount: amount.parse().unwrap(),
        owner: "sarah1".to_string(),
    }
}
