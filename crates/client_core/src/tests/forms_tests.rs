use super::*;

use serde_json::json;
use shared::domain::ProductId;

fn filled_user() -> UserDraft {
    UserDraft {
        first_name: " Joana ".to_string(),
        last_name: "Reis".to_string(),
        nickname: String::new(),
        room: "8".to_string(),
        role: "Equipe".parse().expect("known role"),
        initial_balance: String::new(),
    }
}

#[test]
fn staff_user_is_sent_with_role_code_two() {
    let payload = filled_user().to_payload().expect("valid draft");
    assert_eq!(
        serde_json::to_value(&payload).expect("serialize"),
        json!({"nome": "Joana", "sobrenome": "Reis", "quarto": "8", "tipo_usuario": 2})
    );
}

#[test]
fn user_optionals_are_parsed_when_present() {
    let mut draft = filled_user();
    draft.nickname = "Jo".to_string();
    draft.initial_balance = "25,5".to_string();

    let payload = draft.to_payload().expect("valid draft");
    assert_eq!(payload.nickname.as_deref(), Some("Jo"));
    assert_eq!(payload.initial_balance, Some(Money::from_cents(2550)));
}

#[test]
fn user_requires_names_and_room() {
    let mut draft = filled_user();
    draft.room = "   ".to_string();
    assert_eq!(
        draft.to_payload(),
        Err(ValidationError::Required { field: "room" })
    );

    let draft = UserDraft::default();
    assert_eq!(draft.to_payload().map_err(|e| e.field()), Err("first name"));
}

#[test]
fn user_rejects_garbage_balance() {
    let mut draft = filled_user();
    draft.initial_balance = "dez".to_string();
    assert!(matches!(
        draft.to_payload(),
        Err(ValidationError::NotANumber { field: "initial balance", .. })
    ));
}

#[test]
fn deposit_accepts_comma_decimal() {
    let draft = BalanceDraft {
        operation: BalanceOperation::Deposit,
        amount: "10,50".to_string(),
    };
    let change = draft.to_payload().expect("valid amount");
    assert_eq!(change.amount, Money::from_cents(1050));
    assert_eq!(
        serde_json::to_value(change.request()).expect("serialize"),
        json!({"valor": 10.5})
    );
}

#[test]
fn balance_amount_must_be_a_positive_number() {
    for (input, expected) in [
        ("", ValidationError::Required { field: "amount" }),
        (
            "abc",
            ValidationError::NotANumber {
                field: "amount",
                value: "abc".to_string(),
            },
        ),
        (
            "NaN",
            ValidationError::NotANumber {
                field: "amount",
                value: "NaN".to_string(),
            },
        ),
        ("0", ValidationError::NotPositive { field: "amount" }),
        ("-3", ValidationError::NotPositive { field: "amount" }),
        (
            "0,004",
            ValidationError::BelowOneCent {
                field: "amount",
                value: "0,004".to_string(),
            },
        ),
    ] {
        let draft = BalanceDraft {
            operation: BalanceOperation::Withdraw,
            amount: input.to_string(),
        };
        assert_eq!(draft.to_payload(), Err(expected), "input {input:?}");
    }
}

#[test]
fn product_draft_parses_quantity_and_price() {
    let draft = ProductDraft {
        name: "Pipoca".to_string(),
        quantity: "12".to_string(),
        kind: "Snack".to_string(),
        price: "3,50".to_string(),
    };
    let payload = draft.to_payload().expect("valid draft");
    assert_eq!(payload.quantity, 12);
    assert_eq!(payload.price, Money::from_cents(350));

    let mut bad = draft.clone();
    bad.quantity = "1.5".to_string();
    assert!(matches!(
        bad.to_payload(),
        Err(ValidationError::NotAQuantity { field: "quantity", .. })
    ));

    let mut free = draft.clone();
    free.price = "0".to_string();
    assert_eq!(free.to_payload().map(|p| p.price), Ok(Money::ZERO));

    let mut bad = draft;
    bad.price = "-1,00".to_string();
    assert_eq!(
        bad.to_payload(),
        Err(ValidationError::Negative { field: "price" })
    );
}

#[test]
fn free_product_can_still_be_renamed() {
    let product = Product {
        id: ProductId::from(3),
        name: "Agua".to_string(),
        quantity: 40,
        kind: "Bebida".to_string(),
        price: Money::ZERO,
    };
    let mut draft = ProductEditDraft::from_product(&product);
    assert_eq!(draft.price, "0.00");

    draft.name = "Agua gelada".to_string();
    let update = draft.to_payload().expect("zero price is valid");
    assert_eq!(
        serde_json::to_value(update).expect("serialize"),
        json!({"nome": "Agua gelada", "tipo": "Bebida", "preco": 0.0})
    );
}

#[test]
fn sub_cent_amount_explains_the_rounding() {
    let draft = BalanceDraft {
        operation: BalanceOperation::Deposit,
        amount: "0,004".to_string(),
    };
    let err = draft.to_payload().expect_err("rounds to zero");
    assert_eq!(err.field(), "amount");
    assert_eq!(
        err.to_string(),
        "amount must be at least one cent (got \"0,004\")"
    );
}

#[test]
fn edit_draft_keeps_quantity_out_of_the_payload() {
    let product = Product {
        id: ProductId::from(9),
        name: "Suco".to_string(),
        quantity: 14,
        kind: "Bebida".to_string(),
        price: Money::from_cents(450),
    };
    let mut draft = ProductEditDraft::from_product(&product);
    assert_eq!(draft.price, "4.50");
    assert_eq!(draft.quantity, 14);

    draft.quantity = 999;
    draft.name = "Suco de uva".to_string();
    let value = serde_json::to_value(draft.to_payload().expect("valid edit")).expect("serialize");
    assert_eq!(value, json!({"nome": "Suco de uva", "tipo": "Bebida", "preco": 4.5}));
}

#[test]
fn stock_delta_must_be_a_positive_integer() {
    assert_eq!(parse_stock_delta(" 4 "), Ok(StockAdjustment { delta: 4 }));
    assert_eq!(
        parse_stock_delta("0"),
        Err(ValidationError::NotPositive { field: "delta" })
    );
    assert_eq!(
        parse_stock_delta("-2"),
        Err(ValidationError::NotPositive { field: "delta" })
    );
    assert!(matches!(
        parse_stock_delta("two"),
        Err(ValidationError::NotANumber { field: "delta", .. })
    ));
    assert_eq!(
        parse_stock_delta(""),
        Err(ValidationError::Required { field: "delta" })
    );
}
