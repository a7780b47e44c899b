/// Property-based tests using proptest
/// Tests invariants of customer validation and identifier parsing for all inputs
use customer_records::errors::ValidationError;
use customer_records::models::{parse_date, validate, CustomerCandidate};
use customer_records::services::parse_customer_id;
use proptest::prelude::*;
use serde_json::{json, Value};

fn candidate(name: Value, dob: Value, member: Value, interests: Value) -> CustomerCandidate {
    serde_json::from_value(json!({
        "name": name,
        "dateOfBirth": dob,
        "memberNumber": member,
        "interests": interests,
    }))
    .unwrap()
}

// Property: Validation and parsing should never panic
proptest! {
    #[test]
    fn validation_never_panics(
        name in "\\PC*",
        dob in "\\PC*",
        member in "\\PC*",
        interests in "\\PC*"
    ) {
        let _ = validate(&candidate(json!(name), json!(dob), json!(member), json!(interests)));
    }

    #[test]
    fn id_parsing_never_panics(raw in "\\PC*") {
        let _ = parse_customer_id(&raw);
    }

    #[test]
    fn date_parsing_never_panics(raw in "\\PC*") {
        let _ = parse_date(&raw);
    }
}

// Property: Normalization trims text and keeps the member number
proptest! {
    #[test]
    fn valid_candidates_are_trimmed(
        pad_left in "[ \t]{0,3}",
        pad_right in "[ \t]{0,3}",
        name in "[A-Za-z][A-Za-z ]{0,20}[A-Za-z]",
        interests in "[a-z]{1,12}(, [a-z]{1,12}){0,3}",
        member in 1i64..=1_000_000_000,
        year in 1900i32..=2020,
        month in 1u32..=12,
        day in 1u32..=28
    ) {
        let dob = format!("{:04}-{:02}-{:02}", year, month, day);
        let fields = validate(&candidate(
            json!(format!("{}{}{}", pad_left, name, pad_right)),
            json!(dob),
            json!(member),
            json!(format!("{}{}{}", pad_left, interests, pad_right)),
        ))
        .unwrap();

        prop_assert_eq!(fields.name, name);
        prop_assert_eq!(fields.interests, interests);
        prop_assert_eq!(fields.member_number, member);
        prop_assert_eq!(fields.date_of_birth.format("%Y-%m-%d").to_string(), dob);
    }

    #[test]
    fn member_numbers_below_one_rejected(member in i64::MIN..=0) {
        let err = validate(&candidate(json!("Ada"), json!("1990-01-01"), json!(member), json!("math")))
            .unwrap_err();
        prop_assert_eq!(err.field(), "memberNumber");
    }

    #[test]
    fn numeric_strings_coerce_like_numbers(member in 1i64..=1_000_000) {
        let from_string = validate(&candidate(
            json!("Ada"), json!("1990-01-01"), json!(member.to_string()), json!("math"),
        )).unwrap();
        prop_assert_eq!(from_string.member_number, member);
    }

    #[test]
    fn blank_name_always_reported_first(blank in "[ \t\n]{0,5}") {
        // Everything else is missing too, but name is checked first
        let err = validate(&candidate(json!(blank), Value::Null, Value::Null, Value::Null)).unwrap_err();
        prop_assert_eq!(err, ValidationError::Missing("name"));
    }
}

// Property: Identifiers must be UUIDs
proptest! {
    #[test]
    fn hex_object_ids_are_not_identifiers(raw in "[0-9a-f]{24}") {
        prop_assert!(parse_customer_id(&raw).is_err());
    }

    #[test]
    fn uuid_strings_always_parse(bytes in proptest::array::uniform16(any::<u8>())) {
        let id = uuid::Uuid::from_bytes(bytes);
        prop_assert_eq!(parse_customer_id(&id.to_string()).unwrap(), id);
    }
}
