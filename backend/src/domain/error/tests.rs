//! Tests for the service error payload and its serialised shape.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

#[fixture]
fn not_found_with_key() -> Error {
    Error::not_found("author not found").with_details(json!({ "name": "Same" }))
}

#[rstest]
#[case(Error::invalid_input("bad"), ErrorCode::InvalidInput)]
#[case(Error::not_found("missing"), ErrorCode::NotFound)]
#[case(Error::internal("boom"), ErrorCode::Internal)]
fn convenience_constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::InvalidInput, "   ");
    assert_eq!(result, Err(ErrorValidationError::EmptyMessage));
}

#[rstest]
#[case(ErrorCode::InvalidInput, "invalid input")]
#[case(ErrorCode::NotFound, "not found")]
#[case(ErrorCode::Internal, "internal error")]
fn blank_messages_fall_back_to_the_code_default(#[case] code: ErrorCode, #[case] expected: &str) {
    let error = Error::new(code, " ");
    assert_eq!(error.message(), expected);
    assert_eq!(error.code(), code);
}

#[rstest]
fn display_uses_message(not_found_with_key: Error) {
    assert_eq!(not_found_with_key.to_string(), "author not found");
}

#[rstest]
fn serialises_code_message_and_details(not_found_with_key: Error) {
    let value = serde_json::to_value(&not_found_with_key).expect("serialise error");
    assert_eq!(
        value,
        json!({
            "code": "not_found",
            "message": "author not found",
            "details": { "name": "Same" },
        })
    );
}

#[rstest]
fn omits_details_when_absent() {
    let value = serde_json::to_value(Error::internal("boom")).expect("serialise error");
    assert_eq!(value, json!({ "code": "internal", "message": "boom" }));
}

#[rstest]
#[case(ErrorCode::InvalidInput, "invalid_input")]
#[case(ErrorCode::NotFound, "not_found")]
#[case(ErrorCode::Internal, "internal")]
fn code_display_matches_wire_format(#[case] code: ErrorCode, #[case] expected: &str) {
    assert_eq!(code.to_string(), expected);
    assert_eq!(
        serde_json::to_value(code).expect("serialise code"),
        json!(expected)
    );
}
