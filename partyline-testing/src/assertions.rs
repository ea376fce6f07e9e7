// Assertions over partyline answers and responses

use partyline_core::{Response, Rsvp};
use serde_json::Value;

/// Assert that `ask_around` answers match, in registration order
pub fn assert_answers(actual: &[Value], expected: &[Value]) {
    assert_eq!(
        actual, expected,
        "Expected answers {:?}, got {:?}",
        expected, actual
    );
}

/// Assert the answers match ignoring order
pub fn assert_answers_unordered(actual: &[Value], expected: &[Value]) {
    let mut actual_sorted: Vec<String> = actual.iter().map(Value::to_string).collect();
    let mut expected_sorted: Vec<String> = expected.iter().map(Value::to_string).collect();
    actual_sorted.sort();
    expected_sorted.sort();
    assert_eq!(
        actual_sorted, expected_sorted,
        "Expected answers {:?} in any order, got {:?}",
        expected, actual
    );
}

/// Assert that a response has a specific status code
pub fn assert_status(response: &Response, expected: u16) {
    assert_eq!(
        response.status, expected,
        "Expected status {}, got {}",
        expected, response.status
    );
}

/// Assert that a response body contains a string
pub fn assert_body_contains(response: &Response, expected: &str) {
    let body = response.body_text();
    assert!(
        body.contains(expected),
        "Expected body to contain '{}', but it didn't. Body: {}",
        expected,
        body
    );
}

/// Assert that every invitation was accepted
pub fn assert_all_accepted(rsvps: &[Rsvp]) {
    let declined: Vec<&str> = rsvps
        .iter()
        .filter(|rsvp| !rsvp.is_accepted())
        .map(|rsvp| rsvp.path.as_str())
        .collect();
    assert!(
        declined.is_empty(),
        "Expected every invitation to be accepted, declined: {:?}",
        declined
    );
}
