// crates/webhook-chat-e2e/src/tests/session.rs
// ============================================================================
// Module: Session Identity Tests
// Description: Unit tests for session identifiers and the session context.
// Purpose: Ensure identifiers are unique UUIDs and isolation never reuses main.
// Dependencies: proptest, uuid
// ============================================================================

use std::collections::BTreeSet;

use proptest::prelude::*;

use crate::session::SESSION_PREFIX_LEN;
use crate::session::SessionContext;
use crate::session::SessionId;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn random_session_ids_are_hyphenated_v4_uuids() {
    let id = SessionId::new_random();
    let parsed = uuid::Uuid::parse_str(id.as_str()).expect("uuid");
    assert_eq!(parsed.get_version_num(), 4);
    assert_eq!(id.as_str().len(), 36);
    assert_eq!(id.as_str().matches('-').count(), 4);
}

#[test]
fn random_session_ids_do_not_repeat() {
    let ids: BTreeSet<String> =
        (0 .. 1_000).map(|_| SessionId::new_random().as_str().to_string()).collect();
    assert_eq!(ids.len(), 1_000);
}

#[test]
fn short_prefix_is_first_eight_characters() {
    let id = SessionId::new("0123456789abcdef");
    assert_eq!(id.short(), "01234567");
    assert_eq!(SessionId::new_random().short().len(), SESSION_PREFIX_LEN);
}

#[test]
fn short_prefix_of_short_id_is_whole_id() {
    assert_eq!(SessionId::new("abc").short(), "abc");
}

#[test]
fn isolated_session_differs_from_main() {
    let sessions = SessionContext::new();
    for _ in 0 .. 100 {
        assert_ne!(&sessions.isolated(), sessions.main());
    }
}

#[test]
fn main_session_is_stable_for_the_context() {
    let main = SessionId::new("fixed-main-session");
    let sessions = SessionContext::with_main(main.clone());
    assert_eq!(sessions.main(), &main);
    assert_eq!(sessions.main(), &main);
    assert_eq!(sessions.main().to_string(), "fixed-main-session");
}

proptest! {
    #[test]
    fn short_prefix_is_a_char_prefix(value in "\\PC{0,24}") {
        let id = SessionId::new(value.clone());
        let short = id.short();
        prop_assert!(value.starts_with(short));
        prop_assert_eq!(short.chars().count(), value.chars().count().min(SESSION_PREFIX_LEN));
    }
}
