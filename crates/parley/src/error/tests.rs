//! Unit tests for domain error types.

use std::io;

use rstest::rstest;

use super::*;

#[test]
fn coercion_error_lists_valid_members() {
    let error = CoercionError::new("mode", "loud", "mode")
        .with_valid(vec!["quiet".into(), "normal".into()]);
    assert_eq!(
        error.to_string(),
        "cannot convert 'loud' for parameter 'mode': expected mode (one of: quiet, normal)"
    );
}

#[test]
fn coercion_error_without_members_has_no_suffix() {
    let error = CoercionError::new("b", "abc", "integer");
    assert_eq!(
        error.to_string(),
        "cannot convert 'abc' for parameter 'b': expected integer"
    );
}

#[rstest]
#[case::missing(BindError::missing("a"), "a")]
#[case::coercion(BindError::from(CoercionError::new("b", "x", "integer")), "b")]
fn bind_error_reports_parameter(#[case] error: BindError, #[case] expected: &str) {
    assert_eq!(error.parameter(), expected);
}

#[rstest]
#[case::empty(DispatchError::EmptyInput, FailureKind::EmptyInput, None)]
#[case::prefix(DispatchError::missing_prefix("/"), FailureKind::MissingPrefix, None)]
#[case::unknown(
    DispatchError::unknown_command("unknown"),
    FailureKind::UnknownCommand,
    Some("unknown")
)]
#[case::incomplete(
    DispatchError::incomplete_command("team", vec!["add".into()]),
    FailureKind::IncompleteCommand,
    Some("team")
)]
#[case::denied(
    DispatchError::permission_denied("secret", "admin"),
    FailureKind::PermissionDenied,
    Some("secret")
)]
#[case::missing(
    DispatchError::binding("k", BindError::missing("a")),
    FailureKind::MissingArgument,
    Some("a")
)]
#[case::coercion(
    DispatchError::binding("k", CoercionError::new("b", "abc", "integer").into()),
    FailureKind::Coercion,
    Some("b")
)]
fn dispatch_error_classifies_failures(
    #[case] error: DispatchError,
    #[case] kind: FailureKind,
    #[case] offending: Option<&str>,
) {
    assert_eq!(error.kind(), kind);
    assert_eq!(error.offending_name(), offending);
}

#[test]
fn handler_error_is_carried_unchanged() {
    let error = DispatchError::handler("k", Box::new(io::Error::other("disk full")));

    assert_eq!(error.kind(), FailureKind::Handler);
    assert_eq!(error.to_string(), "disk full");
    let inner = error
        .handler_error()
        .and_then(|source| source.downcast_ref::<io::Error>())
        .expect("handler error should downcast to io::Error");
    assert_eq!(inner.kind(), io::ErrorKind::Other);
}

#[test]
fn unknown_command_message_names_command() {
    let message = DispatchError::unknown_command("unknown").to_string();
    assert!(message.contains("unknown"), "message: {message}");
}

#[test]
fn incomplete_command_lists_branches() {
    let error = DispatchError::incomplete_command("team", vec!["add".into(), "remove".into()]);

    assert_eq!(error.branches(), ["add", "remove"]);
    assert_eq!(
        error.to_string(),
        "incomplete command 'team': expected one of add, remove"
    );
    assert!(DispatchError::EmptyInput.branches().is_empty());
}

#[test]
fn permission_denied_names_permission_and_command() {
    let message = DispatchError::permission_denied("secret", "admin").to_string();
    assert_eq!(message, "permission 'admin' is required to run 'secret'");
}

#[rstest]
#[case(FailureKind::UnknownCommand, "unknown_command")]
#[case(FailureKind::IncompleteCommand, "incomplete_command")]
#[case(FailureKind::PermissionDenied, "permission_denied")]
#[case(FailureKind::MissingArgument, "missing_argument")]
#[case(FailureKind::Handler, "handler")]
fn failure_kind_displays_snake_case(#[case] kind: FailureKind, #[case] expected: &str) {
    assert_eq!(kind.to_string(), expected);
}

#[test]
fn registry_conflict_names_both_sides() {
    let error = RegistryError::Conflict {
        name: "tp".into(),
        existing: "teleport".into(),
    };
    assert_eq!(
        error.to_string(),
        "'tp' is already registered by command 'teleport'"
    );
}
