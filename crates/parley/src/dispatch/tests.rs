//! Unit tests for the dispatch pipeline.

use std::io;
use std::sync::{Arc, Mutex};

use parley_config::{Config, EnumMatching};
use rstest::{fixture, rstest};

use super::*;
use crate::descriptor::{CommandBuilder, CommandDescriptor, Parameter};
use crate::error::{FailureKind, HandlerError};
use crate::sender::SenderSlot;
use crate::value::{EnumType, ScalarType, Value, ValueType};

#[derive(Debug)]
struct Sub1;

impl Sender for Sub1 {
    fn name(&self) -> &str {
        "sub1"
    }
}

#[derive(Debug)]
struct Sub2;

impl Sender for Sub2 {
    fn name(&self) -> &str {
        "sub2"
    }
}

/// A caller holding only the permissions it lists.
#[derive(Debug)]
struct Guest(&'static [&'static str]);

impl Sender for Guest {
    fn name(&self) -> &str {
        "guest"
    }

    fn has_permission(&self, permission: &str) -> bool {
        self.0.iter().any(|held| *held == permission)
    }
}

type Seen = Arc<Mutex<Vec<(String, Value)>>>;

struct Harness {
    dispatcher: Dispatcher,
    seen: Seen,
    caller: Arc<dyn Sender>,
}

fn recording_command(name: &str, parameters: Vec<Parameter>, seen: &Seen) -> CommandDescriptor {
    recording_builder(name, parameters, seen)
        .build()
        .expect("valid descriptor")
}

fn recording_builder(name: &str, parameters: Vec<Parameter>, seen: &Seen) -> CommandBuilder {
    let sink = Arc::clone(seen);
    parameters
        .into_iter()
        .fold(CommandDescriptor::builder(name), CommandBuilder::parameter)
        .handler(move |arguments, _| {
            let mut recorded = sink.lock().map_err(|_| "poisoned")?;
            recorded.extend(
                arguments
                    .iter()
                    .map(|(parameter, value)| (parameter.to_owned(), value.clone())),
            );
            Ok(Reply::Empty)
        })
}

#[fixture]
fn harness() -> Harness {
    let seen: Seen = Arc::default();
    let commands = CommandRegistry::default();
    commands
        .register(recording_command(
            "k",
            vec![
                Parameter::required("a", ValueType::STRING),
                Parameter::required("b", ValueType::INTEGER),
                Parameter::required("list", ValueType::List(ScalarType::Double)),
            ],
            &seen,
        ))
        .expect("register k");
    commands
        .register(recording_command(
            "d",
            vec![Parameter::optional("c", ValueType::INTEGER, 3)],
            &seen,
        ))
        .expect("register d");
    commands
        .register(recording_command(
            "team add",
            vec![Parameter::required("member", ValueType::STRING)],
            &seen,
        ))
        .expect("register team add");
    commands
        .register(recording_command(
            "say",
            vec![Parameter::required("message", ValueType::STRING)],
            &seen,
        ))
        .expect("register say");
    commands
        .register(recording_command("say hello world", Vec::new(), &seen))
        .expect("register say hello world");
    commands
        .register(
            recording_builder(
                "secret",
                vec![Parameter::required("code", ValueType::INTEGER)],
                &seen,
            )
            .permission("admin")
            .build()
            .expect("valid descriptor"),
        )
        .expect("register secret");

    Harness {
        dispatcher: Dispatcher::new(Arc::new(commands), Arc::new(SenderRegistry::new())),
        seen,
        caller: Arc::new(Sub1),
    }
}

impl Harness {
    fn run(&self, line: &str) -> Result<Reply, DispatchError> {
        self.dispatcher.dispatch(&self.caller, line)
    }

    fn seen(&self) -> Vec<(String, Value)> {
        self.seen.lock().expect("lock").clone()
    }
}

#[rstest]
fn binds_positional_and_trailing_arguments(harness: Harness) {
    let reply = harness.run("k abc 123 0.0 0.5").expect("dispatch succeeds");
    assert!(reply.is_empty());
    assert_eq!(
        harness.seen(),
        vec![
            ("a".to_owned(), Value::from("abc")),
            ("b".to_owned(), Value::Integer(123)),
            (
                "list".to_owned(),
                Value::List(vec![Value::Double(0.0), Value::Double(0.5)])
            ),
        ]
    );
}

#[rstest]
fn omitted_parameter_uses_default(harness: Harness) {
    harness.run("d").expect("dispatch succeeds");
    assert_eq!(harness.seen(), vec![("c".to_owned(), Value::Integer(3))]);
}

#[rstest]
fn subcommand_words_are_not_arguments(harness: Harness) {
    harness.run("team add alice").expect("dispatch succeeds");
    assert_eq!(harness.seen(), vec![("member".to_owned(), Value::from("alice"))]);
}

#[rstest]
#[case::empty("", FailureKind::EmptyInput, None)]
#[case::unknown("unknown", FailureKind::UnknownCommand, Some("unknown"))]
#[case::group("team", FailureKind::IncompleteCommand, Some("team"))]
#[case::group_with_unknown_word("team kick bob", FailureKind::IncompleteCommand, Some("team"))]
#[case::missing("k abc", FailureKind::MissingArgument, Some("b"))]
#[case::coercion("k abc many 0.5", FailureKind::Coercion, Some("b"))]
fn failures_are_classified(
    harness: Harness,
    #[case] line: &str,
    #[case] kind: FailureKind,
    #[case] offending: Option<&str>,
) {
    let error = harness.run(line).expect_err("dispatch fails");
    assert_eq!(error.kind(), kind);
    assert_eq!(error.offending_name(), offending);
    assert!(harness.seen().is_empty(), "handler must not run");
}

#[rstest]
fn incomplete_command_lists_next_words(harness: Harness) {
    let error = harness.run("team").expect_err("team is a group");
    assert_eq!(error.branches(), ["add"]);
}

#[rstest]
fn quoted_argument_is_not_a_subcommand_word(harness: Harness) {
    harness
        .run("say \"hello world\"")
        .expect("dispatch succeeds");
    assert_eq!(
        harness.seen(),
        vec![("message".to_owned(), Value::from("hello world"))]
    );
}

#[rstest]
fn bare_words_still_reach_the_subcommand(harness: Harness) {
    harness.run("say hello world").expect("dispatch succeeds");
    assert!(harness.seen().is_empty(), "subcommand binds no arguments");
}

#[rstest]
#[case::lacks_permission(&[], false)]
#[case::holds_other_permission(&["moderator"], false)]
#[case::holds_permission(&["admin"], true)]
fn permission_gates_the_handler(
    harness: Harness,
    #[case] held: &'static [&'static str],
    #[case] allowed: bool,
) {
    let caller: Arc<dyn Sender> = Arc::new(Guest(held));
    let outcome = harness.dispatcher.dispatch(&caller, "secret 7");

    if allowed {
        outcome.expect("dispatch succeeds");
        assert_eq!(harness.seen(), vec![("code".to_owned(), Value::Integer(7))]);
    } else {
        let error = outcome.expect_err("permission denied");
        assert_eq!(error.kind(), FailureKind::PermissionDenied);
        assert_eq!(error.offending_name(), Some("secret"));
        assert!(harness.seen().is_empty(), "handler must not run");
    }
}

#[rstest]
fn permission_is_checked_before_arguments(harness: Harness) {
    let caller: Arc<dyn Sender> = Arc::new(Guest(&[]));
    let error = harness
        .dispatcher
        .dispatch(&caller, "secret")
        .expect_err("permission denied");
    assert_eq!(error.kind(), FailureKind::PermissionDenied);
}

#[rstest]
fn senders_hold_every_permission_by_default(harness: Harness) {
    harness.run("secret 7").expect("default sender is allowed");
}

#[rstest]
fn dispatch_is_repeatable(harness: Harness) {
    let first = harness.run("unknown x").expect_err("unknown");
    let second = harness.run("unknown x").expect_err("unknown");
    assert_eq!(first.to_string(), second.to_string());
    assert_eq!(first.kind(), second.kind());
}

#[test]
fn strict_slot_without_adapter_binds_absent() {
    let observed = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&observed);
    let commands = CommandRegistry::default();
    commands
        .register(
            CommandDescriptor::builder("whois")
                .sender(SenderSlot::primary("sender"))
                .sender(SenderSlot::strict::<Sub2>("target"))
                .handler(move |_, senders| {
                    let mut slot = sink.lock().map_err(|_| "poisoned")?;
                    *slot = Some((senders.is_bound("sender"), senders.is_bound("target")));
                    Ok(())
                })
                .build()
                .expect("valid descriptor"),
        )
        .expect("register");
    let dispatcher = Dispatcher::new(Arc::new(commands), Arc::new(SenderRegistry::new()));
    let caller: Arc<dyn Sender> = Arc::new(Sub1);

    dispatcher.dispatch(&caller, "whois").expect("dispatch succeeds");
    assert_eq!(*observed.lock().expect("lock"), Some((true, false)));
}

#[test]
fn handler_error_is_returned_verbatim() {
    let commands = CommandRegistry::default();
    commands
        .register(
            CommandDescriptor::builder("fail")
                .handler(|_, _| -> Result<Reply, HandlerError> {
                    Err(io::Error::new(io::ErrorKind::PermissionDenied, "nope").into())
                })
                .build()
                .expect("valid descriptor"),
        )
        .expect("register");
    let dispatcher = Dispatcher::new(Arc::new(commands), Arc::new(SenderRegistry::new()));
    let caller: Arc<dyn Sender> = Arc::new(Sub1);

    let error = dispatcher.dispatch(&caller, "fail").expect_err("handler fails");
    assert_eq!(error.kind(), FailureKind::Handler);
    let inner = error
        .handler_error()
        .and_then(|source| source.downcast_ref::<io::Error>())
        .expect("io error preserved");
    assert_eq!(inner.kind(), io::ErrorKind::PermissionDenied);
}

#[rstest]
fn prefix_is_required_and_stripped(harness: Harness) {
    let dispatcher = harness.dispatcher.clone().with_prefix("/");

    let error = dispatcher
        .dispatch(&harness.caller, "d")
        .expect_err("missing prefix");
    assert_eq!(error.kind(), FailureKind::MissingPrefix);

    dispatcher
        .dispatch(&harness.caller, "/d 9")
        .expect("prefixed line dispatches");
    assert_eq!(harness.seen(), vec![("c".to_owned(), Value::Integer(9))]);
}

#[test]
fn config_selects_prefix_and_enum_policy() {
    let config = Config {
        enum_matching: EnumMatching::IgnoreCase,
        command_prefix: Some("!".into()),
        ..Config::default()
    };
    let commands = CommandRegistry::from_config(&config);
    commands
        .register(
            CommandDescriptor::builder("mode")
                .parameter(Parameter::required(
                    "level",
                    ValueType::enumeration(EnumType::new("level", ["Low", "High"])),
                ))
                .handler(|arguments, _| Ok(arguments.value::<String>("level")?))
                .build()
                .expect("valid descriptor"),
        )
        .expect("register");
    let dispatcher =
        Dispatcher::from_config(&config, Arc::new(commands), Arc::new(SenderRegistry::new()));
    let caller: Arc<dyn Sender> = Arc::new(Sub1);

    let reply = dispatcher
        .dispatch(&caller, "!mode high")
        .expect("dispatch succeeds");
    assert_eq!(reply, Reply::Text("High".into()));
}

#[test]
fn invocation_states_display_snake_case() {
    assert_eq!(InvocationState::SendersResolved.to_string(), "senders_resolved");
    assert_eq!(InvocationState::Failed.as_str(), "failed");
}
