//! Crate-level integration and BDD tests.

use std::sync::Arc;

use parley_config::Config;

use crate::complete::Completer;
use crate::descriptor::{CommandDescriptor, Parameter};
use crate::dispatch::Dispatcher;
use crate::error::FailureKind;
use crate::registry::CommandRegistry;
use crate::sender::{Sender, SenderRegistry, SenderSlot};
use crate::value::{EnumType, ValueType};


#[derive(Debug)]
struct Player {
    name: String,
}

impl Sender for Player {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Account {
    owner: String,
}

#[test]
fn end_to_end_with_configuration() {
    let config = Config::from_toml_str(
        r#"
        name_matching = "ignore_case"
        enum_matching = "ignore_case"
        command_prefix = "/"
        "#,
    )
    .expect("valid configuration");

    let senders = Arc::new(SenderRegistry::new());
    senders.register_adapter(|player: &Player| {
        Some(Account {
            owner: player.name.clone(),
        })
    });

    let commands = Arc::new(CommandRegistry::from_config(&config));
    commands
        .register(
            CommandDescriptor::builder("Balance")
                .alias("bal")
                .parameter(Parameter::optional(
                    "currency",
                    ValueType::enumeration(EnumType::new("currency", ["Gold", "Silver"])),
                    crate::value::Value::Enum("Gold".into()),
                ))
                .sender(SenderSlot::strict::<Account>("account"))
                .handler(|arguments, senders| {
                    let currency: String = arguments.value("currency")?;
                    let owner = senders
                        .get_as::<Account>("account")
                        .map_or("nobody", |account| account.owner.as_str());
                    Ok(format!("{owner}: 0 {currency}"))
                })
                .build()
                .expect("valid descriptor"),
        )
        .expect("register");

    let dispatcher = Dispatcher::from_config(&config, Arc::clone(&commands), senders);
    let caller: Arc<dyn Sender> = Arc::new(Player {
        name: "alice".into(),
    });

    let reply = dispatcher
        .dispatch(&caller, "/BAL silver")
        .expect("dispatch succeeds");
    assert_eq!(reply, crate::descriptor::Reply::Text("alice: 0 Silver".into()));

    let error = dispatcher
        .dispatch(&caller, "balance")
        .expect_err("prefix missing");
    assert_eq!(error.kind(), FailureKind::MissingPrefix);

    let completer = Completer::for_dispatcher(&dispatcher);
    assert_eq!(completer.complete("/balance "), vec!["Gold", "Silver"]);
}
