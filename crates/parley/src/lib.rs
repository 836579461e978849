//! Command definition and dispatch engine.
//!
//! `parley` turns a declared command plus a raw line of text into a
//! validated, fully typed invocation. Commands are described by a
//! [`CommandDescriptor`]: a name and aliases, ordered typed [`Parameter`]s,
//! [`SenderSlot`]s for the caller's identity, and a handler. The
//! [`Dispatcher`] tokenizes a line, resolves the command in a
//! [`CommandRegistry`], resolves sender slots through the
//! [`SenderRegistry`], checks the command's permission, binds and coerces
//! arguments, and runs the handler.
//!
//! Every stage reports failures as a [`DispatchError`] whose
//! [`kind`](DispatchError::kind) classifies the outcome. Sender resolution
//! misses are not failures: an unresolved slot is handed to the handler as
//! absent.
//!
//! ```
//! use std::sync::Arc;
//!
//! use parley::{
//!     CommandDescriptor, CommandRegistry, Dispatcher, Parameter, ScalarType, Sender,
//!     SenderRegistry, ValueType,
//! };
//!
//! #[derive(Debug)]
//! struct Console;
//!
//! impl Sender for Console {
//!     fn name(&self) -> &str {
//!         "console"
//!     }
//! }
//!
//! let commands = CommandRegistry::default();
//! commands
//!     .register(
//!         CommandDescriptor::builder("sum")
//!             .parameter(Parameter::required("terms", ValueType::List(ScalarType::Integer)))
//!             .handler(|arguments, _| {
//!                 let terms: Vec<i64> = arguments.value("terms")?;
//!                 Ok(terms.iter().sum::<i64>().to_string())
//!             })
//!             .build()
//!             .expect("valid command"),
//!     )
//!     .expect("unique name");
//!
//! let dispatcher = Dispatcher::new(Arc::new(commands), Arc::new(SenderRegistry::new()));
//! let caller: Arc<dyn Sender> = Arc::new(Console);
//! let reply = dispatcher.dispatch(&caller, "sum 1 2 3").expect("dispatch succeeds");
//! assert_eq!(reply, parley::Reply::Text("6".into()));
//! ```

pub mod bind;
pub mod coerce;
pub mod complete;
pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod registry;
pub mod sender;
pub mod telemetry;
pub mod tokenize;
pub mod value;

pub use bind::{ArgumentMap, bind};
pub use coerce::Coercer;
pub use complete::Completer;
pub use descriptor::{CommandBuilder, CommandDescriptor, Handler, Parameter, Reply};
pub use dispatch::{Dispatcher, InvocationState};
pub use error::{
    ArgumentError, BindError, CoercionError, DescriptorError, DispatchError, FailureKind,
    HandlerError, RegistryError,
};
pub use registry::{CommandRegistry, Resolution};
pub use sender::{BoundSender, Sender, SenderBindings, SenderRegistry, SenderSlot, SenderType};
pub use telemetry::{TelemetryError, TelemetryHandle};
pub use tokenize::{TokenizedInput, tokenize};
pub use value::{EnumType, FromValue, ScalarType, Value, ValueSet, ValueType};

#[cfg(test)]
mod tests;
