//! Tab completion for partially typed input lines.
//!
//! While the command name (or a subcommand word) is being typed, the
//! completer offers registered names and aliases. Once a command resolves,
//! it offers candidates for the next positional parameter: the default
//! value, any explicit suggestions, and the members of finite types. A
//! trailing collection keeps offering candidates for every further word.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::descriptor::Parameter;
use crate::dispatch::Dispatcher;
use crate::registry::CommandRegistry;
use crate::tokenize::{scan, strip_prefix};
use crate::value::Value;

/// Produces completion candidates against a command registry.
#[derive(Debug, Clone)]
pub struct Completer {
    commands: Arc<CommandRegistry>,
    prefix: Option<String>,
}

impl Completer {
    /// Creates a completer for `commands` with no command prefix.
    #[must_use]
    pub const fn new(commands: Arc<CommandRegistry>) -> Self {
        Self {
            commands,
            prefix: None,
        }
    }

    /// Creates a completer sharing the dispatcher's registry and prefix.
    #[must_use]
    pub fn for_dispatcher(dispatcher: &Dispatcher) -> Self {
        Self {
            commands: Arc::clone(dispatcher.commands()),
            prefix: dispatcher.prefix().map(str::to_owned),
        }
    }

    /// Requires lines to start with `prefix` before offering candidates.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into()).filter(|value| !value.is_empty());
        self
    }

    /// Returns the sorted, de-duplicated candidates for the last word of
    /// `line`.
    ///
    /// A line ending in whitespace completes a new, empty word. Candidates
    /// containing whitespace are quoted.
    #[must_use]
    pub fn complete(&self, line: &str) -> Vec<String> {
        let Some(body) = self
            .prefix
            .as_deref()
            .map_or(Some(line), |prefix| strip_prefix(line, prefix))
        else {
            return Vec::new();
        };

        let mut scanned = scan(body);
        let partial = if scanned.trailing_open {
            scanned.tokens.pop().unwrap_or_default()
        } else {
            String::new()
        };
        let words = scanned.tokens;
        let bare = scanned
            .quoted
            .iter()
            .take(words.len())
            .position(|&literal| literal)
            .unwrap_or(words.len());

        let mut candidates = BTreeSet::new();
        if bare == words.len() {
            self.path_candidates(&words, &partial, &mut candidates);
        }
        self.parameter_candidates(&words, bare, &partial, &mut candidates);

        candidates.into_iter().map(quote_if_needed).collect()
    }

    fn path_candidates(&self, words: &[String], partial: &str, out: &mut BTreeSet<String>) {
        let matching = self.commands.name_matching();
        let wanted = matching.normalise(partial);
        out.extend(
            self.commands
                .branches(words)
                .into_iter()
                .filter(|next| matching.normalise(next).starts_with(&wanted)),
        );
    }

    fn parameter_candidates(
        &self,
        words: &[String],
        bare: usize,
        partial: &str,
        out: &mut BTreeSet<String>,
    ) {
        let Some((name, arguments)) = words.split_first() else {
            return;
        };
        let path = arguments.get(..bare.saturating_sub(1)).unwrap_or_default();
        let Some(resolution) = self.commands.find(name, path) else {
            return;
        };
        let parameters = resolution.command().parameters();
        let index = arguments.len().saturating_sub(resolution.consumed());
        let parameter = parameters.get(index).or_else(|| {
            parameters
                .last()
                .filter(|last| last.value_type().is_collection())
        });

        if let Some(parameter) = parameter {
            out.extend(
                parameter_values(parameter)
                    .into_iter()
                    .filter(|candidate| candidate.starts_with(partial)),
            );
        }
    }
}

fn parameter_values(parameter: &Parameter) -> Vec<String> {
    let mut values: Vec<String> = match parameter.default_value() {
        Some(Value::List(items)) => items.iter().map(ToString::to_string).collect(),
        Some(Value::Set(items)) => items.iter().map(ToString::to_string).collect(),
        Some(value) => vec![value.to_string()],
        None => Vec::new(),
    };
    values.extend(parameter.suggestions().iter().cloned());
    values.extend(parameter.value_type().element().candidates());
    values
}

fn quote_if_needed(candidate: String) -> String {
    if candidate.chars().any(char::is_whitespace) {
        format!("\"{candidate}\"")
    } else {
        candidate
    }
}
