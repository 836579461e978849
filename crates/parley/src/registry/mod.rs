//! Command registry keyed by normalised name and alias.
//!
//! The [`CommandRegistry`] maps every name and alias of a registered command
//! to its [`CommandDescriptor`]. Keys are normalised with the registry's
//! [`NameMatching`] policy, fixed at construction. Names and aliases are
//! unique across the registry; a clash is rejected and leaves the registry
//! unchanged.
//!
//! Storage is copy-on-write behind an `RwLock`, so lookups proceed on a
//! snapshot and never observe a half-applied registration.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use parley_config::{Config, NameMatching};
use tracing::debug;

use crate::descriptor::CommandDescriptor;
use crate::error::RegistryError;

const REGISTRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::registry");

#[derive(Debug, Clone)]
struct Entry {
    spelling: String,
    command: Arc<CommandDescriptor>,
}

#[derive(Debug, Clone, Default)]
struct CommandTable {
    entries: HashMap<String, Entry>,
    commands: Vec<Arc<CommandDescriptor>>,
    longest_path: usize,
}

/// A command matched against the leading tokens of an input line.
#[derive(Debug, Clone)]
pub struct Resolution {
    command: Arc<CommandDescriptor>,
    matched: String,
    consumed: usize,
}

impl Resolution {
    /// Returns the matched command.
    #[must_use]
    pub fn command(&self) -> &Arc<CommandDescriptor> {
        &self.command
    }

    /// Returns the name or alias that matched, as registered.
    #[must_use]
    pub fn matched(&self) -> &str {
        &self.matched
    }

    /// Returns how many argument tokens were taken as subcommand words.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.consumed
    }
}

/// Registry of command descriptors.
pub struct CommandRegistry {
    matching: NameMatching,
    table: RwLock<Arc<CommandTable>>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new(NameMatching::default())
    }
}

impl CommandRegistry {
    /// Creates an empty registry using `matching` for all lookups.
    #[must_use]
    pub fn new(matching: NameMatching) -> Self {
        Self {
            matching,
            table: RwLock::new(Arc::default()),
        }
    }

    /// Creates an empty registry using the configured name matching policy.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.name_matching())
    }

    /// Returns the name matching policy.
    #[must_use]
    pub const fn name_matching(&self) -> NameMatching {
        self.matching
    }

    /// Registers `command` under its name and every alias.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Conflict`] when any of its names is already
    /// registered or repeated within the command itself.
    pub fn register(&self, command: CommandDescriptor) -> Result<(), RegistryError> {
        let command = Arc::new(command);
        let mut guard = self.table.write().unwrap_or_else(PoisonError::into_inner);
        let mut table = CommandTable::clone(&guard);

        for spelling in command.names() {
            let key = self.matching.normalise(spelling);
            if let Some(existing) = table.entries.get(&key) {
                return Err(RegistryError::Conflict {
                    name: spelling.to_owned(),
                    existing: existing.command.name().to_owned(),
                });
            }
            table.longest_path = table.longest_path.max(spelling.split(' ').count());
            table.entries.insert(
                key,
                Entry {
                    spelling: spelling.to_owned(),
                    command: Arc::clone(&command),
                },
            );
        }
        table.commands.push(Arc::clone(&command));
        *guard = Arc::new(table);

        debug!(
            target: REGISTRY_TARGET,
            command = command.name(),
            aliases = command.aliases().len(),
            parameters = command.parameters().len(),
            "registered command"
        );
        Ok(())
    }

    /// Looks up a command by its full name or alias.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<CommandDescriptor>> {
        let key = self.matching.normalise(&collapse(name));
        self.snapshot()
            .entries
            .get(&key)
            .map(|entry| Arc::clone(&entry.command))
    }

    /// Finds the command whose name is the longest path matching `name`
    /// followed by leading `arguments`.
    ///
    /// A word holding whitespace came from a quoted token and never matches
    /// a path, so matching stops before it.
    #[must_use]
    pub fn find(&self, name: &str, arguments: &[String]) -> Option<Resolution> {
        if name.contains(char::is_whitespace) {
            return None;
        }
        let table = self.snapshot();
        let extra = table
            .longest_path
            .saturating_sub(1)
            .min(single_words(arguments));

        (0..=extra).rev().find_map(|consumed| {
            let words = arguments.get(..consumed)?;
            let path = std::iter::once(name)
                .chain(words.iter().map(String::as_str))
                .collect::<Vec<_>>()
                .join(" ");
            table
                .entries
                .get(&self.matching.normalise(&path))
                .map(|entry| Resolution {
                    command: Arc::clone(&entry.command),
                    matched: entry.spelling.clone(),
                    consumed,
                })
        })
    }

    /// Returns the sorted words that follow `words` in registered names and
    /// aliases.
    ///
    /// Empty `words` yields the first word of every registered spelling.
    #[must_use]
    pub fn branches<S: AsRef<str>>(&self, words: &[S]) -> Vec<String> {
        let mut next: Vec<String> = self
            .snapshot()
            .entries
            .values()
            .filter_map(|entry| {
                let mut parts = entry.spelling.split(' ');
                let leads_match = words.iter().all(|word| {
                    parts
                        .next()
                        .is_some_and(|part| self.same(part, word.as_ref()))
                });
                if !leads_match {
                    return None;
                }
                parts.next().map(str::to_owned)
            })
            .collect();
        next.sort_unstable();
        next.dedup();
        next
    }

    /// Finds the longest path of `name` and leading `arguments` that is a
    /// strict prefix of registered names, returning the path and the words
    /// that may follow it.
    ///
    /// Used when [`find`](Self::find) matches nothing, to tell a caller who
    /// stopped at a group of subcommands which words would complete it.
    #[must_use]
    pub fn longest_branch(
        &self,
        name: &str,
        arguments: &[String],
    ) -> Option<(String, Vec<String>)> {
        if name.contains(char::is_whitespace) {
            return None;
        }
        let extra = self
            .snapshot()
            .longest_path
            .saturating_sub(1)
            .min(single_words(arguments));

        (0..=extra).rev().find_map(|taken| {
            let path: Vec<&str> = std::iter::once(name)
                .chain(arguments.get(..taken)?.iter().map(String::as_str))
                .collect();
            let next = self.branches(&path);
            (!next.is_empty()).then(|| (path.join(" "), next))
        })
    }

    /// Returns `true` when `name` is registered as a name or alias.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the registered commands in registration order.
    #[must_use]
    pub fn commands(&self) -> Vec<Arc<CommandDescriptor>> {
        self.snapshot().commands.clone()
    }

    /// Returns every registered name and alias as spelled at registration.
    #[must_use]
    pub fn spellings(&self) -> Vec<String> {
        let mut spellings: Vec<String> = self
            .snapshot()
            .entries
            .values()
            .map(|entry| entry.spelling.clone())
            .collect();
        spellings.sort_unstable();
        spellings
    }

    /// Returns the number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot().commands.len()
    }

    /// Returns `true` when no commands are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshot().commands.is_empty()
    }

    fn same(&self, left: &str, right: &str) -> bool {
        self.matching.normalise(left) == self.matching.normalise(right)
    }

    fn snapshot(&self) -> Arc<CommandTable> {
        let guard = self.table.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("matching", &self.matching)
            .field("names", &self.spellings())
            .finish()
    }
}

fn single_words(arguments: &[String]) -> usize {
    arguments
        .iter()
        .take_while(|word| !word.is_empty() && !word.contains(char::is_whitespace))
        .count()
}

fn collapse(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}
