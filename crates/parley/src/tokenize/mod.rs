//! Splitting of raw input lines into a command name and argument tokens.
//!
//! Tokens are separated by runs of unquoted whitespace. A double-quoted run
//! keeps its whitespace and loses the quote characters; an unterminated
//! quote extends to the end of the line. Tokenizing never fails.
//!
//! A token holding any quote character is literal: it never names a
//! subcommand word, so `say "hello world"` passes one argument to `say` even
//! when `say hello world` is registered.

/// A raw line split into the command name and its argument tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenizedInput {
    name: Option<String>,
    arguments: Vec<String>,
    bare: usize,
}

impl TokenizedInput {
    /// Returns the first token, or `None` for blank input.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the tokens following the name.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Returns the leading arguments that may be read as subcommand words:
    /// those before the first quoted token.
    #[must_use]
    pub fn path_words(&self) -> &[String] {
        self.arguments.get(..self.bare).unwrap_or_default()
    }

    /// Consumes the input, returning the name and argument tokens.
    #[must_use]
    pub fn into_parts(self) -> (Option<String>, Vec<String>) {
        (self.name, self.arguments)
    }
}

/// Splits `line` into a command name and argument tokens.
#[must_use]
pub fn tokenize(line: &str) -> TokenizedInput {
    let Scan { tokens, quoted, .. } = scan(line);
    let bare = quoted.iter().position(|&literal| literal).unwrap_or(quoted.len());
    let mut words = tokens.into_iter();
    TokenizedInput {
        name: words.next(),
        arguments: words.collect(),
        bare: bare.saturating_sub(1),
    }
}

/// Splits `line` into tokens.
#[must_use]
pub fn split_tokens(line: &str) -> Vec<String> {
    scan(line).tokens
}

/// Returns `line` without `prefix`, or `None` when it does not start with it.
///
/// Leading whitespace before the prefix is ignored.
#[must_use]
pub fn strip_prefix<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    line.trim_start().strip_prefix(prefix)
}

/// Result of scanning a line, including whether the final token was still
/// open when the input ended.
#[derive(Debug, Default)]
pub(crate) struct Scan {
    pub(crate) tokens: Vec<String>,
    /// Parallel to `tokens`: whether each held a quote character.
    pub(crate) quoted: Vec<bool>,
    pub(crate) trailing_open: bool,
}

pub(crate) fn scan(line: &str) -> Scan {
    let mut tokens = Vec::new();
    let mut literal = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut has_quote = false;
    let mut quoted = false;

    for ch in line.chars() {
        if ch == '"' {
            quoted = !quoted;
            in_token = true;
            has_quote = true;
        } else if ch.is_whitespace() && !quoted {
            if in_token {
                tokens.push(std::mem::take(&mut current));
                literal.push(std::mem::take(&mut has_quote));
                in_token = false;
            }
        } else {
            current.push(ch);
            in_token = true;
        }
    }
    if in_token {
        tokens.push(current);
        literal.push(has_quote);
    }

    Scan {
        tokens,
        quoted: literal,
        trailing_open: in_token,
    }
}
