//! Command registry
//!
//! Commands are looked up by a canonical key built from one or two command
//! words: each word is capitalised, the words are joined, and the result is
//! prefixed with [`KEY_MARKER`]. `container list` becomes `CmdContainerList`.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

use tracing::warn;

use super::ClientContext;
use crate::errors::CliResult;

pub const KEY_MARKER: &str = "Cmd";

/// Future returned by a command handler
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = CliResult<()>> + 'a>>;

/// A command handler. Receives only the arguments left after the command name.
pub type Handler = for<'a> fn(&'a mut ClientContext, Vec<String>) -> HandlerFuture<'a>;

/// Capitalise the first character and lower-case the rest.
/// Empty tokens have no canonical form.
pub fn normalize_token(token: &str) -> Option<String> {
    let mut chars = token.chars();
    let first = chars.next()?;
    let mut normalized: String = first.to_uppercase().collect();
    normalized.push_str(&chars.as_str().to_lowercase());
    Some(normalized)
}

/// Canonical lookup key for a sequence of command words
pub fn method_key<S: AsRef<str>>(tokens: &[S]) -> Option<String> {
    let mut key = String::from(KEY_MARKER);
    for token in tokens {
        key.push_str(&normalize_token(token.as_ref())?);
    }
    Some(key)
}

#[derive(Clone)]
pub struct CommandEntry {
    /// Words as typed by users, e.g. `container list`
    pub name: String,
    pub description: &'static str,
    pub handler: Handler,
}

impl fmt::Debug for CommandEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandEntry")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Explicit mapping from canonical key to handler
#[derive(Debug, Clone, Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, CommandEntry>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under the given command words. Registering the same
    /// words twice replaces the earlier handler.
    pub fn register(
        &mut self,
        words: &[&str],
        description: &'static str,
        handler: Handler,
    ) -> &mut Self {
        let Some(key) = method_key(words) else {
            warn!(?words, "ignoring command with an empty name");
            return self;
        };

        self.commands.insert(
            key,
            CommandEntry {
                name: words.join(" "),
                description,
                handler,
            },
        );
        self
    }

    pub fn lookup<S: AsRef<str>>(&self, tokens: &[S]) -> Option<&CommandEntry> {
        self.commands.get(&method_key(tokens)?)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.commands.contains_key(key)
    }

    /// Entries ordered by canonical key
    pub fn entries(&self) -> impl Iterator<Item = &CommandEntry> {
        self.commands.values()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
