//! Argument resolution: tokens → command name + argument map.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, trace};

use crate::domain::error::{DomainError, DomainResult};

/// Key of one entry in an [`ArgumentMap`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArgumentKey {
    /// Index among the unflagged tokens after the command name
    Position(usize),
    /// Flag name with its leading dashes stripped
    Name(String),
}

impl fmt::Display for ArgumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgumentKey::Position(i) => write!(f, "#{}", i),
            ArgumentKey::Name(n) => write!(f, "-{}", n),
        }
    }
}

/// Raw argument strings keyed by position or flag name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentMap {
    entries: HashMap<ArgumentKey, String>,
}

impl ArgumentMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the one it replaced.
    pub fn insert(&mut self, key: ArgumentKey, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key, value.into())
    }

    pub fn get(&self, key: &ArgumentKey) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn positional(&self, index: usize) -> Option<&str> {
        self.get(&ArgumentKey::Position(index))
    }

    pub fn named(&self, name: &str) -> Option<&str> {
        self.get(&ArgumentKey::Name(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by key: positions first, then names.
    pub fn sorted(&self) -> Vec<(&ArgumentKey, &str)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(k, v)| (k, v.as_str()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

/// A command line split into its target name and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    pub name: String,
    pub arguments: ArgumentMap,
}

/// Classify tokens into command name, positional and named arguments.
///
/// A flag token (`-x`, `--x`) names the token that follows it. A flag at the
/// very end has no value and is dropped.
pub fn resolve<I>(tokens: I) -> DomainResult<ResolvedCommand>
where
    I: IntoIterator<Item = String>,
{
    let mut tokens = tokens.into_iter();
    let name = tokens.next().ok_or(DomainError::NoTokens)?;

    let mut arguments = ArgumentMap::new();
    let mut pending: Option<String> = None;
    let mut position = 0;

    for token in tokens {
        if let Some(flag) = pending.take() {
            trace!("flag -{} = {:?}", flag, token);
            if let Some(previous) = arguments.insert(ArgumentKey::Name(flag.clone()), token) {
                debug!("flag -{} repeated, dropping {:?}", flag, previous);
            }
        } else if let Some(flag) = token.strip_prefix('-') {
            pending = Some(flag.trim_start_matches('-').to_string());
        } else {
            trace!("position {} = {:?}", position, token);
            arguments.insert(ArgumentKey::Position(position), token);
            position += 1;
        }
    }

    if let Some(flag) = pending {
        debug!("flag -{} has no value, ignored", flag);
    }

    Ok(ResolvedCommand { name, arguments })
}
