use crate::error::AliasError;
use log::{debug, trace};

/// Names that the shell handles itself and that an alias may never shadow.
pub const RESERVED_NAMES: [&str; 3] = ["alias", "unalias", "exit"];

/// One `name -> command` mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasEntry {
    pub name: String,
    pub command: String,
}

/// Insertion-ordered table of aliases owned by one shell session.
///
/// At most one entry exists per name. Redefining a name drops the old entry
/// and appends the new one, so the redefined alias moves to the end of
/// [`AliasTable::list`].
#[derive(Debug, Default)]
pub struct AliasTable {
    entries: Vec<AliasEntry>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define or redefine `name`.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        command: impl Into<String>,
    ) -> Result<(), AliasError> {
        let name = name.into();
        if RESERVED_NAMES.contains(&name.as_str()) {
            return Err(AliasError::Reserved(name));
        }
        if self.remove(&name).is_ok() {
            trace!("alias {name} redefined");
        }
        let command = command.into();
        debug!("alias {name} -> {command:?}");
        self.entries.push(AliasEntry { name, command });
        Ok(())
    }

    /// Exact-match lookup of the command text stored under `name`.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.command.as_str())
    }

    pub fn remove(&mut self, name: &str) -> Result<AliasEntry, AliasError> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.name == name)
            .ok_or_else(|| AliasError::NotFound(name.to_string()))?;
        Ok(self.entries.remove(index))
    }

    /// All `(name, command)` pairs in insertion order.
    pub fn list(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|entry| (entry.name.as_str(), entry.command.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Drop for AliasTable {
    fn drop(&mut self) {
        debug!("releasing {} alias(es)", self.entries.len());
    }
}
