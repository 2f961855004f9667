//! Validated identifiers and keyspace-qualified names

use super::keywords::{self, IdentifierRole};
use crate::error::SchemaResult;
use std::fmt;

/// Keyspace, table, column or index name that passed reserved-word validation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier(String);

impl Identifier {
    pub fn new(name: impl Into<String>, role: IdentifierRole) -> SchemaResult<Self> {
        let name = name.into();
        keywords::validate(&name, role)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Name with an optional keyspace prefix, rendered `keyspace.name`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub keyspace: Option<Identifier>,
    pub name: Identifier,
}

impl QualifiedName {
    /// Validate `name` under `role`, without keyspace
    pub fn new(name: &str, role: IdentifierRole) -> SchemaResult<Self> {
        Ok(Self {
            keyspace: None,
            name: Identifier::new(name, role)?,
        })
    }

    /// Validate the keyspace first, then `name` under `role`
    pub fn qualified(keyspace: &str, name: &str, role: IdentifierRole) -> SchemaResult<Self> {
        Ok(Self {
            keyspace: Some(Identifier::new(keyspace, IdentifierRole::Keyspace)?),
            name: Identifier::new(name, role)?,
        })
    }

    /// Table name, optionally qualified
    pub fn table(keyspace: Option<&str>, table: &str) -> SchemaResult<Self> {
        match keyspace {
            Some(ks) => Self::qualified(ks, table, IdentifierRole::Table),
            None => Self::new(table, IdentifierRole::Table),
        }
    }

    /// Same name, qualified with `keyspace` when no keyspace is set yet
    pub fn or_keyspace(self, keyspace: Option<&Identifier>) -> Self {
        match self.keyspace {
            Some(_) => self,
            None => Self {
                keyspace: keyspace.cloned(),
                name: self.name,
            },
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.keyspace {
            Some(ks) => write!(f, "{}.{}", ks, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}
