//! Reserved keyword validation for identifiers

use crate::error::{SchemaResult, ValidationError};
use std::fmt;

/// Syntactic position an identifier occupies, used in error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierRole {
    Keyspace,
    Table,
    Column,
    NewColumn,
    AlteredColumn,
    RenamedColumn,
    DroppedColumn,
    PartitionKey,
    ClusteringColumn,
    Index,
}

impl IdentifierRole {
    pub fn as_str(self) -> &'static str {
        match self {
            IdentifierRole::Keyspace => "keyspace",
            IdentifierRole::Table => "table",
            IdentifierRole::Column => "column",
            IdentifierRole::NewColumn => "new column",
            IdentifierRole::AlteredColumn => "altered column",
            IdentifierRole::RenamedColumn => "renamed column",
            IdentifierRole::DroppedColumn => "dropped column",
            IdentifierRole::PartitionKey => "partition key",
            IdentifierRole::ClusteringColumn => "clustering column",
            IdentifierRole::Index => "index",
        }
    }
}

impl fmt::Display for IdentifierRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check if a word is a CQL reserved keyword (case-insensitive)
pub fn is_reserved_keyword(word: &str) -> bool {
    matches!(
        word.to_uppercase().as_str(),
        "ADD"
            | "ALLOW"
            | "ALTER"
            | "AND"
            | "ANY"
            | "APPLY"
            | "ASC"
            | "AUTHORIZE"
            | "BATCH"
            | "BEGIN"
            | "BY"
            | "COLUMNFAMILY"
            | "CREATE"
            | "DELETE"
            | "DESC"
            | "DROP"
            | "EACH_QUORUM"
            | "FROM"
            | "GRANT"
            | "IN"
            | "INDEX"
            | "INET"
            | "INSERT"
            | "INTO"
            | "KEYSPACE"
            | "KEYSPACES"
            | "LIMIT"
            | "LOCAL_ONE"
            | "LOCAL_QUORUM"
            | "MODIFY"
            | "NORECURSIVE"
            | "OF"
            | "ON"
            | "ONE"
            | "ORDER"
            | "PASSWORD"
            | "PRIMARY"
            | "QUORUM"
            | "RENAME"
            | "REVOKE"
            | "SCHEMA"
            | "SELECT"
            | "SET"
            | "TABLE"
            | "THREE"
            | "TO"
            | "TOKEN"
            | "TRUNCATE"
            | "TWO"
            | "UNLOGGED"
            | "UPDATE"
            | "USE"
            | "USING"
            | "WHERE"
            | "WITH"
    )
}

/// Reject blank identifiers and reserved keywords for the given role
pub fn validate(identifier: &str, role: IdentifierRole) -> SchemaResult<()> {
    if identifier.trim().is_empty() {
        return Err(ValidationError::BlankIdentifier { role });
    }
    if is_reserved_keyword(identifier) {
        return Err(ValidationError::ReservedKeyword {
            role,
            word: identifier.to_string(),
        });
    }
    Ok(())
}
