//! Driver session boundary
//!
//! The wire-protocol driver is external: this module only defines what the
//! query engine needs from it (statement execution, preparation and row
//! access) plus the prepared-statement cache used for continuation pages.

use crate::consistency::ConsistencyLevel;
use crate::types::CqlValue;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, trace};

/// Native protocol error codes
pub mod error_codes {
    /// Server error (generic)
    pub const SERVER_ERROR: i32 = 0x0000;
    /// Protocol error
    pub const PROTOCOL_ERROR: i32 = 0x000A;
    /// Bad credentials
    pub const BAD_CREDENTIALS: i32 = 0x0100;
    /// Not enough live replicas
    pub const UNAVAILABLE: i32 = 0x1000;
    pub const OVERLOADED: i32 = 0x1100;
    pub const IS_BOOTSTRAPPING: i32 = 0x1200;
    pub const TRUNCATE_ERROR: i32 = 0x1300;
    pub const WRITE_TIMEOUT: i32 = 0x2000;
    pub const READ_TIMEOUT: i32 = 0x2100;
    pub const SYNTAX_ERROR: i32 = 0x2200;
    pub const UNAUTHORIZED: i32 = 0x2300;
    /// Invalid query
    pub const INVALID: i32 = 0x2400;
    pub const CONFIG_ERROR: i32 = 0x2500;
    /// Keyspace or table already exists
    pub const ALREADY_EXISTS: i32 = 0x2600;
    /// Prepared statement unknown to the coordinator
    pub const UNPREPARED: i32 = 0x2700;
}

/// Error reported by the driver session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// Error frame returned by the server
    #[error("Server error {code:#06x}: {message}")]
    Server { code: i32, message: String },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl DriverError {
    pub fn server(code: i32, message: impl Into<String>) -> Self {
        DriverError::Server {
            code,
            message: message.into(),
        }
    }

    /// Native protocol error code, for server errors
    pub fn code(&self) -> Option<i32> {
        match self {
            DriverError::Server { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self.code(),
            Some(error_codes::READ_TIMEOUT) | Some(error_codes::WRITE_TIMEOUT)
        )
    }
}

/// Statement ready to execute: CQL text, positional values and consistency
#[derive(Debug, Clone, PartialEq)]
pub struct BoundStatement {
    pub cql: String,
    pub values: Vec<CqlValue>,
    pub consistency: ConsistencyLevel,
    /// Id of the prepared statement this was bound from, if any
    pub prepared_id: Option<Vec<u8>>,
}

impl BoundStatement {
    /// Unprepared statement
    pub fn new(cql: impl Into<String>, values: Vec<CqlValue>, consistency: ConsistencyLevel) -> Self {
        Self {
            cql: cql.into(),
            values,
            consistency,
            prepared_id: None,
        }
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared_id.is_some()
    }
}

/// Statement prepared by the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedStatement {
    /// MD5 digest of the statement text
    pub id: Vec<u8>,
    pub cql: String,
}

impl PreparedStatement {
    pub fn new(cql: impl Into<String>) -> Self {
        let cql = cql.into();
        Self {
            id: statement_id(&cql).to_vec(),
            cql,
        }
    }

    pub fn bind(&self, values: Vec<CqlValue>, consistency: ConsistencyLevel) -> BoundStatement {
        BoundStatement {
            cql: self.cql.clone(),
            values,
            consistency,
            prepared_id: Some(self.id.clone()),
        }
    }
}

/// Decoded row, columns in result order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, CqlValue)>,
}

impl Row {
    pub fn new<K: Into<String>>(columns: impl IntoIterator<Item = (K, CqlValue)>) -> Self {
        Self {
            columns: columns
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        }
    }

    /// Value of a column, `None` when the row has no such column
    pub fn get(&self, column: &str) -> Option<&CqlValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Rows returned by one execution
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    rows: VecDeque<Row>,
}

impl ResultSet {
    pub fn new(rows: impl IntoIterator<Item = Row>) -> Self {
        Self {
            rows: rows.into_iter().collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Iterator for ResultSet {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        self.rows.pop_front()
    }
}

/// Driver session executing CQL statements
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Session: Send + Sync {
    /// Execute a statement and return all rows of its result page
    async fn execute(&self, statement: &BoundStatement) -> Result<ResultSet, DriverError>;

    /// Prepare a statement for repeated execution
    async fn prepare(&self, cql: &str) -> Result<PreparedStatement, DriverError>;
}

/// Prepared statement id for a CQL text
pub fn statement_id(cql: &str) -> [u8; 16] {
    md5::compute(cql.as_bytes()).0
}

struct CacheEntries {
    statements: HashMap<[u8; 16], PreparedStatement>,
    insertion_order: VecDeque<[u8; 16]>,
}

/// Prepared statements keyed by the MD5 digest of their text, bounded with
/// FIFO eviction
pub struct StatementCache {
    capacity: usize,
    entries: RwLock<CacheEntries>,
}

impl StatementCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: RwLock::new(CacheEntries {
                statements: HashMap::new(),
                insertion_order: VecDeque::new(),
            }),
        }
    }

    /// Cached statement for `cql`, preparing it on the session on a miss
    pub async fn get_or_prepare(
        &self,
        session: &dyn Session,
        cql: &str,
    ) -> Result<PreparedStatement, DriverError> {
        let id = statement_id(cql);
        if let Some(prepared) = self.entries.read().await.statements.get(&id) {
            trace!(cql = %cql.trim(), "Prepared statement cache hit");
            return Ok(prepared.clone());
        }

        let prepared = session.prepare(cql).await?;

        let mut entries = self.entries.write().await;
        if !entries.statements.contains_key(&id) {
            entries.statements.insert(id, prepared.clone());
            entries.insertion_order.push_back(id);
            while entries.insertion_order.len() > self.capacity {
                if let Some(evicted) = entries.insertion_order.pop_front() {
                    entries.statements.remove(&evicted);
                }
            }
            debug!(
                cql = %cql.trim(),
                cached = entries.statements.len(),
                "Prepared statement cached"
            );
        }
        Ok(prepared)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.statements.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn contains(&self, cql: &str) -> bool {
        self.entries
            .read()
            .await
            .statements
            .contains_key(&statement_id(cql))
    }
}
