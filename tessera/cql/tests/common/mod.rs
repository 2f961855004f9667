//! Shared fixtures for the slice query integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use tessera_cql::entity::{EntityMeta, TableLayout};
use tessera_cql::error::{CqlError, CqlResult};
use tessera_cql::session::{BoundStatement, DriverError, PreparedStatement, ResultSet, Row, Session};
use tessera_cql::types::CqlValue;

/// Session replaying scripted pages and recording every call
#[derive(Default)]
pub struct RecordingSession {
    pages: Mutex<VecDeque<Result<ResultSet, DriverError>>>,
    executed: Mutex<Vec<BoundStatement>>,
    prepared: Mutex<Vec<String>>,
}

impl RecordingSession {
    pub fn with_pages(pages: impl IntoIterator<Item = ResultSet>) -> Arc<Self> {
        Arc::new(Self {
            pages: Mutex::new(pages.into_iter().map(Ok).collect()),
            ..Default::default()
        })
    }

    pub fn push_error(&self, error: DriverError) {
        self.pages.lock().unwrap().push_back(Err(error));
    }

    pub fn executed(&self) -> Vec<BoundStatement> {
        self.executed.lock().unwrap().clone()
    }

    pub fn prepared(&self) -> Vec<String> {
        self.prepared.lock().unwrap().clone()
    }
}

#[async_trait]
impl Session for RecordingSession {
    async fn execute(&self, statement: &BoundStatement) -> Result<ResultSet, DriverError> {
        self.executed.lock().unwrap().push(statement.clone());
        if statement.cql.trim_start().starts_with("DELETE") {
            return Ok(ResultSet::empty());
        }
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ResultSet::empty()))
    }

    async fn prepare(&self, cql: &str) -> Result<PreparedStatement, DriverError> {
        self.prepared.lock().unwrap().push(cql.to_string());
        Ok(PreparedStatement::new(cql))
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Event {
    pub id: i64,
    pub day: i32,
    pub seq: i32,
    pub payload: String,
}

pub struct EventMeta {
    layout: TableLayout,
}

impl EventMeta {
    pub fn new() -> Self {
        Self {
            layout: TableLayout::new("events")
                .partition_key(["id"])
                .clustering_columns(["day", "seq"])
                .columns(["payload"]),
        }
    }

    /// Same layout pinned to another keyspace
    pub fn in_keyspace(keyspace: &str) -> Self {
        let meta = Self::new();
        Self {
            layout: meta.layout.in_keyspace(keyspace),
        }
    }
}

impl EntityMeta<Event> for EventMeta {
    fn entity_name(&self) -> &str {
        "Event"
    }

    fn layout(&self) -> &TableLayout {
        &self.layout
    }

    fn instantiate(&self) -> Event {
        Event::default()
    }

    fn set_eager_properties(&self, row: &Row, target: &mut Event) -> CqlResult<()> {
        match (
            row.get("id"),
            row.get("day"),
            row.get("seq"),
            row.get("payload"),
        ) {
            (
                Some(CqlValue::Bigint(id)),
                Some(CqlValue::Int(day)),
                Some(CqlValue::Int(seq)),
                Some(CqlValue::Text(payload)),
            ) => {
                target.id = *id;
                target.day = *day;
                target.seq = *seq;
                target.payload = payload.clone();
                Ok(())
            }
            _ => Err(CqlError::mapping("Event", "unexpected row shape")),
        }
    }

    fn eager_getters(&self) -> HashSet<String> {
        ["id", "day", "seq", "payload"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

/// `events(id bigint, day int, seq int, payload text, PRIMARY KEY(id, day, seq))`
pub fn event_meta() -> Arc<dyn EntityMeta<Event>> {
    Arc::new(EventMeta::new())
}

pub fn event_row(day: i32, seq: i32) -> Row {
    Row::new([
        ("id", CqlValue::Bigint(7)),
        ("day", CqlValue::Int(day)),
        ("seq", CqlValue::Int(seq)),
        ("payload", CqlValue::Text(format!("{}-{}", day, seq))),
    ])
}

pub fn page(keys: &[(i32, i32)]) -> ResultSet {
    ResultSet::new(keys.iter().map(|(day, seq)| event_row(*day, *seq)))
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
