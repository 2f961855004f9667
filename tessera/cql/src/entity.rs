//! Entity boundary
//!
//! Row-to-object mapping and lazy-loading proxies live outside this crate.
//! The executor talks to them through [`EntityMeta`] and [`EntityProxifier`]
//! and hands every decoded entity a [`PersistenceContext`].

use crate::consistency::ConsistencyLevel;
use crate::error::{CqlError, CqlResult};
use crate::schema::QualifiedName;
use crate::session::Row;
use crate::types::CqlValue;
use std::collections::HashSet;

/// Physical layout of the table an entity maps to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableLayout {
    /// Keyspace, when the entity pins one; otherwise the configured keyspace
    pub keyspace: Option<String>,
    pub table: String,
    /// Partition key columns in declaration order
    pub partition_key: Vec<String>,
    /// Clustering columns in declaration order
    pub clustering_columns: Vec<String>,
    /// Remaining selected columns
    pub columns: Vec<String>,
}

impl TableLayout {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    pub fn in_keyspace(mut self, keyspace: impl Into<String>) -> Self {
        self.keyspace = Some(keyspace.into());
        self
    }

    pub fn partition_key<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.partition_key = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn clustering_columns<S: Into<String>>(
        mut self,
        columns: impl IntoIterator<Item = S>,
    ) -> Self {
        self.clustering_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Clustering key of a row, in clustering column order
    pub fn clustering_key(&self, entity: &str, row: &Row) -> CqlResult<Vec<CqlValue>> {
        self.clustering_columns
            .iter()
            .map(|column| match row.get(column) {
                Some(value) if !value.is_null() => Ok(value.clone()),
                _ => Err(CqlError::mapping(
                    entity,
                    format!("row has no value for clustering column '{}'", column),
                )),
            })
            .collect()
    }
}

/// Entity metadata collaborator
pub trait EntityMeta<T>: Send + Sync {
    fn entity_name(&self) -> &str;

    fn layout(&self) -> &TableLayout;

    /// Bare instance with no property populated
    fn instantiate(&self) -> T;

    /// Copy eagerly-loaded properties from the row into `target`
    fn set_eager_properties(&self, row: &Row, target: &mut T) -> CqlResult<()>;

    /// Accessors populated by [`EntityMeta::set_eager_properties`]; every
    /// other accessor is fulfilled lazily by the proxy
    fn eager_getters(&self) -> HashSet<String>;
}

/// Execution context attached to every managed entity
#[derive(Debug, Clone, PartialEq)]
pub struct PersistenceContext {
    pub entity_name: String,
    pub table: QualifiedName,
    pub partition_components: Vec<CqlValue>,
    pub clustering_components: Vec<CqlValue>,
    /// Level used for lazy loads and removals issued through this context
    pub consistency_level: ConsistencyLevel,
}

impl PersistenceContext {
    /// Primary key values, partition components first
    pub fn primary_key(&self) -> Vec<CqlValue> {
        self.partition_components
            .iter()
            .chain(&self.clustering_components)
            .cloned()
            .collect()
    }
}

/// Proxy-construction collaborator wrapping raw entities into managed ones
pub trait EntityProxifier: Send + Sync {
    fn build_proxy<T>(
        &self,
        entity: T,
        context: PersistenceContext,
        eager_getters: &HashSet<String>,
    ) -> T;
}

/// Proxifier handing entities back unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughProxifier;

impl EntityProxifier for PassThroughProxifier {
    fn build_proxy<T>(
        &self,
        entity: T,
        _context: PersistenceContext,
        _eager_getters: &HashSet<String>,
    ) -> T {
        entity
    }
}
