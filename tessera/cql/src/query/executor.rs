//! Slice query executor

use super::iterator::SliceQueryIterator;
use super::planner::SlicePlan;
use super::slice::SliceQuery;
use crate::config::PersistenceConfig;
use crate::consistency::ConsistencyLevel;
use crate::entity::{EntityMeta, EntityProxifier, PassThroughProxifier, PersistenceContext};
use crate::error::CqlResult;
use crate::schema::QualifiedName;
use crate::session::{Row, Session, StatementCache};
use crate::types::CqlValue;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Decodes rows of one slice query into managed entities
pub(crate) struct RowDecoder<T, P> {
    meta: Arc<dyn EntityMeta<T>>,
    proxifier: Arc<P>,
    eager_getters: HashSet<String>,
    table: QualifiedName,
    partition_components: Vec<CqlValue>,
    consistency: ConsistencyLevel,
}

impl<T, P: EntityProxifier> RowDecoder<T, P> {
    fn new(meta: Arc<dyn EntityMeta<T>>, proxifier: Arc<P>, plan: &SlicePlan) -> Self {
        let eager_getters = meta.eager_getters();
        Self {
            meta,
            proxifier,
            eager_getters,
            table: plan.table().clone(),
            partition_components: plan.partition_values().to_vec(),
            consistency: plan.consistency(),
        }
    }

    pub(crate) fn clustering_key(&self, row: &Row) -> CqlResult<Vec<CqlValue>> {
        self.meta
            .layout()
            .clustering_key(self.meta.entity_name(), row)
    }

    /// Bare instance with eager properties set, wrapped by the proxifier
    pub(crate) fn decode(&self, row: &Row, clustering_key: Vec<CqlValue>) -> CqlResult<T> {
        let mut entity = self.meta.instantiate();
        self.meta.set_eager_properties(row, &mut entity)?;
        let context = PersistenceContext {
            entity_name: self.meta.entity_name().to_string(),
            table: self.table.clone(),
            partition_components: self.partition_components.clone(),
            clustering_components: clustering_key,
            consistency_level: self.consistency,
        };
        Ok(self
            .proxifier
            .build_proxy(entity, context, &self.eager_getters))
    }
}

/// Plans and executes slice queries against a driver session.
///
/// Every validation failure is reported before the session is called.
pub struct SliceQueryExecutor<P = PassThroughProxifier> {
    session: Arc<dyn Session>,
    config: Arc<PersistenceConfig>,
    statements: Arc<StatementCache>,
    proxifier: Arc<P>,
}

impl SliceQueryExecutor<PassThroughProxifier> {
    pub fn new(session: Arc<dyn Session>, config: PersistenceConfig) -> CqlResult<Self> {
        Self::with_proxifier(session, config, PassThroughProxifier)
    }
}

impl<P: EntityProxifier> SliceQueryExecutor<P> {
    pub fn with_proxifier(
        session: Arc<dyn Session>,
        config: PersistenceConfig,
        proxifier: P,
    ) -> CqlResult<Self> {
        config.validate()?;
        let statements = StatementCache::new(config.statements.prepared_statements_cache_size);
        Ok(Self {
            session,
            config: Arc::new(config),
            statements: Arc::new(statements),
            proxifier: Arc::new(proxifier),
        })
    }

    pub fn config(&self) -> &PersistenceConfig {
        &self.config
    }

    pub fn statement_cache(&self) -> &StatementCache {
        &self.statements
    }

    /// Execute one bounded SELECT and decode every row
    #[instrument(skip(self, query), fields(entity = query.entity_name()))]
    pub async fn get<T>(&self, query: &SliceQuery<T>) -> CqlResult<Vec<T>> {
        let plan = SlicePlan::new(query, &self.config)?;
        let statement = plan.select_statement();
        let rows = self
            .session
            .execute(&statement.bind(plan.consistency()))
            .await?;
        debug!(
            rows = rows.len(),
            consistency = %plan.consistency(),
            "Slice query executed"
        );

        let decoder = self.decoder(query, &plan);
        rows.map(|row| {
            let key = decoder.clustering_key(&row)?;
            decoder.decode(&row, key)
        })
        .collect()
    }

    /// Execute the first page and return a lazy iterator over the slice.
    ///
    /// Later pages use a prepared continuation statement shared through the
    /// statement cache.
    #[instrument(skip(self, query), fields(entity = query.entity_name()))]
    pub async fn iterator<T>(&self, query: &SliceQuery<T>) -> CqlResult<SliceQueryIterator<T, P>> {
        let plan = SlicePlan::new(query, &self.config)?;
        let first_page = plan.first_page_statement();
        let page = self
            .session
            .execute(&first_page.bind(plan.consistency()))
            .await?;

        let continuation = plan.continuation_statement().to_cql();
        let prepared = self
            .statements
            .get_or_prepare(self.session.as_ref(), &continuation)
            .await?;
        debug!(
            rows = page.len(),
            batch_size = plan.batch_size(),
            "First slice page fetched"
        );

        let decoder = self.decoder(query, &plan);
        Ok(SliceQueryIterator::new(
            Arc::clone(&self.session),
            plan,
            decoder,
            prepared,
            page,
        ))
    }

    /// Delete the slice; no affected-row count is available
    #[instrument(skip(self, query), fields(entity = query.entity_name()))]
    pub async fn remove<T>(&self, query: &SliceQuery<T>) -> CqlResult<()> {
        let plan = SlicePlan::new(query, &self.config)?;
        let statement = plan.remove_statement()?;
        self.session
            .execute(&statement.bind(plan.consistency()))
            .await?;
        debug!(table = %plan.table(), "Slice removed");
        Ok(())
    }

    fn decoder<T>(&self, query: &SliceQuery<T>, plan: &SlicePlan) -> RowDecoder<T, P> {
        RowDecoder::new(query.meta_arc(), Arc::clone(&self.proxifier), plan)
    }
}
