//! Slice query definition

use super::planner;
use crate::consistency::ConsistencyLevel;
use crate::entity::EntityMeta;
use crate::error::{SchemaResult, ValidationError};
use crate::schema::ClusteringOrder;
use crate::types::CqlValue;
use std::fmt;
use std::sync::Arc;

/// Inclusiveness of the clustering bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundingMode {
    #[default]
    InclusiveBounds,
    ExclusiveBounds,
    InclusiveStartBoundOnly,
    InclusiveEndBoundOnly,
}

impl BoundingMode {
    pub fn start_inclusive(self) -> bool {
        matches!(
            self,
            BoundingMode::InclusiveBounds | BoundingMode::InclusiveStartBoundOnly
        )
    }

    pub fn end_inclusive(self) -> bool {
        matches!(
            self,
            BoundingMode::InclusiveBounds | BoundingMode::InclusiveEndBoundOnly
        )
    }
}

/// Iteration direction over the clustering columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderingMode {
    #[default]
    Ascending,
    Descending,
}

impl OrderingMode {
    pub fn clustering_order(self) -> ClusteringOrder {
        match self {
            OrderingMode::Ascending => ClusteringOrder::Asc,
            OrderingMode::Descending => ClusteringOrder::Desc,
        }
    }

    pub fn is_reversed(self) -> bool {
        self == OrderingMode::Descending
    }
}

/// Bounded scan over the clustering columns of one partition.
///
/// `clustering_from` and `clustering_to` are the start and end of iteration:
/// with [`OrderingMode::Descending`] the start is the greatest key. Either
/// bound may be a strict prefix of the clustering key, and an empty bound
/// leaves that side open.
pub struct SliceQuery<T> {
    meta: Arc<dyn EntityMeta<T>>,
    partition_components: Vec<CqlValue>,
    clustering_from: Vec<CqlValue>,
    clustering_to: Vec<CqlValue>,
    bounding: BoundingMode,
    ordering: OrderingMode,
    limit: Option<u32>,
    batch_size: Option<u32>,
    consistency_level: Option<ConsistencyLevel>,
}

impl<T> SliceQuery<T> {
    pub fn builder(meta: Arc<dyn EntityMeta<T>>) -> SliceQueryBuilder<T> {
        SliceQueryBuilder {
            query: SliceQuery {
                meta,
                partition_components: Vec::new(),
                clustering_from: Vec::new(),
                clustering_to: Vec::new(),
                bounding: BoundingMode::default(),
                ordering: OrderingMode::default(),
                limit: None,
                batch_size: None,
                consistency_level: None,
            },
        }
    }

    pub fn meta(&self) -> &dyn EntityMeta<T> {
        self.meta.as_ref()
    }

    pub(crate) fn meta_arc(&self) -> Arc<dyn EntityMeta<T>> {
        Arc::clone(&self.meta)
    }

    pub fn entity_name(&self) -> &str {
        self.meta.entity_name()
    }

    pub fn partition_components(&self) -> &[CqlValue] {
        &self.partition_components
    }

    pub fn clustering_from(&self) -> &[CqlValue] {
        &self.clustering_from
    }

    pub fn clustering_to(&self) -> &[CqlValue] {
        &self.clustering_to
    }

    pub fn bounding(&self) -> BoundingMode {
        self.bounding
    }

    pub fn ordering(&self) -> OrderingMode {
        self.ordering
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    /// Page size; the configured default applies when unset
    pub fn batch_size(&self) -> Option<u32> {
        self.batch_size
    }

    /// Per-query consistency override
    pub fn consistency_level(&self) -> Option<ConsistencyLevel> {
        self.consistency_level
    }
}

impl<T> fmt::Debug for SliceQuery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SliceQuery")
            .field("entity", &self.entity_name())
            .field("partition_components", &self.partition_components)
            .field("clustering_from", &self.clustering_from)
            .field("clustering_to", &self.clustering_to)
            .field("bounding", &self.bounding)
            .field("ordering", &self.ordering)
            .field("limit", &self.limit)
            .field("batch_size", &self.batch_size)
            .field("consistency_level", &self.consistency_level)
            .finish()
    }
}

pub struct SliceQueryBuilder<T> {
    query: SliceQuery<T>,
}

impl<T> SliceQueryBuilder<T> {
    /// Partition key values, in partition key order
    pub fn partition_components(mut self, components: impl IntoIterator<Item = CqlValue>) -> Self {
        self.query.partition_components = components.into_iter().collect();
        self
    }

    pub fn from_clusterings(mut self, components: impl IntoIterator<Item = CqlValue>) -> Self {
        self.query.clustering_from = components.into_iter().collect();
        self
    }

    pub fn to_clusterings(mut self, components: impl IntoIterator<Item = CqlValue>) -> Self {
        self.query.clustering_to = components.into_iter().collect();
        self
    }

    pub fn bounding(mut self, bounding: BoundingMode) -> Self {
        self.query.bounding = bounding;
        self
    }

    pub fn ordering(mut self, ordering: OrderingMode) -> Self {
        self.query.ordering = ordering;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.query.limit = Some(limit);
        self
    }

    pub fn batch_size(mut self, batch_size: u32) -> Self {
        self.query.batch_size = Some(batch_size);
        self
    }

    pub fn consistency_level(mut self, level: ConsistencyLevel) -> Self {
        self.query.consistency_level = Some(level);
        self
    }

    /// Validate components against the entity layout and the bounds
    /// against each other
    pub fn build(self) -> SchemaResult<SliceQuery<T>> {
        let query = self.query;
        let layout = query.meta.layout();
        let entity = query.meta.entity_name();

        if layout.clustering_columns.is_empty() {
            return Err(ValidationError::InvalidQuery(format!(
                "Entity '{}' has no clustering columns",
                entity
            )));
        }
        if query.partition_components.len() != layout.partition_key.len() {
            return Err(ValidationError::InvalidQuery(format!(
                "There should be {} partition components for entity '{}', got {}",
                layout.partition_key.len(),
                entity,
                query.partition_components.len()
            )));
        }
        for (name, bound) in [
            ("partition components", &query.partition_components),
            ("clustering start", &query.clustering_from),
            ("clustering end", &query.clustering_to),
        ] {
            if bound.iter().any(CqlValue::is_null) {
                return Err(ValidationError::InvalidQuery(format!(
                    "The {} should not contain null for entity '{}'",
                    name, entity
                )));
            }
        }
        for (name, bound) in [
            ("start", &query.clustering_from),
            ("end", &query.clustering_to),
        ] {
            if bound.len() > layout.clustering_columns.len() {
                return Err(ValidationError::InvalidQuery(format!(
                    "The clustering {} has {} components but entity '{}' has {} clustering columns",
                    name,
                    bound.len(),
                    entity,
                    layout.clustering_columns.len()
                )));
            }
        }
        if query.limit == Some(0) {
            return Err(ValidationError::InvalidQuery(
                "Limit should be strictly positive".to_string(),
            ));
        }
        if query.batch_size == Some(0) {
            return Err(ValidationError::InvalidQuery(
                "Batch size should be strictly positive".to_string(),
            ));
        }

        planner::validate_range(
            &layout.clustering_columns,
            &query.clustering_from,
            &query.clustering_to,
            query.bounding,
            query.ordering,
        )?;
        Ok(query)
    }
}
