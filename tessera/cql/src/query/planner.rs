//! Slice query planner
//!
//! Turns a [`SliceQuery`] into SELECT and DELETE statement trees. The WHERE
//! clause is built as:
//!
//! 1. equality on every partition key component;
//! 2. equality on the leading clustering components both bounds share;
//! 3. one single-column relation per remaining bound tail.
//!
//! Single-column and multi-column relations cannot be mixed on clustering
//! columns. When a bound tail spans more than one column, every clustering
//! relation is written as a tuple over the full bound instead, the shared
//! prefix included.
//!
//! With ascending ordering the start bound is the lower bound; with
//! descending ordering it is the upper bound. Both orderings therefore
//! select the same rows and differ only in `ORDER BY`.

use super::slice::{BoundingMode, OrderingMode, SliceQuery};
use crate::config::PersistenceConfig;
use crate::consistency::ConsistencyLevel;
use crate::error::{CqlResult, SchemaResult, ValidationError};
use crate::schema::{
    ClusteringOrder, ComparisonOperator, DeleteSpec, Identifier, IdentifierRole, Limit,
    QualifiedName, Relation, SelectSpec, StatementSpec,
};
use crate::session::BoundStatement;
use crate::types::CqlValue;
use std::cmp::Ordering;
use tracing::trace;

/// Check that the start bound does not come after the end bound under the
/// iteration order, and that the range can select at least one row.
///
/// Returns the number of leading components both bounds share.
pub(crate) fn validate_range(
    clustering_columns: &[String],
    from: &[CqlValue],
    to: &[CqlValue],
    bounding: BoundingMode,
    ordering: OrderingMode,
) -> SchemaResult<usize> {
    let common = from.len().min(to.len());
    for i in 0..common {
        let order = from[i].compare(&to[i]).ok_or_else(|| {
            ValidationError::MalformedRange(format!(
                "bounds {:?} and {:?} of clustering column '{}' are not comparable",
                from[i], to[i], clustering_columns[i]
            ))
        })?;
        let order = if ordering.is_reversed() {
            order.reverse()
        } else {
            order
        };
        match order {
            Ordering::Less => return Ok(i),
            Ordering::Greater => {
                return Err(ValidationError::MalformedRange(format!(
                    "start {:?} comes after end {:?} in {:?} order",
                    from, to, ordering
                )))
            }
            Ordering::Equal => {}
        }
    }

    let start_exclusive = !from.is_empty() && !bounding.start_inclusive();
    let end_exclusive = !to.is_empty() && !bounding.end_inclusive();
    let empty_range = match from.len().cmp(&to.len()) {
        Ordering::Equal => common > 0 && (start_exclusive || end_exclusive),
        Ordering::Less => start_exclusive,
        Ordering::Greater => end_exclusive,
    };
    if empty_range {
        return Err(ValidationError::MalformedRange(format!(
            "exclusive bound {:?} shares its prefix with {:?} and selects no row",
            from, to
        )));
    }
    Ok(common)
}

/// Statement tree plus the values for its bind markers, in order
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedStatement {
    pub statement: StatementSpec,
    pub values: Vec<CqlValue>,
}

impl PlannedStatement {
    fn new(statement: StatementSpec, values: Vec<CqlValue>) -> Self {
        debug_assert_eq!(statement.bind_marker_count(), values.len());
        Self { statement, values }
    }

    pub fn cql(&self) -> String {
        self.statement.to_cql()
    }

    pub fn bind(&self, consistency: ConsistencyLevel) -> BoundStatement {
        BoundStatement::new(self.cql(), self.values.clone(), consistency)
    }
}

/// Validated, keyspace-qualified plan of one slice query
#[derive(Debug, Clone)]
pub struct SlicePlan {
    entity_name: String,
    table: QualifiedName,
    selected: Vec<Identifier>,
    partition_key: Vec<Identifier>,
    clustering_columns: Vec<Identifier>,
    partition_values: Vec<CqlValue>,
    shared_prefix: usize,
    clustering_from: Vec<CqlValue>,
    clustering_to: Vec<CqlValue>,
    bounding: BoundingMode,
    ordering: OrderingMode,
    limit: Option<u32>,
    batch_size: u32,
    consistency: ConsistencyLevel,
}

impl SlicePlan {
    pub fn new<T>(query: &SliceQuery<T>, config: &PersistenceConfig) -> CqlResult<Self> {
        let layout = query.meta().layout();
        let keyspace = config.keyspace()?;
        let table = QualifiedName::table(layout.keyspace.as_deref(), &layout.table)?
            .or_keyspace(Some(&keyspace));

        let partition_key = identifiers(&layout.partition_key, IdentifierRole::PartitionKey)?;
        let clustering_columns =
            identifiers(&layout.clustering_columns, IdentifierRole::ClusteringColumn)?;
        let columns = identifiers(&layout.columns, IdentifierRole::Column)?;

        let shared_prefix = validate_range(
            &layout.clustering_columns,
            query.clustering_from(),
            query.clustering_to(),
            query.bounding(),
            query.ordering(),
        )?;

        let consistency = query
            .consistency_level()
            .unwrap_or_else(|| config.read_level(&layout.table));
        let batch_size = query
            .batch_size()
            .unwrap_or(config.statements.default_batch_size);

        let selected = partition_key
            .iter()
            .chain(&clustering_columns)
            .chain(&columns)
            .cloned()
            .collect();

        trace!(
            entity = query.entity_name(),
            table = %table,
            %consistency,
            shared_prefix,
            "Slice query planned"
        );

        Ok(Self {
            entity_name: query.entity_name().to_string(),
            table,
            selected,
            partition_key,
            clustering_columns,
            partition_values: query.partition_components().to_vec(),
            shared_prefix,
            clustering_from: query.clustering_from().to_vec(),
            clustering_to: query.clustering_to().to_vec(),
            bounding: query.bounding(),
            ordering: query.ordering(),
            limit: query.limit(),
            batch_size,
            consistency,
        })
    }

    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }

    pub fn table(&self) -> &QualifiedName {
        &self.table
    }

    pub fn partition_values(&self) -> &[CqlValue] {
        &self.partition_values
    }

    pub fn consistency(&self) -> ConsistencyLevel {
        self.consistency
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    pub fn batch_size(&self) -> u32 {
        self.batch_size
    }

    /// Single SELECT honoring the overall limit
    pub fn select_statement(&self) -> PlannedStatement {
        let (relations, values) = self.range_relations();
        self.select(relations, values, self.limit.map(Limit::Value))
    }

    /// First page of an iteration: same predicate, `LIMIT <batch size>`
    pub fn first_page_statement(&self) -> PlannedStatement {
        let (relations, values) = self.range_relations();
        self.select(relations, values, Some(Limit::Value(self.batch_size)))
    }

    /// Statement fetching the page after a given clustering key; bind with
    /// [`SlicePlan::continuation_values`]
    pub fn continuation_statement(&self) -> StatementSpec {
        let mut relations = self.partition_relations();
        let after = if self.ordering.is_reversed() {
            ComparisonOperator::LessThan
        } else {
            ComparisonOperator::GreaterThan
        };
        relations.push(Relation::tuple(self.clustering_columns.clone(), after));
        if !self.clustering_to.is_empty() {
            relations.push(Relation::tuple(
                self.clustering_columns[..self.clustering_to.len()].to_vec(),
                self.end_operator(),
            ));
        }
        StatementSpec::Select(SelectSpec {
            table: self.table.clone(),
            columns: self.selected.clone(),
            relations,
            order_by: Some(self.order_by()),
            limit: Some(Limit::Value(self.batch_size)),
        })
    }

    pub fn continuation_values(&self, last_key: &[CqlValue]) -> Vec<CqlValue> {
        self.partition_values
            .iter()
            .chain(last_key)
            .chain(&self.clustering_to)
            .cloned()
            .collect()
    }

    /// Range DELETE; the predicate must name a contiguous clustering prefix
    pub fn remove_statement(&self) -> SchemaResult<PlannedStatement> {
        if self.limit.is_some() {
            return Err(ValidationError::InvalidQuery(format!(
                "Limit is not allowed when removing a slice of entity '{}'",
                self.entity_name
            )));
        }
        let (relations, values) = self.range_relations();
        if let Some(Relation::Tuple { columns, .. }) = relations.iter().find(|r| r.is_tuple()) {
            let names = columns
                .iter()
                .map(Identifier::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ValidationError::MalformedRange(format!(
                "removing a slice of entity '{}' over ({}) leaves a hole in the clustering prefix",
                self.entity_name, names
            )));
        }
        Ok(PlannedStatement::new(
            StatementSpec::Delete(DeleteSpec {
                table: self.table.clone(),
                relations,
            }),
            values,
        ))
    }

    /// DELETE of the single row with the given clustering key
    pub fn row_delete_statement(&self, clustering_key: &[CqlValue]) -> PlannedStatement {
        let mut relations = self.partition_relations();
        relations.extend(self.clustering_columns.iter().cloned().map(Relation::eq));
        let values = self
            .partition_values
            .iter()
            .chain(clustering_key)
            .cloned()
            .collect();
        PlannedStatement::new(
            StatementSpec::Delete(DeleteSpec {
                table: self.table.clone(),
                relations,
            }),
            values,
        )
    }

    fn select(
        &self,
        relations: Vec<Relation>,
        values: Vec<CqlValue>,
        limit: Option<Limit>,
    ) -> PlannedStatement {
        PlannedStatement::new(
            StatementSpec::Select(SelectSpec {
                table: self.table.clone(),
                columns: self.selected.clone(),
                relations,
                order_by: Some(self.order_by()),
                limit,
            }),
            values,
        )
    }

    fn order_by(&self) -> (Identifier, ClusteringOrder) {
        (
            self.clustering_columns[0].clone(),
            self.ordering.clustering_order(),
        )
    }

    fn partition_relations(&self) -> Vec<Relation> {
        self.partition_key.iter().cloned().map(Relation::eq).collect()
    }

    fn start_operator(&self) -> ComparisonOperator {
        let inclusive = self.bounding.start_inclusive();
        if self.ordering.is_reversed() {
            ComparisonOperator::upper(inclusive)
        } else {
            ComparisonOperator::lower(inclusive)
        }
    }

    fn end_operator(&self) -> ComparisonOperator {
        let inclusive = self.bounding.end_inclusive();
        if self.ordering.is_reversed() {
            ComparisonOperator::lower(inclusive)
        } else {
            ComparisonOperator::upper(inclusive)
        }
    }

    fn range_relations(&self) -> (Vec<Relation>, Vec<CqlValue>) {
        let k = self.shared_prefix;
        let mut relations = self.partition_relations();
        let mut values = self.partition_values.clone();
        let bounds = [
            (&self.clustering_from, self.start_operator()),
            (&self.clustering_to, self.end_operator()),
        ];

        if bounds.iter().any(|(bound, _)| bound.len() > k + 1) {
            for (bound, operator) in bounds {
                if !bound.is_empty() {
                    relations.push(Relation::tuple(
                        self.clustering_columns[..bound.len()].to_vec(),
                        operator,
                    ));
                    values.extend_from_slice(bound);
                }
            }
            return (relations, values);
        }

        for (column, value) in self.clustering_columns.iter().zip(&self.clustering_from).take(k) {
            relations.push(Relation::eq(column.clone()));
            values.push(value.clone());
        }
        for (bound, operator) in bounds {
            if bound.len() > k {
                relations.push(Relation::single(self.clustering_columns[k].clone(), operator));
                values.push(bound[k].clone());
            }
        }
        (relations, values)
    }
}

fn identifiers(names: &[String], role: IdentifierRole) -> SchemaResult<Vec<Identifier>> {
    names
        .iter()
        .map(|name| Identifier::new(name.as_str(), role))
        .collect()
}
