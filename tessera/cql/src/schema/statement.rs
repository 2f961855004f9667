//! Statement tree produced by the builders and consumed by the serializer

use super::identifier::{Identifier, QualifiedName};
use super::options::TableOptions;
use crate::types::CqlType;
use std::fmt;

/// Column definition
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    /// Column name
    pub name: Identifier,
    /// Data type
    pub data_type: CqlType,
    /// Is static column
    pub is_static: bool,
}

/// Clustering order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusteringOrder {
    /// Ascending order
    Asc,
    /// Descending order
    Desc,
}

impl ClusteringOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            ClusteringOrder::Asc => "ASC",
            ClusteringOrder::Desc => "DESC",
        }
    }
}

/// Keyspace replication strategy
#[derive(Debug, Clone, PartialEq)]
pub enum Replication {
    Simple {
        replication_factor: u32,
    },
    /// Per data-center replication factors, in declaration order
    NetworkTopology {
        data_centers: Vec<(String, u32)>,
    },
}

/// Change applied by ALTER TABLE
#[derive(Debug, Clone, PartialEq)]
pub enum AlterAction {
    AlterColumn { column: Identifier, data_type: CqlType },
    AddColumn(ColumnSpec),
    RenameColumn { from: Identifier, to: Identifier },
    DropColumn(Identifier),
    WithOptions(TableOptions),
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOperator {
    /// Equality (=)
    Equal,
    /// Greater than (>)
    GreaterThan,
    /// Greater than or equal (>=)
    GreaterThanOrEqual,
    /// Less than (<)
    LessThan,
    /// Less than or equal (<=)
    LessThanOrEqual,
}

impl ComparisonOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "=",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::GreaterThanOrEqual => ">=",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::LessThanOrEqual => "<=",
        }
    }

    /// Lower-bound operator
    pub fn lower(inclusive: bool) -> Self {
        if inclusive {
            ComparisonOperator::GreaterThanOrEqual
        } else {
            ComparisonOperator::GreaterThan
        }
    }

    /// Upper-bound operator
    pub fn upper(inclusive: bool) -> Self {
        if inclusive {
            ComparisonOperator::LessThanOrEqual
        } else {
            ComparisonOperator::LessThan
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// WHERE clause relation; every value is a bind marker
#[derive(Debug, Clone, PartialEq)]
pub enum Relation {
    /// `column <op> ?`
    Single {
        column: Identifier,
        operator: ComparisonOperator,
    },
    /// `(c1, c2) <op> (?, ?)`
    Tuple {
        columns: Vec<Identifier>,
        operator: ComparisonOperator,
    },
}

impl Relation {
    pub fn eq(column: Identifier) -> Self {
        Relation::Single {
            column,
            operator: ComparisonOperator::Equal,
        }
    }

    pub fn single(column: Identifier, operator: ComparisonOperator) -> Self {
        Relation::Single { column, operator }
    }

    /// Multi-column relation, also used for a single column when another
    /// relation on the clustering columns is a tuple
    pub fn tuple(columns: Vec<Identifier>, operator: ComparisonOperator) -> Self {
        Relation::Tuple { columns, operator }
    }

    /// Number of bind markers
    pub fn arity(&self) -> usize {
        match self {
            Relation::Single { .. } => 1,
            Relation::Tuple { columns, .. } => columns.len(),
        }
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self, Relation::Tuple { .. })
    }
}

/// LIMIT clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Value(u32),
    /// `LIMIT ?`
    Marker,
}

/// SELECT over one table
#[derive(Debug, Clone, PartialEq)]
pub struct SelectSpec {
    pub table: QualifiedName,
    /// Selected columns, `*` when empty
    pub columns: Vec<Identifier>,
    pub relations: Vec<Relation>,
    pub order_by: Option<(Identifier, ClusteringOrder)>,
    pub limit: Option<Limit>,
}

/// DELETE of whole rows
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteSpec {
    pub table: QualifiedName,
    pub relations: Vec<Relation>,
}

/// Immutable statement tree
#[derive(Debug, Clone, PartialEq)]
pub enum StatementSpec {
    CreateKeyspace {
        name: Identifier,
        if_not_exists: bool,
        replication: Replication,
        durable_writes: Option<bool>,
    },
    AlterKeyspace {
        name: Identifier,
        replication: Option<Replication>,
        durable_writes: Option<bool>,
    },
    DropKeyspace {
        name: Identifier,
        if_exists: bool,
    },
    CreateTable {
        name: QualifiedName,
        if_not_exists: bool,
        partition_key: Vec<ColumnSpec>,
        clustering_columns: Vec<ColumnSpec>,
        columns: Vec<ColumnSpec>,
        clustering_order: Vec<(Identifier, ClusteringOrder)>,
        compact_storage: bool,
        options: TableOptions,
    },
    AlterTable {
        name: QualifiedName,
        action: AlterAction,
    },
    DropTable {
        name: QualifiedName,
        if_exists: bool,
    },
    CreateIndex {
        name: Identifier,
        if_not_exists: bool,
        table: QualifiedName,
        columns: Vec<Identifier>,
    },
    DropIndex {
        name: QualifiedName,
        if_exists: bool,
    },
    Select(SelectSpec),
    Delete(DeleteSpec),
}

impl StatementSpec {
    /// Canonical CQL text
    pub fn to_cql(&self) -> String {
        super::serializer::serialize(self)
    }

    /// Number of bind markers in the statement
    pub fn bind_marker_count(&self) -> usize {
        match self {
            StatementSpec::Select(select) => {
                let relations: usize = select.relations.iter().map(Relation::arity).sum();
                relations + usize::from(matches!(select.limit, Some(Limit::Marker)))
            }
            StatementSpec::Delete(delete) => delete.relations.iter().map(Relation::arity).sum(),
            _ => 0,
        }
    }
}

impl fmt::Display for StatementSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cql())
    }
}
