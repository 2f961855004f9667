//! Fluent schema statement builders
//!
//! Each step returns a narrower builder exposing only its legal next
//! operations, e.g. `SchemaBuilder::alter_table("test")?.rename_column("a")?`
//! only offers `to(..)`. Identifiers are validated against reserved keywords
//! at the call that receives them.

use super::identifier::{Identifier, QualifiedName};
use super::keywords::IdentifierRole;
use super::options::{TableOptions, TableOptionsBuilder};
use super::statement::{AlterAction, ClusteringOrder, ColumnSpec, Replication, StatementSpec};
use crate::error::{SchemaResult, ValidationError};
use crate::types::CqlType;
use std::collections::HashSet;

/// Entry point for schema statements
pub struct SchemaBuilder;

impl SchemaBuilder {
    pub fn create_keyspace(name: &str) -> SchemaResult<CreateKeyspace> {
        Ok(CreateKeyspace {
            name: Identifier::new(name, IdentifierRole::Keyspace)?,
            if_not_exists: false,
            replication: None,
            durable_writes: None,
        })
    }

    pub fn alter_keyspace(name: &str) -> SchemaResult<AlterKeyspace> {
        Ok(AlterKeyspace {
            name: Identifier::new(name, IdentifierRole::Keyspace)?,
            replication: None,
            durable_writes: None,
        })
    }

    pub fn drop_keyspace(name: &str) -> SchemaResult<DropKeyspace> {
        Ok(DropKeyspace {
            name: Identifier::new(name, IdentifierRole::Keyspace)?,
            if_exists: false,
        })
    }

    pub fn create_table(table: &str) -> SchemaResult<CreateTable> {
        Ok(CreateTable::new(QualifiedName::table(None, table)?))
    }

    pub fn create_table_in(keyspace: &str, table: &str) -> SchemaResult<CreateTable> {
        Ok(CreateTable::new(QualifiedName::table(Some(keyspace), table)?))
    }

    pub fn alter_table(table: &str) -> SchemaResult<AlterTable> {
        Ok(AlterTable {
            name: QualifiedName::table(None, table)?,
        })
    }

    pub fn alter_table_in(keyspace: &str, table: &str) -> SchemaResult<AlterTable> {
        Ok(AlterTable {
            name: QualifiedName::table(Some(keyspace), table)?,
        })
    }

    pub fn drop_table(table: &str) -> SchemaResult<DropTable> {
        Ok(DropTable {
            name: QualifiedName::table(None, table)?,
            if_exists: false,
        })
    }

    pub fn drop_table_in(keyspace: &str, table: &str) -> SchemaResult<DropTable> {
        Ok(DropTable {
            name: QualifiedName::table(Some(keyspace), table)?,
            if_exists: false,
        })
    }

    pub fn create_index(index: &str) -> SchemaResult<CreateIndex> {
        Ok(CreateIndex {
            name: Identifier::new(index, IdentifierRole::Index)?,
            if_not_exists: false,
        })
    }

    pub fn drop_index(index: &str) -> SchemaResult<DropIndex> {
        Ok(DropIndex {
            name: QualifiedName::new(index, IdentifierRole::Index)?,
            if_exists: false,
        })
    }

    pub fn drop_index_in(keyspace: &str, index: &str) -> SchemaResult<DropIndex> {
        Ok(DropIndex {
            name: QualifiedName::qualified(keyspace, index, IdentifierRole::Index)?,
            if_exists: false,
        })
    }
}

// ---- keyspaces ----

pub struct CreateKeyspace {
    name: Identifier,
    if_not_exists: bool,
    replication: Option<Replication>,
    durable_writes: Option<bool>,
}

impl CreateKeyspace {
    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    pub fn with_simple_strategy(mut self, replication_factor: u32) -> Self {
        self.replication = Some(Replication::Simple { replication_factor });
        self
    }

    /// Data centers are rendered in the given order
    pub fn with_network_topology_strategy<S: Into<String>>(
        mut self,
        data_centers: impl IntoIterator<Item = (S, u32)>,
    ) -> Self {
        self.replication = Some(Replication::NetworkTopology {
            data_centers: data_centers
                .into_iter()
                .map(|(dc, rf)| (dc.into(), rf))
                .collect(),
        });
        self
    }

    pub fn durable_writes(mut self, durable: bool) -> Self {
        self.durable_writes = Some(durable);
        self
    }

    pub fn build(self) -> SchemaResult<StatementSpec> {
        let replication = self.replication.ok_or_else(|| {
            ValidationError::InvalidSchema(format!(
                "Replication strategy should be provided for keyspace '{}'",
                self.name
            ))
        })?;
        Ok(StatementSpec::CreateKeyspace {
            name: self.name,
            if_not_exists: self.if_not_exists,
            replication,
            durable_writes: self.durable_writes,
        })
    }
}

pub struct AlterKeyspace {
    name: Identifier,
    replication: Option<Replication>,
    durable_writes: Option<bool>,
}

impl AlterKeyspace {
    pub fn with_simple_strategy(mut self, replication_factor: u32) -> Self {
        self.replication = Some(Replication::Simple { replication_factor });
        self
    }

    pub fn with_network_topology_strategy<S: Into<String>>(
        mut self,
        data_centers: impl IntoIterator<Item = (S, u32)>,
    ) -> Self {
        self.replication = Some(Replication::NetworkTopology {
            data_centers: data_centers
                .into_iter()
                .map(|(dc, rf)| (dc.into(), rf))
                .collect(),
        });
        self
    }

    pub fn durable_writes(mut self, durable: bool) -> Self {
        self.durable_writes = Some(durable);
        self
    }

    pub fn build(self) -> SchemaResult<StatementSpec> {
        if self.replication.is_none() && self.durable_writes.is_none() {
            return Err(ValidationError::InvalidSchema(format!(
                "ALTER KEYSPACE '{}' requires replication or durable_writes",
                self.name
            )));
        }
        Ok(StatementSpec::AlterKeyspace {
            name: self.name,
            replication: self.replication,
            durable_writes: self.durable_writes,
        })
    }
}

pub struct DropKeyspace {
    name: Identifier,
    if_exists: bool,
}

impl DropKeyspace {
    pub fn if_exists(mut self) -> Self {
        self.if_exists = true;
        self
    }

    pub fn build(self) -> StatementSpec {
        StatementSpec::DropKeyspace {
            name: self.name,
            if_exists: self.if_exists,
        }
    }
}

// ---- tables ----

pub struct CreateTable {
    name: QualifiedName,
    if_not_exists: bool,
    partition_key: Vec<ColumnSpec>,
    clustering_columns: Vec<ColumnSpec>,
    columns: Vec<ColumnSpec>,
}

impl CreateTable {
    fn new(name: QualifiedName) -> Self {
        Self {
            name,
            if_not_exists: false,
            partition_key: Vec::new(),
            clustering_columns: Vec::new(),
            columns: Vec::new(),
        }
    }

    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    /// Partition key components, in declaration order
    pub fn add_partition_key(mut self, name: &str, data_type: CqlType) -> SchemaResult<Self> {
        self.partition_key
            .push(column(name, IdentifierRole::PartitionKey, data_type, false)?);
        Ok(self)
    }

    pub fn add_clustering_column(mut self, name: &str, data_type: CqlType) -> SchemaResult<Self> {
        self.clustering_columns.push(column(
            name,
            IdentifierRole::ClusteringColumn,
            data_type,
            false,
        )?);
        Ok(self)
    }

    pub fn add_column(mut self, name: &str, data_type: CqlType) -> SchemaResult<Self> {
        self.columns
            .push(column(name, IdentifierRole::Column, data_type, false)?);
        Ok(self)
    }

    pub fn add_static_column(mut self, name: &str, data_type: CqlType) -> SchemaResult<Self> {
        self.columns
            .push(column(name, IdentifierRole::Column, data_type, true)?);
        Ok(self)
    }

    pub fn with_options(self) -> CreateTableOptions {
        CreateTableOptions {
            table: self,
            clustering_order: Vec::new(),
            compact_storage: false,
            options: TableOptions::new(),
        }
    }

    pub fn build(self) -> SchemaResult<StatementSpec> {
        self.with_options().build()
    }
}

/// Options stage of CREATE TABLE
pub struct CreateTableOptions {
    table: CreateTable,
    clustering_order: Vec<(Identifier, ClusteringOrder)>,
    compact_storage: bool,
    options: TableOptions,
}

impl CreateTableOptions {
    pub fn clustering_order(mut self, column: &str, order: ClusteringOrder) -> SchemaResult<Self> {
        self.clustering_order.push((
            Identifier::new(column, IdentifierRole::ClusteringColumn)?,
            order,
        ));
        Ok(self)
    }

    pub fn compact_storage(mut self) -> Self {
        self.compact_storage = true;
        self
    }

    pub fn build(self) -> SchemaResult<StatementSpec> {
        let table = self.table;
        if table.partition_key.is_empty() {
            return Err(ValidationError::InvalidSchema(format!(
                "Table '{}' should have at least one partition key",
                table.name
            )));
        }

        let mut seen = HashSet::new();
        for spec in table
            .partition_key
            .iter()
            .chain(&table.clustering_columns)
            .chain(&table.columns)
        {
            if !seen.insert(spec.name.as_str().to_lowercase()) {
                return Err(ValidationError::InvalidSchema(format!(
                    "Column '{}' is declared more than once in table '{}'",
                    spec.name, table.name
                )));
            }
        }

        if table.clustering_columns.is_empty() {
            if let Some(spec) = table.columns.iter().find(|c| c.is_static) {
                return Err(ValidationError::InvalidSchema(format!(
                    "Static column '{}' requires at least one clustering column in table '{}'",
                    spec.name, table.name
                )));
            }
        }

        for (column, _) in &self.clustering_order {
            if !table.clustering_columns.iter().any(|c| &c.name == column) {
                return Err(ValidationError::InvalidSchema(format!(
                    "Clustering order references '{}' which is not a clustering column of table '{}'",
                    column, table.name
                )));
            }
        }

        self.options.validate()?;
        Ok(StatementSpec::CreateTable {
            name: table.name,
            if_not_exists: table.if_not_exists,
            partition_key: table.partition_key,
            clustering_columns: table.clustering_columns,
            columns: table.columns,
            clustering_order: self.clustering_order,
            compact_storage: self.compact_storage,
            options: self.options,
        })
    }
}

impl TableOptionsBuilder for CreateTableOptions {
    fn options_mut(&mut self) -> &mut TableOptions {
        &mut self.options
    }
}

/// ALTER TABLE; exactly one action per statement
pub struct AlterTable {
    name: QualifiedName,
}

impl AlterTable {
    pub fn alter_column(self, column: &str) -> SchemaResult<AlterColumn> {
        Ok(AlterColumn {
            name: self.name,
            column: Identifier::new(column, IdentifierRole::AlteredColumn)?,
        })
    }

    pub fn add_column(self, column: &str) -> SchemaResult<AddColumn> {
        Ok(AddColumn {
            name: self.name,
            column: Identifier::new(column, IdentifierRole::NewColumn)?,
            is_static: false,
        })
    }

    pub fn add_static_column(self, column: &str) -> SchemaResult<AddColumn> {
        Ok(AddColumn {
            name: self.name,
            column: Identifier::new(column, IdentifierRole::NewColumn)?,
            is_static: true,
        })
    }

    pub fn rename_column(self, column: &str) -> SchemaResult<RenameColumn> {
        Ok(RenameColumn {
            name: self.name,
            from: Identifier::new(column, IdentifierRole::RenamedColumn)?,
        })
    }

    pub fn drop_column(self, column: &str) -> SchemaResult<StatementSpec> {
        Ok(StatementSpec::AlterTable {
            name: self.name,
            action: AlterAction::DropColumn(Identifier::new(
                column,
                IdentifierRole::DroppedColumn,
            )?),
        })
    }

    pub fn with_options(self) -> AlterTableOptions {
        AlterTableOptions {
            name: self.name,
            options: TableOptions::new(),
        }
    }
}

pub struct AlterColumn {
    name: QualifiedName,
    column: Identifier,
}

impl AlterColumn {
    pub fn of_type(self, data_type: CqlType) -> StatementSpec {
        StatementSpec::AlterTable {
            name: self.name,
            action: AlterAction::AlterColumn {
                column: self.column,
                data_type,
            },
        }
    }
}

pub struct AddColumn {
    name: QualifiedName,
    column: Identifier,
    is_static: bool,
}

impl AddColumn {
    pub fn of_type(self, data_type: CqlType) -> StatementSpec {
        StatementSpec::AlterTable {
            name: self.name,
            action: AlterAction::AddColumn(ColumnSpec {
                name: self.column,
                data_type,
                is_static: self.is_static,
            }),
        }
    }
}

pub struct RenameColumn {
    name: QualifiedName,
    from: Identifier,
}

impl RenameColumn {
    pub fn to(self, column: &str) -> SchemaResult<StatementSpec> {
        Ok(StatementSpec::AlterTable {
            name: self.name,
            action: AlterAction::RenameColumn {
                from: self.from,
                to: Identifier::new(column, IdentifierRole::NewColumn)?,
            },
        })
    }
}

pub struct AlterTableOptions {
    name: QualifiedName,
    options: TableOptions,
}

impl AlterTableOptions {
    pub fn build(self) -> SchemaResult<StatementSpec> {
        if self.options.is_empty() {
            return Err(ValidationError::InvalidSchema(format!(
                "ALTER TABLE {} WITH requires at least one option",
                self.name
            )));
        }
        self.options.validate()?;
        Ok(StatementSpec::AlterTable {
            name: self.name,
            action: AlterAction::WithOptions(self.options),
        })
    }
}

impl TableOptionsBuilder for AlterTableOptions {
    fn options_mut(&mut self) -> &mut TableOptions {
        &mut self.options
    }
}

pub struct DropTable {
    name: QualifiedName,
    if_exists: bool,
}

impl DropTable {
    pub fn if_exists(mut self) -> Self {
        self.if_exists = true;
        self
    }

    pub fn build(self) -> StatementSpec {
        StatementSpec::DropTable {
            name: self.name,
            if_exists: self.if_exists,
        }
    }
}

// ---- indexes ----

pub struct CreateIndex {
    name: Identifier,
    if_not_exists: bool,
}

impl CreateIndex {
    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    pub fn on_table(self, table: &str) -> SchemaResult<CreateIndexOn> {
        self.on(QualifiedName::table(None, table)?)
    }

    pub fn on_table_in(self, keyspace: &str, table: &str) -> SchemaResult<CreateIndexOn> {
        self.on(QualifiedName::table(Some(keyspace), table)?)
    }

    fn on(self, table: QualifiedName) -> SchemaResult<CreateIndexOn> {
        Ok(CreateIndexOn {
            index: self,
            table,
            columns: Vec::new(),
        })
    }
}

/// Indexed columns; more than one makes a composite index
pub struct CreateIndexOn {
    index: CreateIndex,
    table: QualifiedName,
    columns: Vec<Identifier>,
}

impl CreateIndexOn {
    pub fn column(mut self, column: &str) -> SchemaResult<Self> {
        self.columns
            .push(Identifier::new(column, IdentifierRole::Column)?);
        Ok(self)
    }

    pub fn build(self) -> SchemaResult<StatementSpec> {
        if self.columns.is_empty() {
            return Err(ValidationError::InvalidSchema(format!(
                "Index '{}' should name at least one column",
                self.index.name
            )));
        }
        Ok(StatementSpec::CreateIndex {
            name: self.index.name,
            if_not_exists: self.index.if_not_exists,
            table: self.table,
            columns: self.columns,
        })
    }
}

pub struct DropIndex {
    name: QualifiedName,
    if_exists: bool,
}

impl DropIndex {
    pub fn if_exists(mut self) -> Self {
        self.if_exists = true;
        self
    }

    pub fn build(self) -> StatementSpec {
        StatementSpec::DropIndex {
            name: self.name,
            if_exists: self.if_exists,
        }
    }
}

fn column(
    name: &str,
    role: IdentifierRole,
    data_type: CqlType,
    is_static: bool,
) -> SchemaResult<ColumnSpec> {
    Ok(ColumnSpec {
        name: Identifier::new(name, role)?,
        data_type,
        is_static,
    })
}
