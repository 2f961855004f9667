//! Statement serializer
//!
//! Pure function from [`StatementSpec`] to canonical CQL text. Every statement
//! starts with `"\n\t"` followed by the statement keyword; options are
//! introduced by `" WITH "` and joined by `" AND "`.

use super::identifier::Identifier;
use super::options::{map_literal, quote, TableOptions};
use super::statement::{
    AlterAction, ClusteringOrder, ColumnSpec, DeleteSpec, Limit, Relation, Replication,
    SelectSpec, StatementSpec,
};

const PREFIX: &str = "\n\t";

/// Serialize a statement tree to CQL
pub fn serialize(statement: &StatementSpec) -> String {
    let mut cql = String::from(PREFIX);
    match statement {
        StatementSpec::CreateKeyspace {
            name,
            if_not_exists,
            replication,
            durable_writes,
        } => {
            cql.push_str("CREATE KEYSPACE ");
            if *if_not_exists {
                cql.push_str("IF NOT EXISTS ");
            }
            cql.push_str(name.as_str());
            cql.push_str(&keyspace_clauses(Some(replication), *durable_writes));
        }
        StatementSpec::AlterKeyspace {
            name,
            replication,
            durable_writes,
        } => {
            cql.push_str("ALTER KEYSPACE ");
            cql.push_str(name.as_str());
            cql.push_str(&keyspace_clauses(replication.as_ref(), *durable_writes));
        }
        StatementSpec::DropKeyspace { name, if_exists } => {
            cql.push_str("DROP KEYSPACE ");
            if *if_exists {
                cql.push_str("IF EXISTS ");
            }
            cql.push_str(name.as_str());
        }
        StatementSpec::CreateTable {
            name,
            if_not_exists,
            partition_key,
            clustering_columns,
            columns,
            clustering_order,
            compact_storage,
            options,
        } => {
            cql.push_str("CREATE TABLE ");
            if *if_not_exists {
                cql.push_str("IF NOT EXISTS ");
            }
            cql.push_str(&format!("{}(", name));
            for column in partition_key
                .iter()
                .chain(clustering_columns.iter())
                .chain(columns.iter())
            {
                cql.push_str(&format!("\n\t\t{},", column_definition(column)));
            }
            cql.push_str(&format!(
                "\n\t\tPRIMARY KEY({}))",
                primary_key(partition_key, clustering_columns)
            ));

            let mut clauses = Vec::new();
            if *compact_storage {
                clauses.push("COMPACT STORAGE".to_string());
            }
            if !clustering_order.is_empty() {
                let order = clustering_order
                    .iter()
                    .map(|(column, order)| format!("{} {}", column, order.as_str()))
                    .collect::<Vec<_>>()
                    .join(", ");
                clauses.push(format!("CLUSTERING ORDER BY({})", order));
            }
            clauses.extend(option_fragments(options));
            cql.push_str(&with_clauses(&clauses));
        }
        StatementSpec::AlterTable { name, action } => {
            cql.push_str(&format!("ALTER TABLE {}", name));
            match action {
                AlterAction::AlterColumn { column, data_type } => {
                    cql.push_str(&format!(" ALTER {} TYPE {}", column, data_type));
                }
                AlterAction::AddColumn(column) => {
                    cql.push_str(&format!(" ADD {}", column_definition(column)));
                }
                AlterAction::RenameColumn { from, to } => {
                    cql.push_str(&format!(" RENAME {} TO {}", from, to));
                }
                AlterAction::DropColumn(column) => {
                    cql.push_str(&format!(" DROP {}", column));
                }
                AlterAction::WithOptions(options) => {
                    cql.push_str(&with_clauses(&option_fragments(options)));
                }
            }
        }
        StatementSpec::DropTable { name, if_exists } => {
            cql.push_str("DROP TABLE ");
            if *if_exists {
                cql.push_str("IF EXISTS ");
            }
            cql.push_str(&name.to_string());
        }
        StatementSpec::CreateIndex {
            name,
            if_not_exists,
            table,
            columns,
        } => {
            cql.push_str("CREATE INDEX ");
            if *if_not_exists {
                cql.push_str("IF NOT EXISTS ");
            }
            cql.push_str(&format!("{} ON {}({})", name, table, join_identifiers(columns)));
        }
        StatementSpec::DropIndex { name, if_exists } => {
            cql.push_str("DROP INDEX ");
            if *if_exists {
                cql.push_str("IF EXISTS ");
            }
            cql.push_str(&name.to_string());
        }
        StatementSpec::Select(select) => serialize_select(select, &mut cql),
        StatementSpec::Delete(delete) => serialize_delete(delete, &mut cql),
    }
    cql
}

fn serialize_select(select: &SelectSpec, cql: &mut String) {
    let columns = if select.columns.is_empty() {
        "*".to_string()
    } else {
        join_identifiers(&select.columns)
    };
    cql.push_str(&format!("SELECT {} FROM {}", columns, select.table));
    cql.push_str(&where_clause(&select.relations));
    if let Some((column, order)) = &select.order_by {
        cql.push_str(&format!(" ORDER BY {} {}", column, order.as_str()));
    }
    match select.limit {
        Some(Limit::Value(limit)) => cql.push_str(&format!(" LIMIT {}", limit)),
        Some(Limit::Marker) => cql.push_str(" LIMIT ?"),
        None => {}
    }
}

fn serialize_delete(delete: &DeleteSpec, cql: &mut String) {
    cql.push_str(&format!("DELETE FROM {}", delete.table));
    cql.push_str(&where_clause(&delete.relations));
}

fn where_clause(relations: &[Relation]) -> String {
    if relations.is_empty() {
        return String::new();
    }
    let rendered = relations
        .iter()
        .map(|relation| match relation {
            Relation::Single { column, operator } => format!("{} {} ?", column, operator),
            Relation::Tuple { columns, operator } => format!(
                "({}) {} ({})",
                join_identifiers(columns),
                operator,
                vec!["?"; columns.len()].join(", ")
            ),
        })
        .collect::<Vec<_>>()
        .join(" AND ");
    format!(" WHERE {}", rendered)
}

fn column_definition(column: &ColumnSpec) -> String {
    if column.is_static {
        format!("{} {} static", column.name, column.data_type)
    } else {
        format!("{} {}", column.name, column.data_type)
    }
}

fn primary_key(partition_key: &[ColumnSpec], clustering_columns: &[ColumnSpec]) -> String {
    let partition = partition_key
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let mut key = if partition_key.len() > 1 {
        format!("({})", partition)
    } else {
        partition
    };
    for column in clustering_columns {
        key.push_str(&format!(", {}", column.name));
    }
    key
}

fn keyspace_clauses(replication: Option<&Replication>, durable_writes: Option<bool>) -> String {
    let mut clauses = Vec::new();
    if let Some(replication) = replication {
        clauses.push(format!("replication = {}", replication_literal(replication)));
    }
    if let Some(durable) = durable_writes {
        clauses.push(format!("durable_writes = {}", durable));
    }
    with_clauses(&clauses)
}

fn replication_literal(replication: &Replication) -> String {
    match replication {
        Replication::Simple { replication_factor } => map_literal(&[
            ("class", quote("SimpleStrategy")),
            ("replication_factor", replication_factor.to_string()),
        ]),
        Replication::NetworkTopology { data_centers } => {
            let mut entries = vec![("class", quote("NetworkTopologyStrategy"))];
            entries.extend(
                data_centers
                    .iter()
                    .map(|(dc, rf)| (dc.as_str(), rf.to_string())),
            );
            map_literal(&entries)
        }
    }
}

fn option_fragments(options: &TableOptions) -> Vec<String> {
    options.iter().map(|option| option.to_string()).collect()
}

fn with_clauses(clauses: &[String]) -> String {
    if clauses.is_empty() {
        String::new()
    } else {
        format!(" WITH {}", clauses.join(" AND "))
    }
}

fn join_identifiers(identifiers: &[Identifier]) -> String {
    identifiers
        .iter()
        .map(Identifier::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::keywords::IdentifierRole;
    use crate::schema::statement::ComparisonOperator;
    use crate::schema::QualifiedName;

    fn ident(name: &str) -> Identifier {
        Identifier::new(name, IdentifierRole::Column).unwrap()
    }

    #[test]
    fn test_select_with_tuple_relation() {
        let select = StatementSpec::Select(SelectSpec {
            table: QualifiedName::qualified("ks", "events", IdentifierRole::Table).unwrap(),
            columns: vec![ident("id"), ident("day"), ident("seq"), ident("payload")],
            relations: vec![
                Relation::eq(ident("id")),
                Relation::tuple(
                    vec![ident("day"), ident("seq")],
                    ComparisonOperator::GreaterThan,
                ),
            ],
            order_by: Some((ident("day"), ClusteringOrder::Desc)),
            limit: Some(Limit::Value(50)),
        });

        assert_eq!(
            select.to_cql(),
            "\n\tSELECT id, day, seq, payload FROM ks.events WHERE id = ? AND (day, seq) > (?, ?) \
             ORDER BY day DESC LIMIT 50"
        );
        assert_eq!(select.bind_marker_count(), 3);
    }

    #[test]
    fn test_one_column_tuple_keeps_parentheses() {
        let select = StatementSpec::Select(SelectSpec {
            table: QualifiedName::new("events", IdentifierRole::Table).unwrap(),
            columns: vec![],
            relations: vec![
                Relation::tuple(vec![ident("day"), ident("seq")], ComparisonOperator::GreaterThan),
                Relation::tuple(vec![ident("day")], ComparisonOperator::LessThanOrEqual),
            ],
            order_by: None,
            limit: None,
        });
        assert_eq!(
            select.to_cql(),
            "\n\tSELECT * FROM events WHERE (day, seq) > (?, ?) AND (day) <= (?)"
        );
    }

    #[test]
    fn test_select_star_without_where() {
        let select = StatementSpec::Select(SelectSpec {
            table: QualifiedName::new("events", IdentifierRole::Table).unwrap(),
            columns: vec![],
            relations: vec![],
            order_by: None,
            limit: Some(Limit::Marker),
        });
        assert_eq!(select.to_cql(), "\n\tSELECT * FROM events LIMIT ?");
        assert_eq!(select.bind_marker_count(), 1);
    }

    #[test]
    fn test_delete() {
        let delete = StatementSpec::Delete(DeleteSpec {
            table: QualifiedName::new("events", IdentifierRole::Table).unwrap(),
            relations: vec![
                Relation::eq(ident("id")),
                Relation::single(ident("day"), ComparisonOperator::LessThanOrEqual),
            ],
        });
        assert_eq!(
            delete.to_cql(),
            "\n\tDELETE FROM events WHERE id = ? AND day <= ?"
        );
    }

    #[test]
    fn test_network_topology_replication() {
        let statement = StatementSpec::CreateKeyspace {
            name: Identifier::new("ks", IdentifierRole::Keyspace).unwrap(),
            if_not_exists: false,
            replication: Replication::NetworkTopology {
                data_centers: vec![("dc1".to_string(), 3), ("dc2".to_string(), 2)],
            },
            durable_writes: Some(false),
        };
        assert_eq!(
            statement.to_cql(),
            "\n\tCREATE KEYSPACE ks WITH replication = {'class' : 'NetworkTopologyStrategy', \
             'dc1' : 3, 'dc2' : 2} AND durable_writes = false"
        );
    }
}
