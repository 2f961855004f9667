//! Schema statement compiler
//!
//! Builders produce an immutable [`StatementSpec`]; [`StatementSpec::to_cql`]
//! renders it as canonical CQL text.

pub mod builder;
pub mod identifier;
pub mod keywords;
pub mod options;
pub mod serializer;
pub mod statement;

pub use builder::SchemaBuilder;
pub use identifier::{Identifier, QualifiedName};
pub use keywords::{is_reserved_keyword, IdentifierRole};
pub use options::{
    Caching, CompactionOptions, CompactionStrategy, CompressionOptions, Compressor, OptionKey,
    SpeculativeRetry, TableOption, TableOptions, TableOptionsBuilder, TimestampResolution,
};
pub use statement::{
    AlterAction, ClusteringOrder, ColumnSpec, ComparisonOperator, DeleteSpec, Limit, Relation,
    Replication, SelectSpec, StatementSpec,
};
