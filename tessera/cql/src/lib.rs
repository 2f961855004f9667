//! CQL statement compiler and clustered slice query engine
//!
//! Two halves share this crate:
//!
//! - [`schema`]: typed builders that compile CREATE/ALTER/DROP statements to
//!   canonical, byte-stable CQL text.
//! - [`query`]: slice queries over clustered tables, planned into SELECT and
//!   DELETE statements and executed through a driver [`session::Session`],
//!   with lazily paged iteration.
//!
//! ```
//! use tessera_cql::prelude::*;
//!
//! let cql = SchemaBuilder::alter_table("test")?
//!     .add_static_column("stat")?
//!     .of_type(CqlType::Text)
//!     .to_cql();
//! assert_eq!(cql, "\n\tALTER TABLE test ADD stat text static");
//! # Ok::<(), tessera_cql::error::ValidationError>(())
//! ```

pub mod config;
pub mod consistency;
pub mod entity;
pub mod error;
pub mod query;
pub mod schema;
pub mod session;
pub mod types;

pub use error::{CqlError, CqlResult, SchemaResult, ValidationError};

/// Commonly used types
pub mod prelude {
    pub use crate::config::PersistenceConfig;
    pub use crate::consistency::ConsistencyLevel;
    pub use crate::entity::{EntityMeta, EntityProxifier, PersistenceContext, TableLayout};
    pub use crate::error::{CqlError, CqlResult, SchemaResult, ValidationError};
    pub use crate::query::{
        BoundingMode, OrderingMode, SliceQuery, SliceQueryExecutor, SliceQueryIterator,
    };
    pub use crate::schema::{
        Caching, ClusteringOrder, CompactionOptions, CompressionOptions, SchemaBuilder,
        SpeculativeRetry, StatementSpec, TableOptionsBuilder,
    };
    pub use crate::session::{Row, Session};
    pub use crate::types::{CqlType, CqlValue};
}
