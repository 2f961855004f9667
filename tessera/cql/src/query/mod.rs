//! Slice queries over clustered tables
//!
//! [`SliceQuery`] describes a bounded scan of one partition,
//! [`planner::SlicePlan`] compiles it into SELECT/DELETE statements and
//! [`SliceQueryExecutor`] runs them, either at once (`get`), page by page
//! (`iterator`) or as a range deletion (`remove`).

pub mod executor;
pub mod iterator;
pub mod planner;
pub mod slice;

pub use executor::SliceQueryExecutor;
pub use iterator::SliceQueryIterator;
pub use planner::{PlannedStatement, SlicePlan};
pub use slice::{BoundingMode, OrderingMode, SliceQuery, SliceQueryBuilder};
