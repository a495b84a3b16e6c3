/**
 * query module
 *
 * - catalog: `.rq` discovery and identifier resolution
 * - engine: recursive-path and bounded-union engines
 * - dispatcher: execute and render by result shape
 */

pub mod catalog;
pub mod dispatcher;
pub mod engine;

pub use catalog::{QueryCatalog, QueryDescriptor, QueryIdentifier, ResolvedQuery};
pub use dispatcher::{execute, GraphListing, RenderedResult, RowTable};
pub use engine::{
    analyze, BoundedUnionEngine, Dialect, QueryAnalysis, QueryEngine, QueryShape, RecursivePathEngine,
};
