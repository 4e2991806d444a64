// SPDX-License-Identifier: Apache-2.0

//! Source code query engine: callers, callees, callstack, callgraph and
//! describe queries answered from a tree-sitter call graph.

pub mod lang;
pub mod query;

pub use query::error::QueryError;
pub use query::query;
pub use query::types::{QueryMode, QueryOptions, QueryResult};
