/**
 * engine.rs
 * Query engines with different expressive power
 *
 * Both engines evaluate against the same GraphStore. They differ only in
 * what they accept: the bounded engine refuses transitive property paths
 * (`*`, `+`), matching catalogs written with fixed-depth UNION expansion.
 */

use serde::{Deserialize, Serialize};
use spargebra::algebra::{
    AggregateExpression, Expression, GraphPattern, OrderExpression, PropertyPathExpression,
};
use spargebra::Query;
use std::fmt;
use tracing::debug;

use crate::errors::QueryError;
use crate::graph::{GraphStore, RawResult};

/// Query dialect, one per catalog directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Engines with `rdfs:subClassOf*` style property paths
    Recursive,
    /// Engines limited to finite UNION expansion
    Bounded,
}

impl Dialect {
    pub fn label(self) -> &'static str {
        match self {
            Dialect::Recursive => "recursive",
            Dialect::Bounded => "bounded",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Dialect::Recursive => Dialect::Bounded,
            Dialect::Bounded => Dialect::Recursive,
        }
    }

    pub fn engine(self) -> Box<dyn QueryEngine> {
        match self {
            Dialect::Recursive => Box::new(RecursivePathEngine),
            Dialect::Bounded => Box::new(BoundedUnionEngine),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result shape of a query form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryShape {
    /// SELECT
    Rows,
    /// CONSTRUCT and DESCRIBE
    Graph,
    /// ASK
    Boolean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryAnalysis {
    pub shape: QueryShape,
    pub uses_transitive_paths: bool,
}

/// Parse query text and inspect its algebra
pub fn analyze(text: &str) -> Result<QueryAnalysis, QueryError> {
    let query = Query::parse(text, None).map_err(|e| QueryError::Syntax(e.to_string()))?;

    let (shape, pattern) = match &query {
        Query::Select { pattern, .. } => (QueryShape::Rows, pattern),
        Query::Construct { pattern, .. } | Query::Describe { pattern, .. } => {
            (QueryShape::Graph, pattern)
        }
        Query::Ask { pattern, .. } => (QueryShape::Boolean, pattern),
    };

    Ok(QueryAnalysis {
        shape,
        uses_transitive_paths: pattern_has_transitive_path(pattern),
    })
}

fn pattern_has_transitive_path(pattern: &GraphPattern) -> bool {
    match pattern {
        GraphPattern::Path { path, .. } => path_is_transitive(path),
        GraphPattern::Join { left, right }
        | GraphPattern::Union { left, right }
        | GraphPattern::Minus { left, right } => {
            pattern_has_transitive_path(left) || pattern_has_transitive_path(right)
        }
        GraphPattern::LeftJoin {
            left,
            right,
            expression,
        } => {
            pattern_has_transitive_path(left)
                || pattern_has_transitive_path(right)
                || expression.as_ref().map_or(false, expression_has_transitive_path)
        }
        GraphPattern::Filter { expr, inner } => {
            expression_has_transitive_path(expr) || pattern_has_transitive_path(inner)
        }
        GraphPattern::Extend {
            inner, expression, ..
        } => expression_has_transitive_path(expression) || pattern_has_transitive_path(inner),
        GraphPattern::OrderBy { inner, expression } => {
            expression.iter().any(order_has_transitive_path) || pattern_has_transitive_path(inner)
        }
        GraphPattern::Group {
            inner, aggregates, ..
        } => {
            aggregates
                .iter()
                .any(|(_, aggregate)| aggregate_has_transitive_path(aggregate))
                || pattern_has_transitive_path(inner)
        }
        GraphPattern::Graph { inner, .. }
        | GraphPattern::Project { inner, .. }
        | GraphPattern::Distinct { inner }
        | GraphPattern::Reduced { inner }
        | GraphPattern::Slice { inner, .. }
        | GraphPattern::Service { inner, .. } => pattern_has_transitive_path(inner),
        _ => false,
    }
}

fn path_is_transitive(path: &PropertyPathExpression) -> bool {
    match path {
        PropertyPathExpression::ZeroOrMore(_) | PropertyPathExpression::OneOrMore(_) => true,
        PropertyPathExpression::Reverse(inner) | PropertyPathExpression::ZeroOrOne(inner) => {
            path_is_transitive(inner)
        }
        PropertyPathExpression::Sequence(a, b) | PropertyPathExpression::Alternative(a, b) => {
            path_is_transitive(a) || path_is_transitive(b)
        }
        _ => false,
    }
}

fn expression_has_transitive_path(expression: &Expression) -> bool {
    match expression {
        Expression::Exists(pattern) => pattern_has_transitive_path(pattern),
        Expression::Not(inner) | Expression::UnaryPlus(inner) | Expression::UnaryMinus(inner) => {
            expression_has_transitive_path(inner)
        }
        Expression::Or(a, b)
        | Expression::And(a, b)
        | Expression::Equal(a, b)
        | Expression::SameTerm(a, b)
        | Expression::Greater(a, b)
        | Expression::GreaterOrEqual(a, b)
        | Expression::Less(a, b)
        | Expression::LessOrEqual(a, b)
        | Expression::Add(a, b)
        | Expression::Subtract(a, b)
        | Expression::Multiply(a, b)
        | Expression::Divide(a, b) => {
            expression_has_transitive_path(a) || expression_has_transitive_path(b)
        }
        Expression::In(needle, haystack) => {
            expression_has_transitive_path(needle) || haystack.iter().any(expression_has_transitive_path)
        }
        Expression::If(condition, then, otherwise) => {
            expression_has_transitive_path(condition)
                || expression_has_transitive_path(then)
                || expression_has_transitive_path(otherwise)
        }
        Expression::Coalesce(arguments) | Expression::FunctionCall(_, arguments) => {
            arguments.iter().any(expression_has_transitive_path)
        }
        Expression::NamedNode(_)
        | Expression::Literal(_)
        | Expression::Variable(_)
        | Expression::Bound(_) => false,
    }
}

fn order_has_transitive_path(order: &OrderExpression) -> bool {
    match order {
        OrderExpression::Asc(expression) | OrderExpression::Desc(expression) => {
            expression_has_transitive_path(expression)
        }
    }
}

fn aggregate_has_transitive_path(aggregate: &AggregateExpression) -> bool {
    match aggregate {
        AggregateExpression::CountSolutions { .. } => false,
        AggregateExpression::FunctionCall { expr, .. } => expression_has_transitive_path(expr),
    }
}

/// One way of executing catalog queries against a graph
pub trait QueryEngine: Send + Sync {
    fn name(&self) -> &'static str;

    fn dialect(&self) -> Dialect;

    /// Check the query is something this engine can run
    fn prepare(&self, text: &str) -> Result<QueryAnalysis, QueryError>;

    fn execute(&self, graph: &GraphStore, text: &str) -> Result<RawResult, QueryError> {
        let analysis = self.prepare(text)?;
        debug!(engine = self.name(), shape = ?analysis.shape, "executing query");
        graph.evaluate(text)
    }
}

/// Full SPARQL 1.1, property paths included
#[derive(Debug, Clone, Copy, Default)]
pub struct RecursivePathEngine;

impl QueryEngine for RecursivePathEngine {
    fn name(&self) -> &'static str {
        "recursive-path"
    }

    fn dialect(&self) -> Dialect {
        Dialect::Recursive
    }

    fn prepare(&self, text: &str) -> Result<QueryAnalysis, QueryError> {
        analyze(text)
    }
}

/// SPARQL without transitive property paths
#[derive(Debug, Clone, Copy, Default)]
pub struct BoundedUnionEngine;

impl QueryEngine for BoundedUnionEngine {
    fn name(&self) -> &'static str {
        "bounded-union"
    }

    fn dialect(&self) -> Dialect {
        Dialect::Bounded
    }

    fn prepare(&self, text: &str) -> Result<QueryAnalysis, QueryError> {
        let analysis = analyze(text)?;
        if analysis.uses_transitive_paths {
            return Err(QueryError::Unsupported {
                engine: "bounded-union",
                feature: "transitive property path (* or +)".to_string(),
            });
        }
        Ok(analysis)
    }
}
