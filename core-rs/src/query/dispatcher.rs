/**
 * dispatcher.rs
 * Execute a query and render its result by shape
 *
 * Output is built in full before anything is returned, so a failing
 * query never yields partial rows.
 */

use oxigraph::model::{Term, Triple};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::errors::QueryError;
use crate::graph::{GraphStore, RawResult};
use crate::query::engine::QueryEngine;

static ABSOLUTE_URI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").expect("valid URI scheme regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowTable {
    pub variables: Vec<String>,
    /// Display values, `""` for unbound
    pub rows: Vec<Vec<String>>,
}

impl RowTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphListing {
    /// N-Triples statements, sorted
    pub triples: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedResult {
    Rows(RowTable),
    Graph(GraphListing),
    Boolean(bool),
}

/// Run `text` through `engine` and render the full result
pub fn execute(
    graph: &GraphStore,
    engine: &dyn QueryEngine,
    text: &str,
) -> Result<RenderedResult, QueryError> {
    let raw = engine.execute(graph, text)?;
    Ok(render(raw))
}

pub fn render(raw: RawResult) -> RenderedResult {
    match raw {
        RawResult::Solutions { variables, rows } => {
            let rows = rows
                .into_iter()
                .map(|row| {
                    row.iter()
                        .map(|value| value.as_ref().map(display_term).unwrap_or_default())
                        .collect()
                })
                .collect();
            RenderedResult::Rows(RowTable { variables, rows })
        }
        RawResult::Graph(triples) => RenderedResult::Graph(GraphListing {
            triples: sorted_statements(&triples),
        }),
        RawResult::Boolean(value) => RenderedResult::Boolean(value),
    }
}

fn sorted_statements(triples: &[Triple]) -> Vec<String> {
    let mut lines: Vec<String> = triples.iter().map(|t| format!("{} .", t)).collect();
    lines.sort();
    lines.dedup();
    lines
}

/// Display form of a term: IRIs and URI-valued literals are shortened
///
/// The result is a single table cell, so line breaks and `|` are escaped.
pub fn display_term(term: &Term) -> String {
    let value = match term {
        Term::NamedNode(node) => display_value(node.as_str()),
        Term::BlankNode(node) => format!("_:{}", node.as_str()),
        Term::Literal(literal) => display_value(literal.value()),
        #[allow(unreachable_patterns)]
        other => other.to_string(),
    };
    escape_cell(&value)
}

/// `\`, `\n`, `\r` and `|` as backslash escapes
pub fn escape_cell(value: &str) -> String {
    if !value.contains(['\\', '\n', '\r', '|']) {
        return value.to_string();
    }

    let mut out = String::with_capacity(value.len() + 4);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '|' => out.push_str("\\|"),
            other => out.push(other),
        }
    }
    out
}

/// `https://x.org/onto#Baptism` -> `Baptism`; other strings unchanged
pub fn display_value(value: &str) -> String {
    if !ABSOLUTE_URI.is_match(value) {
        return value.to_string();
    }

    let after_slash = value.rsplit('/').next().unwrap_or(value);
    let short = after_slash.rsplit('#').next().unwrap_or(after_slash);

    if short.is_empty() {
        value.to_string()
    } else {
        short.to_string()
    }
}

impl fmt::Display for RowTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = self.variables.join(" | ");
        writeln!(f, "{}", header)?;
        writeln!(f, "{}", "-".repeat(header.chars().count()))?;
        for row in &self.rows {
            writeln!(f, "{}", row.join(" | "))?;
        }
        write!(f, "\n({} results)", self.rows.len())
    }
}

impl fmt::Display for GraphListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.triples {
            writeln!(f, "{}", line)?;
        }
        write!(f, "\n({} triples)", self.triples.len())
    }
}

impl fmt::Display for RenderedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderedResult::Rows(table) => table.fmt(f),
            RenderedResult::Graph(listing) => listing.fmt(f),
            RenderedResult::Boolean(value) => write!(f, "{}", value),
        }
    }
}
