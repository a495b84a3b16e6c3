/**
 * hierarchy.rs
 * Categories declared by root classes
 *
 * Terms are the labels of each root class and its `owl:Class` descendants.
 * The descendant query is written per dialect: a `subClassOf*` path for the
 * recursive engine, three UNION levels below the root for the bounded one.
 *
 * The same closure also yields the class IRIs of each category, reported
 * with a `VALUES ?targetClass { ... }` clause for reuse in other queries.
 */

use oxigraph::model::Term;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

use crate::errors::QueryError;
use crate::graph::vocab::{OWL_CLASS, RDFS_LABEL, RDFS_SUBCLASS_OF, SKOS_ALT_LABEL, SKOS_PREF_LABEL};
use crate::graph::GraphStore;
use crate::query::engine::Dialect;
use crate::vocabulary::extractor::{literal_value, solution_rows, CategoryTerms};

/// Depth reached by the bounded dialect below each root
pub const BOUNDED_DEPTH: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootClassCategory {
    pub name: String,
    /// Display label, the category name when not configured
    pub label: String,
    pub description: String,
    /// Absolute root class IRIs
    pub roots: Vec<String>,
}

/// Classes of one root-class category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryClasses {
    pub label: String,
    pub description: String,
    /// Sorted, deduplicated
    pub class_uris: Vec<String>,
    pub class_count: usize,
    pub values_clause: String,
}

/// Category name -> its classes
pub type ClassReport = BTreeMap<String, CategoryClasses>;

fn closure(root: &str, dialect: Dialect) -> String {
    match dialect {
        Dialect::Recursive => format!("?class <{sub}>* <{root}> .", sub = RDFS_SUBCLASS_OF, root = root),
        Dialect::Bounded => bounded_closure(root),
    }
}

/// SELECT ?label for a root class and its descendants
pub fn hierarchy_query(root: &str, dialect: Dialect) -> String {
    format!(
        r#"
        SELECT DISTINCT ?label
        WHERE {{
            {closure}
            ?class a <{class}> .
            {{ ?class <{label}> ?label }}
            UNION
            {{ ?class <{pref}> ?label }}
            UNION
            {{ ?class <{alt}> ?label }}
        }}
        "#,
        closure = closure(root, dialect),
        class = OWL_CLASS,
        label = RDFS_LABEL,
        pref = SKOS_PREF_LABEL,
        alt = SKOS_ALT_LABEL,
    )
}

/// SELECT ?class for a root class and its `owl:Class` descendants
pub fn class_query(root: &str, dialect: Dialect) -> String {
    format!(
        r#"
        SELECT DISTINCT ?class
        WHERE {{
            {closure}
            ?class a <{class}> .
        }}
        "#,
        closure = closure(root, dialect),
        class = OWL_CLASS,
    )
}

/// `VALUES ?targetClass { <a> <b> }` over sorted IRIs
pub fn target_values_clause(uris: &[String]) -> String {
    if uris.is_empty() {
        return "VALUES ?targetClass { }".to_string();
    }

    let mut sorted: Vec<&str> = uris.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.dedup();

    let formatted: Vec<String> = sorted.iter().map(|uri| format!("<{}>", uri)).collect();
    format!("VALUES ?targetClass {{ {} }}", formatted.join(" "))
}

fn bounded_closure(root: &str) -> String {
    let mut blocks = vec![format!("{{ BIND(<{}> AS ?class) }}", root)];

    for depth in 1..=BOUNDED_DEPTH {
        // ?l1 .. ?l{depth-1} link the chain from ?class up to the root
        let mut chain = Vec::with_capacity(depth);
        let mut child = "?class".to_string();
        for step in 1..depth {
            let parent = format!("?l{}", step);
            chain.push(format!("{} <{}> {} .", child, RDFS_SUBCLASS_OF, parent));
            child = parent;
        }
        chain.push(format!("{} <{}> <{}> .", child, RDFS_SUBCLASS_OF, root));
        blocks.push(format!("{{ {} }}", chain.join(" ")));
    }

    blocks.join("\nUNION\n")
}

/// Labels under each category's roots, run through the dialect's engine
pub fn extract_root_categories(
    graph: &GraphStore,
    categories: &[RootClassCategory],
    dialect: Dialect,
    min_term_length: usize,
) -> Result<CategoryTerms, QueryError> {
    let engine = dialect.engine();
    let mut terms = CategoryTerms::new();

    for category in categories {
        let mut labels = BTreeSet::new();

        for root in &category.roots {
            let raw = engine.execute(graph, &hierarchy_query(root, dialect))?;
            let before = labels.len();

            for row in solution_rows(raw)? {
                let Some(label) = row.first().and_then(literal_value) else {
                    continue;
                };
                let label = label.trim();
                if label.chars().count() >= min_term_length {
                    labels.insert(label.to_string());
                }
            }

            if labels.len() == before {
                warn!(category = %category.name, root = %root, "root class contributed no labels");
            }
        }

        info!(category = %category.name, labels = labels.len(), engine = engine.name(), "collected hierarchy labels");

        if !labels.is_empty() {
            terms.insert(category.name.clone(), labels);
        }
    }

    Ok(terms)
}

/// Class IRIs under each category's roots, run through the dialect's engine
///
/// Every category appears in the report, with an empty class list when
/// none of its roots resolve.
pub fn extract_category_classes(
    graph: &GraphStore,
    categories: &[RootClassCategory],
    dialect: Dialect,
) -> Result<ClassReport, QueryError> {
    let engine = dialect.engine();
    let mut report = ClassReport::new();

    for category in categories {
        let mut uris = BTreeSet::new();

        for root in &category.roots {
            let raw = engine.execute(graph, &class_query(root, dialect))?;
            let before = uris.len();

            for row in solution_rows(raw)? {
                if let Some(Some(Term::NamedNode(node))) = row.first() {
                    uris.insert(node.as_str().to_string());
                }
            }

            if uris.len() == before {
                warn!(category = %category.name, root = %root, "root class contributed no classes");
            }
        }

        let class_uris: Vec<String> = uris.into_iter().collect();
        info!(category = %category.name, classes = class_uris.len(), engine = engine.name(), "collected hierarchy classes");

        report.insert(
            category.name.clone(),
            CategoryClasses {
                label: category.label.clone(),
                description: category.description.clone(),
                class_count: class_uris.len(),
                values_clause: target_values_clause(&class_uris),
                class_uris,
            },
        );
    }

    Ok(report)
}
