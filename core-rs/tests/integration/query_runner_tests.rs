//! Integration tests for catalog resolution and query dispatch
//!
//! Runs the fixture catalogs against the fixture vocabulary through both
//! engines, the way `canon query` does.

use canon_core::query::dispatcher::{self, RenderedResult};
use canon_core::{
    CatalogError, Dialect, GraphStore, LoadOptions, QueryCatalog, QueryError, QueryIdentifier,
};
use std::path::{Path, PathBuf};
use std::thread;

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("core-rs/tests/fixtures")
}

fn vocabulary() -> GraphStore {
    GraphStore::load_with(fixtures().join("vocabulary.ttl"), &LoadOptions { use_cache: false }).unwrap()
}

fn catalog(dialect: Dialect) -> QueryCatalog {
    let dir = match dialect {
        Dialect::Recursive => fixtures().join("queries"),
        Dialect::Bounded => fixtures().join("queries/rdflib"),
    };
    QueryCatalog::discover(dir, dialect).unwrap()
}

fn run(graph: &GraphStore, dialect: Dialect, id: &str) -> Result<RenderedResult, QueryError> {
    let resolved = catalog(dialect)
        .resolve(&QueryIdentifier::parse_positional(id))
        .unwrap();
    dispatcher::execute(graph, dialect.engine().as_ref(), &resolved.text)
}

#[test]
fn test_catalogs_are_listed_independently() {
    let recursive = catalog(Dialect::Recursive);
    let bounded = catalog(Dialect::Bounded);

    let names = |c: &QueryCatalog| c.entries().iter().map(|d| d.name.clone()).collect::<Vec<_>>();
    assert_eq!(
        names(&recursive),
        vec!["01-list-classes", "02-sacrament-hierarchy", "03-narrower", "04-has-clergy"]
    );
    assert_eq!(names(&bounded), vec!["01-list-classes", "02-sacrament-hierarchy"]);
}

#[test]
fn test_numeric_resolution() {
    let recursive = catalog(Dialect::Recursive);

    for id in ["1", "01"] {
        let resolved = recursive.resolve(&QueryIdentifier::parse_positional(id)).unwrap();
        assert_eq!(resolved.label, "01-list-classes.rq");
    }

    match recursive.resolve(&QueryIdentifier::parse_positional("99")) {
        Err(CatalogError::NotFound { identifier, dialect }) => {
            assert_eq!(identifier, "99");
            assert_eq!(dialect, "recursive");
        }
        other => panic!("Expected NotFound, got {:?}", other),
    }
}

#[test]
fn test_select_rows_align_with_variables() {
    let graph = vocabulary();

    match run(&graph, Dialect::Recursive, "01").unwrap() {
        RenderedResult::Rows(table) => {
            assert_eq!(table.variables, vec!["class", "label"]);
            assert_eq!(table.len(), 13);
            assert!(table.rows.iter().all(|row| row.len() == table.variables.len()));

            // Bishop only has an altLabel
            let bishop = table.rows.iter().find(|row| row[0] == "Bishop").unwrap();
            assert_eq!(bishop[1], "");
        }
        other => panic!("Expected rows, got {:?}", other),
    }
}

#[test]
fn test_both_dialects_answer_hierarchy_query() {
    let graph = vocabulary();

    let labels = |result: RenderedResult| match result {
        RenderedResult::Rows(table) => table.rows.into_iter().map(|r| r[1].clone()).collect::<Vec<_>>(),
        other => panic!("Expected rows, got {:?}", other),
    };

    let recursive = labels(run(&graph, Dialect::Recursive, "2").unwrap());
    let bounded = labels(run(&graph, Dialect::Bounded, "2").unwrap());

    assert_eq!(recursive, vec!["Baptism", "Eucharist", "First Communion"]);
    assert_eq!(recursive, bounded);
}

#[test]
fn test_bounded_engine_refuses_recursive_catalog_query() {
    let graph = vocabulary();
    let text = catalog(Dialect::Recursive)
        .resolve(&QueryIdentifier::Numeric("02".to_string()))
        .unwrap()
        .text;

    let result = dispatcher::execute(&graph, Dialect::Bounded.engine().as_ref(), &text);
    assert!(matches!(result, Err(QueryError::Unsupported { .. })));
}

#[test]
fn test_construct_and_ask_shapes() {
    let graph = vocabulary();

    match run(&graph, Dialect::Recursive, "03").unwrap() {
        RenderedResult::Graph(listing) => {
            // owl:Thing parent of Family is an IRI too
            assert_eq!(listing.triples.len(), 9);
            assert!(listing.triples.iter().all(|t| t.ends_with(" .")));
        }
        other => panic!("Expected graph, got {:?}", other),
    }

    assert_eq!(run(&graph, Dialect::Recursive, "4").unwrap(), RenderedResult::Boolean(true));
}

#[test]
fn test_inline_query_is_used_verbatim() {
    let graph = vocabulary();
    let resolved = catalog(Dialect::Recursive)
        .resolve(&QueryIdentifier::Inline(
            "ASK { <https://ontology.example.org/Vestment> ?p ?o }".to_string(),
        ))
        .unwrap();

    let result = dispatcher::execute(&graph, Dialect::Recursive.engine().as_ref(), &resolved.text).unwrap();
    assert_eq!(result.to_string(), "true");
}

#[test]
fn test_bad_query_does_not_poison_graph() {
    let graph = vocabulary();
    let engine = Dialect::Recursive.engine();

    let err = dispatcher::execute(&graph, engine.as_ref(), "SELECT ?x WHERE { ?x").unwrap_err();
    assert!(matches!(err, QueryError::Syntax(_)));

    // the same session keeps working
    assert!(run(&graph, Dialect::Recursive, "01").is_ok());
}

#[test]
fn test_concurrent_execution_matches_sequential() {
    let graph = vocabulary();
    let text = catalog(Dialect::Recursive)
        .resolve(&QueryIdentifier::Numeric("1".to_string()))
        .unwrap()
        .text;

    let sequential = dispatcher::execute(&graph, Dialect::Recursive.engine().as_ref(), &text).unwrap();

    let results: Vec<RenderedResult> = thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                s.spawn(|| dispatcher::execute(&graph, Dialect::Recursive.engine().as_ref(), &text).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(results.iter().all(|r| *r == sequential));
}
