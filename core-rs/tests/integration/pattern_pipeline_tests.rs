//! Integration tests for the extract -> generate -> write pipeline
//!
//! Mirrors `canon patterns` against the fixture vocabulary.

use canon_core::{
    extract_category_classes, extract_root_categories, merge_terms, write_artifact, CanonConfig, CategoryConfig,
    CategoryTerms, ClassReport, Dialect, GraphStore, LoadOptions, PatternGenerator, PatternMap, RootClass,
    VocabularyExtractor,
};
use regex::RegexBuilder;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const PREDICATE: &str = "https://ontology.example.org/patternCategory";

fn vocabulary() -> GraphStore {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("core-rs/tests/fixtures/vocabulary.ttl");
    GraphStore::load_with(path, &LoadOptions { use_cache: false }).unwrap()
}

fn extract(graph: &GraphStore) -> CategoryTerms {
    VocabularyExtractor::new(PREDICATE).extract(graph).unwrap()
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_extracted_vocabulary() {
    let terms = extract(&vocabulary());

    assert_eq!(
        terms.keys().cloned().collect::<Vec<_>>(),
        vec!["clergy", "family", "liturgy", "sacraments"]
    );
    assert_eq!(
        terms["sacraments"],
        set(&["Baptism", "Christening", "Eucharist", "Holy Communion", "Mass (Eucharistic)", "Sacrament"])
    );
    assert_eq!(
        terms["liturgy"],
        set(&["Eucharist", "Holy Communion", "Liturgy", "Mass", "Mass (Eucharistic)"])
    );
    assert_eq!(terms["clergy"], set(&["Bishop", "Clergy", "Father", "Priest"]));
    assert_eq!(terms["family"], set(&["Father"]));
}

#[test]
fn test_untagged_labels_never_reach_patterns() {
    let patterns = PatternGenerator::new().generate(&extract(&vocabulary()));
    for pattern in patterns.values() {
        assert!(!pattern.contains("First Communion"));
        assert!(!pattern.contains("Vestment"));
    }
}

#[test]
fn test_each_pattern_holds_exactly_its_own_terms() {
    let terms = extract(&vocabulary());
    let patterns = PatternGenerator::new().generate(&terms);

    assert_eq!(patterns.keys().collect::<Vec<_>>(), terms.keys().collect::<Vec<_>>());

    for (category, category_terms) in &terms {
        let alternatives: BTreeSet<&str> = patterns[category].split('|').collect();
        let expected: BTreeSet<String> = category_terms.iter().map(|t| regex::escape(t)).collect();
        assert_eq!(
            alternatives,
            expected.iter().map(String::as_str).collect::<BTreeSet<_>>(),
            "pattern for {}",
            category
        );
    }
}

#[test]
fn test_patterns_compile_as_case_insensitive_matchers() {
    let patterns = PatternGenerator::new().generate(&extract(&vocabulary()));
    let liturgy = RegexBuilder::new(&patterns["liturgy"])
        .case_insensitive(true)
        .build()
        .unwrap();

    assert!(liturgy.is_match("attending MASS (eucharistic) on sunday"));
    assert!(liturgy.is_match("holy communion"));
    assert!(!liturgy.is_match("a bishop"));
}

#[test]
fn test_regeneration_is_byte_identical() {
    let temp_dir = TempDir::new().unwrap();
    let first = temp_dir.path().join("first/patterns.json");
    let second = temp_dir.path().join("second/patterns.json");

    for output in [&first, &second] {
        let graph = vocabulary();
        let patterns = PatternGenerator::new().generate(&extract(&graph));
        write_artifact(&patterns, output).unwrap();
    }

    assert_eq!(fs::read(&first).unwrap(), fs::read(&second).unwrap());
}

#[test]
fn test_yaml_artifact_carries_same_mapping() {
    let temp_dir = TempDir::new().unwrap();
    let json_path = temp_dir.path().join("patterns.json");
    let yaml_path = temp_dir.path().join("patterns.yaml");

    let patterns = PatternGenerator::new().generate(&extract(&vocabulary()));
    write_artifact(&patterns, &json_path).unwrap();
    write_artifact(&patterns, &yaml_path).unwrap();

    let from_json: PatternMap = serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    let from_yaml: PatternMap = serde_yaml::from_str(&fs::read_to_string(&yaml_path).unwrap()).unwrap();
    assert_eq!(from_json, patterns);
    assert_eq!(from_yaml, patterns);
}

#[test]
fn test_root_class_categories_merge_with_tags() {
    let graph = vocabulary();

    let mut config = CanonConfig::default();
    config.namespace = "https://ontology.example.org/".to_string();
    config.categories.insert(
        "liturgy".to_string(),
        CategoryConfig {
            label: Some("Liturgy".to_string()),
            description: None,
            root_classes: vec![RootClass {
                id: "Liturgy".to_string(),
                label: Some("Liturgy".to_string()),
            }],
        },
    );

    let mut terms = extract(&graph);
    for dialect in [Dialect::Recursive, Dialect::Bounded] {
        let rooted = extract_root_categories(&graph, &config.root_categories(), dialect, 2).unwrap();
        assert_eq!(rooted["liturgy"], set(&["Liturgy", "Mass", "Vestment"]), "{} dialect", dialect);
        merge_terms(&mut terms, rooted);
    }

    assert!(terms["liturgy"].contains("Vestment"));
    assert!(terms["liturgy"].contains("Holy Communion"));
}

#[test]
fn test_term_report_lists_sorted_terms() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("terms.json");

    write_artifact(&extract(&vocabulary()), &path).unwrap();

    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(report["clergy"], serde_json::json!(["Bishop", "Clergy", "Father", "Priest"]));
}

fn sacrament_config() -> CanonConfig {
    let mut config = CanonConfig::default();
    config.namespace = "https://ontology.example.org/".to_string();
    config.categories.insert(
        "sacraments".to_string(),
        CategoryConfig {
            label: Some("Sacraments".to_string()),
            description: Some("Rites of the church".to_string()),
            root_classes: vec![RootClass {
                id: "Sacrament".to_string(),
                label: Some("Sacrament".to_string()),
            }],
        },
    );
    config
}

#[test]
fn test_class_report_matches_across_dialects() {
    let graph = vocabulary();
    let categories = sacrament_config().root_categories();

    let recursive = extract_category_classes(&graph, &categories, Dialect::Recursive).unwrap();
    let bounded = extract_category_classes(&graph, &categories, Dialect::Bounded).unwrap();

    let sacraments = &recursive["sacraments"];
    assert_eq!(
        sacraments.class_uris,
        vec![
            "https://ontology.example.org/Baptism",
            "https://ontology.example.org/Eucharist",
            "https://ontology.example.org/FirstCommunion",
            "https://ontology.example.org/Sacrament",
        ]
    );
    assert_eq!(sacraments.class_count, 4);
    assert_eq!(sacraments.label, "Sacraments");
    assert_eq!(sacraments.description, "Rites of the church");
    assert!(sacraments
        .values_clause
        .starts_with("VALUES ?targetClass { <https://ontology.example.org/Baptism> "));
    assert_eq!(recursive, bounded);
}

#[test]
fn test_class_report_is_a_separate_artifact() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("classes.json");

    let graph = vocabulary();
    let report = extract_category_classes(&graph, &sacrament_config().root_categories(), Dialect::Bounded).unwrap();
    write_artifact(&report, &path).unwrap();

    let restored: ClassReport = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(restored, report);

    let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["sacraments"]["class_count"], serde_json::json!(4));
    assert!(raw["sacraments"]["values_clause"].is_string());
}
