/**
 * config.rs
 * Parser for canon.yaml project files
 *
 * Format:
 * ```yaml
 * ontology: sources/ontology-semantic-canon.owl
 * namespace: https://ontology.example.org/
 * queries:
 *   recursive: queries
 *   bounded: queries/rdflib
 * patterns:
 *   output: generated/patterns.json
 *   categoryPredicate: https://ontology.example.org/patternCategory
 *   minTermLength: 2
 *   wordBoundaries: false
 *   cache: true
 * categories:
 *   sacraments:
 *     label: Sacraments
 *     rootClasses:
 *       - id: RB91Ir5bSOsoHyaGccORDpQ
 *         label: Sacraments
 * ```
 *
 * Every section is optional; missing values fall back to the defaults below.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::ConfigError;
use crate::query::engine::Dialect;
use crate::vocabulary::hierarchy::RootClassCategory;

/// Name of the project file looked up by [`CanonConfig::load_from_project`]
pub const CONFIG_FILE_NAME: &str = "canon.yaml";

pub const DEFAULT_NAMESPACE: &str = "https://ontology.catholicos.catholic/";
pub const DEFAULT_CATEGORY_PREDICATE: &str = "https://ontology.catholicos.catholic/patternCategory";

/// Absolute http(s) IRI without characters that could break out of `<...>`
static IRI_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^https?://[^\s<>"'{}|\\^`]+$"#).expect("valid IRI regex"));

/// canon.yaml file structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CanonConfig {
    #[serde(default = "default_ontology")]
    pub ontology: PathBuf,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default)]
    pub queries: QueryDirs,
    #[serde(default)]
    pub patterns: PatternSettings,
    /// Root-class categories, merged with tag-derived categories
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub categories: BTreeMap<String, CategoryConfig>,
}

/// One catalog directory per query dialect
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct QueryDirs {
    pub recursive: PathBuf,
    pub bounded: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct PatternSettings {
    pub output: PathBuf,
    pub category_predicate: String,
    pub min_term_length: usize,
    pub word_boundaries: bool,
    /// Keep a parsed snapshot next to the ontology file
    pub cache: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub root_classes: Vec<RootClass>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RootClass {
    /// Local name appended to the namespace, or a full IRI
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

fn default_ontology() -> PathBuf {
    PathBuf::from("sources/ontology-semantic-canon.owl")
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

impl Default for QueryDirs {
    fn default() -> Self {
        Self {
            recursive: PathBuf::from("queries"),
            bounded: PathBuf::from("queries/rdflib"),
        }
    }
}

impl QueryDirs {
    pub fn dir_for(&self, dialect: Dialect) -> &Path {
        match dialect {
            Dialect::Recursive => &self.recursive,
            Dialect::Bounded => &self.bounded,
        }
    }
}

impl Default for PatternSettings {
    fn default() -> Self {
        Self {
            output: PathBuf::from("generated/patterns.json"),
            category_predicate: DEFAULT_CATEGORY_PREDICATE.to_string(),
            min_term_length: 2,
            word_boundaries: false,
            cache: true,
        }
    }
}

impl Default for CanonConfig {
    fn default() -> Self {
        Self {
            ontology: default_ontology(),
            namespace: default_namespace(),
            queries: QueryDirs::default(),
            patterns: PatternSettings::default(),
            categories: BTreeMap::new(),
        }
    }
}

impl CanonConfig {
    /// Load canon.yaml from specified path
    ///
    /// # Example
    /// ```no_run
    /// # use canon_core::CanonConfig;
    /// let config = CanonConfig::load("canon.yaml").unwrap();
    /// println!("{}", config.ontology.display());
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read {}: {}", path.display(), e)))?;

        let config: CanonConfig = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load canon.yaml from a project root, or the defaults when it has none.
    /// Relative paths come back resolved against `project_root`.
    pub fn load_from_project<P: AsRef<Path>>(project_root: P) -> Result<Self, ConfigError> {
        let project_root = project_root.as_ref();
        let config_path = project_root.join(CONFIG_FILE_NAME);

        let config = if config_path.exists() {
            Self::load(&config_path)?
        } else {
            tracing::debug!(root = %project_root.display(), "no canon.yaml, using defaults");
            Self::default()
        };

        Ok(config.resolve(project_root))
    }

    /// Validate canon.yaml structure
    ///
    /// Ensures:
    /// - paths are non-empty
    /// - namespace and category predicate are absolute http(s) IRIs
    /// - every root class expands to a safe IRI
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ontology.as_os_str().is_empty() {
            return Err(ConfigError::Validation("ontology cannot be empty".to_string()));
        }

        if self.queries.recursive.as_os_str().is_empty() || self.queries.bounded.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "queries.recursive and queries.bounded cannot be empty".to_string(),
            ));
        }

        if self.patterns.output.as_os_str().is_empty() {
            return Err(ConfigError::Validation("patterns.output cannot be empty".to_string()));
        }

        check_iri("namespace", &self.namespace)?;
        check_iri("patterns.categoryPredicate", &self.patterns.category_predicate)?;

        for (name, category) in &self.categories {
            if name.trim().is_empty() {
                return Err(ConfigError::Validation("category names cannot be empty".to_string()));
            }
            for root in &category.root_classes {
                let iri = self.root_class_iri(root);
                check_iri(&format!("categories.{}.rootClasses", name), &iri)?;
            }
        }

        Ok(())
    }

    /// Make relative paths absolute against `base`
    pub fn resolve(mut self, base: &Path) -> Self {
        let join = |p: &Path| if p.is_absolute() { p.to_path_buf() } else { base.join(p) };
        self.ontology = join(&self.ontology);
        self.queries.recursive = join(&self.queries.recursive);
        self.queries.bounded = join(&self.queries.bounded);
        self.patterns.output = join(&self.patterns.output);
        self
    }

    pub fn root_class_iri(&self, root: &RootClass) -> String {
        if root.id.starts_with("http://") || root.id.starts_with("https://") {
            root.id.clone()
        } else {
            format!("{}{}", self.namespace, root.id)
        }
    }

    /// Root-class categories in name order, categories without roots skipped
    pub fn root_categories(&self) -> Vec<RootClassCategory> {
        self.categories
            .iter()
            .filter(|(_, category)| !category.root_classes.is_empty())
            .map(|(name, category)| RootClassCategory {
                name: name.clone(),
                label: category.label.clone().unwrap_or_else(|| name.clone()),
                description: category.description.clone().unwrap_or_default(),
                roots: category
                    .root_classes
                    .iter()
                    .map(|root| self.root_class_iri(root))
                    .collect(),
            })
            .collect()
    }
}

fn check_iri(field: &str, value: &str) -> Result<(), ConfigError> {
    if IRI_PATTERN.is_match(value) {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "{} must be an absolute http(s) IRI, got '{}'",
            field, value
        )))
    }
}
