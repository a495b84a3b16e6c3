//! canon - ontology vocabulary and query CLI
//!
//! Runs catalogued or inline SPARQL against the ontology, generates the
//! category pattern artifact and reports ambiguous labels.

use anyhow::{anyhow, Context, Result};
use canon_core::query::dispatcher;
use canon_core::vocabulary::ambiguity::AmbiguityReport;
use canon_core::{
    extract_category_classes, extract_root_categories, find_ambiguous_labels, merge_terms, values_clause,
    write_artifact, CanonConfig, Dialect, GraphStore, LoadOptions, PatternGenerator, QueryCatalog, QueryIdentifier, VocabularyExtractor,
};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::thread;

#[derive(Parser)]
#[command(name = "canon")]
#[command(version)]
#[command(about = "Ontology vocabulary extraction and SPARQL query runner", long_about = None)]
struct Cli {
    /// Debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Project config (default: ./canon.yaml if present)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct GraphArgs {
    /// Ontology file (.owl, .rdf, .xml, .ttl, .nt, .n3)
    #[arg(long, short = 'o')]
    ontology: Option<PathBuf>,

    /// Always parse the ontology; do not read or write the snapshot
    #[arg(long)]
    no_cache: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a catalogued query (by number or name), an inline query, or the interactive menu
    Query {
        /// Query number (e.g. 01) or file name/path
        id: Option<String>,

        /// Run inline SPARQL text
        #[arg(long, short = 'q', conflicts_with = "id")]
        query: Option<String>,

        /// List available queries
        #[arg(long, short = 'l')]
        list: bool,

        /// Use the bounded (UNION-only) catalog and engine
        #[arg(long, short = 'b')]
        bounded: bool,

        /// Catalog directory override
        #[arg(long)]
        queries: Option<PathBuf>,

        #[command(flatten)]
        graph: GraphArgs,
    },
    /// Generate the category pattern artifact
    Patterns {
        /// Output path (.json, or .yaml/.yml)
        #[arg(long, short = 'O')]
        output: Option<PathBuf>,

        /// Also write the category term lists
        #[arg(long)]
        terms_output: Option<PathBuf>,

        /// Also write class IRIs and VALUES clauses of root-class categories
        #[arg(long)]
        classes_output: Option<PathBuf>,

        /// Expand root-class hierarchies with UNION blocks instead of property paths
        #[arg(long, short = 'b')]
        bounded: bool,

        /// Wrap each pattern in word boundaries
        #[arg(long)]
        word_boundaries: bool,

        #[command(flatten)]
        graph: GraphArgs,
    },
    /// Report labels shared by more than one class
    Ambiguous {
        /// Namespace to scan (default: config namespace)
        #[arg(long)]
        namespace: Option<String>,

        #[command(flatten)]
        graph: GraphArgs,
    },
    /// Show category tags and configured root-class categories
    Categories {
        #[command(flatten)]
        graph: GraphArgs,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Query {
            id,
            query,
            list,
            bounded,
            queries,
            graph,
        } => {
            let dialect = if bounded { Dialect::Bounded } else { Dialect::Recursive };

            if list {
                let catalog = open_catalog(&config, dialect, queries.as_deref())?;
                print_listing(&catalog);
                return Ok(());
            }

            let store = load_graph(&config, &graph)?;

            if let Some(text) = query {
                return run_resolved(&store, dialect, "inline query", &text);
            }

            if let Some(id) = id {
                let catalog = open_catalog(&config, dialect, queries.as_deref())?;
                let resolved = catalog
                    .resolve(&QueryIdentifier::parse_positional(&id))
                    .map_err(|e| anyhow!("{}\nUse --list to see available queries", e))?;
                return run_resolved(&store, dialect, &resolved.label, &resolved.text);
            }

            interactive_session(&store, &config, dialect, queries)
        }

        Commands::Patterns {
            output,
            terms_output,
            classes_output,
            bounded,
            word_boundaries,
            graph,
        } => {
            let dialect = if bounded { Dialect::Bounded } else { Dialect::Recursive };
            let store = load_graph(&config, &graph)?;
            let settings = &config.patterns;

            let extractor = VocabularyExtractor::new(settings.category_predicate.clone())
                .with_min_term_length(settings.min_term_length);
            let root_categories = config.root_categories();

            let (tagged, rooted, classes) = thread::scope(|s| {
                let tagged = s.spawn(|| extractor.extract(&store));
                let rooted = s.spawn(|| {
                    extract_root_categories(&store, &root_categories, dialect, settings.min_term_length)
                });
                let classes = s.spawn(|| {
                    classes_output
                        .as_ref()
                        .map(|_| extract_category_classes(&store, &root_categories, dialect))
                        .transpose()
                });
                (tagged.join(), rooted.join(), classes.join())
            });

            let mut terms = tagged.map_err(|_| anyhow!("tag extraction thread panicked"))??;
            merge_terms(&mut terms, rooted.map_err(|_| anyhow!("hierarchy extraction thread panicked"))??);
            let classes = classes.map_err(|_| anyhow!("class extraction thread panicked"))??;

            let patterns = PatternGenerator::new()
                .with_word_boundaries(word_boundaries || settings.word_boundaries)
                .generate(&terms);

            let output = output.unwrap_or_else(|| settings.output.clone());
            write_artifact(&patterns, &output)?;

            if let Some(path) = terms_output {
                write_artifact(&terms, &path)?;
                println!("Terms written to: {}", path.display());
            }

            if let (Some(path), Some(classes)) = (classes_output, classes) {
                write_artifact(&classes, &path)?;
                println!("Classes written to: {}", path.display());
            }

            println!("Patterns written to: {}", output.display());
            println!("\n=== Summary ===");
            for (category, category_terms) in &terms {
                if !category_terms.is_empty() {
                    println!("  {}: {} terms", category, category_terms.len());
                }
            }
            Ok(())
        }

        Commands::Ambiguous { namespace, graph } => {
            let store = load_graph(&config, &graph)?;
            let namespace = namespace.unwrap_or_else(|| config.namespace.clone());
            let report = find_ambiguous_labels(&store, &namespace)?;
            print_ambiguity(&report, &namespace);
            Ok(())
        }

        Commands::Categories { graph } => {
            let store = load_graph(&config, &graph)?;
            let extractor = VocabularyExtractor::new(config.patterns.category_predicate.clone());

            let mut counts: BTreeMap<String, usize> = BTreeMap::new();
            for membership in extractor.memberships(&store)? {
                *counts.entry(membership.category).or_default() += 1;
            }

            println!("Category tags ({}):", extractor.category_predicate());
            if counts.is_empty() {
                println!("  (none)");
            }
            for (category, count) in &counts {
                println!("  {:<24} {} entities", category, count);
            }

            println!("\nRoot-class categories:");
            let root_categories = config.root_categories();
            if root_categories.is_empty() {
                println!("  (none configured)");
            }
            for category in root_categories {
                println!("  {} ({})", category.name, category.label);
                if !category.description.is_empty() {
                    println!("    {}", category.description);
                }
                let declared = config
                    .categories
                    .get(&category.name)
                    .map(|c| c.root_classes.as_slice())
                    .unwrap_or_default();
                for (root, iri) in declared.iter().zip(&category.roots) {
                    match &root.label {
                        Some(label) => println!("    {} <{}>", label, iri),
                        None => println!("    <{}>", iri),
                    }
                }
            }
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<CanonConfig> {
    match path {
        Some(path) => {
            let base = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            Ok(CanonConfig::load(path)?.resolve(&base))
        }
        None => {
            let cwd = std::env::current_dir().context("Cannot determine current directory")?;
            Ok(CanonConfig::load_from_project(cwd)?)
        }
    }
}

fn load_graph(config: &CanonConfig, args: &GraphArgs) -> Result<GraphStore> {
    let path = args.ontology.clone().unwrap_or_else(|| config.ontology.clone());
    let options = LoadOptions {
        use_cache: config.patterns.cache && !args.no_cache,
    };

    let store = GraphStore::load_with(&path, &options)
        .with_context(|| format!("Failed to load ontology {} (set it with --ontology)", path.display()))?;
    eprintln!("Loaded {} triples from {}.", store.triple_count(), path.display());
    Ok(store)
}

fn open_catalog(config: &CanonConfig, dialect: Dialect, override_dir: Option<&Path>) -> Result<QueryCatalog> {
    let dir = override_dir.unwrap_or_else(|| config.queries.dir_for(dialect));
    Ok(QueryCatalog::discover(dir, dialect)?)
}

fn print_listing(catalog: &QueryCatalog) {
    println!("\nAvailable {} queries ({}):", catalog.dialect(), catalog.directory().display());
    if catalog.is_empty() {
        println!("  (none)");
    }
    for descriptor in catalog.entries() {
        println!("  {}", descriptor.file_name());
    }
}

fn run_resolved(store: &GraphStore, dialect: Dialect, label: &str, text: &str) -> Result<()> {
    let engine = dialect.engine();
    let rendered = dispatcher::execute(store, engine.as_ref(), text)
        .with_context(|| format!("Query '{}' failed", label))?;

    println!("\n=== Running: {} ===\n", label);
    println!("{}", rendered);
    Ok(())
}

fn interactive_session(
    store: &GraphStore,
    config: &CanonConfig,
    mut dialect: Dialect,
    override_dir: Option<PathBuf>,
) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let catalog = match open_catalog(config, dialect, override_dir.as_deref()) {
            Ok(catalog) => Some(catalog),
            Err(e) => {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
                None
            }
        };

        println!("\n{}", "=".repeat(60));
        println!("Available {} SPARQL queries:", dialect);
        println!("{}", "=".repeat(60));
        if let Some(catalog) = &catalog {
            for (i, descriptor) in catalog.entries().iter().enumerate() {
                println!("  {:2}. {}", i + 1, descriptor.name);
            }
        }
        println!("\n  q. Quit");
        println!("  c. Custom SPARQL query");
        if override_dir.is_none() {
            println!("  s. Switch to {} queries", dialect.toggle());
        }
        println!("{}", "=".repeat(60));
        print!("\nSelect a query number (or 'q' to quit): ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            return Ok(());
        };
        let choice = line?.trim().to_lowercase();

        let outcome = match choice.as_str() {
            "q" => {
                println!("Goodbye!");
                return Ok(());
            }
            "s" if override_dir.is_some() => Err(anyhow!(
                "Cannot switch dialects while --queries is set; the directory holds {} queries only.",
                dialect
            )),
            "s" => {
                dialect = dialect.toggle();
                println!("\nSwitched to {} queries.", dialect);
                continue;
            }
            "c" => {
                println!("\nEnter your SPARQL query (end with an empty line):");
                let mut text = Vec::new();
                for line in lines.by_ref() {
                    let line = line?;
                    if line.is_empty() {
                        break;
                    }
                    text.push(line);
                }
                if text.is_empty() {
                    continue;
                }
                run_resolved(store, dialect, "custom query", &text.join("\n"))
            }
            other => match (other.parse::<usize>(), &catalog) {
                (Ok(position), Some(catalog)) => match catalog.get(position) {
                    Some(descriptor) => canon_core::query::catalog::read_descriptor(descriptor)
                        .map_err(anyhow::Error::from)
                        .and_then(|resolved| run_resolved(store, dialect, &resolved.label, &resolved.text)),
                    None => Err(anyhow!("Invalid selection.")),
                },
                (Ok(_), None) => Err(anyhow!("No catalog loaded; press 's' to switch.")),
                (Err(_), _) => Err(anyhow!("Please enter a number.")),
            },
        };

        if let Err(e) = outcome {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
        }
    }
}

fn print_ambiguity(report: &AmbiguityReport, namespace: &str) {
    if report.is_empty() {
        println!("\nNo ambiguous labels found.");
        return;
    }

    println!("\n{}", "=".repeat(60));
    println!("AMBIGUOUS LABELS FOUND: {}", report.len());
    println!("{}\n", "=".repeat(60));

    for (label, occurrences) in &report.labels {
        println!("Label: \"{}\" ({} classes)", label, occurrences.len());
        println!("{}", "-".repeat(40));
        for occurrence in occurrences {
            let short = occurrence.uri.strip_prefix(namespace).unwrap_or(&occurrence.uri);
            let marker = if occurrence.is_alt { " [altLabel]" } else { "" };
            let parents = if occurrence.parents.is_empty() {
                "(no parent)".to_string()
            } else {
                occurrence.parents.join(", ")
            };
            println!("  - {}{}", short, marker);
            println!("    Parent: {}", parents);
        }
        println!();
    }

    println!("{}", "=".repeat(60));
    println!("VALUES CLAUSE FOR SPARQL QUERIES");
    println!("{}\n", "=".repeat(60));
    println!("{}", values_clause(report));
}
