//! Modelsmith CLI
//!
//! Builds a domain model from a schema document, completes it and renders
//! the selected generators.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use modelsmith::{builtin_registry, Document, Generator, GeneratorConfig, Repository, TemplateCatalog};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "modelsmith")]
#[command(about = "Build facet-annotated domain models and generate code from them")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build, complete and render a schema document
    Generate {
        /// Schema document (.toml or .json)
        #[arg(short, long)]
        schema: PathBuf,

        /// Output directory (overrides generator.output_dir)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Generator to run; repeat for several (default: all)
        #[arg(short, long = "generator")]
        generators: Vec<String>,

        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Build and complete schema documents without rendering
    Check {
        /// Schema document, or a directory searched for .toml/.json documents
        #[arg(short, long)]
        schema: PathBuf,

        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List the known generator keys
    Generators,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate {
            schema,
            output,
            generators,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let model = build(&schema, &config)?;

            let output_dir = output.unwrap_or_else(|| config.output_dir());
            let generators = if generators.is_empty() {
                config.generator.generators.clone()
            } else {
                generators
            };

            let catalog = TemplateCatalog::builtin();
            let generator = Generator::new(&model, &catalog)?;
            let report = generator.generate(&output_dir, generators.as_slice())?;

            println!("Generated {} file(s) in {}", report.len(), output_dir.display());
            for file in &report.files {
                println!("   {}", file.display());
            }
        }

        Commands::Check { schema, config } => {
            let config = load_config(config.as_deref())?;
            let documents = schema_documents(&schema)?;
            if documents.is_empty() {
                bail!("no schema documents found in {}", schema.display());
            }

            let mut failures = 0;
            for document in &documents {
                match build(document, &config) {
                    Ok(model) => {
                        let modules = model.data_modules().count();
                        println!("✓ {} ({} data module(s))", document.display(), modules);
                    }
                    Err(e) => {
                        failures += 1;
                        println!("✗ {}: {:#}", document.display(), e);
                    }
                }
            }

            if failures > 0 {
                bail!("{} of {} schema document(s) failed", failures, documents.len());
            }
        }

        Commands::Generators => {
            let catalog = TemplateCatalog::builtin();
            for key in catalog.keys() {
                println!("{}", key);
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<GeneratorConfig> {
    let path = path.map(|p| p.to_string_lossy().into_owned());
    GeneratorConfig::load_from(path.as_deref()).context("failed to load configuration")
}

/// Load, build and complete one schema document
fn build(schema: &Path, config: &GeneratorConfig) -> anyhow::Result<Repository> {
    let document =
        Document::load(schema).with_context(|| format!("failed to load {}", schema.display()))?;
    let mut model = document
        .build(builtin_registry()?, &config.facets.enabled)
        .with_context(|| format!("failed to build {}", schema.display()))?;
    model
        .complete()
        .with_context(|| format!("failed to complete {}", schema.display()))?;
    Ok(model)
}

fn schema_documents(path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut documents = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to read {}", path.display()))?;
        let is_document = matches!(
            entry.path().extension().and_then(|e| e.to_str()),
            Some("toml") | Some("json")
        );
        if entry.file_type().is_file() && is_document {
            documents.push(entry.into_path());
        }
    }
    Ok(documents)
}
