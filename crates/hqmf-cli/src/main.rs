//! HQMF CLI
//!
//! Reads an HQMF R2 measure document and prints its data criteria as JSON

use anyhow::{Context, Result};
use clap::Parser;
use hqmf_criteria::{
    registry::{FieldRegistry, TemplateRegistry, ValuePathRegistry},
    xml::Element,
    ParseSession, Registries,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "hqmf")]
#[command(about = "Extract normalized data criteria from HQMF R2 measure documents")]
#[command(version)]
#[command(
    long_about = "Reads the data criteria section of an HQMF R2 quality measure document and\n\
writes the normalized data criteria as a JSON array.\n\
\n\
Examples:\n  \
hqmf measure.xml                          # Print criteria to stdout\n  \
hqmf measure.xml --pretty -o out.json     # Write indented JSON to a file\n  \
hqmf measure.xml --templates extra.json   # Use a custom template table"
)]
struct Cli {
    /// HQMF document to read
    input: PathBuf,

    /// Write JSON to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Indent the JSON output
    #[arg(long)]
    pretty: bool,

    /// Template table replacing the built-in one
    #[arg(long, env = "HQMF_TEMPLATES", help = "Template id → definition/status JSON table")]
    templates: Option<PathBuf>,

    /// Value path table replacing the built-in one
    #[arg(long, env = "HQMF_VALUE_PATHS", help = "Template id → value set/result path JSON table")]
    value_paths: Option<PathBuf>,

    /// Field code table replacing the built-in one
    #[arg(long, env = "HQMF_FIELDS", help = "Relationship code → field key JSON table")]
    fields: Option<PathBuf>,
}

fn main() {
    init_tracing();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hqmf=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let registries = load_registries(&cli)?;

    let xml = fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;
    let document = Element::parse(&xml)
        .with_context(|| format!("Failed to parse {}", cli.input.display()))?;

    let mut session = ParseSession::new(&registries);
    let entries = session
        .parse_document(&document)
        .with_context(|| format!("Failed to extract data criteria from {}", cli.input.display()))?;
    let stats = session.patch().context("Patch pass failed")?;
    debug!("Patched: {}", stats);

    let criteria = session.export();
    info!("Extracted {} data criteria from {} entries", criteria.len(), entries);

    let json = if cli.pretty {
        serde_json::to_string_pretty(&criteria)?
    } else {
        serde_json::to_string(&criteria)?
    };

    match &cli.output {
        Some(path) => fs::write(path, json + "\n")
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

fn load_registries(cli: &Cli) -> Result<Registries> {
    let mut registries = Registries::builtin().context("Built-in registry tables are invalid")?;

    if let Some(path) = &cli.templates {
        registries.templates = TemplateRegistry::from_file(path).with_context(|| table_context(path))?;
    }
    if let Some(path) = &cli.value_paths {
        registries.value_paths =
            ValuePathRegistry::from_file(path).with_context(|| table_context(path))?;
    }
    if let Some(path) = &cli.fields {
        registries.fields = FieldRegistry::from_file(path).with_context(|| table_context(path))?;
    }

    debug!(
        "Registries: {} templates, {} value paths, {} fields",
        registries.templates.len(),
        registries.value_paths.len(),
        registries.fields.len()
    );
    Ok(registries)
}

fn table_context(path: &Path) -> String {
    format!("Failed to load registry table {}", path.display())
}
