use std::path::Path;

use anyhow::Result;
use clap::Parser;
use sm_core::config::JobConfig;
use sm_core::generator::{MappingGenerator, OutputTarget};

pub mod cli;

/// Config looked up in the working directory when `--config` is absent.
const DEFAULT_CONFIG: &str = "segmap.toml";

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    run(&cli)
}

/// Load, validate, remap, write. Nothing is written if any check fails.
fn run(cli: &cli::Cli) -> Result<()> {
    // 1. Charger la config
    let mut config = resolve_config(cli)?;

    // 1b. Appliquer les overrides CLI
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(polarity) = cli.polarity {
        config.polarity = polarity;
    }
    if let Some(extra) = cli.extra_zeros {
        config.extra_zero_padding = extra;
    }

    // 2. Charger et valider les documents
    let generator = MappingGenerator::from_files(
        &cli.wiring,
        &cli.base,
        OutputTarget::from_arg(cli.output.as_deref()),
    )?;

    // 3. Générer et écrire
    let mapping = generator.run(&config)?;
    log::info!(
        "{} caractères sur {} bits générés ({}, {})",
        mapping.len(),
        mapping.word_length,
        config.polarity,
        config.format
    );
    Ok(())
}

/// Resolve config: explicit --config, then segmap.toml, then defaults.
fn resolve_config(cli: &cli::Cli) -> Result<JobConfig> {
    match cli.config.as_deref() {
        Some(path) if path.exists() => sm_core::config::load_config(path),
        Some(path) => {
            log::warn!(
                "Config introuvable : {}. Utilisation des défauts.",
                path.display()
            );
            Ok(JobConfig::default())
        }
        None if Path::new(DEFAULT_CONFIG).exists() => {
            sm_core::config::load_config(Path::new(DEFAULT_CONFIG))
        }
        None => Ok(JobConfig::default()),
    }
}
