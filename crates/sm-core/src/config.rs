use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::format::{check_extra_zeros, OutputFormat};
use crate::remap::Polarity;

/// Per-run generation options.
///
/// Sérialisable en TOML. Chaque champ a une valeur par défaut saine.
///
/// # Example
/// ```
/// use sm_core::config::JobConfig;
/// use sm_core::format::OutputFormat;
/// let config = JobConfig::default();
/// assert_eq!(config.format, OutputFormat::BinS);
/// assert_eq!(config.extra_zero_padding, 0);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct JobConfig {
    /// Common cathode (active-high) or common anode (active-low).
    pub polarity: Polarity,
    /// Text representation of each value.
    pub format: OutputFormat,
    /// Added to the zero-padded width of `*_z` formats. May be negative.
    pub extra_zero_padding: isize,
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    output: Option<OutputSection>,
}

/// Output section, all fields optional for partial override.
///
/// Ids restent des chaînes ici : `FromStr` donne l'erreur typée.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct OutputSection {
    polarity: Option<String>,
    format: Option<String>,
    extra_zero_padding: Option<isize>,
}

/// Parse a TOML job config, keeping defaults for missing fields.
///
/// # Errors
/// Returns an error if the TOML is malformed or names an unknown key.
/// An unknown format or polarity, or extra padding beyond
/// [`MAX_EXTRA_ZEROS`](crate::format::MAX_EXTRA_ZEROS), is a [`CoreError`]
/// reachable through `downcast_ref`.
///
/// # Example
/// ```
/// use sm_core::config::parse_config;
/// use sm_core::format::OutputFormat;
/// use sm_core::remap::Polarity;
/// let config = parse_config("[output]\nformat = \"hex_sz\"\npolarity = \"common_anode\"\n").unwrap();
/// assert_eq!(config.format, OutputFormat::HexSz);
/// assert_eq!(config.polarity, Polarity::ActiveLow);
/// ```
pub fn parse_config(content: &str) -> Result<JobConfig> {
    let file: ConfigFile = toml::from_str(content).context("Erreur de parsing TOML")?;
    let mut config = JobConfig::default();

    if let Some(o) = file.output {
        if let Some(v) = o.polarity {
            config.polarity = v.parse()?;
        }
        if let Some(v) = o.format {
            config.format = v.parse()?;
        }
        if let Some(v) = o.extra_zero_padding {
            config.extra_zero_padding = check_extra_zeros(v)?;
        }
    }

    Ok(config)
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use sm_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("segmap.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<JobConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    let config = parse_config(&content)
        .with_context(|| format!("Configuration invalide dans {}", path.display()))?;
    log::info!(
        "Config chargée : format {}, polarité {}, zéros en plus {} ({})",
        config.format,
        config.polarity,
        config.extra_zero_padding,
        path.display()
    );
    Ok(config)
}
