use std::path::PathBuf;

use clap::Parser;
use sm_core::format::{check_extra_zeros, OutputFormat};
use sm_core::remap::Polarity;

/// segmap — remap segment-display encodings onto your own pin wiring.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Câblage utilisateur (JSON) : index de broche pilote → nom de broche de l'afficheur.
    #[arg(short, long)]
    pub wiring: PathBuf,

    /// Table de référence (JSON) : characters_encoding + pins_on_display.
    #[arg(short, long)]
    pub base: PathBuf,

    /// Fichier de sortie. Défaut : sortie standard ("-").
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Fichier de configuration TOML. Défaut : segmap.toml s'il existe.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Format : bin, bin_s, bin_z, bin_sz, hex, hex_s, hex_z, hex_sz.
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Polarité : active_high (cathode commune) ou active_low (anode commune).
    #[arg(short, long)]
    pub polarity: Option<Polarity>,

    /// Zéros ajoutés (ou retirés si négatif) à la largeur des formats *_z.
    #[arg(short = 'z', long, allow_negative_numbers = true, value_parser = parse_extra_zeros)]
    pub extra_zeros: Option<isize>,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

/// Entier borné à ±128.
fn parse_extra_zeros(s: &str) -> Result<isize, String> {
    let value: isize = s.parse().map_err(|e| format!("{e}"))?;
    check_extra_zeros(value).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_full_command_line() {
        let cli = Cli::try_parse_from([
            "segmap",
            "--wiring",
            "user.json",
            "--base",
            "base.json",
            "-o",
            "out.txt",
            "--format",
            "hex_sz",
            "--polarity",
            "common_anode",
            "-z",
            "-1",
        ])
        .unwrap();
        assert_eq!(cli.wiring, PathBuf::from("user.json"));
        assert_eq!(cli.format, Some(OutputFormat::HexSz));
        assert_eq!(cli.polarity, Some(Polarity::ActiveLow));
        assert_eq!(cli.extra_zeros, Some(-1));
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn rejects_unknown_format() {
        let err = Cli::try_parse_from([
            "segmap", "-w", "user.json", "-b", "base.json", "-f", "oct",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("oct"));
    }

    #[test]
    fn rejects_out_of_range_extra_zeros() {
        let err = Cli::try_parse_from([
            "segmap", "-w", "user.json", "-b", "base.json", "-z", "9223372036854775807",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("hors limites"), "{err}");
        let cli = Cli::try_parse_from([
            "segmap", "-w", "user.json", "-b", "base.json", "-z", "-128",
        ])
        .unwrap();
        assert_eq!(cli.extra_zeros, Some(-128));
    }

    #[test]
    fn documents_are_required() {
        assert!(Cli::try_parse_from(["segmap", "-b", "base.json"]).is_err());
        assert!(Cli::try_parse_from(["segmap", "-w", "user.json"]).is_err());
    }
}
