use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::JobConfig;
use crate::document::{BaseMapping, UserWiring};
use crate::error::CoreError;
use crate::format::{save_mapping, write_mapping};
use crate::remap::{remap, Polarity, RemappedEncoding};
use crate::validate::{validate, validate_base_mapping};

/// Where the generated mapping goes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputTarget {
    /// Standard output.
    #[default]
    Stdout,
    /// Text file, created or truncated.
    File(PathBuf),
}

impl OutputTarget {
    /// `-` means standard output, anything else is a file path.
    #[must_use]
    pub fn from_arg(path: Option<&Path>) -> Self {
        match path {
            Some(p) if p != Path::new("-") => Self::File(p.to_path_buf()),
            _ => Self::Stdout,
        }
    }
}

/// Base mapping and wiring of one display, checked against each other.
///
/// Built once; every generation reads the same validated tables.
///
/// # Example
/// ```
/// use sm_core::config::JobConfig;
/// use sm_core::document::{BaseMapping, UserWiring};
/// use sm_core::format::OutputFormat;
/// use sm_core::generator::{MappingGenerator, OutputTarget};
/// use sm_core::remap::Polarity;
///
/// let base = BaseMapping::from_json(
///     r#"{"characters_encoding": {"X": "1010"}, "pins_on_display": ["D", "C", "B", "A"]}"#,
/// ).unwrap();
/// let wiring = UserWiring::from_json(r#"{"0": "A", "1": "B", "2": "C", "3": "D"}"#).unwrap();
/// let generator = MappingGenerator::new(base, wiring, OutputTarget::Stdout).unwrap();
///
/// let config = JobConfig { polarity: Polarity::ActiveLow, format: OutputFormat::BinSz, extra_zero_padding: 0 };
/// let mut out = Vec::new();
/// generator.write_to(&mut out, &config).unwrap();
/// assert_eq!(out, b"X: 0b0101\n");
/// ```
#[derive(Clone, Debug)]
pub struct MappingGenerator {
    base: BaseMapping,
    wiring: UserWiring,
    output: OutputTarget,
}

impl MappingGenerator {
    /// Validate both documents and keep them for generation.
    ///
    /// # Errors
    /// Returns the first [`CoreError`] found in the base mapping, then in the
    /// wiring.
    pub fn new(base: BaseMapping, wiring: UserWiring, output: OutputTarget) -> Result<Self, CoreError> {
        validate_base_mapping(&base)?;
        validate(&wiring, &base.pins_on_display)?;
        Ok(Self {
            base,
            wiring,
            output,
        })
    }

    /// Load the wiring and base mapping documents, then validate them.
    ///
    /// # Errors
    /// Returns an error if a document cannot be read or parsed, or if the
    /// wiring does not fit the display. The [`CoreError`] stays reachable
    /// through `downcast_ref`.
    pub fn from_files(wiring_path: &Path, base_path: &Path, output: OutputTarget) -> Result<Self> {
        let wiring = UserWiring::load(wiring_path)?;
        let base = BaseMapping::load(base_path)?;
        Self::new(base, wiring, output).with_context(|| {
            format!(
                "{} ne correspond pas à {}",
                wiring_path.display(),
                base_path.display()
            )
        })
    }

    /// Reference document.
    #[must_use]
    pub fn base(&self) -> &BaseMapping {
        &self.base
    }

    /// Bits per character.
    #[must_use]
    pub fn word_length(&self) -> usize {
        self.base.word_length()
    }

    /// Remap every character for the given polarity.
    ///
    /// # Errors
    /// Only [`CoreError::Internal`], which construction rules out.
    pub fn generate(&self, polarity: Polarity) -> Result<RemappedEncoding, CoreError> {
        remap(
            &self.base.characters,
            &self.wiring,
            &self.base.pins_on_display,
            polarity,
        )
    }

    /// Generate and write the mapping to `writer`.
    ///
    /// # Errors
    /// Returns an error if generation or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, config: &JobConfig) -> Result<()> {
        let mapping = self.generate(config.polarity)?;
        write_mapping(writer, &mapping, config.format, config.extra_zero_padding)?;
        writer.flush()?;
        Ok(())
    }

    /// Generate and write the mapping to the output destination.
    ///
    /// Nothing is created or written if generation fails.
    ///
    /// # Errors
    /// Returns an error if generation fails or the destination is unwritable.
    pub fn run(&self, config: &JobConfig) -> Result<RemappedEncoding> {
        let mapping = self.generate(config.polarity)?;
        match &self.output {
            OutputTarget::Stdout => {
                let mut stdout = io::stdout().lock();
                write_mapping(&mut stdout, &mapping, config.format, config.extra_zero_padding)
                    .and_then(|()| stdout.flush())
                    .context("Erreur d'écriture sur la sortie standard")?;
            }
            OutputTarget::File(path) => {
                save_mapping(path, &mapping, config.format, config.extra_zero_padding)?;
            }
        }
        Ok(mapping)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::OutputFormat;

    const BASE: &str = r#"{
        "characters_encoding": {"X": "1010", "Y": "0001"},
        "pins_on_display": ["D", "C", "B", "A"]
    }"#;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn end_to_end_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let base = write(dir.path(), "base.json", BASE);
        let wiring = write(
            dir.path(),
            "wiring.json",
            r#"{"0": "A", "1": "B", "2": "C", "3": "D"}"#,
        );
        let out = dir.path().join("out.txt");
        let generator =
            MappingGenerator::from_files(&wiring, &base, OutputTarget::File(out.clone())).unwrap();
        assert_eq!(generator.word_length(), 4);

        let config = JobConfig {
            format: OutputFormat::BinSz,
            ..JobConfig::default()
        };
        let mapping = generator.run(&config).unwrap();
        assert_eq!(mapping.get("X"), Some(10));
        assert_eq!(
            std::fs::read_to_string(&out).unwrap(),
            "X: 0b1010\nY: 0b0001\n"
        );
    }

    #[test]
    fn unknown_pin_fails_before_output_exists() {
        let dir = tempfile::tempdir().unwrap();
        let base = write(dir.path(), "base.json", BASE);
        let wiring = write(
            dir.path(),
            "wiring.json",
            r#"{"0": "A", "1": "B", "2": "C", "3": "E"}"#,
        );
        let out = dir.path().join("out.txt");
        let err = MappingGenerator::from_files(&wiring, &base, OutputTarget::File(out.clone()))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::UnknownPin(p)) if p == "E"
        ));
        assert!(format!("{err:#}").contains("\"E\""));
        assert!(!out.exists());
    }

    #[test]
    fn malformed_base_is_reported_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let base = write(dir.path(), "base.json", "{\"pins_on_display\": [");
        let wiring = write(dir.path(), "wiring.json", r#"{"0": "A"}"#);
        let err =
            MappingGenerator::from_files(&wiring, &base, OutputTarget::Stdout).unwrap_err();
        assert!(format!("{err:#}").contains("base.json"));
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::Document { .. })
        ));
    }

    #[test]
    fn new_checks_base_before_wiring() {
        let base = BaseMapping {
            characters: vec![("X".into(), "10".into())],
            pins_on_display: vec!["D".into(), "C".into(), "B".into(), "A".into()],
        };
        let wiring = UserWiring { entries: vec![] };
        assert!(matches!(
            MappingGenerator::new(base, wiring, OutputTarget::Stdout),
            Err(CoreError::InvalidEncoding { .. })
        ));
    }

    #[test]
    fn write_to_honors_config() {
        let base = BaseMapping::from_json(BASE).unwrap();
        let wiring = UserWiring::identity(&base.pins_on_display);
        let generator = MappingGenerator::new(base, wiring, OutputTarget::Stdout).unwrap();
        let config = JobConfig {
            polarity: Polarity::ActiveLow,
            format: OutputFormat::HexSz,
            extra_zero_padding: -2,
        };
        let mut out = Vec::new();
        generator.write_to(&mut out, &config).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "X: 0x05\nY: 0x0e\n");
    }

    #[test]
    fn bundled_seven_segment_sample() {
        let data = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data");
        let generator = MappingGenerator::from_files(
            &data.join("user_config_7-segment.json"),
            &data.join("base_mapping_7-segment.json"),
            OutputTarget::Stdout,
        )
        .unwrap();
        assert_eq!(generator.word_length(), 7);
        let mapping = generator.generate(Polarity::ActiveHigh).unwrap();
        assert_eq!(mapping.len(), generator.base().characters.len());
        assert_eq!(mapping.get("8"), Some(0b111_1111));
        assert_eq!(mapping.get(" "), Some(0));
        for ((symbol, bits), (_, value)) in generator.base().characters.iter().zip(&mapping.values) {
            let ones = bits.bytes().filter(|&b| b == b'1').count();
            assert_eq!(value.count_ones() as usize, ones, "'{symbol}'");
        }
    }

    #[test]
    fn output_target_from_arg() {
        assert_eq!(OutputTarget::from_arg(None), OutputTarget::Stdout);
        assert_eq!(OutputTarget::from_arg(Some(Path::new("-"))), OutputTarget::Stdout);
        assert_eq!(
            OutputTarget::from_arg(Some(Path::new("out.txt"))),
            OutputTarget::File(PathBuf::from("out.txt"))
        );
    }
}
