use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::remap::RemappedEncoding;

/// Numeric base of the rendered values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Radix {
    /// Base 2, `0b` prefix.
    Binary,
    /// Base 16, `0x` prefix, lowercase digits.
    Hexadecimal,
}

impl Radix {
    /// Literal prefix for this base.
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Binary => "0b",
            Self::Hexadecimal => "0x",
        }
    }

    /// Digits needed for a word of `word_length` bits before extra padding.
    ///
    /// Hexadecimal never goes below four digits for words up to 16 bits.
    ///
    /// # Example
    /// ```
    /// use sm_core::format::Radix;
    /// assert_eq!(Radix::Binary.digit_width(14), 14);
    /// assert_eq!(Radix::Hexadecimal.digit_width(7), 4);
    /// assert_eq!(Radix::Hexadecimal.digit_width(17), 5);
    /// ```
    #[must_use]
    pub fn digit_width(self, word_length: usize) -> usize {
        match self {
            Self::Binary => word_length,
            Self::Hexadecimal if word_length <= 16 => 4,
            Self::Hexadecimal => word_length.div_ceil(4),
        }
    }

    fn digits(self, value: u128) -> String {
        match self {
            Self::Binary => format!("{value:b}"),
            Self::Hexadecimal => format!("{value:x}"),
        }
    }
}

/// Largest number of zeros that may be added to or removed from a padded width.
pub const MAX_EXTRA_ZEROS: isize = 128;

/// Reject extra padding beyond `±MAX_EXTRA_ZEROS`.
///
/// # Errors
/// Returns [`CoreError::ExtraZeros`] if the value is out of range.
///
/// # Example
/// ```
/// use sm_core::format::check_extra_zeros;
/// assert_eq!(check_extra_zeros(-2).unwrap(), -2);
/// assert!(check_extra_zeros(isize::MAX).is_err());
/// ```
pub fn check_extra_zeros(extra_zeros: isize) -> Result<isize, CoreError> {
    if (-MAX_EXTRA_ZEROS..=MAX_EXTRA_ZEROS).contains(&extra_zeros) {
        Ok(extra_zeros)
    } else {
        Err(CoreError::ExtraZeros(extra_zeros))
    }
}

/// Text representation of a remapped value.
///
/// `_s` adds the base prefix, `_z` left-pads with zeros to the word width.
///
/// # Example
/// ```
/// use sm_core::format::OutputFormat;
/// assert_eq!(OutputFormat::default(), OutputFormat::BinS);
/// assert_eq!("hex_sz".parse::<OutputFormat>().unwrap(), OutputFormat::HexSz);
/// assert_eq!(OutputFormat::HexZ.to_string(), "hex_z");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", rename_all = "snake_case")]
pub enum OutputFormat {
    /// Binary, no prefix, no padding.
    Bin,
    /// Binary with `0b`.
    #[default]
    BinS,
    /// Binary zero-padded.
    BinZ,
    /// Binary with `0b`, zero-padded.
    BinSz,
    /// Hexadecimal, no prefix, no padding.
    Hex,
    /// Hexadecimal with `0x`.
    HexS,
    /// Hexadecimal zero-padded.
    HexZ,
    /// Hexadecimal with `0x`, zero-padded.
    HexSz,
}

impl OutputFormat {
    /// Every supported format.
    pub const ALL: [Self; 8] = [
        Self::Bin,
        Self::BinS,
        Self::BinZ,
        Self::BinSz,
        Self::Hex,
        Self::HexS,
        Self::HexZ,
        Self::HexSz,
    ];

    /// Format id as used on the command line and in config files.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Bin => "bin",
            Self::BinS => "bin_s",
            Self::BinZ => "bin_z",
            Self::BinSz => "bin_sz",
            Self::Hex => "hex",
            Self::HexS => "hex_s",
            Self::HexZ => "hex_z",
            Self::HexSz => "hex_sz",
        }
    }

    /// Numeric base.
    #[must_use]
    pub fn radix(self) -> Radix {
        match self {
            Self::Bin | Self::BinS | Self::BinZ | Self::BinSz => Radix::Binary,
            Self::Hex | Self::HexS | Self::HexZ | Self::HexSz => Radix::Hexadecimal,
        }
    }

    /// `true` if values carry the `0b`/`0x` prefix.
    #[must_use]
    pub fn prefixed(self) -> bool {
        matches!(self, Self::BinS | Self::BinSz | Self::HexS | Self::HexSz)
    }

    /// `true` if values are zero-padded to the word width.
    #[must_use]
    pub fn padded(self) -> bool {
        matches!(self, Self::BinZ | Self::BinSz | Self::HexZ | Self::HexSz)
    }

    /// Zero-padded digit count for a word, `extra_zeros` included.
    ///
    /// `None` for unpadded formats. Negative totals clamp to zero.
    /// `extra_zeros` is clamped to `±MAX_EXTRA_ZEROS`.
    #[must_use]
    pub fn pad_width(self, word_length: usize, extra_zeros: isize) -> Option<usize> {
        let extra = extra_zeros.clamp(-MAX_EXTRA_ZEROS, MAX_EXTRA_ZEROS);
        self.padded().then(|| {
            self.radix()
                .digit_width(word_length)
                .checked_add_signed(extra)
                .unwrap_or(0)
        })
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl TryFrom<String> for OutputFormat {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl FromStr for OutputFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.id() == s)
            .ok_or_else(|| CoreError::UnsupportedFormat(s.to_string()))
    }
}

/// Render one value.
///
/// Zero padding fills up to the computed width and never truncates: a value
/// wider than the width keeps all its digits.
///
/// # Example
/// ```
/// use sm_core::format::{render_value, OutputFormat};
/// assert_eq!(render_value(10, 4, OutputFormat::BinSz, 0), "0b1010");
/// assert_eq!(render_value(5, 4, OutputFormat::BinSz, 0), "0b0101");
/// assert_eq!(render_value(10, 4, OutputFormat::HexZ, 0), "000a");
/// assert_eq!(render_value(10, 4, OutputFormat::Bin, 0), "1010");
/// ```
#[must_use]
pub fn render_value(
    value: u128,
    word_length: usize,
    format: OutputFormat,
    extra_zeros: isize,
) -> String {
    let radix = format.radix();
    let mut digits = radix.digits(value);
    if let Some(width) = format.pad_width(word_length, extra_zeros) {
        digits = format!("{digits:0>width$}");
    }
    if format.prefixed() {
        format!("{}{digits}", radix.prefix())
    } else {
        digits
    }
}

/// Write `"<symbol>: <value>\n"` for every character, in order.
///
/// # Errors
/// Returns the writer's I/O error unchanged.
pub fn write_mapping<W: Write>(
    writer: &mut W,
    mapping: &RemappedEncoding,
    format: OutputFormat,
    extra_zeros: isize,
) -> io::Result<()> {
    for (symbol, value) in &mapping.values {
        writeln!(
            writer,
            "{symbol}: {}",
            render_value(*value, mapping.word_length, format, extra_zeros)
        )?;
    }
    Ok(())
}

/// Render the whole mapping to a string.
///
/// # Example
/// ```
/// use sm_core::format::{serialize, OutputFormat};
/// use sm_core::remap::RemappedEncoding;
/// let mapping = RemappedEncoding { word_length: 4, values: vec![("X".into(), 10)] };
/// assert_eq!(serialize(&mapping, OutputFormat::HexSz, 0), "X: 0x000a\n");
/// ```
#[must_use]
pub fn serialize(mapping: &RemappedEncoding, format: OutputFormat, extra_zeros: isize) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_mapping(&mut buf, mapping, format, extra_zeros);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Write the mapping to a file, replacing its content.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn save_mapping(
    path: &Path,
    mapping: &RemappedEncoding,
    format: OutputFormat,
    extra_zeros: isize,
) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Impossible de créer {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_mapping(&mut writer, mapping, format, extra_zeros)
        .and_then(|()| writer.flush())
        .with_context(|| format!("Erreur d'écriture dans {}", path.display()))?;
    log::info!(
        "{} caractères écrits en {format} dans {}",
        mapping.len(),
        path.display()
    );
    Ok(())
}
