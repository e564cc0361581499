use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::document::UserWiring;
use crate::error::CoreError;
use crate::validate::driver_index;

/// Logic level that lights a segment.
///
/// # Example
/// ```
/// use sm_core::remap::Polarity;
/// assert_eq!(Polarity::default(), Polarity::ActiveHigh);
/// assert_eq!("common_anode".parse::<Polarity>().unwrap(), Polarity::ActiveLow);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "String", rename_all = "snake_case")]
pub enum Polarity {
    /// High output lights the segment (common cathode).
    #[default]
    ActiveHigh,
    /// Low output lights the segment (common anode).
    ActiveLow,
}

impl Polarity {
    /// Canonical name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ActiveHigh => "active_high",
            Self::ActiveLow => "active_low",
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Polarity {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl FromStr for Polarity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "active_high" | "common_cathode" => Ok(Self::ActiveHigh),
            "active_low" | "common_anode" => Ok(Self::ActiveLow),
            _ => Err(CoreError::UnsupportedPolarity(s.to_string())),
        }
    }
}

/// Character values after remapping, in the order of the base mapping.
///
/// Values are `word_length` bits wide; leading zeros are implied by
/// `word_length`, not by the integer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemappedEncoding {
    /// Bits per character (W).
    pub word_length: usize,
    /// `(symbol, value)` pairs.
    pub values: Vec<(String, u128)>,
}

impl RemappedEncoding {
    /// Value for `symbol`, if the character exists.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<u128> {
        self.values
            .iter()
            .find(|(s, _)| s == symbol)
            .map(|&(_, v)| v)
    }

    /// Number of characters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `true` if there are no characters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Same characters with every value complemented within `word_length` bits.
    #[must_use]
    pub fn inverted(&self) -> Self {
        let mask = word_mask(self.word_length);
        Self {
            word_length: self.word_length,
            values: self
                .values
                .iter()
                .map(|(s, v)| (s.clone(), !v & mask))
                .collect(),
        }
    }
}

/// All-ones value of `word_length` bits.
///
/// # Example
/// ```
/// use sm_core::remap::word_mask;
/// assert_eq!(word_mask(4), 0b1111);
/// assert_eq!(word_mask(128), u128::MAX);
/// ```
#[must_use]
pub fn word_mask(word_length: usize) -> u128 {
    if word_length >= u128::BITS as usize {
        u128::MAX
    } else {
        (1u128 << word_length) - 1
    }
}

/// Rewrite every character so its bits follow the user's wiring.
///
/// Bit strings are indexed from the left. For each wired pair
/// `(driver, pin)`, position `driver` of the new string takes the bit found
/// at the position of `pin` in the reversed `pins_on_display`. The new
/// string is then read MSB-first. Active-low complements the result.
///
/// Inputs must have passed [`validate`](crate::validate::validate) and
/// [`validate_base_mapping`](crate::validate::validate_base_mapping).
///
/// # Errors
/// Returns [`CoreError::Internal`] if the inputs were not validated and a
/// pin, index or bit string does not fit the word length.
///
/// # Example
/// ```
/// use sm_core::document::UserWiring;
/// use sm_core::remap::{remap, Polarity};
/// let pins: Vec<String> = ["D", "C", "B", "A"].iter().map(|s| s.to_string()).collect();
/// let chars = vec![("X".to_string(), "1010".to_string())];
/// let wiring = UserWiring::identity(&pins);
/// let high = remap(&chars, &wiring, &pins, Polarity::ActiveHigh).unwrap();
/// assert_eq!(high.get("X"), Some(0b1010));
/// let low = remap(&chars, &wiring, &pins, Polarity::ActiveLow).unwrap();
/// assert_eq!(low.get("X"), Some(0b0101));
/// ```
pub fn remap(
    characters: &[(String, String)],
    wiring: &UserWiring,
    pins_on_display: &[String],
    polarity: Polarity,
) -> Result<RemappedEncoding, CoreError> {
    let word_length = pins_on_display.len();
    let reversed: Vec<&str> = pins_on_display.iter().rev().map(String::as_str).collect();

    // (destination, source) string positions, resolved once for all characters.
    let routes = wiring
        .entries
        .iter()
        .map(|(key, pin)| -> Result<(usize, usize), CoreError> {
            let driver = driver_index(key)?;
            if driver >= word_length {
                return Err(CoreError::Internal(format!(
                    "broche pilote {driver} hors du mot de {word_length} bits"
                )));
            }
            let source = reversed
                .iter()
                .position(|p| *p == pin.as_str())
                .ok_or_else(|| CoreError::Internal(format!("broche \"{pin}\" introuvable")))?;
            Ok((driver, source))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut values = Vec::with_capacity(characters.len());
    for (symbol, bits) in characters {
        let bits = bits.as_bytes();
        if bits.len() != word_length {
            return Err(CoreError::Internal(format!(
                "encodage de '{symbol}' sur {} bits au lieu de {word_length}",
                bits.len()
            )));
        }
        let mut generated = vec![b'0'; word_length];
        for &(driver, source) in &routes {
            generated[driver] = bits[source];
        }
        let value = generated
            .iter()
            .fold(0u128, |acc, &b| (acc << 1) | u128::from(b == b'1'));
        values.push((symbol.clone(), value));
    }

    let remapped = RemappedEncoding {
        word_length,
        values,
    };
    Ok(match polarity {
        Polarity::ActiveHigh => remapped,
        Polarity::ActiveLow => remapped.inverted(),
    })
}
