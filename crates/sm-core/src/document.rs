use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use crate::error::CoreError;

/// Reference encodings of a display, as written in the base mapping document.
///
/// Bit strings are MSB-first and follow `pins_on_display`, which is also
/// listed MSB-first. Character order is the document order.
///
/// # Example
/// ```
/// use sm_core::document::BaseMapping;
/// let base = BaseMapping::from_json(
///     r#"{"characters_encoding": {"X": "1010"}, "pins_on_display": ["D", "C", "B", "A"]}"#,
/// ).unwrap();
/// assert_eq!(base.word_length(), 4);
/// assert_eq!(base.characters[0], ("X".to_string(), "1010".to_string()));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BaseMapping {
    /// `(symbol, bit string)` pairs in document order.
    pub characters: Vec<(String, String)>,
    /// Pin names on the display, MSB-first.
    pub pins_on_display: Vec<String>,
}

impl BaseMapping {
    /// Parse a base mapping document.
    ///
    /// # Errors
    /// Returns [`CoreError::Document`] if the JSON is malformed or misses a key.
    pub fn from_json(content: &str) -> Result<Self, CoreError> {
        let file: BaseMappingFile = serde_json::from_str(content)?;
        Ok(Self {
            characters: file.characters_encoding.0,
            pins_on_display: file.pins_on_display,
        })
    }

    /// Read and parse a base mapping document from disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Impossible de lire {}", path.display()))?;
        let base = Self::from_json(&content)
            .with_context(|| format!("Erreur de parsing JSON dans {}", path.display()))?;
        log::info!(
            "Base chargée : {} caractères, {} broches ({})",
            base.characters.len(),
            base.pins_on_display.len(),
            path.display()
        );
        Ok(base)
    }

    /// Number of bits per character (W).
    #[must_use]
    pub fn word_length(&self) -> usize {
        self.pins_on_display.len()
    }
}

/// How the driving device's output pins are connected to the display.
///
/// Keys are driver pin indices as written in the document (strings), values
/// are display pin names.
///
/// # Example
/// ```
/// use sm_core::document::UserWiring;
/// let wiring = UserWiring::from_json(r#"{"1": "B", "0": "A"}"#).unwrap();
/// assert_eq!(wiring.len(), 2);
/// assert_eq!(wiring.entries[0], ("1".to_string(), "B".to_string()));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserWiring {
    /// `(driver pin index, display pin name)` pairs in document order.
    pub entries: Vec<(String, String)>,
}

impl UserWiring {
    /// Parse a wiring document.
    ///
    /// # Errors
    /// Returns [`CoreError::Document`] if the JSON is malformed or not an
    /// object of strings.
    pub fn from_json(content: &str) -> Result<Self, CoreError> {
        let pairs: OrderedPairs = serde_json::from_str(content)?;
        Ok(Self { entries: pairs.0 })
    }

    /// Read and parse a wiring document from disk.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Impossible de lire {}", path.display()))?;
        let wiring = Self::from_json(&content)
            .with_context(|| format!("Erreur de parsing JSON dans {}", path.display()))?;
        log::info!(
            "Câblage chargé : {} broches ({})",
            wiring.len(),
            path.display()
        );
        Ok(wiring)
    }

    /// Wiring where driver pin `i` drives the pin of weight `2^i` in the
    /// reference order, i.e. a remap that leaves every encoding unchanged.
    ///
    /// # Example
    /// ```
    /// use sm_core::document::UserWiring;
    /// let pins = vec!["D".to_string(), "C".to_string(), "B".to_string(), "A".to_string()];
    /// let wiring = UserWiring::identity(&pins);
    /// assert_eq!(wiring.entries[0], ("0".to_string(), "A".to_string()));
    /// assert_eq!(wiring.entries[3], ("3".to_string(), "D".to_string()));
    /// ```
    #[must_use]
    pub fn identity(pins_on_display: &[String]) -> Self {
        Self {
            entries: pins_on_display
                .iter()
                .rev()
                .enumerate()
                .map(|(i, pin)| (i.to_string(), pin.clone()))
                .collect(),
        }
    }

    /// Number of wired pins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if nothing is wired.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Deserialize)]
struct BaseMappingFile {
    characters_encoding: OrderedPairs,
    pins_on_display: Vec<String>,
}

/// JSON object of strings, kept in document order.
///
/// A repeated key keeps its first position and its last value, like a JSON
/// object loaded into an insertion-ordered dictionary.
struct OrderedPairs(Vec<(String, String)>);

impl<'de> Deserialize<'de> for OrderedPairs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(OrderedPairsVisitor)
    }
}

struct OrderedPairsVisitor;

impl<'de> Visitor<'de> for OrderedPairsVisitor {
    type Value = OrderedPairs;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object mapping strings to strings")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut pairs: Vec<(String, String)> = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, String>()? {
            if let Some(slot) = pairs.iter_mut().find(|(k, _)| *k == key) {
                slot.1 = value;
            } else {
                pairs.push((key, value));
            }
        }
        Ok(OrderedPairs(pairs))
    }
}
