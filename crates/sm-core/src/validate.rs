use std::collections::HashSet;

use crate::document::{BaseMapping, UserWiring};
use crate::error::CoreError;

/// Largest word length a remapped value can hold.
pub const MAX_WORD_LENGTH: usize = u128::BITS as usize;

/// Check that a wiring fits the display described by `pins_on_display`.
///
/// Checks, in order: entry count, pin names, then that the driver indices
/// cover `0..W` exactly once.
///
/// # Errors
/// - [`CoreError::SizeMismatch`] if the counts differ.
/// - [`CoreError::UnknownPin`] for the first wired pin absent from the display.
/// - [`CoreError::InvalidDriverIndex`], [`CoreError::DriverIndexOutOfRange`]
///   or [`CoreError::DuplicateDriverIndex`] if the indices are not a
///   permutation of `0..W`.
///
/// # Example
/// ```
/// use sm_core::document::UserWiring;
/// use sm_core::validate::validate;
/// let pins = vec!["B".to_string(), "A".to_string()];
/// let wiring = UserWiring::from_json(r#"{"0": "B", "1": "A"}"#).unwrap();
/// assert!(validate(&wiring, &pins).is_ok());
/// ```
pub fn validate(wiring: &UserWiring, pins_on_display: &[String]) -> Result<(), CoreError> {
    if wiring.len() != pins_on_display.len() {
        return Err(CoreError::SizeMismatch {
            wiring: wiring.len(),
            pins: pins_on_display.len(),
        });
    }

    for (_, pin) in &wiring.entries {
        if !pins_on_display.contains(pin) {
            return Err(CoreError::UnknownPin(pin.clone()));
        }
    }

    let word_length = pins_on_display.len();
    let mut seen = vec![false; word_length];
    for (key, _) in &wiring.entries {
        let index = driver_index(key)?;
        let slot = seen
            .get_mut(index)
            .ok_or(CoreError::DriverIndexOutOfRange { index, word_length })?;
        if *slot {
            return Err(CoreError::DuplicateDriverIndex(index));
        }
        *slot = true;
    }

    log::debug!("Câblage valide : {word_length} broches");
    Ok(())
}

/// Check the internal consistency of a base mapping document.
///
/// # Errors
/// - [`CoreError::WordLength`] if there are no pins or more than 128.
/// - [`CoreError::DuplicatePin`] if a pin name is listed twice.
/// - [`CoreError::EmptyEncoding`] if no character is defined.
/// - [`CoreError::InvalidEncoding`] if a bit string is not exactly W binary digits.
pub fn validate_base_mapping(base: &BaseMapping) -> Result<(), CoreError> {
    let word_length = base.word_length();
    if !(1..=MAX_WORD_LENGTH).contains(&word_length) {
        return Err(CoreError::WordLength(word_length));
    }

    let mut pins = HashSet::with_capacity(word_length);
    for pin in &base.pins_on_display {
        if !pins.insert(pin.as_str()) {
            return Err(CoreError::DuplicatePin(pin.clone()));
        }
    }

    if base.characters.is_empty() {
        return Err(CoreError::EmptyEncoding);
    }

    for (symbol, bits) in &base.characters {
        let count = bits.chars().count();
        if count != word_length {
            return Err(CoreError::InvalidEncoding {
                symbol: symbol.clone(),
                reason: format!("{count} bits au lieu de {word_length}"),
            });
        }
        if let Some(c) = bits.chars().find(|c| !matches!(c, '0' | '1')) {
            return Err(CoreError::InvalidEncoding {
                symbol: symbol.clone(),
                reason: format!("caractère '{c}' dans \"{bits}\""),
            });
        }
    }

    log::debug!(
        "Base valide : {} caractères sur {word_length} bits",
        base.characters.len()
    );
    Ok(())
}

/// Parse a wiring key as a driver pin index.
pub(crate) fn driver_index(key: &str) -> Result<usize, CoreError> {
    key.trim()
        .parse()
        .map_err(|_| CoreError::InvalidDriverIndex(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pins(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    fn wiring(pairs: &[(&str, &str)]) -> UserWiring {
        UserWiring {
            entries: pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    #[test]
    fn accepts_any_permutation() {
        let reference = pins(&["D", "C", "B", "A"]);
        let w = wiring(&[("2", "A"), ("0", "D"), ("3", "B"), ("1", "C")]);
        assert!(validate(&w, &reference).is_ok());
    }

    #[test]
    fn size_mismatch_reports_both_counts() {
        let reference = pins(&["D", "C", "B", "A"]);
        let w = wiring(&[("0", "A"), ("1", "B"), ("2", "C")]);
        let err = validate(&w, &reference).unwrap_err();
        assert!(matches!(
            err,
            CoreError::SizeMismatch { wiring: 3, pins: 4 }
        ));
        let msg = err.to_string();
        assert!(msg.contains('3') && msg.contains('4'), "{msg}");
    }

    #[test]
    fn unknown_pin_is_named() {
        let reference = pins(&["D", "C", "B", "A"]);
        let w = wiring(&[("0", "A"), ("1", "B"), ("2", "C"), ("3", "E")]);
        let err = validate(&w, &reference).unwrap_err();
        assert!(matches!(err, CoreError::UnknownPin(ref p) if p == "E"));
        assert!(err.to_string().contains("\"E\""));
    }

    #[test]
    fn size_is_checked_before_pin_names() {
        let reference = pins(&["B", "A"]);
        let w = wiring(&[("0", "X")]);
        assert!(matches!(
            validate(&w, &reference),
            Err(CoreError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn rejects_non_numeric_index() {
        let reference = pins(&["B", "A"]);
        let w = wiring(&[("0", "A"), ("one", "B")]);
        assert!(matches!(
            validate(&w, &reference),
            Err(CoreError::InvalidDriverIndex(ref k)) if k == "one"
        ));
        let w = wiring(&[("0", "A"), ("-1", "B")]);
        assert!(matches!(
            validate(&w, &reference),
            Err(CoreError::InvalidDriverIndex(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_index() {
        let reference = pins(&["B", "A"]);
        let w = wiring(&[("0", "A"), ("2", "B")]);
        assert!(matches!(
            validate(&w, &reference),
            Err(CoreError::DriverIndexOutOfRange {
                index: 2,
                word_length: 2
            })
        ));
    }

    #[test]
    fn rejects_index_wired_twice() {
        let reference = pins(&["C", "B", "A"]);
        let w = wiring(&[("0", "A"), ("1", "B"), ("01", "C")]);
        assert!(matches!(
            validate(&w, &reference),
            Err(CoreError::DuplicateDriverIndex(1))
        ));
    }

    #[test]
    fn bit_strings_are_measured_in_characters() {
        let mut base = BaseMapping {
            characters: vec![("X".into(), "é01".into())],
            pins_on_display: pins(&["D", "C", "B", "A"]),
        };
        let err = validate_base_mapping(&base).unwrap_err();
        assert!(err.to_string().contains("3 bits au lieu de 4"), "{err}");

        base.characters[0].1 = "é010".into();
        let err = validate_base_mapping(&base).unwrap_err();
        assert!(err.to_string().contains("caractère 'é'"), "{err}");
    }

    #[test]
    fn base_mapping_checks() {
        let good = BaseMapping {
            characters: vec![("X".into(), "1010".into())],
            pins_on_display: pins(&["D", "C", "B", "A"]),
        };
        assert!(validate_base_mapping(&good).is_ok());

        let mut short = good.clone();
        short.characters.push(("Y".into(), "101".into()));
        assert!(matches!(
            validate_base_mapping(&short),
            Err(CoreError::InvalidEncoding { ref symbol, .. }) if symbol == "Y"
        ));

        let mut bad_digit = good.clone();
        bad_digit.characters[0].1 = "10x0".into();
        assert!(matches!(
            validate_base_mapping(&bad_digit),
            Err(CoreError::InvalidEncoding { .. })
        ));

        let mut dup = good.clone();
        dup.pins_on_display[3] = "D".into();
        assert!(matches!(
            validate_base_mapping(&dup),
            Err(CoreError::DuplicatePin(ref p)) if p == "D"
        ));

        let mut empty = good.clone();
        empty.characters.clear();
        assert!(matches!(
            validate_base_mapping(&empty),
            Err(CoreError::EmptyEncoding)
        ));

        let mut no_pins = good;
        no_pins.pins_on_display.clear();
        assert!(matches!(
            validate_base_mapping(&no_pins),
            Err(CoreError::WordLength(0))
        ));
    }

    #[test]
    fn word_length_limit() {
        let names: Vec<String> = (0..=MAX_WORD_LENGTH).map(|i| format!("p{i}")).collect();
        let base = BaseMapping {
            characters: vec![("X".into(), "0".repeat(names.len()))],
            pins_on_display: names,
        };
        assert!(matches!(
            validate_base_mapping(&base),
            Err(CoreError::WordLength(129))
        ));
    }
}
