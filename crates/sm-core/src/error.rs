use thiserror::Error;

/// Errors originating from the core module.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Malformed input document.
    #[error("Document JSON invalide : {source}")]
    Document {
        /// Underlying parser error.
        #[from]
        source: serde_json::Error,
    },

    /// Wiring entry count differs from the reference pin count.
    #[error(
        "Le câblage déclare {wiring} broches mais l'afficheur en possède {pins} \
         (une broche par bit de caractère)"
    )]
    SizeMismatch {
        /// Number of entries in the wiring document.
        wiring: usize,
        /// Number of pins in `pins_on_display`.
        pins: usize,
    },

    /// Wiring references a pin absent from the reference pin list.
    #[error(
        "Broche inconnue \"{0}\" : absente de pins_on_display, vérifiez que les noms correspondent"
    )]
    UnknownPin(String),

    /// Driver pin key is not a non-negative integer.
    #[error("Index de broche pilote invalide : \"{0}\"")]
    InvalidDriverIndex(String),

    /// Driver pin index is outside `[0, word_length)`.
    #[error("Index de broche pilote {index} hors limites (0..{word_length})")]
    DriverIndexOutOfRange {
        /// Parsed index.
        index: usize,
        /// Bits per character.
        word_length: usize,
    },

    /// Two wiring keys resolve to the same driver pin index.
    #[error("Index de broche pilote {0} câblé plusieurs fois")]
    DuplicateDriverIndex(usize),

    /// Pin name listed twice in `pins_on_display`.
    #[error("Broche \"{0}\" déclarée plusieurs fois dans pins_on_display")]
    DuplicatePin(String),

    /// Word length outside what a `u128` can carry.
    #[error("Longueur de mot non supportée : {0} bits (1..=128)")]
    WordLength(usize),

    /// A character's bit string is malformed.
    #[error("Encodage invalide pour '{symbol}' : {reason}")]
    InvalidEncoding {
        /// Character symbol.
        symbol: String,
        /// What is wrong with it.
        reason: String,
    },

    /// `characters_encoding` has no entries.
    #[error("characters_encoding est vide")]
    EmptyEncoding,

    /// Unsupported serialization format id.
    #[error("Format non supporté : {0}")]
    UnsupportedFormat(String),

    /// Extra zero padding outside `±MAX_EXTRA_ZEROS`.
    #[error("Zéros en plus hors limites : {0} (-128..=128)")]
    ExtraZeros(isize),

    /// Unsupported polarity name.
    #[error("Polarité non supportée : {0}")]
    UnsupportedPolarity(String),

    /// Broken internal invariant (validated input was not actually valid).
    #[error("Invariant interne violé : {0}")]
    Internal(String),
}
