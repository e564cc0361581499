/// Segment-display encoding remapper.
///
/// Loads a reference character table and a user pin wiring, checks that
/// they fit together, permutes every character's bits to follow the wiring
/// and renders the result as binary or hexadecimal text.

pub mod config;
pub mod document;
pub mod error;
pub mod format;
pub mod generator;
pub mod remap;
pub mod validate;

pub use config::JobConfig;
pub use document::{BaseMapping, UserWiring};
pub use error::CoreError;
pub use format::OutputFormat;
pub use generator::{MappingGenerator, OutputTarget};
pub use remap::{Polarity, RemappedEncoding};
