/**
 * patterns module
 *
 * - generator: escaped alternation per category
 * - artifact: JSON/YAML rendering and atomic write
 */

pub mod artifact;
pub mod generator;

pub use artifact::{render, write_artifact, ArtifactFormat};
pub use generator::{PatternGenerator, PatternMap};
