/**
 * project module
 * canon.yaml configuration
 */

pub mod config;

pub use config::{CanonConfig, CategoryConfig, PatternSettings, QueryDirs, RootClass, CONFIG_FILE_NAME};
