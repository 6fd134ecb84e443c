//! Traversal policy definitions.

pub mod bundle;

pub use bundle::{BundleConfiguration, BUNDLE_CONFIG_VERSION};
