//! DOI registrar port.
//!
//! Registration is best-effort from the kernel's point of view: the
//! archiver decides whether a registrar failure aborts a publish.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ContentError, ContentResult};
use crate::validation::doi_pattern;

/// A validated DOI (`10.1234/suffix`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Doi(String);

impl Doi {
    /// Parse and validate a DOI.
    pub fn parse(value: &str) -> ContentResult<Self> {
        if !doi_pattern().is_match(value) {
            return Err(ContentError::validation("doi", format!("\"{value}\" is not a valid DOI")));
        }
        Ok(Self(value.to_string()))
    }

    /// Get the DOI as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolver URI.
    pub fn uri(&self) -> String {
        format!("https://doi.org/{}", self.0)
    }
}

impl fmt::Display for Doi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata submitted when registering a DOI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoiMetadata {
    /// Suffix requested for the DOI, usually the version ID.
    pub suffix: String,
    /// Title of the published version.
    pub title: String,
    /// Abstract or changelog.
    pub description: String,
    /// Landing page of the published version.
    pub url: String,
    /// Creator names, in order.
    pub creators: Vec<String>,
    /// Kind of the published resource (e.g. "Collection").
    pub resource_type: String,
    /// DOIs of earlier versions.
    pub related_identifiers: Vec<Doi>,
}

/// Error type for registrar calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrarError {
    /// The registrar rejected the metadata.
    #[error("DOI registration rejected: {0}")]
    Rejected(String),
    /// The registrar could not be reached.
    #[error("DOI registrar unavailable: {0}")]
    Unavailable(String),
}

impl From<RegistrarError> for ContentError {
    fn from(e: RegistrarError) -> Self {
        ContentError::ExternalServiceFailure {
            service: "doi",
            message: e.to_string(),
        }
    }
}

/// Registers DOIs for published versions.
pub trait DoiRegistrar: Send + Sync {
    /// Register a DOI for the given metadata.
    fn register(&self, metadata: &DoiMetadata) -> Result<Doi, RegistrarError>;
}

/// Registrar that mints `prefix/suffix` locally without a remote call.
///
/// Suitable for embedding and tests where no registration agency is wired.
#[derive(Debug, Clone)]
pub struct PrefixDoiRegistrar {
    prefix: String,
}

impl PrefixDoiRegistrar {
    /// Create a registrar for a DOI prefix such as `10.5555`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }
}

impl DoiRegistrar for PrefixDoiRegistrar {
    fn register(&self, metadata: &DoiMetadata) -> Result<Doi, RegistrarError> {
        Doi::parse(&format!("{}/{}", self.prefix, metadata.suffix))
            .map_err(|e| RegistrarError::Rejected(e.to_string()))
    }
}
