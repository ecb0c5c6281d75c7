//! Project descriptor (`.strata.yaml`) reading and writing
//!
//! The descriptor is the single configuration input for every generation
//! task. It is loaded once per invocation into an immutable value and
//! passed explicitly through the resolver and engine.

use chrono::{DateTime, Utc};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::core::model::{ArchitectureType, Framework, Paradigm, TemplateMode};
use crate::yaml::YamlSyntaxError;

/// Descriptor file name, located at the project root.
pub const DESCRIPTOR_FILE: &str = ".strata.yaml";

/// Repository used in production mode when none is configured.
pub const DEFAULT_TEMPLATE_REPOSITORY: &str =
    "https://github.com/strata-tools/strata-templates";

/// Branch used when neither a branch nor a version is configured.
pub const DEFAULT_TEMPLATE_BRANCH: &str = "main";

/// Cache validity window used when `templates.cache_ttl_hours` is absent.
pub const DEFAULT_CACHE_TTL_HOURS: u64 = 24;

/// The parsed `.strata.yaml` descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Descriptor {
    pub project: ProjectSection,
    pub architecture: ArchitectureSection,
    #[serde(default)]
    pub templates: TemplatePreferences,
}

/// `project:` section of the descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSection {
    /// Service name, used for generated artifact naming.
    pub name: String,
    /// Base identifier the generated sources are rooted under,
    /// dot-separated (e.g. `com.example.orders`).
    pub base_module: String,
    /// Version of the tool that wrote this descriptor.
    pub tool_version: String,
    pub created_at: DateTime<Utc>,
}

/// `architecture:` section of the descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchitectureSection {
    #[serde(rename = "type")]
    pub architecture: ArchitectureType,
    pub paradigm: Paradigm,
    pub framework: Framework,
}

/// `templates:` section: where template assets come from and how they
/// are cached. Every field has a declared default so the section may be
/// omitted entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplatePreferences {
    pub mode: TemplateMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_path: Option<PathBuf>,
    pub cache: bool,
    pub cache_ttl_hours: u64,
}

impl Default for TemplatePreferences {
    fn default() -> Self {
        Self {
            mode: TemplateMode::Production,
            repository: None,
            branch: None,
            version: None,
            local_path: None,
            cache: true,
            cache_ttl_hours: DEFAULT_CACHE_TTL_HOURS,
        }
    }
}

impl TemplatePreferences {
    /// The version pin wins over the branch, which wins over `main`.
    pub fn effective_reference(&self) -> &str {
        self.version
            .as_deref()
            .or(self.branch.as_deref())
            .unwrap_or(DEFAULT_TEMPLATE_BRANCH)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_hours * 3600)
    }
}

/// Errors that can occur reading or writing the descriptor
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("no {DESCRIPTOR_FILE} found at {0}")]
    #[diagnostic(
        code(strata::config::not_found),
        help("run `strata init` to create a project here")
    )]
    NotFound(PathBuf),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] YamlSyntaxError),

    #[error("project name cannot be blank")]
    #[diagnostic(code(strata::config::blank_name))]
    BlankName,

    #[error("invalid base module `{0}`")]
    #[diagnostic(
        code(strata::config::invalid_base_module),
        help("use dot-separated lowercase segments, e.g. `com.example.orders`")
    )]
    InvalidBaseModule(String),

    #[error("failed to access {path}: {message}")]
    #[diagnostic(code(strata::config::io))]
    Io { path: PathBuf, message: String },
}

impl Descriptor {
    /// Load and validate the descriptor from the given project root.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(DESCRIPTOR_FILE);

        if !path.exists() {
            return Err(ConfigError::NotFound(root.to_path_buf()));
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let descriptor: Descriptor = serde_yml::from_str(&content).map_err(|e| {
            YamlSyntaxError::from_serde_error(&e, &content, DESCRIPTOR_FILE)
        })?;

        descriptor.validate()?;
        Ok(descriptor)
    }

    /// Write the descriptor atomically: the full file lands or nothing does.
    pub fn write(&self, root: &Path) -> Result<(), ConfigError> {
        self.validate()?;
        let path = root.join(DESCRIPTOR_FILE);
        let content = serde_yml::to_string(self).map_err(|e| ConfigError::Io {
            path: path.clone(),
            message: e.to_string(),
        })?;

        let tmp = path.with_extension("yaml.tmp");
        std::fs::write(&tmp, &content)
            .and_then(|()| std::fs::rename(&tmp, &path))
            .map_err(|e| ConfigError::Io {
                path,
                message: e.to_string(),
            })
    }

    pub fn exists(root: &Path) -> bool {
        root.join(DESCRIPTOR_FILE).exists()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.project.name.trim().is_empty() {
            return Err(ConfigError::BlankName);
        }
        if !is_valid_base_module(&self.project.base_module) {
            return Err(ConfigError::InvalidBaseModule(
                self.project.base_module.clone(),
            ));
        }
        Ok(())
    }
}

/// Segments must each match `[a-z][a-z0-9_]*`.
pub fn is_valid_base_module(base_module: &str) -> bool {
    if base_module.is_empty() {
        return false;
    }

    base_module.split('.').all(|segment| {
        let mut chars = segment.chars();
        match chars.next() {
            Some(c) if c.is_ascii_lowercase() => {
                chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
            }
            _ => false,
        }
    })
}
