//! Template requests and resolved bundles

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::config::{Descriptor, DEFAULT_TEMPLATE_BRANCH, DEFAULT_TEMPLATE_REPOSITORY};
use crate::core::model::{ArchitectureType, Framework, Paradigm, TemplateMode};

/// Everything the engine needs to resolve templates for one generation
/// task. Built once from the descriptor, never mutated.
#[derive(Debug, Clone)]
pub struct TemplateRequest {
    pub architecture: ArchitectureType,
    pub paradigm: Paradigm,
    pub framework: Framework,
    pub mode: TemplateMode,
    pub local_path: Option<PathBuf>,
    pub repository: Option<String>,
    pub branch: Option<String>,
    pub version: Option<String>,
    pub cache: bool,
    pub cache_ttl: Duration,
}

impl TemplateRequest {
    pub fn from_descriptor(descriptor: &Descriptor) -> Self {
        let prefs = &descriptor.templates;
        Self {
            architecture: descriptor.architecture.architecture,
            paradigm: descriptor.architecture.paradigm,
            framework: descriptor.architecture.framework,
            mode: prefs.mode,
            local_path: prefs.local_path.clone(),
            repository: prefs.repository.clone(),
            branch: prefs.branch.clone(),
            version: prefs.version.clone(),
            cache: prefs.cache,
            cache_ttl: prefs.cache_ttl(),
        }
    }

    /// The architecture/paradigm/framework triple, as used in bundle
    /// file names and cache identities.
    pub fn combination(&self) -> String {
        format!("{}-{}-{}", self.architecture, self.paradigm, self.framework)
    }

    /// Repository overrides are only honored in developer mode;
    /// production always targets the built-in default.
    pub fn effective_repository(&self) -> &str {
        match self.mode {
            TemplateMode::Developer => self
                .repository
                .as_deref()
                .unwrap_or(DEFAULT_TEMPLATE_REPOSITORY),
            TemplateMode::Production => DEFAULT_TEMPLATE_REPOSITORY,
        }
    }

    /// Effective git reference: version pin, else branch, else `main`.
    /// Again, overrides are only honored in developer mode.
    pub fn effective_reference(&self) -> &str {
        match self.mode {
            TemplateMode::Developer => self
                .version
                .as_deref()
                .or(self.branch.as_deref())
                .unwrap_or(DEFAULT_TEMPLATE_BRANCH),
            TemplateMode::Production => DEFAULT_TEMPLATE_BRANCH,
        }
    }

    pub fn has_repository_override(&self) -> bool {
        self.mode == TemplateMode::Developer
            && (self.repository.is_some() || self.branch.is_some() || self.version.is_some())
    }
}

/// One possible origin for template assets, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceCandidate {
    /// Explicit filesystem path named in the descriptor.
    LocalConfigured(PathBuf),
    /// Conventionally-named sibling directory next to the project root.
    LocalAutoDetected(PathBuf),
    /// Remote repository reference.
    Remote { repository: String, reference: String },
}

impl SourceCandidate {
    pub fn is_local(&self) -> bool {
        !matches!(self, SourceCandidate::Remote { .. })
    }

    /// Human-readable description for status output and errors.
    pub fn describe(&self) -> String {
        match self {
            SourceCandidate::LocalConfigured(path) => {
                format!("local templates (configured): {}", path.display())
            }
            SourceCandidate::LocalAutoDetected(path) => {
                format!("local templates (auto-detected): {}", path.display())
            }
            SourceCandidate::Remote {
                repository,
                reference,
            } => format!("remote templates: {repository} (ref: {reference})"),
        }
    }
}

/// Cache identity of a remote candidate: repository, reference and
/// combination together distinguish one entry from another.
pub fn remote_identity(repository: &str, reference: &str, combination: &str) -> String {
    format!("{repository}#{reference}/{combination}")
}

/// The resolved result handed to generation tasks: where the templates
/// came from, and the template name → content mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateBundle {
    pub source: SourceCandidate,
    pub files: BTreeMap<String, String>,
}

impl TemplateBundle {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.files.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Read a live local template directory into a bundle. Keys are
    /// `/`-separated paths relative to `dir`.
    pub fn from_dir(source: SourceCandidate, dir: &Path) -> io::Result<Self> {
        if !dir.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("template directory does not exist: {}", dir.display()),
            ));
        }

        let mut files = BTreeMap::new();
        for entry in walkdir::WalkDir::new(dir) {
            let entry = entry.map_err(io::Error::other)?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(dir)
                .map_err(io::Error::other)?
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            let content = std::fs::read_to_string(entry.path())?;
            files.insert(relative, content);
        }

        Ok(Self { source, files })
    }
}

/// Wire format of a packed remote bundle: a single YAML document so one
/// fetch acquires the whole bundle atomically.
#[derive(Debug, Serialize, Deserialize)]
pub struct BundlePayload {
    pub files: BTreeMap<String, String>,
}

impl BundlePayload {
    pub fn parse(bytes: &[u8]) -> Result<BTreeMap<String, String>, serde_yml::Error> {
        serde_yml::from_slice::<BundlePayload>(bytes).map(|payload| payload.files)
    }

    pub fn render(files: &BTreeMap<String, String>) -> Result<String, serde_yml::Error> {
        serde_yml::to_string(&BundlePayload {
            files: files.clone(),
        })
    }
}
