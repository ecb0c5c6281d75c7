//! Project discovery

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::config::DESCRIPTOR_FILE;

/// A directory tree rooted at a `.strata.yaml` descriptor.
#[derive(Debug)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    /// Find the project root by walking up from the current directory.
    pub fn discover() -> Result<Self, ProjectError> {
        let current =
            std::env::current_dir().map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find the project root by walking up from the given directory.
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(DESCRIPTOR_FILE).is_file() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Open a project at an explicit root, without walking up.
    pub fn at(root: &Path) -> Result<Self, ProjectError> {
        let root = root
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        if !root.join(DESCRIPTOR_FILE).is_file() {
            return Err(ProjectError::NotFound {
                searched_from: root,
            });
        }

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn descriptor_path(&self) -> PathBuf {
        self.root.join(DESCRIPTOR_FILE)
    }
}

/// Errors that can occur during project discovery
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a strata project (searched from {searched_from:?}). Run 'strata init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("a strata project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}
