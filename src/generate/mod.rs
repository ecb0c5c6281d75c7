//! Source-file emission from resolved template bundles
//!
//! Rendering is pure string templating once the bundle is in hand; all
//! disk writes happen after every file has rendered, so a failed
//! generation leaves nothing behind.

pub mod component;
pub mod project;
pub mod render;

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

pub use component::{ComponentKind, ComponentSpec, Field};
pub use render::{RenderError, Renderer};

/// One rendered file waiting to be written.
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub content: String,
}

/// Errors raised during emission
#[derive(Debug, Error, Diagnostic)]
pub enum GenerateError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Render(#[from] RenderError),

    #[error("refusing to overwrite {0}")]
    #[diagnostic(
        code(strata::generate::would_overwrite),
        help("pass --force to overwrite existing files")
    )]
    WouldOverwrite(PathBuf),

    #[error("invalid field `{0}`")]
    #[diagnostic(
        code(strata::generate::invalid_field),
        help("fields take the form name:type, e.g. email:String")
    )]
    InvalidField(String),

    #[error("failed to write {path}: {message}")]
    #[diagnostic(code(strata::generate::io))]
    Io { path: PathBuf, message: String },
}

/// Write rendered files to disk. Overwrite checks run for every file
/// before the first write, so a refusal leaves the tree untouched.
pub fn write_files(files: &[GeneratedFile], force: bool) -> Result<(), GenerateError> {
    if !force {
        for file in files {
            if file.path.exists() {
                return Err(GenerateError::WouldOverwrite(file.path.clone()));
            }
        }
    }

    for file in files {
        let io_err = |e: std::io::Error| GenerateError::Io {
            path: file.path.clone(),
            message: e.to_string(),
        };

        if let Some(parent) = file.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(&file.path, &file.content).map_err(io_err)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_files_creates_parents() {
        let tmp = tempdir().unwrap();
        let files = vec![GeneratedFile {
            path: tmp.path().join("a/b/C.java"),
            content: "class C {}".to_string(),
        }];

        write_files(&files, false).unwrap();
        assert_eq!(
            std::fs::read_to_string(tmp.path().join("a/b/C.java")).unwrap(),
            "class C {}"
        );
    }

    #[test]
    fn test_refusal_leaves_tree_untouched() {
        let tmp = tempdir().unwrap();
        let existing = tmp.path().join("Existing.java");
        std::fs::write(&existing, "old").unwrap();

        let files = vec![
            GeneratedFile {
                path: tmp.path().join("New.java"),
                content: "new".to_string(),
            },
            GeneratedFile {
                path: existing.clone(),
                content: "overwritten".to_string(),
            },
        ];

        let err = write_files(&files, false).unwrap_err();
        assert!(matches!(err, GenerateError::WouldOverwrite(_)));
        // The first file must not have been written either.
        assert!(!tmp.path().join("New.java").exists());
        assert_eq!(std::fs::read_to_string(&existing).unwrap(), "old");
    }

    #[test]
    fn test_force_overwrites() {
        let tmp = tempdir().unwrap();
        let existing = tmp.path().join("Existing.java");
        std::fs::write(&existing, "old").unwrap();

        let files = vec![GeneratedFile {
            path: existing.clone(),
            content: "new".to_string(),
        }];

        write_files(&files, true).unwrap();
        assert_eq!(std::fs::read_to_string(&existing).unwrap(), "new");
    }
}
