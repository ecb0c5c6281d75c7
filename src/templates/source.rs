//! Template source selection
//!
//! Candidates are evaluated in a fixed priority order: the configured
//! local path, then the auto-detected sibling directory, then the
//! remote repository. The first usable candidate wins; if none is
//! usable the error names every candidate and why it was rejected.

use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::model::TemplateMode;
use crate::templates::bundle::{SourceCandidate, TemplateRequest};
use crate::templates::transport::Transport;

/// Sibling directory probed next to the project root when no local path
/// is configured.
pub const AUTO_DETECT_DIR: &str = "strata-templates";

/// Why a candidate was passed over during selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NotConfigured,
    NotFound,
    Unreachable,
    /// Auto-detection bypassed by an explicit repository override.
    Overridden,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::NotConfigured => write!(f, "not configured"),
            RejectReason::NotFound => write!(f, "not found on disk"),
            RejectReason::Unreachable => write!(f, "unreachable"),
            RejectReason::Overridden => write!(f, "bypassed by explicit repository override"),
        }
    }
}

/// A candidate that was considered and rejected.
#[derive(Debug, Clone)]
pub struct RejectedCandidate {
    pub description: String,
    pub reason: RejectReason,
}

/// Every candidate was absent or unreachable.
#[derive(Debug, Error, Diagnostic)]
#[error("no viable template source for {combination}\n{}", format_rejections(.rejected))]
#[diagnostic(
    code(strata::templates::no_viable_source),
    help(
        "set templates.local_path in .strata.yaml to a template checkout, \
         or check network access to the template repository"
    )
)]
pub struct NoViableSourceError {
    pub combination: String,
    pub rejected: Vec<RejectedCandidate>,
}

fn format_rejections(rejected: &[RejectedCandidate]) -> String {
    rejected
        .iter()
        .map(|r| format!("  - {}: {}", r.description, r.reason))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Select the template source for a request.
///
/// Relative configured paths are resolved against the project root; the
/// auto-detect directory is a sibling of the project root. The remote
/// candidate is probed with a HEAD against the bundle URL.
pub fn select_source(
    request: &TemplateRequest,
    project_root: &Path,
    transport: &dyn Transport,
) -> Result<SourceCandidate, NoViableSourceError> {
    let mut rejected = Vec::new();

    // 1. Explicit local path, developer mode only.
    match (&request.mode, &request.local_path) {
        (TemplateMode::Developer, Some(path)) => {
            let resolved = resolve_against(project_root, path);
            if resolved.is_dir() {
                return Ok(SourceCandidate::LocalConfigured(resolved));
            }
            rejected.push(RejectedCandidate {
                description: format!("configured local path {}", resolved.display()),
                reason: RejectReason::NotFound,
            });
        }
        _ => rejected.push(RejectedCandidate {
            description: "configured local path".to_string(),
            reason: RejectReason::NotConfigured,
        }),
    }

    // 2. Auto-detected sibling, unless the descriptor names an explicit
    //    remote to use instead.
    let auto_dir = project_root
        .parent()
        .map(|parent| parent.join(AUTO_DETECT_DIR));
    if request.has_repository_override() {
        rejected.push(RejectedCandidate {
            description: format!("auto-detected directory ../{AUTO_DETECT_DIR}"),
            reason: RejectReason::Overridden,
        });
    } else {
        match auto_dir {
            Some(dir) if dir.is_dir() => {
                return Ok(SourceCandidate::LocalAutoDetected(dir));
            }
            _ => rejected.push(RejectedCandidate {
                description: format!("auto-detected directory ../{AUTO_DETECT_DIR}"),
                reason: RejectReason::NotFound,
            }),
        }
    }

    // 3. Remote repository, verified with a lightweight probe.
    let repository = request.effective_repository().to_string();
    let reference = request.effective_reference().to_string();
    let url = bundle_url(&repository, &reference, &request.combination());

    if transport.probe(&url) {
        return Ok(SourceCandidate::Remote {
            repository,
            reference,
        });
    }

    rejected.push(RejectedCandidate {
        description: format!("remote templates {repository} (ref: {reference})"),
        reason: RejectReason::Unreachable,
    });

    Err(NoViableSourceError {
        combination: request.combination(),
        rejected,
    })
}

fn resolve_against(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Raw-content URL for a file in a hosted git repository. Knows the
/// URL shapes of the common hosts and falls back to a `/raw/` suffix.
pub fn raw_content_url(repository: &str, reference: &str, path: &str) -> String {
    let path = path.trim_start_matches('/');
    let repo_path = |host: &str| {
        repository
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_start_matches(host)
            .trim_start_matches('/')
            .trim_end_matches(".git")
            .to_string()
    };

    if repository.contains("github.com") {
        format!(
            "https://raw.githubusercontent.com/{}/{reference}/{path}",
            repo_path("github.com")
        )
    } else if repository.contains("gitlab.com") {
        format!(
            "https://gitlab.com/{}/-/raw/{reference}/{path}",
            repo_path("gitlab.com")
        )
    } else if repository.contains("bitbucket.org") {
        format!(
            "https://bitbucket.org/{}/raw/{reference}/{path}",
            repo_path("bitbucket.org")
        )
    } else {
        let repository = repository.trim_end_matches('/');
        format!("{repository}/raw/{reference}/{path}")
    }
}

/// URL of the packed bundle for one architecture/paradigm/framework
/// combination.
pub fn bundle_url(repository: &str, reference: &str, combination: &str) -> String {
    raw_content_url(repository, reference, &format!("bundles/{combination}.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{ArchitectureType, Framework, Paradigm};
    use crate::templates::transport::testing::StubTransport;
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;

    fn request(mode: TemplateMode) -> TemplateRequest {
        TemplateRequest {
            architecture: ArchitectureType::HexagonalSingle,
            paradigm: Paradigm::Reactive,
            framework: Framework::Spring,
            mode,
            local_path: None,
            repository: None,
            branch: None,
            version: None,
            cache: true,
            cache_ttl: Duration::from_secs(3600),
        }
    }

    #[test]
    fn test_configured_local_path_wins_in_developer_mode() {
        let tmp = tempdir().unwrap();
        let project = tmp.path().join("service");
        let templates = tmp.path().join("my-templates");
        fs::create_dir_all(&project).unwrap();
        fs::create_dir_all(&templates).unwrap();

        let mut req = request(TemplateMode::Developer);
        req.local_path = Some(templates.clone());

        // Remote is unreachable; the local path must still win.
        let transport = StubTransport::new();
        let selected = select_source(&req, &project, &transport).unwrap();
        assert_eq!(selected, SourceCandidate::LocalConfigured(templates));
        assert_eq!(transport.probe_count(), 0);
    }

    #[test]
    fn test_relative_local_path_resolves_against_project_root() {
        let tmp = tempdir().unwrap();
        let project = tmp.path().join("service");
        fs::create_dir_all(project.join("templates-dev")).unwrap();

        let mut req = request(TemplateMode::Developer);
        req.local_path = Some(PathBuf::from("templates-dev"));

        let selected = select_source(&req, &project, &StubTransport::new()).unwrap();
        assert_eq!(
            selected,
            SourceCandidate::LocalConfigured(project.join("templates-dev"))
        );
    }

    #[test]
    fn test_auto_detected_sibling_directory() {
        let tmp = tempdir().unwrap();
        let project = tmp.path().join("service");
        fs::create_dir_all(&project).unwrap();
        fs::create_dir_all(tmp.path().join(AUTO_DETECT_DIR)).unwrap();

        let selected =
            select_source(&request(TemplateMode::Production), &project, &StubTransport::new())
                .unwrap();
        assert!(matches!(selected, SourceCandidate::LocalAutoDetected(_)));
    }

    #[test]
    fn test_repository_override_suppresses_auto_detection() {
        let tmp = tempdir().unwrap();
        let project = tmp.path().join("service");
        fs::create_dir_all(&project).unwrap();
        fs::create_dir_all(tmp.path().join(AUTO_DETECT_DIR)).unwrap();

        let mut req = request(TemplateMode::Developer);
        req.repository = Some("https://github.com/acme/templates".to_string());
        req.branch = Some("next".to_string());

        let transport = StubTransport::new();
        let url = bundle_url(
            "https://github.com/acme/templates",
            "next",
            "hexagonal-single-reactive-spring",
        );
        transport.serve(url, "files: {}\n");

        let selected = select_source(&req, &project, &transport).unwrap();
        assert_eq!(
            selected,
            SourceCandidate::Remote {
                repository: "https://github.com/acme/templates".to_string(),
                reference: "next".to_string(),
            }
        );
    }

    #[test]
    fn test_no_viable_source_names_all_candidates() {
        let tmp = tempdir().unwrap();
        let project = tmp.path().join("service");
        fs::create_dir_all(&project).unwrap();

        let err =
            select_source(&request(TemplateMode::Production), &project, &StubTransport::new())
                .unwrap_err();

        assert_eq!(err.rejected.len(), 3);
        assert_eq!(err.rejected[0].reason, RejectReason::NotConfigured);
        assert_eq!(err.rejected[1].reason, RejectReason::NotFound);
        assert_eq!(err.rejected[2].reason, RejectReason::Unreachable);

        let message = err.to_string();
        assert!(message.contains("configured local path"));
        assert!(message.contains(AUTO_DETECT_DIR));
        assert!(message.contains("unreachable"));
    }

    #[test]
    fn test_missing_configured_path_reported_as_not_found() {
        let tmp = tempdir().unwrap();
        let project = tmp.path().join("service");
        fs::create_dir_all(&project).unwrap();

        let mut req = request(TemplateMode::Developer);
        req.local_path = Some(PathBuf::from("does-not-exist"));

        let err = select_source(&req, &project, &StubTransport::new()).unwrap_err();
        assert_eq!(err.rejected[0].reason, RejectReason::NotFound);
    }

    #[test]
    fn test_raw_url_per_host() {
        assert_eq!(
            raw_content_url("https://github.com/acme/tpl.git", "main", "bundles/x.yaml"),
            "https://raw.githubusercontent.com/acme/tpl/main/bundles/x.yaml"
        );
        assert_eq!(
            raw_content_url("https://gitlab.com/acme/tpl", "v1.2", "bundles/x.yaml"),
            "https://gitlab.com/acme/tpl/-/raw/v1.2/bundles/x.yaml"
        );
        assert_eq!(
            raw_content_url("https://bitbucket.org/acme/tpl", "main", "/bundles/x.yaml"),
            "https://bitbucket.org/acme/tpl/raw/main/bundles/x.yaml"
        );
        assert_eq!(
            raw_content_url("https://git.example.com/acme/tpl", "main", "bundles/x.yaml"),
            "https://git.example.com/acme/tpl/raw/main/bundles/x.yaml"
        );
    }
}
