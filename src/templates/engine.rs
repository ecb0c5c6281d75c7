//! Template resolution orchestration
//!
//! Single entry point used by every generation task: select a source,
//! consult the cache for remote sources, fetch at most once per cache
//! validity window, and hand back the resolved bundle. Local sources
//! are always read live from disk: they are the developer's working
//! copy, and caching them would mask edits.

use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::templates::bundle::{
    remote_identity, BundlePayload, SourceCandidate, TemplateBundle, TemplateRequest,
};
use crate::templates::cache::{CacheError, CacheStore};
use crate::templates::source::{bundle_url, select_source, NoViableSourceError};
use crate::templates::transport::{HttpTransport, Transport, TransportError};

/// Failure to produce a bundle for a request.
#[derive(Debug, Error, Diagnostic)]
pub enum ResolveError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    NoViableSource(#[from] NoViableSourceError),

    #[error("failed to download template bundle: {0}")]
    #[diagnostic(
        code(strata::templates::download),
        help("check the repository URL and branch in .strata.yaml, and your network connection")
    )]
    Transport(#[from] TransportError),

    #[error("failed to read local templates from {path}: {message}")]
    #[diagnostic(code(strata::templates::local_read))]
    LocalRead { path: PathBuf, message: String },

    #[error("malformed template bundle at {url}: {message}")]
    #[diagnostic(
        code(strata::templates::malformed_bundle),
        help("the remote bundle is not a valid packed template document; try a different branch or version")
    )]
    MalformedBundle { url: String, message: String },
}

/// Resolves template bundles for generation tasks.
///
/// Stateless apart from the cache store; a new engine per invocation is
/// the expected usage.
pub struct TemplateEngine<T: Transport = HttpTransport> {
    transport: T,
    cache: CacheStore,
}

impl TemplateEngine<HttpTransport> {
    /// Engine with the real HTTP transport and the user-level cache.
    pub fn with_defaults() -> Result<Self, CacheError> {
        Ok(Self::new(HttpTransport::new(), CacheStore::open_default()?))
    }
}

impl<T: Transport> TemplateEngine<T> {
    pub fn new(transport: T, cache: CacheStore) -> Self {
        Self { transport, cache }
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Resolve the template bundle for a request.
    ///
    /// With `force_refresh` the cache is bypassed (and overwritten on
    /// success) for the selected remote identity; entries for other
    /// identities are untouched.
    pub fn resolve(
        &self,
        project_root: &Path,
        request: &TemplateRequest,
        force_refresh: bool,
    ) -> Result<TemplateBundle, ResolveError> {
        let candidate = select_source(request, project_root, &self.transport)?;

        match &candidate {
            SourceCandidate::LocalConfigured(path) | SourceCandidate::LocalAutoDetected(path) => {
                // The directory may have vanished between selection and read.
                let dir = combination_dir(path, request);
                TemplateBundle::from_dir(candidate.clone(), &dir).map_err(|e| {
                    ResolveError::LocalRead {
                        path: dir,
                        message: e.to_string(),
                    }
                })
            }
            SourceCandidate::Remote {
                repository,
                reference,
            } => {
                let combination = request.combination();
                let identity = remote_identity(repository, reference, &combination);

                if !force_refresh && request.cache {
                    if let Some(files) = self.cache.lookup(&identity, request.cache_ttl) {
                        return Ok(TemplateBundle {
                            source: candidate,
                            files,
                        });
                    }
                }

                // One network attempt; failures surface rather than being
                // retried against a possibly-misconfigured remote.
                let url = bundle_url(repository, reference, &combination);
                let bytes = self.transport.fetch(&url)?;
                let files = BundlePayload::parse(&bytes).map_err(|e| {
                    ResolveError::MalformedBundle {
                        url: url.clone(),
                        message: e.to_string(),
                    }
                })?;

                if request.cache {
                    if let Err(err) = self.cache.store(&identity, &files) {
                        // The bundle still works, it just won't be cached.
                        eprintln!("warning: failed to cache templates: {err}");
                    }
                }

                Ok(TemplateBundle {
                    source: candidate,
                    files,
                })
            }
        }
    }

    /// Force re-fetch of the currently selected remote identity,
    /// overwriting its cache entry.
    pub fn update(
        &self,
        project_root: &Path,
        request: &TemplateRequest,
    ) -> Result<TemplateBundle, ResolveError> {
        self.resolve(project_root, request, true)
    }

    /// Remove every cached entry. No resolution is performed.
    pub fn clear_cache(&self) -> Result<usize, CacheError> {
        self.cache.invalidate_all()
    }
}

/// Subdirectory of a local template root holding the templates for one
/// architecture/paradigm/framework combination.
fn combination_dir(root: &Path, request: &TemplateRequest) -> PathBuf {
    root.join(request.architecture.as_str())
        .join(request.paradigm.as_str())
        .join(request.framework.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{ArchitectureType, Framework, Paradigm, TemplateMode};
    use crate::templates::bundle::BundlePayload;
    use crate::templates::source::AUTO_DETECT_DIR;
    use crate::templates::transport::testing::StubTransport;
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::{tempdir, TempDir};

    const REPO: &str = "https://github.com/strata-tools/strata-templates";

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

    fn remote_files() -> BTreeMap<String, String> {
        let mut files = BTreeMap::new();
        files.insert(
            "components/entity.tera".to_string(),
            "entity {{ name }}".to_string(),
        );
        files
    }

    /// Project dir, engine cache dir, and a stub serving the default
    /// bundle URL for `request`'s combination.
    fn remote_setup() -> (TempDir, TempDir, StubTransport) {
        let project = tempdir().unwrap();
        let cache = tempdir().unwrap();
        let transport = StubTransport::new();
        transport.serve(
            bundle_url(REPO, "main", "hexagonal-single-reactive-spring"),
            BundlePayload::render(&remote_files()).unwrap(),
        );
        (project, cache, transport)
    }

    fn engine(cache_root: &Path, transport: StubTransport) -> TemplateEngine<StubTransport> {
        TemplateEngine::new(transport, CacheStore::open(cache_root))
    }

    #[test]
    fn test_remote_resolution_fetches_and_caches_once() {
        let (project, cache_dir, transport) = remote_setup();
        let engine = engine(cache_dir.path(), transport);
        let req = request(TemplateMode::Production);

        let first = engine.resolve(project.path(), &req, false).unwrap();
        assert_eq!(first.files, remote_files());
        assert!(matches!(first.source, SourceCandidate::Remote { .. }));

        let entries = engine.cache().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].identity,
            format!("{REPO}#main/hexagonal-single-reactive-spring")
        );

        // Second call is a cache hit with identical content.
        let second = engine.resolve(project.path(), &req, false).unwrap();
        assert_eq!(second.files, first.files);
        assert_eq!(engine.transport.fetch_count(), 1);
    }

    #[test]
    fn test_disabled_cache_always_fetches() {
        let (project, cache_dir, transport) = remote_setup();
        let engine = engine(cache_dir.path(), transport);
        let mut req = request(TemplateMode::Production);
        req.cache = false;

        engine.resolve(project.path(), &req, false).unwrap();
        engine.resolve(project.path(), &req, false).unwrap();

        assert_eq!(engine.transport.fetch_count(), 2);
        assert!(engine.cache().entries().is_empty());
    }

    #[test]
    fn test_force_refresh_bypasses_fresh_entry() {
        let (project, cache_dir, transport) = remote_setup();
        let engine = engine(cache_dir.path(), transport);
        let req = request(TemplateMode::Production);

        engine.resolve(project.path(), &req, false).unwrap();
        engine.update(project.path(), &req).unwrap();

        assert_eq!(engine.transport.fetch_count(), 2);
    }

    #[test]
    fn test_update_leaves_other_identities_untouched() {
        let (project, cache_dir, transport) = remote_setup();
        let engine = engine(cache_dir.path(), transport);
        let req = request(TemplateMode::Production);

        // Seed an unrelated identity directly in the store.
        engine
            .cache()
            .store("other-repo#main/onion-single-imperative-quarkus", &remote_files())
            .unwrap();

        engine.update(project.path(), &req).unwrap();

        let entries = engine.cache().entries();
        assert_eq!(entries.len(), 2);
        assert!(entries
            .iter()
            .any(|e| e.identity.starts_with("other-repo#main")));
    }

    #[test]
    fn test_clear_cache_then_resolve_fetches_again() {
        let (project, cache_dir, transport) = remote_setup();
        let engine = engine(cache_dir.path(), transport);
        let req = request(TemplateMode::Production);

        engine.resolve(project.path(), &req, false).unwrap();
        assert_eq!(engine.clear_cache().unwrap(), 1);
        engine.resolve(project.path(), &req, false).unwrap();

        assert_eq!(engine.transport.fetch_count(), 2);
    }

    #[test]
    fn test_local_configured_source_is_never_cached() {
        let root = tempdir().unwrap();
        let project = root.path().join("service");
        fs::create_dir_all(&project).unwrap();

        let templates = root.path().join("templates-dev");
        let combo = templates.join("hexagonal-single/reactive/spring/components");
        fs::create_dir_all(&combo).unwrap();
        fs::write(combo.join("entity.tera"), "live {{ name }}").unwrap();

        let cache_dir = tempdir().unwrap();
        let engine = engine(cache_dir.path(), StubTransport::new());

        let mut req = request(TemplateMode::Developer);
        req.local_path = Some(templates);

        let bundle = engine.resolve(&project, &req, false).unwrap();
        assert_eq!(
            bundle.get("components/entity.tera"),
            Some("live {{ name }}")
        );
        assert!(matches!(bundle.source, SourceCandidate::LocalConfigured(_)));
        assert!(engine.cache().entries().is_empty());
        assert_eq!(engine.transport.fetch_count(), 0);
    }

    #[test]
    fn test_local_reads_are_live_across_calls() {
        let root = tempdir().unwrap();
        let project = root.path().join("service");
        fs::create_dir_all(&project).unwrap();

        let templates = root.path().join(AUTO_DETECT_DIR);
        let combo = templates.join("hexagonal-single/reactive/spring");
        fs::create_dir_all(&combo).unwrap();
        fs::write(combo.join("entity.tera"), "v1").unwrap();

        let cache_dir = tempdir().unwrap();
        let engine = engine(cache_dir.path(), StubTransport::new());
        let req = request(TemplateMode::Developer);

        let first = engine.resolve(&project, &req, false).unwrap();
        assert_eq!(first.get("entity.tera"), Some("v1"));

        fs::write(combo.join("entity.tera"), "v2").unwrap();
        let second = engine.resolve(&project, &req, false).unwrap();
        assert_eq!(second.get("entity.tera"), Some("v2"));
    }

    #[test]
    fn test_vanished_combination_dir_is_local_read_error() {
        let root = tempdir().unwrap();
        let project = root.path().join("service");
        fs::create_dir_all(&project).unwrap();

        // The local root exists but holds no combination subdirectory.
        let templates = root.path().join("templates-dev");
        fs::create_dir_all(&templates).unwrap();

        let cache_dir = tempdir().unwrap();
        let engine = engine(cache_dir.path(), StubTransport::new());

        let mut req = request(TemplateMode::Developer);
        req.local_path = Some(templates);

        let err = engine.resolve(&project, &req, false).unwrap_err();
        assert!(matches!(err, ResolveError::LocalRead { .. }));
    }

    #[test]
    fn test_expired_entry_triggers_refetch() {
        let (project, cache_dir, transport) = remote_setup();
        let engine = engine(cache_dir.path(), transport);
        let mut req = request(TemplateMode::Production);

        engine.resolve(project.path(), &req, false).unwrap();
        std::thread::sleep(Duration::from_millis(5));

        // Shrink the validity window to zero: the fresh entry is now
        // older than allowed.
        req.cache_ttl = Duration::ZERO;
        engine.resolve(project.path(), &req, false).unwrap();

        assert_eq!(engine.transport.fetch_count(), 2);
    }

    #[test]
    fn test_no_viable_source_when_everything_fails() {
        let project = tempdir().unwrap();
        let cache_dir = tempdir().unwrap();
        let engine = engine(cache_dir.path(), StubTransport::new());

        let err = engine
            .resolve(project.path(), &request(TemplateMode::Production), false)
            .unwrap_err();
        assert!(matches!(err, ResolveError::NoViableSource(_)));
    }

    #[test]
    fn test_malformed_remote_bundle_is_surfaced() {
        let project = tempdir().unwrap();
        let cache_dir = tempdir().unwrap();
        let transport = StubTransport::new();
        transport.serve(
            bundle_url(REPO, "main", "hexagonal-single-reactive-spring"),
            "not: [a, bundle",
        );
        let engine = engine(cache_dir.path(), transport);

        let err = engine
            .resolve(project.path(), &request(TemplateMode::Production), false)
            .unwrap_err();
        assert!(matches!(err, ResolveError::MalformedBundle { .. }));
        assert!(engine.cache().entries().is_empty());
    }

    #[test]
    fn test_corrupt_cache_entry_self_heals() {
        let (project, cache_dir, transport) = remote_setup();
        let engine = engine(cache_dir.path(), transport);
        let req = request(TemplateMode::Production);

        engine.resolve(project.path(), &req, false).unwrap();

        // Corrupt the stored bundle in place.
        let entry_dir = fs::read_dir(cache_dir.path())
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
            .path();
        fs::write(entry_dir.join("bundle.yaml"), "{ broken").unwrap();

        let bundle = engine.resolve(project.path(), &req, false).unwrap();
        assert_eq!(bundle.files, remote_files());
        assert_eq!(engine.transport.fetch_count(), 2);
    }
}
