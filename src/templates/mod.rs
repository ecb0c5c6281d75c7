//! Template resolution and caching
//!
//! The engine behind every generation task: decides where template
//! assets come from (configured local path, auto-detected sibling
//! directory, or remote repository), fetches remote bundles at most
//! once per cache validity window, and keeps the local cache durable
//! and self-healing.

pub mod bundle;
pub mod cache;
pub mod engine;
pub mod source;
pub mod transport;
pub mod validate;

pub use bundle::{SourceCandidate, TemplateBundle, TemplateRequest};
pub use cache::CacheStore;
pub use engine::{ResolveError, TemplateEngine};
pub use source::NoViableSourceError;
pub use transport::{HttpTransport, Transport, TransportError};
pub use validate::{validate_bundle, ValidationReport};
