//! Shared helpers for command implementations

use miette::Result;

use crate::cli::args::GlobalOpts;
use crate::core::config::Descriptor;
use crate::core::project::Project;
use crate::templates::{TemplateEngine, TemplateRequest};

/// Locate the project and load its descriptor, honoring `--project`.
pub fn open_project(global: &GlobalOpts) -> Result<(Project, Descriptor)> {
    let project = match &global.project {
        Some(path) => Project::at(path),
        None => Project::discover(),
    }
    .map_err(|e| miette::miette!("{}", e))?;

    let descriptor = Descriptor::load(project.root())?;
    Ok((project, descriptor))
}

/// Engine with the real transport and the user-level cache.
pub fn open_engine() -> Result<TemplateEngine> {
    TemplateEngine::with_defaults().map_err(|e| miette::miette!("{}", e))
}

/// Build the immutable per-invocation request from the descriptor.
pub fn request_for(descriptor: &Descriptor) -> TemplateRequest {
    TemplateRequest::from_descriptor(descriptor)
}
