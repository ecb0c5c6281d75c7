//! Project tree generation for `strata init`

use std::path::Path;

use crate::core::config::Descriptor;
use crate::generate::component::layer_dirs;
use crate::generate::render::Renderer;
use crate::generate::{GenerateError, GeneratedFile};
use crate::templates::TemplateBundle;

const PROJECT_PREFIX: &str = "project/";
const TEMPLATE_SUFFIX: &str = ".tera";

/// Render every `project/` template in the bundle into files rooted at
/// `target`. Nothing is written here.
pub fn render_project(
    target: &Path,
    descriptor: &Descriptor,
    bundle: &TemplateBundle,
) -> Result<Vec<GeneratedFile>, GenerateError> {
    let renderer = Renderer::from_bundle(bundle)?;

    let mut context = tera::Context::new();
    context.insert("project", &descriptor.project.name);
    context.insert("base_module", &descriptor.project.base_module);
    context.insert(
        "architecture",
        descriptor.architecture.architecture.as_str(),
    );
    context.insert("paradigm", descriptor.architecture.paradigm.as_str());
    context.insert("framework", descriptor.architecture.framework.as_str());
    context.insert("tool_version", &descriptor.project.tool_version);
    context.insert("created_at", &descriptor.project.created_at.to_rfc3339());

    let mut files = Vec::new();
    let names: Vec<String> = renderer
        .template_names()
        .filter(|n| n.starts_with(PROJECT_PREFIX))
        .map(String::from)
        .collect();

    for name in names {
        let content = renderer.render(&name, &context)?;
        let relative = name
            .trim_start_matches(PROJECT_PREFIX)
            .trim_end_matches(TEMPLATE_SUFFIX);
        files.push(GeneratedFile {
            path: target.join(relative),
            content,
        });
    }

    Ok(files)
}

/// Create the empty layer directories for the chosen architecture.
pub fn create_layer_dirs(target: &Path, descriptor: &Descriptor) -> Result<(), GenerateError> {
    for dir in layer_dirs(descriptor) {
        let path = target.join(dir);
        std::fs::create_dir_all(&path).map_err(|e| GenerateError::Io {
            path,
            message: e.to_string(),
        })?;
    }
    Ok(())
}
