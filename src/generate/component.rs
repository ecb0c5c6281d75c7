//! Component emission: entities, use cases and adapters
//!
//! Each generation task renders one component template from the
//! resolved bundle into the layer directory the architecture dictates.

use heck::ToUpperCamelCase;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::core::config::Descriptor;
use crate::core::model::ArchitectureType;
use crate::generate::render::Renderer;
use crate::generate::{GenerateError, GeneratedFile};
use crate::templates::TemplateBundle;

/// The kinds of components a generation task can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Entity,
    UseCase,
    InputAdapter,
    OutputAdapter,
}

impl ComponentKind {
    pub fn template_name(self) -> &'static str {
        match self {
            ComponentKind::Entity => "components/entity.tera",
            ComponentKind::UseCase => "components/usecase.tera",
            ComponentKind::InputAdapter => "components/input_adapter.tera",
            ComponentKind::OutputAdapter => "components/output_adapter.tera",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ComponentKind::Entity => "entity",
            ComponentKind::UseCase => "use case",
            ComponentKind::InputAdapter => "input adapter",
            ComponentKind::OutputAdapter => "output adapter",
        }
    }
}

/// A `name:type` field on a generated entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

impl Field {
    pub fn parse(spec: &str) -> Result<Self, GenerateError> {
        match spec.split_once(':') {
            Some((name, type_name)) if !name.is_empty() && !type_name.is_empty() => Ok(Self {
                name: name.to_string(),
                type_name: type_name.to_string(),
            }),
            _ => Err(GenerateError::InvalidField(spec.to_string())),
        }
    }
}

/// What to emit: the component kind, its name, and entity fields.
#[derive(Debug, Clone)]
pub struct ComponentSpec {
    pub kind: ComponentKind,
    pub name: String,
    pub fields: Vec<Field>,
}

/// Render one component from the bundle into a pending file. Nothing
/// is written to disk here; emission only starts once rendering has
/// fully succeeded.
pub fn render_component(
    project_root: &Path,
    descriptor: &Descriptor,
    bundle: &TemplateBundle,
    spec: &ComponentSpec,
) -> Result<GeneratedFile, GenerateError> {
    let renderer = Renderer::from_bundle(bundle)?;
    let type_name = spec.name.to_upper_camel_case();

    let mut context = tera::Context::new();
    context.insert("project", &descriptor.project.name);
    context.insert("base_module", &descriptor.project.base_module);
    context.insert(
        "package",
        &format!(
            "{}.{}",
            descriptor.project.base_module,
            package_suffix(descriptor.architecture.architecture, spec.kind)
        ),
    );
    context.insert("name", &type_name);
    context.insert("fields", &spec.fields);
    context.insert("paradigm", descriptor.architecture.paradigm.as_str());
    context.insert("framework", descriptor.architecture.framework.as_str());

    let content = renderer.render(spec.kind.template_name(), &context)?;
    let path = component_path(project_root, descriptor, spec.kind, &type_name);

    Ok(GeneratedFile { path, content })
}

/// Target path for a component, by architecture layout. Single-module
/// layouts root everything under `src/main/java`; multi-module layouts
/// prepend the owning module directory.
pub fn component_path(
    project_root: &Path,
    descriptor: &Descriptor,
    kind: ComponentKind,
    type_name: &str,
) -> PathBuf {
    let arch = descriptor.architecture.architecture;
    let base_path = descriptor.project.base_module.replace('.', "/");
    let suffix_path = package_suffix(arch, kind).replace('.', "/");

    let mut path = project_root.to_path_buf();
    if arch.is_multi_module() {
        path.push(module_dir(arch, kind));
    }
    path.push("src/main/java");
    path.push(base_path);
    path.push(suffix_path);
    path.push(format!("{type_name}.java"));
    path
}

/// Module owning a component in multi-module layouts.
fn module_dir(arch: ArchitectureType, kind: ComponentKind) -> &'static str {
    match (arch, kind) {
        (ArchitectureType::HexagonalMulti, ComponentKind::Entity)
        | (ArchitectureType::HexagonalMulti, ComponentKind::UseCase) => "domain",
        (ArchitectureType::HexagonalMulti, _) => "infrastructure",
        (ArchitectureType::OnionMulti, ComponentKind::Entity)
        | (ArchitectureType::OnionMulti, ComponentKind::UseCase) => "core",
        (ArchitectureType::OnionMulti, ComponentKind::InputAdapter) => "presentation",
        (ArchitectureType::OnionMulti, ComponentKind::OutputAdapter) => "infrastructure",
        // Single-module layouts have no module directory.
        _ => "",
    }
}

/// Package segment appended to the base module, per architecture.
fn package_suffix(arch: ArchitectureType, kind: ComponentKind) -> &'static str {
    let hexagonal = matches!(
        arch,
        ArchitectureType::HexagonalSingle | ArchitectureType::HexagonalMulti
    );

    match (hexagonal, kind) {
        (true, ComponentKind::Entity) => "domain.model",
        (true, ComponentKind::UseCase) => "domain.usecase",
        (true, ComponentKind::InputAdapter) => "infrastructure.entrypoints",
        (true, ComponentKind::OutputAdapter) => "infrastructure.drivenadapters",
        (false, ComponentKind::Entity) => "core.domain",
        (false, ComponentKind::UseCase) => "core.usecases",
        (false, ComponentKind::InputAdapter) => "presentation",
        (false, ComponentKind::OutputAdapter) => "infrastructure",
    }
}

/// Layer directories created on `strata init`, so the generated tree
/// shows its shape before the first component lands.
pub fn layer_dirs(descriptor: &Descriptor) -> Vec<PathBuf> {
    [
        ComponentKind::Entity,
        ComponentKind::UseCase,
        ComponentKind::InputAdapter,
        ComponentKind::OutputAdapter,
    ]
    .into_iter()
    .map(|kind| {
        component_path(Path::new(""), descriptor, kind, "_")
            .parent()
            .expect("component paths always have a parent")
            .to_path_buf()
    })
    .collect()
}
