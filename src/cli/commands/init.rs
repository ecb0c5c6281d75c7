//! `strata init` command - Initialize a new layered-architecture project

use chrono::Utc;
use console::style;
use dialoguer::{Input, Select};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::args::GlobalOpts;
use crate::cli::helpers::open_engine;
use crate::core::config::{
    ArchitectureSection, Descriptor, ProjectSection, TemplatePreferences, DESCRIPTOR_FILE,
};
use crate::core::model::{ArchitectureType, Framework, Paradigm, TemplateMode};
use crate::generate::project::{create_layer_dirs, render_project};
use crate::generate::write_files;
use crate::templates::TemplateRequest;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Service name (default: prompt, suggesting the directory name)
    #[arg(long)]
    pub name: Option<String>,

    /// Base identifier the generated sources live under, e.g. com.example.orders
    #[arg(long)]
    pub base_module: Option<String>,

    /// Architecture layout
    #[arg(long, value_enum)]
    pub architecture: Option<ArchitectureType>,

    /// Programming paradigm
    #[arg(long, value_enum)]
    pub paradigm: Option<Paradigm>,

    /// Target framework
    #[arg(long, value_enum)]
    pub framework: Option<Framework>,

    /// Template source mode
    #[arg(long, value_enum, default_value = "production")]
    pub templates_mode: TemplateMode,

    /// Custom template repository (developer mode)
    #[arg(long)]
    pub templates_repository: Option<String>,

    /// Custom template branch (developer mode)
    #[arg(long)]
    pub templates_branch: Option<String>,

    /// Pinned template version (developer mode)
    #[arg(long)]
    pub templates_version: Option<String>,

    /// Local template directory (developer mode)
    #[arg(long)]
    pub templates_path: Option<PathBuf>,

    /// Disable the template cache
    #[arg(long)]
    pub no_cache: bool,

    /// Overwrite files in an already-initialized directory
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
    }

    if Descriptor::exists(&path) && !args.force {
        println!(
            "{} strata project already exists at {}",
            style("!").yellow(),
            style(path.display()).cyan()
        );
        println!();
        println!("Use {} to reinitialize", style("strata init --force").yellow());
        return Ok(());
    }

    let descriptor = build_descriptor(&args, &path)?;

    // Resolve templates before touching the tree: a failed resolution
    // must leave nothing behind.
    let engine = open_engine()?;
    let request = TemplateRequest::from_descriptor(&descriptor);
    let bundle = engine.resolve(&path, &request, false)?;

    let files = render_project(&path, &descriptor, &bundle)?;
    write_files(&files, args.force)?;
    create_layer_dirs(&path, &descriptor)?;
    descriptor.write(&path)?;

    if !global.quiet {
        println!(
            "{} Initialized {} project at {}",
            style("✓").green(),
            style(descriptor.architecture.architecture).cyan(),
            style(path.display()).cyan()
        );
        println!("  Template source: {}", bundle.source.describe());
        println!();
        println!("Created:");
        println!("  {}", DESCRIPTOR_FILE);
        for file in &files {
            if let Ok(relative) = file.path.strip_prefix(&path) {
                println!("  {}", relative.display());
            }
        }
        println!();
        println!("Next steps:");
        println!(
            "  {} Generate your first entity",
            style("strata entity <Name>").yellow()
        );
        println!(
            "  {} Validate the template bundle",
            style("strata templates validate").yellow()
        );
    }

    Ok(())
}

fn build_descriptor(args: &InitArgs, path: &std::path::Path) -> Result<Descriptor> {
    let default_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "service".to_string());

    let name = match &args.name {
        Some(name) => name.clone(),
        None => Input::new()
            .with_prompt("Service name")
            .default(default_name)
            .interact_text()
            .into_diagnostic()?,
    };

    let base_module = match &args.base_module {
        Some(base) => base.clone(),
        None => Input::new()
            .with_prompt("Base module")
            .default(format!("com.example.{}", name.replace('-', "_")))
            .interact_text()
            .into_diagnostic()?,
    };

    let architecture = match args.architecture {
        Some(arch) => arch,
        None => {
            let variants = [
                ArchitectureType::HexagonalSingle,
                ArchitectureType::HexagonalMulti,
                ArchitectureType::OnionSingle,
                ArchitectureType::OnionMulti,
            ];
            let index = Select::new()
                .with_prompt("Architecture")
                .items(&variants.map(|v| v.as_str()))
                .default(0)
                .interact()
                .into_diagnostic()?;
            variants[index]
        }
    };

    let paradigm = match args.paradigm {
        Some(p) => p,
        None => {
            let variants = [Paradigm::Reactive, Paradigm::Imperative];
            let index = Select::new()
                .with_prompt("Paradigm")
                .items(&variants.map(|v| v.as_str()))
                .default(0)
                .interact()
                .into_diagnostic()?;
            variants[index]
        }
    };

    let framework = match args.framework {
        Some(f) => f,
        None => {
            let variants = [Framework::Spring, Framework::Quarkus];
            let index = Select::new()
                .with_prompt("Framework")
                .items(&variants.map(|v| v.as_str()))
                .default(0)
                .interact()
                .into_diagnostic()?;
            variants[index]
        }
    };

    let descriptor = Descriptor {
        project: ProjectSection {
            name,
            base_module,
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: Utc::now(),
        },
        architecture: ArchitectureSection {
            architecture,
            paradigm,
            framework,
        },
        templates: TemplatePreferences {
            mode: args.templates_mode,
            repository: args.templates_repository.clone(),
            branch: args.templates_branch.clone(),
            version: args.templates_version.clone(),
            local_path: args.templates_path.clone(),
            cache: !args.no_cache,
            ..Default::default()
        },
    };

    Ok(descriptor)
}
