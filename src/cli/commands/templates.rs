//! `strata templates` command - Template source management

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::args::GlobalOpts;
use crate::cli::helpers::{open_engine, open_project, request_for};
use crate::templates::source::select_source;
use crate::templates::transport::HttpTransport;
use crate::templates::validate::validate_bundle;

#[derive(Subcommand, Debug)]
pub enum TemplateCommands {
    /// Show which template source resolution would select
    Source,

    /// Re-download the current template bundle, bypassing the cache
    Update,

    /// Resolve the bundle and check it for structural completeness
    Validate,
}

pub fn run(cmd: TemplateCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        TemplateCommands::Source => run_source(global),
        TemplateCommands::Update => run_update(global),
        TemplateCommands::Validate => run_validate(global),
    }
}

fn run_source(global: &GlobalOpts) -> Result<()> {
    let (project, descriptor) = open_project(global)?;
    let request = request_for(&descriptor);

    let transport = HttpTransport::new();
    let candidate = select_source(&request, project.root(), &transport)?;

    println!("{}", candidate.describe());
    if global.verbose {
        println!("  mode: {}", request.mode);
        println!("  combination: {}", request.combination());
        println!("  cache: {}", if request.cache { "enabled" } else { "disabled" });
    }

    Ok(())
}

fn run_update(global: &GlobalOpts) -> Result<()> {
    let (project, descriptor) = open_project(global)?;
    let request = request_for(&descriptor);

    let engine = open_engine()?;
    let bundle = engine.update(project.root(), &request)?;

    if bundle.source.is_local() {
        println!(
            "{} Using local templates - nothing to update",
            style("✓").green()
        );
        println!("  {}", bundle.source.describe());
        return Ok(());
    }

    println!(
        "{} Templates refreshed ({} templates)",
        style("✓").green(),
        style(bundle.len()).cyan()
    );
    println!("  {}", bundle.source.describe());

    Ok(())
}

fn run_validate(global: &GlobalOpts) -> Result<()> {
    let (project, descriptor) = open_project(global)?;
    let request = request_for(&descriptor);

    let engine = open_engine()?;
    let bundle = engine.resolve(project.root(), &request, false)?;
    let report = validate_bundle(&bundle);

    if !global.quiet {
        println!("Validating bundle from {}", bundle.source.describe());
    }

    for warning in &report.warnings {
        println!("{} {}", style("!").yellow(), warning);
    }
    for error in &report.errors {
        println!("{} {}", style("✗").red(), error);
    }

    if report.is_valid() {
        println!(
            "{} Bundle is valid ({} templates)",
            style("✓").green(),
            style(bundle.len()).cyan()
        );
        Ok(())
    } else {
        Err(miette::miette!(
            "template validation failed with {} error(s)",
            report.errors.len()
        ))
    }
}
