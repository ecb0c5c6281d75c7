//! `strata adapter` command - Generate input/output adapters

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::args::GlobalOpts;
use crate::cli::helpers::{open_engine, open_project, request_for};
use crate::generate::component::{render_component, ComponentKind, ComponentSpec};
use crate::generate::write_files;

#[derive(Subcommand, Debug)]
pub enum AdapterCommands {
    /// Generate an input (driving) adapter
    In(AdapterArgs),

    /// Generate an output (driven) adapter
    Out(AdapterArgs),
}

#[derive(clap::Args, Debug)]
pub struct AdapterArgs {
    /// Adapter name (converted to UpperCamelCase)
    pub name: String,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

pub fn run(cmd: AdapterCommands, global: &GlobalOpts) -> Result<()> {
    let (kind, args) = match cmd {
        AdapterCommands::In(args) => (ComponentKind::InputAdapter, args),
        AdapterCommands::Out(args) => (ComponentKind::OutputAdapter, args),
    };

    let (project, descriptor) = open_project(global)?;

    let spec = ComponentSpec {
        kind,
        name: args.name,
        fields: Vec::new(),
    };

    let engine = open_engine()?;
    let request = request_for(&descriptor);
    let bundle = engine.resolve(project.root(), &request, false)?;

    let file = render_component(project.root(), &descriptor, &bundle, &spec)?;
    write_files(std::slice::from_ref(&file), args.force)?;

    if !global.quiet {
        println!(
            "{} Created {} {}",
            style("✓").green(),
            kind.display_name(),
            style(file.path.display()).cyan()
        );
    }

    Ok(())
}
