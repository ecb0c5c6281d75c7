//! `strata usecase` command - Generate a use case

use console::style;
use miette::Result;

use crate::cli::args::GlobalOpts;
use crate::cli::helpers::{open_engine, open_project, request_for};
use crate::generate::component::{render_component, ComponentKind, ComponentSpec};
use crate::generate::write_files;

#[derive(clap::Args, Debug)]
pub struct UsecaseArgs {
    /// Use case name (converted to UpperCamelCase)
    pub name: String,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: UsecaseArgs, global: &GlobalOpts) -> Result<()> {
    let (project, descriptor) = open_project(global)?;

    let spec = ComponentSpec {
        kind: ComponentKind::UseCase,
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
            "{} Created use case {}",
            style("✓").green(),
            style(file.path.display()).cyan()
        );
    }

    Ok(())
}
