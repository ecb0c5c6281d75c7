//! `strata entity` command - Generate a domain entity

use console::style;
use miette::Result;

use crate::cli::args::GlobalOpts;
use crate::cli::helpers::{open_engine, open_project, request_for};
use crate::generate::component::{render_component, ComponentKind, ComponentSpec, Field};
use crate::generate::write_files;

#[derive(clap::Args, Debug)]
pub struct EntityArgs {
    /// Entity name (converted to UpperCamelCase)
    pub name: String,

    /// Entity fields as name:type, repeatable
    #[arg(long = "field", value_name = "NAME:TYPE")]
    pub fields: Vec<String>,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: EntityArgs, global: &GlobalOpts) -> Result<()> {
    let (project, descriptor) = open_project(global)?;

    let fields = args
        .fields
        .iter()
        .map(|spec| Field::parse(spec))
        .collect::<Result<Vec<_>, _>>()?;

    let spec = ComponentSpec {
        kind: ComponentKind::Entity,
        name: args.name,
        fields,
    };

    let engine = open_engine()?;
    let request = request_for(&descriptor);
    let bundle = engine.resolve(project.root(), &request, false)?;

    let file = render_component(project.root(), &descriptor, &bundle, &spec)?;
    write_files(std::slice::from_ref(&file), args.force)?;

    if !global.quiet {
        println!(
            "{} Created entity {}",
            style("✓").green(),
            style(file.path.display()).cyan()
        );
        if global.verbose {
            println!("  Template source: {}", bundle.source.describe());
        }
    }

    Ok(())
}
