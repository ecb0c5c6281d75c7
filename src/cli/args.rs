//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::{
    adapter::AdapterCommands,
    cache::CacheCommands,
    completions::CompletionsArgs,
    entity::EntityArgs,
    init::InitArgs,
    templates::TemplateCommands,
    usecase::UsecaseArgs,
};

#[derive(Parser)]
#[command(name = "strata")]
#[command(author, version, about = "Strata - layered architecture scaffolding")]
#[command(
    long_about = "Scaffolds hexagonal and onion service trees from a shared template library, \
                  resolving templates from a local working copy or a remote repository with \
                  durable caching."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .strata.yaml)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new strata project
    Init(InitArgs),

    /// Generate a domain entity
    Entity(EntityArgs),

    /// Generate a use case
    Usecase(UsecaseArgs),

    /// Generate input/output adapters
    #[command(subcommand)]
    Adapter(AdapterCommands),

    /// Template source management
    #[command(subcommand)]
    Templates(TemplateCommands),

    /// Manage the template cache
    #[command(subcommand)]
    Cache(CacheCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
