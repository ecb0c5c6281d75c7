use clap::Parser;
use miette::Result;
use strata::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `grep -q`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    match cli.command {
        Commands::Init(args) => strata::cli::commands::init::run(args, &global),
        Commands::Entity(args) => strata::cli::commands::entity::run(args, &global),
        Commands::Usecase(args) => strata::cli::commands::usecase::run(args, &global),
        Commands::Adapter(cmd) => strata::cli::commands::adapter::run(cmd, &global),
        Commands::Templates(cmd) => strata::cli::commands::templates::run(cmd, &global),
        Commands::Cache(cmd) => strata::cli::commands::cache::run(cmd, &global),
        Commands::Completions(args) => strata::cli::commands::completions::run(args),
    }
}
