//! `strata cache` command - Manage the template cache
//!
//! The cache holds remote template bundles, one entry per
//! repository/reference/combination identity. It is user-local and
//! repopulated on demand, so clearing it is always safe.

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::args::GlobalOpts;
use crate::cli::helpers::open_engine;

#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show cached bundles and their age
    Status,

    /// Remove every cached bundle
    Clear,
}

pub fn run(cmd: CacheCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CacheCommands::Status => run_status(global),
        CacheCommands::Clear => run_clear(global),
    }
}

fn run_status(_global: &GlobalOpts) -> Result<()> {
    let engine = open_engine()?;
    let cache = engine.cache();
    let entries = cache.entries();

    println!("{}", style("Template Cache").bold());
    println!("{}", style("─".repeat(40)).dim());
    println!("  Location: {}", cache.root().display());
    println!("  Entries:  {}", style(entries.len()).cyan());
    println!(
        "  Size:     {}",
        style(format_bytes(cache.size_bytes())).cyan()
    );

    if !entries.is_empty() {
        println!();
        for entry in entries {
            println!(
                "  {} ({}, fetched {})",
                entry.identity,
                format_bytes(entry.size_bytes),
                entry.fetched_at.format("%Y-%m-%d %H:%M UTC")
            );
        }
    }

    Ok(())
}

fn run_clear(global: &GlobalOpts) -> Result<()> {
    let engine = open_engine()?;
    let size_before = engine.cache().size_bytes();

    let removed = engine
        .clear_cache()
        .map_err(|e| miette::miette!("{}", e))?;

    if removed == 0 {
        println!("No cached bundles to clear");
        return Ok(());
    }

    if !global.quiet {
        println!("{} Template cache cleared", style("✓").green());
        println!("  Entries removed: {removed}");
        println!("  Freed: {}", format_bytes(size_before));
        println!("  Location: {}", engine.cache().root().display());
    }

    Ok(())
}

/// Format bytes to a human-readable size
fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else if bytes < GB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.00 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.00 MB");
    }
}
