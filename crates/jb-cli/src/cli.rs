//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};

/// jinja-bridge - configure, lint and inspect MiniJinja template projects
#[derive(Parser, Debug)]
#[command(name = "jb")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Extra template directory, optionally namespaced as NS=DIR (repeatable)
    #[arg(long = "path", value_name = "[NS=]DIR", global = true)]
    pub paths: Vec<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Clean the template cache folder
    #[command(name = "template:clear")]
    Clear,

    /// Check compilation errors in the template files
    #[command(name = "template:compile")]
    Compile,

    /// Show template functions, filters, tests, globals and loader paths
    #[command(name = "template:debug")]
    Debug,

    /// Show the MiniJinja version
    #[command(name = "template:version")]
    Version,

    /// Write the default templates.yml into the project directory
    #[command(name = "template:publish")]
    Publish(PublishArgs),
}

/// Arguments for the publish command
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Overwrite an existing configuration file
    #[arg(short, long)]
    pub force: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
