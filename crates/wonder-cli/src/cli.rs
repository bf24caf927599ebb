//! Command-line argument definitions for `wonder`.

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;

/// Command-line client for Wonder land daemons and the stage.
#[derive(Parser, Debug)]
#[command(name = "wonder", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// Controls how replies are rendered.
    #[arg(long, value_enum, default_value_t = OutputFormat::Auto)]
    pub(crate) output: OutputFormat,
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Subcommands, one per daemon call.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum CliCommand {
    /// Plants sprites on the land.
    Plant {
        /// Plant kind: tree, flower, or grass.
        #[arg(long)]
        what: String,
        /// Colour given to flowers.
        #[arg(long, default_value = "")]
        color: String,
        /// Number of sprites to plant.
        #[arg(long, default_value_t = 1)]
        number: u32,
    },
    /// Prints a snapshot of the land.
    Info,
    /// Follows land events.
    Subscribe {
        /// Stops after this many events.
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Lists the land daemons the stage considers alive.
    List,
    /// Reports a member alive to the stage.
    Report {
        /// `host:port` of the member.
        address: String,
    },
}
