//! Command-line arguments and subcommands of the `xmlui` tool.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use termcolor::ColorChoice;

#[derive(Debug, Parser)]
#[command(
    name = "xmlui",
    version,
    about = "Lex, parse, build and check XMLUI markup and scripts."
)]
pub struct XmluiArgs {
    /// Raise log verbosity (-v debug, -vv trace). RUST_LOG overrides it.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// When to color terminal output.
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    pub color: ColorMode,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn choice(self) -> ColorChoice {
        match self {
            ColorMode::Auto => ColorChoice::Auto,
            ColorMode::Always => ColorChoice::Always,
            ColorMode::Never => ColorChoice::Never,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the tokens of a script file.
    Lex {
        #[arg(required = true)]
        file: PathBuf,
        /// Include whitespace, newline and comment tokens.
        #[arg(long)]
        trivia: bool,
    },
    /// Print the syntax tree of a markup (.xmlui) or script file as JSON.
    Parse {
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Build the component definition of a markup file and print it as JSON.
    Build {
        #[arg(required = true)]
        file: PathBuf,
        /// Identifier recorded in every definition's debug source.
        #[arg(long, default_value_t = 0)]
        file_id: u32,
    },
    /// Resolve a script module and everything it imports.
    Resolve {
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Check every .xmlui and .xs file under a directory.
    Check {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}
