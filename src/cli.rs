use std::path::PathBuf;

use clap::builder::styling::{AnsiColor, Color, Style, Styles};
use clap::{Parser, Subcommand, ValueEnum};

/// Help colors: green headers, cyan literals.
fn help_styles() -> Styles {
    let green = Style::new()
        .bold()
        .fg_color(Some(Color::Ansi(AnsiColor::Green)));
    Styles::styled()
        .header(green)
        .usage(green)
        .literal(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Cyan))),
        )
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
        .error(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Red))),
        )
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// One line for a prompt
    #[default]
    Text,
    /// Every collected fact
    Json,
}

#[derive(Parser)]
#[command(name = "gitline")]
#[command(about = "Git repository state for shell prompts", long_about = None)]
#[command(version)]
#[command(disable_help_subcommand = true)]
#[command(styles = help_styles())]
#[command(after_long_help = "\
Outside a repository, in an excluded folder, or without git on PATH,
`gitline status` prints nothing and exits successfully.

Config: ~/.config/gitline/config.toml (override with --config or GITLINE_CONFIG_PATH)")]
pub(crate) struct Cli {
    /// Directory to inspect instead of the current one
    #[arg(
        short = 'C',
        global = true,
        value_name = "path",
        display_order = 100,
        help_heading = "Global Options"
    )]
    pub directory: Option<PathBuf>,

    /// Config file path
    #[arg(
        long,
        global = true,
        value_name = "path",
        display_order = 101,
        help_heading = "Global Options"
    )]
    pub config: Option<PathBuf>,

    /// Log decisions and git invocations to stderr (-v), or everything (-vv)
    #[arg(
        long,
        short = 'v',
        global = true,
        action = clap::ArgAction::Count,
        display_order = 102,
        help_heading = "Global Options"
    )]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Show repository status (default)
    Status {
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Show where the repository's metadata lives
    Locate,

    /// Print a JSON Schema
    Schema {
        /// Schema of the config file instead of the status output
        #[arg(long)]
        config: bool,
    },
}
