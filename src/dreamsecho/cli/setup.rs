use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use dreamsecho::api::Period;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.3.2" for releases, "0.3.2@abc1234 2024-01-15" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "dreamsecho",
    bin_name = "dreamsecho",
    version = get_version(),
    disable_help_flag = true,
    disable_help_subcommand = true
)]
#[command(about = "A dream journal with analysis and illustrations", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputMode::Text, help_heading = "Options")]
    pub output: OutputMode,

    /// Print help
    #[arg(short, long, global = true)]
    pub help: bool,
}

/// Command group definitions for help output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandGroup {
    Journal,
    Misc,
}

impl CommandGroup {
    pub fn heading(&self) -> &'static str {
        match self {
            CommandGroup::Journal => "Journal Commands:",
            CommandGroup::Misc => "Miscellaneous:",
        }
    }

    pub fn for_command(name: &str) -> Option<Self> {
        match name {
            "add" | "list" | "view" | "stats" => Some(CommandGroup::Journal),
            "config" | "init" | "help" => Some(CommandGroup::Misc),
            _ => None,
        }
    }

    pub fn all() -> &'static [CommandGroup] {
        &[CommandGroup::Journal, CommandGroup::Misc]
    }
}

/// Returns the custom grouped help output as a string
pub fn get_grouped_help() -> String {
    let cmd = Cli::command();
    let version = cmd.get_version().unwrap_or("unknown");

    let mut output = String::new();
    output.push_str(&format!("dreamsecho {version}\n"));
    output.push_str("A dream journal with analysis and illustrations\n");
    output.push('\n');
    output.push_str("Usage: dreamsecho [OPTIONS] [COMMAND]\n");

    let subcommands: Vec<_> = cmd.get_subcommands().collect();
    for group in CommandGroup::all() {
        let group_cmds: Vec<_> = subcommands
            .iter()
            .filter(|sc| {
                !sc.is_hide_set() && CommandGroup::for_command(sc.get_name()) == Some(*group)
            })
            .collect();

        if !group_cmds.is_empty() {
            output.push('\n');
            output.push_str(&format!("{}\n", group.heading()));
            for sc in group_cmds {
                let name = sc.get_name();
                let about = sc.get_about().map(|s| s.to_string()).unwrap_or_default();
                output.push_str(&format!("  {:<12} {}\n", name, about));
            }
        }
    }

    output.push('\n');
    output.push_str("Options:\n");
    output.push_str("  -v, --verbose        Verbose output (debug logging on stderr)\n");
    output.push_str("      --output <MODE>  Output format [text, json]\n");
    output.push_str("  -h, --help           Print help\n");
    output.push_str("  -V, --version        Print version\n");

    output
}

pub fn print_grouped_help() {
    print!("{}", get_grouped_help());
}

/// Prints help for a specific subcommand using clap's built-in rendering
pub fn print_subcommand_help(command: &Option<Commands>) {
    let name = match command {
        Some(Commands::Journal(c)) => match c {
            JournalCommands::Add { .. } => "add",
            JournalCommands::List { .. } => "list",
            JournalCommands::View { .. } => "view",
            JournalCommands::Stats => "stats",
        },
        Some(Commands::Misc(c)) => match c {
            MiscCommands::Config { .. } => "config",
            MiscCommands::Init => "init",
            MiscCommands::Help { .. } => "help",
        },
        None => {
            print_grouped_help();
            return;
        }
    };
    print_help_for_command(name);
}

pub fn print_help_for_command(name: &str) {
    let mut cmd = Cli::command();
    for subcmd in cmd.get_subcommands_mut() {
        if subcmd.get_name() == name {
            print!("{}", subcmd.render_help());
            return;
        }
    }

    eprintln!("Unknown command: {}", name);
    eprintln!();
    print_grouped_help();
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(flatten)]
    Journal(JournalCommands),

    #[command(flatten)]
    Misc(MiscCommands),
}

#[derive(Subcommand, Debug)]
pub enum JournalCommands {
    /// Record a dream (text from arguments or stdin)
    #[command(alias = "a", display_order = 1)]
    Add {
        /// Display title
        #[arg(short, long)]
        title: Option<String>,

        /// Illustration style (fantasy, surreal, watercolor, realistic, anime, nightmare)
        #[arg(short, long)]
        style: Option<String>,

        /// Illustration size (standard, hd, landscape, portrait)
        #[arg(long)]
        size: Option<String>,

        /// Generate an illustration
        #[arg(short, long)]
        image: bool,

        /// Skip the analysis
        #[arg(long)]
        no_analysis: bool,

        /// When the dream happened (e.g. 2024-03-01 or 2024-03-01T06:30:00)
        #[arg(long, value_name = "DATE")]
        date: Option<String>,

        /// Dream text words (joined with spaces)
        #[arg(trailing_var_arg = true)]
        content: Vec<String>,
    },

    /// Browse saved dreams, newest first
    #[command(visible_alias = "ls", alias = "gallery", display_order = 2)]
    List {
        /// all, today, week or month
        #[arg(short, long, default_value = "all")]
        period: Period,

        /// Only dreams with an illustration
        #[arg(long)]
        images: bool,

        /// Only dreams in this style
        #[arg(short, long)]
        style: Option<String>,
    },

    /// Show one dream with its analysis
    #[command(alias = "v", display_order = 3)]
    View {
        /// Dream number (as shown by list)
        id: u64,
    },

    /// Journal statistics and emotion trends
    #[command(alias = "analysis", display_order = 4)]
    Stats,
}

#[derive(Subcommand, Debug)]
pub enum MiscCommands {
    /// Get or set configuration
    #[command(display_order = 30)]
    Config {
        /// Configuration key (e.g., default_style)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },

    /// Create the data directories
    #[command(display_order = 31)]
    Init,

    /// Print help for dreamsecho or a subcommand
    #[command(display_order = 32)]
    Help {
        /// Subcommand to get help for
        command: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_add_with_options() {
        let cli = Cli::try_parse_from([
            "dreamsecho", "add", "--style", "anime", "-i", "--no-analysis", "a", "red", "door",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Journal(JournalCommands::Add {
                style,
                image,
                no_analysis,
                content,
                ..
            })) => {
                assert_eq!(style.as_deref(), Some("anime"));
                assert!(image);
                assert!(no_analysis);
                assert_eq!(content.join(" "), "a red door");
            }
            other => panic!("unexpected parse: {:?}", other),
        }
    }

    #[test]
    fn parses_list_filters_and_output() {
        let cli =
            Cli::try_parse_from(["dreamsecho", "ls", "--period", "week", "--output", "json"])
                .unwrap();
        assert_eq!(cli.output, OutputMode::Json);
        assert!(matches!(
            cli.command,
            Some(Commands::Journal(JournalCommands::List {
                period: Period::Week,
                ..
            }))
        ));
    }

    #[test]
    fn rejects_unknown_period() {
        assert!(Cli::try_parse_from(["dreamsecho", "list", "--period", "decade"]).is_err());
    }

    #[test]
    fn grouped_help_lists_every_command() {
        let help = get_grouped_help();
        for name in ["add", "list", "view", "stats", "config", "init"] {
            assert!(help.contains(name), "missing {}", name);
        }
    }
}
