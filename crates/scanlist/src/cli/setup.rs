use clap::{Args, Parser, Subcommand, ValueEnum};
use scanlistapp::model::{ScanMode, CODE_TYPE_MANUAL};
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format for releases: "v0.3.0"
/// Format for dev builds: "v0.3.0\ndev: abc1234 2024-01-15 14:30"
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" {
            format!("v{}", VERSION)
        } else {
            format!("v{}\ndev: {} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(
    name = "scanlist",
    bin_name = "scanlist",
    version = get_version(),
    disable_help_subcommand = true,
    about = "Barcode scan lists with duplicate suppression and a keyboard handoff",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory (defaults to $SCANLIST_DATA, then the OS data directory)
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub data: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true, help_heading = "Options")]
    pub json: bool,

    /// Verbose output (debug logs on stderr)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Single,
    Multi,
}

impl From<ModeArg> for ScanMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Single => ScanMode::Single,
            ModeArg::Multi => ScanMode::Multi,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage scan lists
    #[command(subcommand, alias = "lists", display_order = 1)]
    List(ListCommands),

    /// Record one scan (repeats within the debounce interval are ignored)
    #[command(display_order = 2)]
    Scan {
        /// List to scan into
        list: String,

        /// Decoded value
        code: String,

        /// Symbology of the code (e.g. EAN13, QR)
        #[arg(long = "type", short = 't', default_value = CODE_TYPE_MANUAL)]
        code_type: String,

        /// Optional label
        #[arg(long, short)]
        label: Option<String>,
    },

    /// Show the items of a list, newest first
    #[command(alias = "ls", display_order = 3)]
    Items {
        list: String,
    },

    /// Set or clear the label of an item
    #[command(display_order = 4)]
    Label {
        list: String,

        /// Position in `items` output (1 = newest) or item id
        item: String,

        /// New label; omit to clear
        label: Option<String>,
    },

    /// Delete an item
    #[command(display_order = 5)]
    Rm {
        list: String,

        /// Position in `items` output (1 = newest) or item id
        item: String,
    },

    /// Export a list as CSV
    #[command(display_order = 6)]
    Export(ExportArgs),

    /// Stage captured codes for the next consumer (capture side)
    #[command(display_order = 10)]
    Capture {
        /// Decoded values, in capture order
        #[arg(required = true)]
        codes: Vec<String>,

        #[arg(long, short, value_enum, default_value = "single")]
        mode: ModeArg,

        /// List the captures belong to
        #[arg(long)]
        list: Option<String>,

        /// Symbology reported for every code
        #[arg(long = "type", short = 't')]
        symbology: Option<String>,
    },

    /// Work with staged captures
    #[command(subcommand, display_order = 11)]
    Pending(PendingCommands),

    /// The shared set of list names
    #[command(subcommand, display_order = 12)]
    Known(KnownCommands),

    /// Build or parse activation addresses
    #[command(subcommand, display_order = 13)]
    Route(RouteCommands),

    /// Show configuration
    #[command(display_order = 20)]
    Config {
        /// Show a single key
        key: Option<String>,

        /// Print a commented scanlist.toml with every default
        #[arg(long, conflicts_with = "key")]
        template: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ListCommands {
    /// Create a list
    Create { name: String },

    /// Show all lists, newest first
    Ls,

    /// Rename a list (items keep the old name)
    Rename { name: String, new_name: String },

    /// Delete a list record (its items are kept)
    Delete {
        name: String,

        /// Repeat the list name exactly to confirm
        #[arg(long, value_name = "NAME")]
        confirm: Option<String>,
    },

    /// Tag future scans into the list
    Meta {
        name: String,

        #[arg(long = "item")]
        item_name: Option<String>,

        #[arg(long = "supplier")]
        supplier_name: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    pub list: String,

    /// Write a file into this directory instead of printing
    #[arg(long, short, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Field delimiter (defaults to the configured one)
    #[arg(long, short)]
    pub delimiter: Option<char>,

    /// Leave out the header row
    #[arg(long)]
    pub no_header: bool,
}

#[derive(Subcommand, Debug)]
pub enum PendingCommands {
    /// Show the staged batch without consuming it
    Show,

    /// Save the staged batch into a list
    Commit {
        /// List to use when the batch does not name one
        #[arg(long)]
        list: Option<String>,
    },

    /// Consume the staged batch and print it as text to type (keyboard side)
    Insert {
        /// Checks before giving up (defaults to configuration)
        #[arg(long)]
        attempts: Option<u32>,

        /// Pause between checks in milliseconds (defaults to configuration)
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// Drop the staged batch
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum KnownCommands {
    Ls,
    Add { name: String },
    Rm { name: String },
}

#[derive(Subcommand, Debug)]
pub enum RouteCommands {
    /// Print the address that opens the capture surface
    Build {
        #[arg(long, short, value_enum, default_value = "single")]
        mode: ModeArg,
    },

    /// Parse an address (falls back to the last used mode)
    Parse { address: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn scan_defaults_to_manual_type() {
        let cli = Cli::try_parse_from(["scanlist", "scan", "L1", "123"]).unwrap();
        match cli.command {
            Some(Commands::Scan { code_type, .. }) => assert_eq!(code_type, "MANUAL"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["scanlist", "items", "L1", "--json", "--data", "/tmp/x"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.data, Some(PathBuf::from("/tmp/x")));
    }

    #[test]
    fn capture_requires_codes() {
        assert!(Cli::try_parse_from(["scanlist", "capture"]).is_err());
        let cli = Cli::try_parse_from(["scanlist", "capture", "A", "B", "-m", "multi"]).unwrap();
        match cli.command {
            Some(Commands::Capture { codes, mode, .. }) => {
                assert_eq!(codes, vec!["A", "B"]);
                assert_eq!(ScanMode::from(mode), ScanMode::Multi);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
