use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};

mod commands;

/// Depot - resolve declared package dependencies and vendor them into a target directory
#[derive(Parser)]
#[command(name = "depot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new depot project
    Init,

    /// Resolve the manifest and vendor all packages into a target directory
    Vendor {
        /// Path to the manifest file (defaults to ./depot.json)
        #[arg(short, long)]
        manifest: Option<String>,

        /// Target directory for vendored packages
        #[arg(short, long, default_value = "vendor")]
        target: String,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },

    /// Resolve the manifest afresh and write the lock file
    Lock {
        /// Path to the manifest file (defaults to ./depot.json)
        #[arg(short, long)]
        manifest: Option<String>,
    },

    /// List vendored packages in a target directory
    List {
        /// Target directory to inspect
        #[arg(short, long, default_value = "vendor")]
        target: String,
    },

    /// Search for packages in the registry
    Search {
        /// Search query
        query: String,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Vendor {
            manifest,
            target,
            quiet,
        } => commands::vendor::run(manifest, target, quiet),
        Commands::Lock { manifest } => commands::lock::run(manifest),
        Commands::List { target } => commands::list::run(target),
        Commands::Search { query } => commands::search::run(query),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "depot", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
