mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::projects::ProjectsSubcommand;
use cmd::prompt::PromptArgs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "casegen",
    about = "AI test case generator: turn user stories into manual test cases and automation scripts",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .casegen/)
    #[arg(long, global = true, env = "CASEGEN_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default config and create the projects directory
    Init,

    /// Serve the web UI
    Ui {
        /// Port to listen on (0 picks a free port)
        #[arg(long, default_value_t = 8501)]
        port: u16,
        /// Don't open the browser automatically
        #[arg(long)]
        no_open: bool,
    },

    /// Print the prompt that would be sent to the model
    Prompt(PromptArgs),

    /// Extract fenced code blocks from model output
    Render {
        /// File to read (default: stdin)
        file: Option<PathBuf>,
    },

    /// Browse saved projects
    Projects {
        #[command(subcommand)]
        subcommand: ProjectsSubcommand,
    },
}

fn main() {
    // A missing .env is normal.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Ui { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Ui { port, no_open } => cmd::ui::run(&root, port, no_open),
        Commands::Prompt(args) => cmd::prompt::run(args, cli.json),
        Commands::Render { file } => cmd::render::run(file.as_deref(), cli.json),
        Commands::Projects { subcommand } => cmd::projects::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
