use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "mindfeed", version, about = "Mindfeed CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run or simulate a paced feed session
    Feed {
        #[command(subcommand)]
        action: commands::feed::FeedAction,
    },
    /// Interest selection
    Interests {
        #[command(subcommand)]
        action: commands::interests::InterestsAction,
    },
    /// Liked items
    Likes {
        #[command(subcommand)]
        action: commands::likes::LikesAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Pacing policies
    Policy {
        #[command(subcommand)]
        action: commands::policy::PolicyAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("MINDFEED_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Feed { action } => commands::feed::run(action),
        Commands::Interests { action } => commands::interests::run(action),
        Commands::Likes { action } => commands::likes::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Policy { action } => commands::policy::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
