mod cli;

use agora_core::config::AgoraConfig;
use agora_core::query::{CategoryFilter, SortMode};
use agora_core::seed::SeedData;
use agora_core::{telemetry, utils, ForumStore};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Agora forum store and interactive shell")]
struct Args {
    /// Seed file to load instead of AGORA_SEED_PATH or the built-in data
    #[arg(long, global = true)]
    seed: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the interactive shell
    Shell,
    /// Print the post feed and exit
    Posts {
        #[arg(long, default_value = "all")]
        category: String,
        #[arg(long, default_value = "latest")]
        sort: SortMode,
    },
    /// Print categories whose name contains QUERY
    Categories {
        #[arg(default_value = "")]
        query: String,
    },
    /// Validate a seed file and print it back as JSON
    Dump,
}

fn main() -> Result<()> {
    utils::print_banner();
    telemetry::init_tracing();

    let args = Args::parse();

    let mut config = AgoraConfig::from_env();
    if let Some(path) = args.seed {
        config.seed_path = Some(path);
    }
    let store = ForumStore::from_config(&config)?;
    tracing::info!(
        seed = ?config.seed_path,
        id_strategy = ?config.id_strategy,
        "agora ready"
    );

    match args.command.unwrap_or(Command::Shell) {
        Command::Shell => {
            let stdin = io::stdin();
            cli::run_shell(store, &config, stdin.lock(), io::stdout())
        }
        Command::Posts { category, sort } => {
            let filter = CategoryFilter::parse(&category);
            for post in store.list_posts(&filter, sort).iter().take(config.list_limit) {
                println!(
                    "[{}] {} ({}) ▲ {} | {} comments",
                    post.id, post.title, post.category, post.upvotes, post.comments
                );
            }
            Ok(())
        }
        Command::Categories { query } => {
            for category in store.list_categories(&query) {
                println!(
                    "[{}] {} - {} threads",
                    category.id, category.name, category.thread_count
                );
            }
            Ok(())
        }
        Command::Dump => {
            let seed = SeedData {
                viewer: store.viewer().clone(),
                categories: store.categories().to_vec(),
                posts: store.snapshot().posts().to_vec(),
            };
            println!("{}", serde_json::to_string_pretty(&seed)?);
            Ok(())
        }
    }
}
