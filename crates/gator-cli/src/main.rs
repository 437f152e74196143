use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gator_core::{scheduler::parse_interval, storage::Database, AppConfig, Session};

mod commands;

#[derive(Parser)]
#[command(name = "gator")]
#[command(author, version, about = "A command-line RSS aggregator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a user and log in as them
    Register {
        name: String,
    },
    /// Switch to an existing user
    Login {
        name: String,
    },
    /// Delete all users, feeds, follows and posts
    Reset,
    /// List registered users
    Users,
    /// Fetch feeds forever, one feed per interval
    Agg {
        /// Time between requests, e.g. 30s, 1m, 1h30m
        #[arg(value_parser = parse_interval)]
        interval: Duration,
    },
    /// Add a feed and follow it
    #[command(name = "addfeed")]
    AddFeed {
        /// Display name for the feed
        name: String,
        /// RSS feed URL
        url: String,
    },
    /// List all feeds
    Feeds,
    /// Follow an existing feed
    Follow {
        url: String,
    },
    /// List the feeds you follow
    Following,
    /// Stop following a feed
    Unfollow {
        url: String,
    },
    /// Show the newest posts from the feeds you follow
    Browse {
        /// Number of posts to show
        #[arg(default_value_t = 2)]
        limit: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let mut session = Session::load(&config)?;

    // Initialize database
    let db = Database::new(&config).await?;

    match cli.command {
        Commands::Register { name } => commands::users::register(&db, &mut session, &name).await,
        Commands::Login { name } => commands::users::login(&db, &mut session, &name).await,
        Commands::Reset => commands::users::reset(&db, &mut session).await,
        Commands::Users => commands::users::list(&db, &session).await,
        Commands::Agg { interval } => commands::agg::run(db, &config, interval).await,
        Commands::Feeds => commands::feeds::list(&db).await,
        Commands::AddFeed { name, url } => {
            let user = commands::logged_in(&db, &session).await?;
            commands::feeds::add(&db, &user, &name, &url).await
        }
        Commands::Follow { url } => {
            let user = commands::logged_in(&db, &session).await?;
            commands::follows::follow(&db, &user, &url).await
        }
        Commands::Following => {
            let user = commands::logged_in(&db, &session).await?;
            commands::follows::following(&db, &user).await
        }
        Commands::Unfollow { url } => {
            let user = commands::logged_in(&db, &session).await?;
            commands::follows::unfollow(&db, &user, &url).await
        }
        Commands::Browse { limit } => {
            let user = commands::logged_in(&db, &session).await?;
            commands::browse::run(&db, &user, limit).await
        }
    }
}
