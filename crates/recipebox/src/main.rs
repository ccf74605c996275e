use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tokio_stream::StreamExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recipebox::auth::password_session;
use recipebox::config::Config;
use recipebox::holder::StateHolder;
use recipebox::mock_data::DEMO_USER_ID;
use recipebox::state::AppState;
use recipebox_core::repository::{AggregationRepository, InteractionRepository, PostRepository};
use recipebox_core::resource::ResourceStream;
use recipebox_core::social::{LikeType, Post};

/// Recipebox - Share recipes and cook along with your friends
#[derive(Parser, Debug)]
#[command(name = "recipebox")]
#[command(version, about, long_about = None)]
struct Cli {
    /// User id to act as
    #[arg(long, short, default_value = DEMO_USER_ID, env = "RECIPEBOX_USER")]
    user: String,

    /// Page size for listings (defaults to DEFAULT_PAGE_SIZE)
    #[arg(long, short)]
    limit: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the public feed, or the home feed of the current user
    Feed {
        #[arg(long)]
        home: bool,

        /// Id of the last post on the previous page
        #[arg(long)]
        cursor: Option<String>,
    },
    /// Publish a public post as the current user
    Post { content: String },
    /// Search recipes, users or posts
    Search {
        #[arg(value_enum)]
        kind: SearchKind,
        query: String,
    },
    /// Show moderation dashboard statistics (administrators only)
    Dashboard,
    /// Like a post, or remove the like with --undo
    Like {
        post_id: String,

        #[arg(long)]
        undo: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SearchKind {
    Recipes,
    Users,
    Posts,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recipebox=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();
    let state = AppState::in_memory(&config).with_demo_data(&config).await?;
    state
        .auth
        .sign_in(password_session(
            &cli.user,
            format!("{}@recipebox.dev", cli.user),
        ))
        .await;

    let limit = cli.limit.unwrap_or(state.page_size);

    match cli.command {
        Command::Feed { home, cursor } => {
            let stream = if home {
                state.feed.get_home_feed(&cli.user, limit, cursor.as_deref())
            } else {
                state.feed.get_public_posts(limit, cursor.as_deref())
            };

            let holder = StateHolder::new();
            holder.bind(stream);
            print_json(&holder.settled().await)?;
        }
        Command::Post { content } => {
            print_stream(state.feed.create_post(Post::new(&cli.user, content))).await?;
        }
        Command::Search { kind, query } => match kind {
            SearchKind::Recipes => print_stream(state.search.search_recipes(&query, limit)).await?,
            SearchKind::Users => print_stream(state.search.search_users(&query, limit)).await?,
            SearchKind::Posts => print_stream(state.search.search_posts(&query, limit)).await?,
        },
        Command::Dashboard => {
            print_stream(state.admin.get_dashboard_stats()).await?;
        }
        Command::Like { post_id, undo } => {
            let stream = if undo {
                state.feed.unlike_post(&cli.user, &post_id)
            } else {
                state.feed.like_post(&cli.user, &post_id, LikeType::Like)
            };
            print_stream(stream).await?;
        }
    }

    Ok(())
}

/// Prints every envelope the stream emits, one JSON document per line.
async fn print_stream<T: Serialize>(mut stream: ResourceStream<T>) -> Result<()> {
    while let Some(item) = stream.next().await {
        print_json(&item)?;
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}
