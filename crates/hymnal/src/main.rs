use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use hymnal::clock::SystemClock;
use hymnal::local::FileKeyValueStore;
#[cfg(feature = "sqlite")]
use hymnal::local::SqliteKeyValueStore;
use hymnal::remote::{InMemoryDocumentStore, RestDocumentStore};
use hymnal::{Config, HymnalContext};
use hymnal_core::access::{AuthState, AuthUser, UserRole};
use hymnal_core::catalog::{SongQuery, SongSortOrder};
use hymnal_core::favorites::FavoriteSet;
use hymnal_core::storage::{DocumentStore, FavoritesStore, KeyValueStore};

/// Hymnal - Browse LPMI songs, the Bible and your favorites
#[derive(Parser, Debug)]
#[command(name = "hymnal")]
#[command(version, about, long_about = None)]
struct Cli {
    /// JSON export used as the remote store when no remote URL is set
    #[arg(long, global = true)]
    seed: Option<PathBuf>,

    /// Sign in as this user
    #[arg(long, global = true, env = "HYMNAL_UID")]
    uid: Option<String>,

    /// Override the role read from the user record
    #[arg(long, global = true)]
    role: Option<String>,

    /// Use a guest session even if a uid is set
    #[arg(long, global = true)]
    anonymous: bool,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Base URL of the remote database
    #[arg(long, global = true, env = "HYMNAL_REMOTE_URL")]
    remote_url: Option<String>,

    /// Path of the local key-value store
    #[arg(long, global = true, env = "HYMNAL_LOCAL_STORE")]
    local_store: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List active collections with your access to each
    Collections,
    /// List the songs of a collection
    Songs {
        collection: String,
        #[arg(long, default_value = "number")]
        sort: SongSortOrder,
    },
    /// Show one song
    Song { collection: String, number: String },
    /// Search song titles and lyrics
    Search {
        text: String,
        #[arg(long)]
        collection: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        sort: Option<SongSortOrder>,
    },
    /// Toggle a favorite
    Favorite {
        number: String,
        /// Collection context; global when omitted
        #[arg(long)]
        collection: Option<String>,
    },
    /// List your favorite songs
    Favorites,
    /// Read the Bible
    Bible {
        #[command(subcommand)]
        command: BibleCommand,
    },
    /// Read or write a local preference
    Pref {
        #[command(subcommand)]
        command: PrefCommand,
    },
    /// Remove cached lists and premium status from the local store
    ClearCache,
    /// Poll the remote store and print connectivity changes
    Watch,
}

#[derive(Subcommand, Debug)]
enum BibleCommand {
    Books,
    Chapter {
        book: String,
        chapter: u32,
    },
    Search {
        text: String,
        #[arg(long)]
        book: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
    Bookmarks,
    Bookmark {
        book: String,
        chapter: u32,
        verse: u32,
        #[arg(long)]
        note: Option<String>,
    },
    Unbookmark {
        id: Uuid,
    },
}

#[derive(Subcommand, Debug)]
enum PrefCommand {
    Get { key: String },
    Set { key: String, value: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_format);

    let mut config = Config::from_env();
    if let Some(url) = cli.remote_url.clone() {
        config.remote_url = Some(url);
    }
    if let Some(path) = cli.local_store.clone() {
        config.local_store_path = path;
    }

    let remote = open_remote(&config, cli.seed.as_deref()).await?;
    let local = open_local(&config).await?;
    let ctx = HymnalContext::build(config, remote, local, Arc::new(SystemClock));
    let auth = resolve_auth(&ctx, &cli).await;

    tracing::info!(
        signed_in = auth.is_signed_in(),
        role = ?auth.role(),
        "Session ready"
    );

    run(&ctx, &auth, cli.command).await
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "hymnal=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

async fn open_remote(config: &Config, seed: Option<&Path>) -> Result<Arc<dyn DocumentStore>> {
    if let Some(url) = &config.remote_url {
        tracing::info!(url = %url, "Using remote database");
        let store = RestDocumentStore::from_url(url, config.remote_auth.clone())?;
        return Ok(Arc::new(store));
    }

    let store = match seed {
        Some(path) => {
            tracing::info!(seed = %path.display(), "Using in-memory store from seed");
            InMemoryDocumentStore::from_json_file(path).await?
        }
        None => {
            tracing::warn!("No remote URL or seed file; the catalog is empty");
            InMemoryDocumentStore::new()
        }
    };
    Ok(Arc::new(store))
}

#[cfg(not(feature = "sqlite"))]
async fn open_local(config: &Config) -> Result<Arc<dyn KeyValueStore>> {
    let store = FileKeyValueStore::open(&config.local_store_path)
        .await
        .with_context(|| format!("opening local store {}", config.local_store_path))?;
    Ok(Arc::new(store))
}

#[cfg(feature = "sqlite")]
async fn open_local(config: &Config) -> Result<Arc<dyn KeyValueStore>> {
    if config.local_store_path.ends_with(".json") {
        let store = FileKeyValueStore::open(&config.local_store_path).await?;
        return Ok(Arc::new(store));
    }
    let store = SqliteKeyValueStore::new(&config.local_store_path)
        .await
        .with_context(|| format!("opening local store {}", config.local_store_path))?;
    Ok(Arc::new(store))
}

async fn resolve_auth(ctx: &HymnalContext, cli: &Cli) -> AuthState {
    let Some(uid) = cli.uid.as_deref() else {
        return AuthState::Anonymous;
    };

    let user = AuthUser::new(uid);
    if cli.anonymous {
        return AuthState::authenticated(user.anonymous(), UserRole::User);
    }
    match cli.role.as_deref() {
        Some(role) => AuthState::authenticated(user, UserRole::parse_lenient(role)),
        None => ctx.sign_in(user).await,
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn require_uid(auth: &AuthState) -> Result<&str> {
    auth.uid()
        .context("this command needs a signed-in user (--uid)")
}

async fn run(ctx: &HymnalContext, auth: &AuthState, command: Command) -> Result<()> {
    match command {
        Command::Collections => print_json(&ctx.songs.collections(auth).await?),
        Command::Songs { collection, sort } => {
            let songs = ctx.songs.get_all(&collection, auth, sort).await?;
            let favorites = match auth.uid() {
                Some(uid) => ctx.favorites.load(uid).await?,
                None => FavoriteSet::new(),
            };
            print_json(&ctx.songs.annotate(songs, &favorites))
        }
        Command::Song { collection, number } => {
            print_json(&ctx.songs.get_by_id(&collection, &number, auth).await?)
        }
        Command::Search {
            text,
            collection,
            limit,
            sort,
        } => {
            let mut query =
                SongQuery::new(text).with_limit(limit.unwrap_or(ctx.config.search_limit));
            if let Some(collection) = collection {
                query = query.in_collection(collection);
            }
            print_json(&ctx.songs.search(&query, auth, sort).await?)
        }
        Command::Favorite { number, collection } => {
            let uid = require_uid(auth)?;
            let is_favorite = ctx
                .favorites
                .toggle(uid, &number, collection.as_deref())
                .await?;
            print_json(&serde_json::json!({ "number": number, "is_favorite": is_favorite }))
        }
        Command::Favorites => print_json(&ctx.songs.favorite_songs(auth).await?),
        Command::Bible { command } => run_bible(ctx, auth, command).await,
        Command::Pref { command } => run_pref(ctx, command).await,
        Command::ClearCache => {
            let removed = ctx.clear_cache().await?;
            print_json(&serde_json::json!({ "removed": removed }))
        }
        Command::Watch => watch(ctx, auth).await,
    }
}

async fn run_bible(ctx: &HymnalContext, auth: &AuthState, command: BibleCommand) -> Result<()> {
    match command {
        BibleCommand::Books => print_json(&ctx.bible.books(auth).await?),
        BibleCommand::Chapter { book, chapter } => {
            print_json(&ctx.bible.chapter(&book, chapter, auth).await?)
        }
        BibleCommand::Search { text, book, limit } => {
            print_json(&ctx.bible.search(&text, book.as_deref(), limit, auth).await?)
        }
        BibleCommand::Bookmarks => print_json(&ctx.bible.bookmarks(auth).await?),
        BibleCommand::Bookmark {
            book,
            chapter,
            verse,
            note,
        } => print_json(
            &ctx.bible
                .add_bookmark(auth, &book, chapter, verse, note)
                .await?,
        ),
        BibleCommand::Unbookmark { id } => {
            if !ctx.bible.remove_bookmark(auth, id).await? {
                bail!("no bookmark {id}");
            }
            print_json(&serde_json::json!({ "removed": id }))
        }
    }
}

async fn run_pref(ctx: &HymnalContext, command: PrefCommand) -> Result<()> {
    match command {
        PrefCommand::Get { key } => print_json(&ctx.local.get(&key).await?),
        PrefCommand::Set { key, value } => {
            let prefs = &ctx.preferences;
            if let Ok(flag) = value.parse::<bool>() {
                prefs.set_bool(&key, flag).await?;
            } else if let Ok(int) = value.parse::<i64>() {
                prefs.set_int(&key, int).await?;
            } else if let Ok(double) = value.parse::<f64>() {
                prefs.set_double(&key, double).await?;
            } else {
                prefs.set_string(&key, value).await?;
            }
            print_json(&ctx.local.get(&key).await?)
        }
    }
}

async fn watch(ctx: &HymnalContext, auth: &AuthState) -> Result<()> {
    let monitor = ctx.connectivity_monitor(auth.clone());
    let mut status = monitor.subscribe();
    let handle = monitor.clone().spawn(ctx.subscribe_shutdown());

    loop {
        tokio::select! {
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = status.borrow_and_update().clone();
                println!("{}", serde_json::to_string(&current)?);
            }
            _ = signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, shutting down...");
                break;
            }
        }
    }

    ctx.signal_shutdown();
    handle.await?;
    Ok(())
}
