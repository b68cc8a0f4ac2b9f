//! cinedeck - browse TMDB movie listings from the terminal.

/// Application configuration (TOML).
mod config;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{AppConfig, resolve_config_path};
use cinedeck_api::tmdb::{Category, Movie, TmdbClient};
use cinedeck_core::accounts::RegistrationForm;
use cinedeck_core::catalog::{CategoryPages, HomeFeed, PageOutcome, fetch_details};
use cinedeck_core::favorites::Favorites;
use cinedeck_core::locale::{LanguageContext, Locale};
use cinedeck_core::session::{ActiveUser, AuthContext};
use cinedeck_db::SqliteStore;

/// Movies shown per lane by `browse`.
const BROWSE_PREVIEW: usize = 5;

/// CLI argument parser.
#[derive(Parser)]
#[command(name = "cinedeck", about, version)]
struct Cli {
    /// Override config/data directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Show the first movies of every home category.
    Browse(LanguageArgs),
    /// Page through one category (top-rated, upcoming, now-playing, popular).
    Category(CategoryArgs),
    /// Show the details of a movie.
    Movie(MovieArgs),
    /// Search the loaded top-rated and upcoming movies by title.
    Search(SearchArgs),
    /// Manage favorite movies.
    Favorites(FavoritesCommand),
    /// Show or change the content language.
    Language(LanguageCommand),
    /// Sign in with a TMDB account.
    Login(LoginArgs),
    /// Sign out.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Manage local accounts.
    Account(AccountCommand),
    /// Print shell completions.
    Completions(CompletionsArgs),
}

/// Language override shared by network commands.
#[derive(clap::Args)]
struct LanguageArgs {
    /// Language tag (e.g. "en", "tr-TR"). Defaults to the saved language.
    #[arg(long)]
    language: Option<String>,
}

/// Arguments for the `category` subcommand.
#[derive(clap::Args)]
struct CategoryArgs {
    /// Category slug.
    category: Category,
    /// Number of pages to load.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=50))]
    pages: u32,
    #[command(flatten)]
    lang: LanguageArgs,
}

/// Arguments for the `movie` subcommand.
#[derive(clap::Args)]
struct MovieArgs {
    /// TMDB movie ID.
    id: u64,
    #[command(flatten)]
    lang: LanguageArgs,
}

/// Arguments for the `search` subcommand.
#[derive(clap::Args)]
struct SearchArgs {
    /// Case-insensitive title fragment.
    query: String,
    #[command(flatten)]
    lang: LanguageArgs,
}

/// Arguments for the `favorites` subcommand.
#[derive(clap::Args)]
struct FavoritesCommand {
    /// Favorites subcommand to run.
    #[command(subcommand)]
    command: FavoritesSubcommands,
}

/// Available favorites subcommands.
#[derive(Subcommand)]
enum FavoritesSubcommands {
    /// List favorites.
    List,
    /// Add a movie to the favorites.
    Add(MovieArgs),
    /// Remove a movie from the favorites.
    Remove {
        /// TMDB movie ID.
        id: u64,
    },
}

/// Arguments for the `language` subcommand.
#[derive(clap::Args)]
struct LanguageCommand {
    /// Language subcommand to run.
    #[command(subcommand)]
    command: LanguageSubcommands,
}

/// Available language subcommands.
#[derive(Subcommand)]
enum LanguageSubcommands {
    /// Print the saved language.
    Show,
    /// Save a new language.
    Set {
        /// Language tag (e.g. "en", "tr-TR").
        tag: String,
    },
}

/// Arguments for the `login` subcommand.
#[derive(clap::Args)]
struct LoginArgs {
    /// TMDB username.
    #[arg(long, env = "TMDB_USERNAME")]
    username: String,
    /// TMDB password.
    #[arg(long, env = "TMDB_PASSWORD", hide_env_values = true)]
    password: String,
}

/// Arguments for the `account` subcommand.
#[derive(clap::Args)]
struct AccountCommand {
    /// Account subcommand to run.
    #[command(subcommand)]
    command: AccountSubcommands,
}

/// Available account subcommands.
#[derive(Subcommand)]
enum AccountSubcommands {
    /// Register a local account.
    Register(RegisterArgs),
    /// Sign in with a local account.
    Login {
        /// Account e-mail.
        #[arg(long)]
        email: String,
        /// Account password.
        #[arg(long, env = "CINEDECK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Change the name and e-mail of the signed-in user.
    Update {
        /// New display name.
        #[arg(long)]
        name: String,
        /// New e-mail.
        #[arg(long, default_value = "")]
        email: String,
    },
    /// Change the password of the signed-in local user.
    Passwd {
        /// Current password.
        #[arg(long)]
        current: String,
        /// New password.
        #[arg(long)]
        new: String,
    },
    /// Delete the signed-in local account and sign out.
    Delete,
}

/// Arguments for the `account register` subcommand.
#[derive(clap::Args)]
struct RegisterArgs {
    /// Full name.
    #[arg(long)]
    name: String,
    /// E-mail address.
    #[arg(long)]
    email: String,
    /// Password (8+ characters with upper, lower and digit).
    #[arg(long)]
    password: String,
    /// Password confirmation.
    #[arg(long)]
    confirm_password: String,
    /// Accept the terms of use.
    #[arg(long)]
    accept_terms: bool,
}

/// Arguments for the `completions` subcommand.
#[derive(clap::Args)]
struct CompletionsArgs {
    /// Target shell.
    shell: Shell,
}

/// Builds a `TmdbClient` from `TMDB_API_KEY` or the `[tmdb]` config section.
///
/// # Errors
///
/// Returns an error if no API key is configured, the config is invalid, or
/// the client fails to build.
#[instrument(skip_all)]
fn build_tmdb_client(dir: Option<&PathBuf>) -> Result<TmdbClient> {
    let config_path = resolve_config_path(dir)?;
    let config = AppConfig::load(&config_path)?;

    let api_key = std::env::var("TMDB_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty())
        .or(config.tmdb.api_key.clone())
        .context("TMDB API key is required: set TMDB_API_KEY or tmdb.api_key in config.toml")?;

    let mut builder = TmdbClient::builder().api_key(api_key).user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));
    if let Some(base_url) = config.tmdb.base_url()? {
        builder = builder.base_url(base_url);
    }
    builder.build().context("failed to build TMDB client")
}

/// Opens the on-device store.
///
/// # Errors
///
/// Returns an error if the database cannot be opened.
fn open_store(dir: Option<&PathBuf>) -> Result<SqliteStore> {
    SqliteStore::open(dir).context("failed to open local storage")
}

/// Resolves `--language`, falling back to the saved language.
///
/// # Errors
///
/// Returns an error if the tag is invalid or the saved language cannot be read.
fn resolve_locale(store: &SqliteStore, args: &LanguageArgs) -> Result<Locale> {
    if let Some(tag) = args.language.as_deref() {
        return Locale::parse(tag).context("invalid --language");
    }
    let ctx = LanguageContext::load(store).context("failed to read saved language")?;
    Ok(ctx.current().clone())
}

/// Logs one movie per line.
fn log_movies<'a>(movies: impl IntoIterator<Item = &'a Movie>) {
    for movie in movies {
        tracing::info!(
            "{}\t{:.1}\t{}\t{}",
            movie.id,
            movie.vote_average,
            movie.release_date.as_deref().unwrap_or("-"),
            movie.title,
        );
    }
}

/// Runs the `browse` subcommand.
///
/// # Errors
///
/// Returns an error if every category failed to load.
#[instrument(skip_all)]
async fn run_browse(args: &LanguageArgs, dir: Option<&PathBuf>) -> Result<()> {
    let client = build_tmdb_client(dir)?;
    let store = open_store(dir)?;
    let locale = resolve_locale(&store, args)?;

    let mut feed = HomeFeed::new();
    let results = feed.refresh(&client, &locale).await;

    let mut failures = 0_usize;
    for (category, result) in results {
        tracing::info!("== {category} ==");
        match result {
            Ok(_) => log_movies(feed.lane(category).items().iter().take(BROWSE_PREVIEW)),
            Err(e) => {
                failures = failures.saturating_add(1);
                tracing::info!("({})", e.user_message());
            }
        }
    }
    if failures == Category::ALL.len() {
        bail!("no category could be loaded");
    }
    Ok(())
}

/// Runs the `category` subcommand.
///
/// # Errors
///
/// Returns an error if the first page cannot be loaded.
#[instrument(skip_all)]
async fn run_category(args: &CategoryArgs, dir: Option<&PathBuf>) -> Result<()> {
    let client = build_tmdb_client(dir)?;
    let store = open_store(dir)?;
    let locale = resolve_locale(&store, &args.lang)?;

    let mut pages = CategoryPages::new(args.category);
    pages
        .reset(&client, &locale)
        .await
        .with_context(|| format!("failed to load {}", args.category))?;
    for _ in 1..args.pages {
        match pages.load_more(&client).await {
            Ok(PageOutcome::Skipped) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::info!("({})", e.user_message());
                break;
            }
        }
    }

    log_movies(pages.items());
    tracing::info!(
        "Page {} ({} movies, {})",
        pages.current_page(),
        pages.items().len(),
        if pages.has_more() { "more available" } else { "end of list" },
    );
    Ok(())
}

/// Runs the `movie` subcommand.
///
/// # Errors
///
/// Returns an error if the details cannot be loaded.
#[instrument(skip_all)]
async fn run_movie(args: &MovieArgs, dir: Option<&PathBuf>) -> Result<()> {
    let client = build_tmdb_client(dir)?;
    let store = open_store(dir)?;
    let locale = resolve_locale(&store, &args.lang)?;

    let details = fetch_details(&client, args.id, &locale)
        .await
        .with_context(|| format!("failed to load movie {}", args.id))?;
    let favorites = Favorites::open(&store).context("failed to read favorites")?;

    tracing::info!("{} ({})", details.title, details.release_date.as_deref().unwrap_or("-"));
    if let Some(tagline) = details.tagline.as_deref().filter(|t| !t.is_empty()) {
        tracing::info!("\"{tagline}\"");
    }
    let genres: Vec<&str> = details.genres.iter().map(|g| g.name.as_str()).collect();
    tracing::info!(
        "Rating: {:.1} ({} votes)\tRuntime: {}\tGenres: {}",
        details.vote_average,
        details.vote_count,
        details
            .runtime
            .map_or_else(|| String::from("-"), |r| format!("{r} min")),
        genres.join(", "),
    );
    if let Some(overview) = details.overview.as_deref() {
        tracing::info!("{overview}");
    }
    if favorites.contains(details.id) {
        tracing::info!("In favorites");
    }
    Ok(())
}

/// Runs the `search` subcommand.
///
/// # Errors
///
/// Returns an error if the API client cannot be built.
#[instrument(skip_all)]
async fn run_search(args: &SearchArgs, dir: Option<&PathBuf>) -> Result<()> {
    let client = build_tmdb_client(dir)?;
    let store = open_store(dir)?;
    let locale = resolve_locale(&store, &args.lang)?;

    let mut feed = HomeFeed::new();
    for (category, result) in feed.refresh(&client, &locale).await {
        if let Err(e) = result {
            tracing::info!("({category}: {})", e.user_message());
        }
    }
    let hits = feed.search(&args.query);
    log_movies(hits.iter().copied());
    tracing::info!("Total: {} movies", hits.len());
    Ok(())
}

/// Runs the `favorites list` subcommand.
///
/// # Errors
///
/// Returns an error if the favorites cannot be read.
fn run_favorites_list(dir: Option<&PathBuf>) -> Result<()> {
    let store = open_store(dir)?;
    let favorites = Favorites::open(&store).context("failed to read favorites")?;
    if favorites.is_empty() {
        tracing::info!("No favorites yet");
        return Ok(());
    }
    log_movies(favorites.items());
    tracing::info!("Total: {} favorites", favorites.len());
    Ok(())
}

/// Runs the `favorites add` subcommand.
///
/// # Errors
///
/// Returns an error if the movie cannot be loaded or the favorites cannot
/// be saved.
#[instrument(skip_all)]
async fn run_favorites_add(args: &MovieArgs, dir: Option<&PathBuf>) -> Result<()> {
    let client = build_tmdb_client(dir)?;
    let store = open_store(dir)?;
    let locale = resolve_locale(&store, &args.lang)?;
    let mut favorites = Favorites::open(&store).context("failed to read favorites")?;

    if favorites.contains(args.id) {
        tracing::info!("Movie {} is already a favorite", args.id);
        return Ok(());
    }
    let details = fetch_details(&client, args.id, &locale)
        .await
        .with_context(|| format!("failed to load movie {}", args.id))?;
    let title = details.title.clone();
    favorites
        .add(Movie::from(details))
        .context("failed to save favorites")?;
    tracing::info!("Added {title} to favorites");
    Ok(())
}

/// Runs the `favorites remove` subcommand.
///
/// # Errors
///
/// Returns an error if the favorites cannot be read or saved.
fn run_favorites_remove(id: u64, dir: Option<&PathBuf>) -> Result<()> {
    let store = open_store(dir)?;
    let mut favorites = Favorites::open(&store).context("failed to read favorites")?;
    if favorites.remove(id).context("failed to save favorites")? {
        tracing::info!("Removed movie {id} from favorites");
    } else {
        tracing::info!("Movie {id} is not a favorite");
    }
    Ok(())
}

/// Runs the `language show` / `language set` subcommands.
///
/// # Errors
///
/// Returns an error if the tag is invalid or storage fails.
fn run_language(cmd: &LanguageSubcommands, dir: Option<&PathBuf>) -> Result<()> {
    let store = open_store(dir)?;
    let mut ctx = LanguageContext::load(&store).context("failed to read saved language")?;
    match cmd {
        LanguageSubcommands::Show => tracing::info!("{}", ctx.current()),
        LanguageSubcommands::Set { tag } => {
            let locale = Locale::parse(tag).context("invalid language tag")?;
            if ctx.change(locale).context("failed to save language")? {
                tracing::info!("Language set to {}", ctx.current());
            } else {
                tracing::info!("Language is already {}", ctx.current());
            }
        }
    }
    Ok(())
}

/// Runs the `login` subcommand.
///
/// # Errors
///
/// Returns an error if any login step fails.
#[instrument(skip_all)]
async fn run_login(args: &LoginArgs, dir: Option<&PathBuf>) -> Result<()> {
    let client = build_tmdb_client(dir)?;
    let store = open_store(dir)?;
    let mut auth = AuthContext::restore(&store).context("failed to read active user")?;
    let identity = auth
        .login_with_tmdb(&client, &args.username, &args.password)
        .await
        .context("TMDB login failed")?;
    tracing::info!("Signed in as {}", identity.username);
    Ok(())
}

/// Runs the `logout` subcommand.
///
/// # Errors
///
/// Returns an error if storage fails.
fn run_logout(dir: Option<&PathBuf>) -> Result<()> {
    let store = open_store(dir)?;
    let mut auth = AuthContext::restore(&store).context("failed to read active user")?;
    auth.logout().context("failed to sign out")?;
    tracing::info!("Signed out");
    Ok(())
}

/// Runs the `whoami` subcommand.
///
/// # Errors
///
/// Returns an error if storage fails.
fn run_whoami(dir: Option<&PathBuf>) -> Result<()> {
    let store = open_store(dir)?;
    let auth = AuthContext::restore(&store).context("failed to read active user")?;
    match auth.active() {
        None => tracing::info!("Not signed in"),
        Some(ActiveUser::Tmdb(profile)) => tracing::info!(
            "{} (TMDB user {}, since {})",
            profile.full_name,
            profile.session.username,
            profile.session.created_at.format("%Y-%m-%d %H:%M:%S"),
        ),
        Some(ActiveUser::Local(profile)) => tracing::info!(
            "{} <{}> (local account {})",
            profile.full_name,
            profile.email,
            profile.id,
        ),
    }
    Ok(())
}

/// Runs the `account` subcommands.
///
/// # Errors
///
/// Returns an error if validation, credentials or storage fail.
fn run_account(cmd: &AccountSubcommands, dir: Option<&PathBuf>) -> Result<()> {
    let store = open_store(dir)?;
    let mut auth = AuthContext::restore(&store).context("failed to read active user")?;
    match cmd {
        AccountSubcommands::Register(args) => {
            let form = RegistrationForm {
                full_name: args.name.clone(),
                email: args.email.clone(),
                password: args.password.clone(),
                confirm_password: args.confirm_password.clone(),
                accept_terms: args.accept_terms,
            };
            let profile = auth.register(&form).context("registration failed")?;
            tracing::info!("Registered {} <{}>", profile.full_name, profile.email);
        }
        AccountSubcommands::Login { email, password } => {
            let profile = auth.login(email, password).context("sign-in failed")?;
            tracing::info!("Signed in as {}", profile.full_name);
        }
        AccountSubcommands::Update { name, email } => {
            let user = auth
                .update_profile(name, email)
                .context("profile update failed")?;
            tracing::info!("Profile updated: {}", user.display_name());
        }
        AccountSubcommands::Passwd { current, new } => {
            auth.change_password(current, new)
                .context("password change failed")?;
            tracing::info!("Password changed");
        }
        AccountSubcommands::Delete => {
            auth.delete_account().context("account deletion failed")?;
            tracing::info!("Account deleted");
        }
    }
    Ok(())
}

/// Installs the tracing subscriber (plus an OTLP exporter when
/// `OTEL_EXPORTER_OTLP_ENDPOINT` is set and the `otel` feature is on).
fn init_tracing() {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let dir = cli.dir.as_ref();
    match cli.command {
        Commands::Browse(args) => run_browse(&args, dir).await,
        Commands::Category(args) => run_category(&args, dir).await,
        Commands::Movie(args) => run_movie(&args, dir).await,
        Commands::Search(args) => run_search(&args, dir).await,
        Commands::Favorites(fav) => match fav.command {
            FavoritesSubcommands::List => run_favorites_list(dir),
            FavoritesSubcommands::Add(args) => run_favorites_add(&args, dir).await,
            FavoritesSubcommands::Remove { id } => run_favorites_remove(id, dir),
        },
        Commands::Language(lang) => run_language(&lang.command, dir),
        Commands::Login(args) => run_login(&args, dir).await,
        Commands::Logout => run_logout(dir),
        Commands::Whoami => run_whoami(dir),
        Commands::Account(account) => run_account(&account.command, dir),
        Commands::Completions(args) => {
            clap_complete::generate(
                args.shell,
                &mut Cli::command(),
                "cinedeck",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}
