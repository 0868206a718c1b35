//! Mexazon CLI - business directory search

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use mexazon_core::config::Config;
use mexazon_core::domain::directory::{
    BusinessDetail, DirectoryRepository, DirectoryRepositoryTrait, DirectoryService,
    MenuCategory, PostalCatalogEntry,
};
use mexazon_core::domain::search::{Page, SearchCriteria, SearchParams, SearchResult, SearchService};
use mexazon_core::storage::{Database, DatabaseConfig};
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Parser)]
#[command(name = "mexazon")]
#[command(author, version, about = "Local business directory search", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Database file (overrides config and MEXAZON_DATABASE)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Search active businesses
    Search {
        /// Text matched against business names and menu categories
        #[arg(long)]
        q: Option<String>,
        /// Administrative area (alcaldía)
        #[arg(short, long)]
        area: Option<String>,
        /// Menu category label (repeatable, any match)
        #[arg(short = 'c', long = "category")]
        categories: Vec<String>,
        /// Zero-based page index
        #[arg(long, allow_negative_numbers = true)]
        page: Option<i64>,
        /// Page size (1-50)
        #[arg(long, allow_negative_numbers = true)]
        size: Option<i64>,
        /// Ordering as `field,direction` (name, rating, reviews, id)
        #[arg(long)]
        sort: Option<String>,
    },

    /// Best rated businesses in a user's area
    Top {
        /// User whose address determines the area
        #[arg(long)]
        user_id: i64,
        #[arg(long, allow_negative_numbers = true)]
        page: Option<i64>,
        #[arg(long, allow_negative_numbers = true)]
        size: Option<i64>,
    },

    /// Show a business with its menu and ratings
    Business {
        /// Business ID
        id: i64,
    },

    /// List the colonias of a postal code
    Postal { postal_code: String },

    /// List menu categories
    Categories,

    /// Apply pending schema migrations
    Migrate,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run health check
    Doctor,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a config value
    Get { key: String },
    /// Set a config value
    Set { key: String, value: String },
    /// List all config values
    List,
    /// Reset to defaults
    Reset,
    /// Show config file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::load();

    let default_filter = match &config {
        Ok(config) => config.log.filter.clone(),
        Err(_) => Config::default().log.filter,
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(&default_filter))?,
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli, config).await {
        if let Some(core) = err.downcast_ref::<mexazon_core::Error>() {
            eprintln!("Error [{}]: {}", core.code(), core);
            if let Some(hint) = core.suggestion() {
                eprintln!("  Try: {}", hint);
            }
            std::process::exit(1);
        }
        return Err(err);
    }
    Ok(())
}

async fn run(cli: Cli, config: anyhow::Result<Config>) -> anyhow::Result<()> {
    let format = cli.format;
    let quiet = cli.quiet;
    let database = cli.database;

    match cli.command {
        Commands::Search {
            q,
            area,
            categories,
            page,
            size,
            sort,
        } => {
            let db = open_database(database.as_deref(), &config?).await?;
            let params = SearchParams {
                q,
                area,
                categories: Some(categories),
                page,
                size,
                sort,
            };
            cmd_search(&db, params, format, quiet).await
        }

        Commands::Top {
            user_id,
            page,
            size,
        } => {
            let db = open_database(database.as_deref(), &config?).await?;
            cmd_top(&db, user_id, page, size, format, quiet).await
        }

        Commands::Business { id } => {
            let db = open_database(database.as_deref(), &config?).await?;
            cmd_business(&db, id, format).await
        }

        Commands::Postal { postal_code } => {
            let db = open_database(database.as_deref(), &config?).await?;
            cmd_postal(&db, &postal_code, format, quiet).await
        }

        Commands::Categories => {
            let db = open_database(database.as_deref(), &config?).await?;
            cmd_categories(&db, format).await
        }

        Commands::Migrate => cmd_migrate(database.as_deref(), &config?, quiet).await,

        Commands::Config { action } => cmd_config(action, quiet),

        Commands::Doctor => cmd_doctor(database.as_deref(), config, quiet).await,
    }
}

/// Database settings from config, with the env var and `--database` applied
fn database_config(path: Option<&Path>, config: &Config) -> DatabaseConfig {
    let mut settings = config.database.resolved();
    if let Some(path) = path {
        settings.path = Some(path.to_path_buf());
    }
    DatabaseConfig::from(&settings)
}

async fn open_database(path: Option<&Path>, config: &Config) -> anyhow::Result<Database> {
    let db_config = database_config(path, config);
    debug!(path = %db_config.path.display(), "Opening database");
    Database::new(db_config).await
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ============================================================================
// Command Implementations
// ============================================================================

async fn cmd_search(
    db: &Database,
    params: SearchParams,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let criteria = SearchCriteria::from(params);
    let page = SearchService::new(db.pool().clone())
        .search(&criteria)
        .await?;
    print_page(&page, format, quiet)
}

async fn cmd_top(
    db: &Database,
    user_id: i64,
    page: Option<i64>,
    size: Option<i64>,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let page = SearchService::new(db.pool().clone())
        .top_in_area(user_id, page, size)
        .await?;

    if page.size == 0 && format == OutputFormat::Text && !quiet {
        println!("No area on file for user {}.", user_id);
        return Ok(());
    }
    print_page(&page, format, quiet)
}

fn print_page(page: &Page<SearchResult>, format: OutputFormat, quiet: bool) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        return print_json(page);
    }

    if page.is_empty() {
        if !quiet {
            println!("No businesses found.");
        }
        return Ok(());
    }

    if !quiet {
        println!(
            "Page {} of {} ({} businesses)",
            page.page + 1,
            page.total_pages(),
            page.total_elements
        );
        println!();
    }
    for result in &page.content {
        println!(
            "  #{:<6} {:<40} {:.1} ({} reviews)",
            result.id, result.name, result.rating, result.review_count
        );
    }
    Ok(())
}

async fn cmd_business(db: &Database, id: i64, format: OutputFormat) -> anyhow::Result<()> {
    let detail = DirectoryService::new(db.pool().clone())
        .business_detail(id)
        .await?;

    if format == OutputFormat::Json {
        return print_json(&detail);
    }
    print_business(&detail);
    Ok(())
}

fn print_business(detail: &BusinessDetail) {
    let profile = &detail.profile;
    println!("{} (#{})", profile.name, profile.business_id);
    if !profile.is_active {
        println!("  [inactive]");
    }
    if let Some(description) = &profile.description {
        println!("  {}", description);
    }

    match (&detail.address, &detail.area) {
        (Some(address), area) => println!(
            "  Address: {} {}, {} {}{}",
            address.street.as_deref().unwrap_or(""),
            address.number.as_deref().unwrap_or(""),
            address.colonia,
            address.postal_code,
            area.as_deref().map(|a| format!(", {}", a)).unwrap_or_default()
        ),
        (None, _) => println!("  Address: (none)"),
    }

    let rating = &detail.rating;
    println!();
    println!(
        "  Rating: {:.1} ({} reviews)",
        rating.average_rating, rating.review_count
    );
    for (star, count) in rating.distribution.iter().rev() {
        println!("    {} stars: {}", star, count);
    }
    if let Some(latest) = rating.latest_review_at {
        println!("    Latest: {}", latest.format("%Y-%m-%d %H:%M:%S"));
    }

    println!();
    if detail.dishes.is_empty() {
        println!("  Menu: (empty)");
    } else {
        println!("  Menu:");
        for dish in &detail.dishes {
            println!(
                "    [{}] {} - ${:.2}",
                dish.category.name, dish.name, dish.price
            );
        }
    }
}

async fn cmd_postal(
    db: &Database,
    postal_code: &str,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let entries: Vec<PostalCatalogEntry> = DirectoryService::new(db.pool().clone())
        .colonias_for_postal_code(postal_code)
        .await?;

    if format == OutputFormat::Json {
        return print_json(&entries);
    }

    if !quiet {
        println!("Postal code {}:", postal_code.trim());
    }
    for entry in &entries {
        println!("  {} ({})", entry.colonia, entry.alcaldia);
    }
    Ok(())
}

async fn cmd_categories(db: &Database, format: OutputFormat) -> anyhow::Result<()> {
    let categories: Vec<MenuCategory> = DirectoryService::new(db.pool().clone())
        .menu_categories()
        .await?;

    if format == OutputFormat::Json {
        return print_json(&categories);
    }
    for category in &categories {
        println!("  {:<4} {}", category.category_id, category.name);
    }
    Ok(())
}

async fn cmd_migrate(path: Option<&Path>, config: &Config, quiet: bool) -> anyhow::Result<()> {
    let db = Database::new(database_config(path, config).no_migrate()).await?;

    let before = db.migration_status().await?;
    if !before.needs_migration {
        if !quiet {
            println!("Database is up to date (v{}).", before.current_version);
        }
        return Ok(());
    }

    db.migrate().await?;
    if !quiet {
        println!(
            "Migrated database from v{} to v{}.",
            before.current_version, before.target_version
        );
    }
    Ok(())
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            let items = config.list()?;
            for (key, value) in items {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

async fn cmd_doctor(
    path: Option<&Path>,
    config: anyhow::Result<Config>,
    quiet: bool,
) -> anyhow::Result<()> {
    if !quiet {
        println!("Mexazon Health Check");
        println!("====================");
        println!();
    }

    let mut all_ok = true;

    // Check configuration
    let config = match config {
        Ok(config) => {
            if !quiet {
                println!("[OK] Configuration: Valid");
            }
            config
        }
        Err(e) => {
            all_ok = false;
            warn!(error = %e, "Configuration could not be loaded");
            if !quiet {
                println!("[!!] Configuration: Error - {}", e);
                println!("     Falling back to defaults");
            }
            Config::default()
        }
    };

    // Check config file location
    if !quiet {
        match Config::config_path() {
            Ok(path) => {
                if path.exists() {
                    println!("[OK] Config file: {}", path.display());
                } else {
                    println!("[--] Config file: {} (using defaults)", path.display());
                }
            }
            Err(e) => {
                println!("[!!] Config file: Error - {}", e);
            }
        }
    }

    // Check database
    match open_database(path, &config).await {
        Ok(db) => match db.health_check().await {
            Ok(()) => {
                if !quiet {
                    println!("[OK] Database: Connected");
                    println!("     Path: {}", db.path().display());
                }

                match db.migration_status().await {
                    Ok(status) if status.needs_migration => {
                        all_ok = false;
                        if !quiet {
                            println!(
                                "[!!] Database: Migrations pending (v{} -> v{})",
                                status.current_version, status.target_version
                            );
                        }
                    }
                    Ok(status) => {
                        if !quiet {
                            println!("[OK] Database: Schema v{}", status.current_version);
                        }
                    }
                    Err(e) => {
                        all_ok = false;
                        if !quiet {
                            println!("[!!] Database: Migration check failed - {}", e);
                        }
                    }
                }

                match DirectoryRepository::new(db.pool().clone())
                    .list_active_businesses()
                    .await
                {
                    Ok(businesses) => {
                        if !quiet {
                            println!("     Active businesses: {}", businesses.len());
                        }
                    }
                    Err(e) => {
                        all_ok = false;
                        if !quiet {
                            println!("[!!] Database: Business lookup failed - {}", e);
                        }
                    }
                }
            }
            Err(e) => {
                all_ok = false;
                if !quiet {
                    println!("[!!] Database: Health check failed - {}", e);
                }
            }
        },
        Err(e) => {
            all_ok = false;
            if !quiet {
                println!("[!!] Database: Failed to initialize - {}", e);
            }
        }
    }

    // Summary
    if !quiet {
        println!();
        if all_ok {
            println!("All checks passed!");
        } else {
            println!("Some checks failed. See above for details.");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_args_parse() {
        let cli = Cli::try_parse_from([
            "mexazon", "search", "--q", "tacos", "--area", "Coyoacán", "-c", "Tacos", "-c",
            "Bebidas", "--page", "-1", "--sort", "rating,desc",
        ])
        .unwrap();

        match cli.command {
            Commands::Search {
                q,
                area,
                categories,
                page,
                size,
                sort,
            } => {
                assert_eq!(q.as_deref(), Some("tacos"));
                assert_eq!(area.as_deref(), Some("Coyoacán"));
                assert_eq!(categories, vec!["Tacos", "Bebidas"]);
                assert_eq!(page, Some(-1));
                assert_eq!(size, None);
                assert_eq!(sort.as_deref(), Some("rating,desc"));
            }
            _ => panic!("expected search command"),
        }
        assert_eq!(cli.format, OutputFormat::Text);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "mexazon",
            "top",
            "--user-id",
            "7",
            "--format",
            "json",
            "--database",
            "/tmp/x.db",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.database, Some(PathBuf::from("/tmp/x.db")));
        assert!(matches!(cli.command, Commands::Top { user_id: 7, .. }));
    }

    #[test]
    fn test_top_requires_user_id() {
        assert!(Cli::try_parse_from(["mexazon", "top"]).is_err());
    }

    #[test]
    fn test_database_flag_overrides_config() {
        let mut config = Config::default();
        config.database.path = Some(PathBuf::from("/var/lib/mexazon/config.db"));
        config.database.max_connections = 3;

        let db_config = database_config(Some(Path::new("/tmp/flag.db")), &config);
        assert_eq!(db_config.path, PathBuf::from("/tmp/flag.db"));
        assert_eq!(db_config.max_connections, 3);
    }
}
