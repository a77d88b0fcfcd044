//! CLI administration tool for urlkeeper.
//!
//! Provides the installer plus commands for managing API keys and domains
//! without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Generate the .env file interactively
//! cargo run --bin admin -- install
//!
//! # Create an admin API key
//! cargo run --bin admin -- api-key generate --name ci
//!
//! # Create a key restricted to one domain
//! cargo run --bin admin -- api-key generate --name blog --domain s.blog.example
//!
//! # List and disable keys
//! cargo run --bin admin -- api-key list --enabled-only
//! cargo run --bin admin -- api-key disable ci
//!
//! # Configure "not found" redirects of a domain
//! cargo run --bin admin -- domain redirects s.blog.example --base-url https://blog.example
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Every command except `install` reads the same variables as the server
//! (`DATABASE_URL`, `SECRET`, `DEFAULT_DOMAIN`, ...).

use urlkeeper::config::{self, Config};
use urlkeeper::install::{DialoguerIo, InstallConfig, Installer};
use urlkeeper::prelude::*;
use urlkeeper::server::connect_database;
use urlkeeper::state::{DynApiKeyService, DynDomainService};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::path::PathBuf;
use std::sync::Arc;

/// CLI tool for managing urlkeeper.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Interactively write the configuration file
    Install {
        /// File to create or update
        #[arg(short, long, default_value = ".env")]
        path: PathBuf,
    },

    /// Manage API keys
    ApiKey {
        #[command(subcommand)]
        action: ApiKeyAction,
    },

    /// Manage domains
    Domain {
        #[command(subcommand)]
        action: DomainAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// API key subcommands.
#[derive(Subcommand)]
enum ApiKeyAction {
    /// Generate a new API key
    Generate {
        /// Key name (e.g., "ci", "Mobile App")
        #[arg(short, long)]
        name: Option<String>,

        /// Expiration date (RFC 3339, e.g. 2030-01-01T00:00:00Z)
        #[arg(short, long)]
        expiration: Option<DateTime<Utc>>,

        /// Only short URLs created with this key will be visible to it
        #[arg(long)]
        author_only: bool,

        /// Restrict the key to a single domain
        #[arg(short, long)]
        domain: Option<String>,
    },

    /// List API keys
    List {
        /// Hide disabled keys
        #[arg(long)]
        enabled_only: bool,
    },

    /// Disable an API key
    Disable {
        /// Key name or ID
        name_or_id: String,
    },
}

/// Domain subcommands.
#[derive(Subcommand)]
enum DomainAction {
    /// List the default domain and every custom domain
    List,

    /// Set the "not found" redirects of a domain
    Redirects {
        /// Domain authority, e.g. s.example.com
        authority: String,

        /// Redirect for visits to the domain root
        #[arg(long)]
        base_url: Option<String>,

        /// Redirect for unknown paths
        #[arg(long)]
        regular_404: Option<String>,

        /// Redirect for unknown or disabled short codes
        #[arg(long)]
        invalid_short_url: Option<String>,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection and apply pending migrations
    Check,
}

/// Services the management commands run against.
struct Services {
    config: Config,
    api_keys: DynApiKeyService,
    domains: Arc<DynDomainService>,
}

impl Services {
    /// Loads the configuration, connects to the database and applies migrations.
    async fn from_env() -> Result<Self> {
        let config = config::load_from_env().context("Failed to load configuration")?;
        let pool = connect_database(&config).await?;
        let repositories = Repositories::postgres(Arc::new(pool));

        Ok(Self {
            api_keys: ApiKeyService::new(repositories.api_keys.clone(), config.secret.clone()),
            domains: Arc::new(DomainService::new(
                repositories.domains.clone(),
                config.default_domain.clone(),
                config.not_found_redirects.clone(),
            )),
            config,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Install { path } => install(path)?,
        Commands::ApiKey { action } => {
            handle_api_key_action(action, &Services::from_env().await?).await?
        }
        Commands::Domain { action } => {
            handle_domain_action(action, &Services::from_env().await?).await?
        }
        Commands::Db { action } => handle_db_action(action, &Services::from_env().await?),
    }

    Ok(())
}

/// Runs the interactive installer against `path`.
fn install(path: PathBuf) -> Result<()> {
    println!("{}", "🛠️  urlkeeper installer".bright_blue().bold());

    let mut config = InstallConfig::load(&path)?;
    Installer::default().run(&mut DialoguerIo, &mut config)?;
    config.save(&path)?;

    println!();
    println!(
        "{} {}",
        "✅ Configuration written to".green().bold(),
        path.display().to_string().cyan()
    );
    println!();

    Ok(())
}

/// Dispatches API key commands.
async fn handle_api_key_action(action: ApiKeyAction, services: &Services) -> Result<()> {
    match action {
        ApiKeyAction::Generate {
            name,
            expiration,
            author_only,
            domain,
        } => generate_api_key(services, name, expiration, author_only, domain).await,
        ApiKeyAction::List { enabled_only } => list_api_keys(services, enabled_only).await,
        ApiKeyAction::Disable { name_or_id } => disable_api_key(services, &name_or_id).await,
    }
}

/// Creates a new API key and prints the raw value once.
///
/// Without a name, one is generated from the current timestamp.
async fn generate_api_key(
    services: &Services,
    name: Option<String>,
    expiration: Option<DateTime<Utc>>,
    author_only: bool,
    domain: Option<String>,
) -> Result<()> {
    println!("{}", "🔑 Generate API Key".bright_blue().bold());
    println!();

    let mut roles = Vec::new();
    if author_only {
        roles.push(ApiKeyRole::AuthoredShortUrls);
    }
    if let Some(authority) = domain {
        let domain = services
            .domains
            .get_or_create(&authority)
            .await
            .with_context(|| format!("Failed to resolve domain '{authority}'"))?;
        roles.push(ApiKeyRole::for_domain(&domain));
    }

    let name = name.unwrap_or_else(|| format!("key-{}", Utc::now().format("%Y%m%d%H%M%S")));

    let (api_key, raw_key) = services
        .api_keys
        .create(&name, expiration, roles)
        .await
        .context("Failed to create API key")?;

    println!("{}", "Key details:".bright_white().bold());
    println!("  Name:    {}", api_key.name.cyan());
    println!("  Roles:   {}", describe_roles(&api_key));
    println!(
        "  Expires: {}",
        api_key
            .expires_at
            .map_or_else(|| "never".to_string(), |e| e.to_rfc3339())
            .bright_black()
    );
    println!("  Key:     {}", raw_key.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "⚠️  IMPORTANT: Save this key now! You won't be able to see it again."
            .red()
            .bold()
    );
    println!();
    println!("{}", "Example:".bright_white());
    println!(
        "  curl -H \"Authorization: Bearer {}\" http://localhost:3000/api/short-urls",
        raw_key.bright_yellow()
    );
    println!();

    Ok(())
}

/// Lists API keys with status indicators.
///
/// # Output Format
///
/// ```text
/// 📋 API Keys
///
///   ID  Name                     Roles                          Expires              Status
///   ──────────────────────────────────────────────────────────────────────────────────────
///   1   ci                       admin                          never                ENABLED
///   2   blog                     domain:s.blog.example          2030-01-01 00:00     DISABLED
/// ```
async fn list_api_keys(services: &Services, enabled_only: bool) -> Result<()> {
    println!("{}", "📋 API Keys".bright_blue().bold());
    println!();

    let api_keys = services
        .api_keys
        .list(enabled_only)
        .await
        .context("Failed to list API keys")?;

    if api_keys.is_empty() {
        println!("{}", "  No API keys found".yellow());
        println!();
        println!(
            "  Create one with: {} admin -- api-key generate",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<3} {:<24} {:<30} {:<20} {:<10}",
        "ID".bright_white().bold(),
        "Name".bright_white().bold(),
        "Roles".bright_white().bold(),
        "Expires".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(90).bright_black());

    for api_key in &api_keys {
        let status = if !api_key.enabled {
            "DISABLED".red()
        } else if api_key.is_expired() {
            "EXPIRED".yellow()
        } else {
            "ENABLED".green()
        };

        let expires = api_key
            .expires_at
            .map_or_else(|| "never".to_string(), |e| e.format("%Y-%m-%d %H:%M").to_string());

        println!(
            "  {:<3} {:<24} {:<30} {:<20} {}",
            api_key.id.to_string().bright_black(),
            api_key.name.cyan(),
            describe_roles(api_key),
            expires.bright_black(),
            status
        );
    }

    println!();
    println!(
        "  Total: {}",
        api_keys.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Disables a key by name or ID after confirmation.
async fn disable_api_key(services: &Services, name_or_id: &str) -> Result<()> {
    println!("{}", "🔒 Disable API Key".bright_blue().bold());
    println!();

    let confirmed = Confirm::new()
        .with_prompt(format!("Disable API key \"{name_or_id}\"?"))
        .default(false)
        .interact()?;

    if !confirmed {
        println!("{}", "❌ Cancelled".red());
        return Ok(());
    }

    let api_key = services
        .api_keys
        .disable(name_or_id)
        .await
        .context("Failed to disable API key")?;

    println!();
    println!(
        "{} {}",
        "✅ API key disabled:".green().bold(),
        api_key.name.cyan()
    );
    println!();

    Ok(())
}

fn describe_roles(api_key: &ApiKey) -> String {
    if api_key.is_admin() {
        return "admin".to_string();
    }

    api_key
        .roles
        .iter()
        .map(|role| match role {
            ApiKeyRole::AuthoredShortUrls => "author-only".to_string(),
            ApiKeyRole::DomainSpecific { authority, .. } => format!("domain:{authority}"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Dispatches domain commands.
async fn handle_domain_action(action: DomainAction, services: &Services) -> Result<()> {
    match action {
        DomainAction::List => {
            println!("{}", "🌐 Domains".bright_blue().bold());
            println!();

            let domains = services
                .domains
                .list_domains(None)
                .await
                .context("Failed to list domains")?;

            for domain in &domains {
                let marker = if domain.is_default() {
                    " (default)".bright_green().to_string()
                } else {
                    String::new()
                };
                println!("  {}{}", domain.authority().cyan(), marker);

                let redirects = domain.redirects();
                print_redirect("base URL", redirects.base_url_redirect.as_deref());
                print_redirect("regular 404", redirects.regular_404_redirect.as_deref());
                print_redirect(
                    "invalid short URL",
                    redirects.invalid_short_url_redirect.as_deref(),
                );
            }
            println!();
        }
        DomainAction::Redirects {
            authority,
            base_url,
            regular_404,
            invalid_short_url,
        } => {
            if authority.eq_ignore_ascii_case(services.domains.default_domain()) {
                anyhow::bail!(
                    "Redirects of the default domain are set through DEFAULT_*_REDIRECT variables"
                );
            }

            for url in [&base_url, &regular_404, &invalid_short_url]
                .into_iter()
                .flatten()
            {
                url::Url::parse(url).with_context(|| format!("'{url}' is not a valid URL"))?;
            }

            let domain = services
                .domains
                .configure_not_found_redirects(
                    &authority,
                    NotFoundRedirects::new(base_url, regular_404, invalid_short_url),
                )
                .await
                .context("Failed to save redirects")?;

            println!(
                "{} {}",
                "✅ Redirects saved for".green().bold(),
                domain.authority.cyan()
            );
        }
    }

    Ok(())
}

fn print_redirect(label: &str, url: Option<&str>) {
    println!(
        "    {:<18} {}",
        label.bright_black(),
        url.unwrap_or("-").bright_white()
    );
}

/// Handles database diagnostic commands.
///
/// The connection and migrations already ran while building the services.
fn handle_db_action(action: DbAction, services: &Services) {
    match action {
        DbAction::Check => {
            let url = services.config.database_url.as_deref().unwrap_or_default();
            println!(
                "{} {}",
                "✅ Database connection OK:".green().bold(),
                config::mask_connection_string(url).bright_white()
            );
        }
    }
}
