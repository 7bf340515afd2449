//! Powerdealer CLI - terminal front end for the Powerdealer business portal
//!
//! # Usage
//!
//! ```bash
//! # Create an account and its business
//! powerdealer signup --username ana --email ana@example.com --password s3cret \
//!     --business-name "Ana's Parts" --business-email parts@example.com
//!
//! # Start a session
//! powerdealer login --username ana --password s3cret
//!
//! # Show where the session stands
//! powerdealer status
//!
//! # Edit the business profile
//! powerdealer business update --phone "+1 555 0100"
//! ```

use std::collections::BTreeMap;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use powerdealer_client::api::token::decode_claims;
use powerdealer_client::api::types::{Business, BusinessPatch, SignupRequest};
use powerdealer_client::api::ApiError;
use powerdealer_client::router::Route;
use powerdealer_client::storage::TokenStorage;
use powerdealer_client::{AppContext, Config};

#[derive(Parser)]
#[command(name = "powerdealer")]
#[command(author, version, about = "Powerdealer business portal client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account together with its business
    Signup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        business_name: String,
        #[arg(long)]
        business_email: String,
        #[arg(long)]
        business_phone: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Log in and persist the session tokens
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Forget the persisted session
    Logout,
    /// Restore the session and show the current user
    Status,
    /// Navigate to a page through the auth guard
    Open {
        /// Location such as `/dashboard`
        path: String,
    },
    /// Business profile
    Business {
        #[command(subcommand)]
        action: BusinessAction,
    },
}

#[derive(Subcommand)]
enum BusinessAction {
    /// Fetch the business profile
    Show,
    /// Update fields of the business profile
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_tracing(&config.log_level);

    let cli = Cli::parse();

    let ctx = AppContext::new(config).context("Failed to open session storage")?;
    ctx.start();

    let result = run(&ctx, cli.command).await;
    ctx.shutdown().await;

    if let Err(e) = result {
        match e.downcast_ref::<ApiError>() {
            Some(api_err) => report_api_error(api_err),
            None => eprintln!("Error: {e:#}"),
        }
        std::process::exit(1);
    }
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(log_level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

async fn run(ctx: &AppContext, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Signup {
            username,
            email,
            password,
            business_name,
            business_email,
            business_phone,
            description,
        } => {
            let request = SignupRequest {
                username,
                email,
                password,
                business_name,
                business_email,
                business_phone,
                description,
            };
            let payload = ctx.auth.signup(&request).await?;
            ctx.business.set_business(payload.business.clone());
            println!("Welcome, {}!", payload.user.username);
            open(ctx, Route::Dashboard.path()).await?;
        }
        Commands::Login { username, password } => {
            let payload = ctx.auth.login(&username, &password).await?;
            ctx.business.set_business(payload.business.clone());
            println!("Logged in as {}", payload.user.username);
            open(ctx, Route::Dashboard.path()).await?;
        }
        Commands::Logout => {
            ctx.logout();
            println!("Logged out");
        }
        Commands::Status => status(ctx).await?,
        Commands::Open { path } => open(ctx, &path).await?,
        Commands::Business { action } => {
            require_session(ctx).await?;
            let business = match action {
                BusinessAction::Show => ctx.business.fetch_business().await?,
                BusinessAction::Update {
                    name,
                    description,
                    email,
                    phone,
                    address,
                } => {
                    let patch = BusinessPatch {
                        name,
                        description,
                        email,
                        phone,
                        address,
                    };
                    anyhow::ensure!(!patch.is_empty(), "Nothing to update");
                    ctx.business.update_business(&patch).await?
                }
            };
            print_business(&business);
        }
    }
    Ok(())
}

async fn open(ctx: &AppContext, path: &str) -> anyhow::Result<()> {
    let navigation = ctx.router.navigate(path).await?;
    if navigation.redirected() {
        info!(from = %navigation.requested, to = %navigation.route, "Redirected");
    }
    render(ctx, navigation.route);
    Ok(())
}

async fn require_session(ctx: &AppContext) -> anyhow::Result<()> {
    let navigation = ctx.router.navigate(Route::Dashboard.path()).await?;
    anyhow::ensure!(
        navigation.route == Route::Dashboard,
        "Not logged in. Run `powerdealer login` first."
    );
    Ok(())
}

async fn status(ctx: &AppContext) -> anyhow::Result<()> {
    let navigation = ctx.router.navigate(Route::Root.path()).await?;
    println!("Page: {}", navigation.route);

    let session = ctx.auth.snapshot();
    println!("Session: {:?}", session.phase);
    match &session.user {
        Some(user) => println!("User: {} <{}>", user.username, user.email),
        None => println!("User: (not logged in)"),
    }
    if let Some(error) = &session.error {
        println!("Last error: {error}");
    }

    let claims = ctx
        .storage
        .access_token()
        .and_then(|token| decode_claims(&token));
    if let Some(claims) = claims {
        if let Some(expires_at) = claims.expires_at() {
            let note = if claims.is_expired_at(Utc::now()) {
                " (expired, refreshed on next request)"
            } else {
                ""
            };
            println!("Access token expires: {}{}", expires_at.to_rfc3339(), note);
        }
    }
    Ok(())
}

fn render(ctx: &AppContext, route: Route) {
    let title = route.title().unwrap_or("Powerdealer");
    println!("== {} ({}) ==", title, route);

    if route == Route::Dashboard {
        if let Some(user) = ctx.auth.user() {
            println!("Signed in as {}", user.username);
        }
        let business = ctx.business.snapshot();
        if let Some(business) = business.business.or_else(|| ctx.auth.business()) {
            print_business(&business);
        }
    }
}

fn print_business(business: &Business) {
    println!("Business: {}", business.name);
    let fields = [
        ("Email", &business.email),
        ("Phone", &business.phone),
        ("Address", &business.address),
        ("Description", &business.description),
    ];
    for (label, value) in fields {
        if !value.is_empty() {
            println!("  {label}: {value}");
        }
    }
}

fn report_api_error(err: &ApiError) {
    eprintln!("Error: {}", err.user_message());
    let fields: BTreeMap<String, String> = err.field_errors();
    for (field, message) in fields {
        eprintln!("  {field}: {message}");
    }
}
