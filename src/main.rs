use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use emailauth::db::AppState;
use emailauth::users::{is_valid_email, ExtraFields};

#[derive(Debug, Parser)]
#[command(name = "emailauth", about = "Manage email-keyed user accounts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create a regular user.
    CreateUser(CreateArgs),
    /// Create a user with staff and superuser flags set.
    CreateSuperuser(CreateArgs),
}

#[derive(Debug, Args)]
struct CreateArgs {
    #[arg(long)]
    email: String,
    /// Omit to create an account without a usable password.
    #[arg(long, env = "EMAILAUTH_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
}

impl CreateArgs {
    fn extra(&self) -> ExtraFields {
        ExtraFields {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            ..ExtraFields::default()
        }
    }
}

fn init_tracing() {
    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "emailauth=info,sqlx=warn".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let state = AppState::init().await?;
    state.migrate().await?;
    tracing::debug!(
        email_normalization = %state.config.email_normalization,
        "account manager ready"
    );

    let (args, superuser) = match &cli.command {
        Command::CreateUser(args) => (args, false),
        Command::CreateSuperuser(args) => (args, true),
    };

    if !is_valid_email(args.email.trim()) {
        anyhow::bail!("invalid email: {}", args.email);
    }

    let password = args.password.as_deref();
    let user = if superuser {
        state
            .users
            .create_superuser(&args.email, password, args.extra())
            .await
            .context("create superuser")?
    } else {
        state
            .users
            .create_user(&args.email, password, args.extra())
            .await
            .context("create user")?
    };

    tracing::info!(user_id = %user.id, superuser, "account ready");
    println!("{user}");
    Ok(())
}
