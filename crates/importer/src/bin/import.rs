use clap::{Parser, Subcommand};
use importer::{DirectoryImporter, ImportContext, TaskImporter};
use sqlx::postgres::PgPoolOptions;
use std::path::PathBuf;
use storage::repository::user::UserRepository;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "speedrun-import")]
#[command(about = "Speedrun scoreboard task importer and admin bootstrap", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every task.yml below a directory
    Tasks {
        #[arg(long, default_value = "./tasks")]
        directory: PathBuf,

        #[arg(long)]
        validate_only: bool,
    },
    GrantAdmin {
        #[arg(long)]
        username: String,
    },
    RevokeAdmin {
        #[arg(long)]
        username: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("speedrun_import={},importer={}", log_level, log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Tasks {
            directory,
            validate_only,
        } => {
            handle_tasks(directory, validate_only, &cli.database_url).await?;
        }
        Commands::GrantAdmin { username } => {
            handle_set_admin(&username, true, &cli.database_url).await?;
        }
        Commands::RevokeAdmin { username } => {
            handle_set_admin(&username, false, &cli.database_url).await?;
        }
    }

    Ok(())
}

async fn connect(database_url: &str) -> Result<sqlx::PgPool, Box<dyn std::error::Error>> {
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;
    Ok(pool)
}

async fn handle_tasks(
    directory: PathBuf,
    validate_only: bool,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let importer = DirectoryImporter::new(directory);

    if validate_only {
        let (manifests, report) = importer.prepare().await?;
        tracing::info!(
            "✓ Validation successful: {} task(s), {} warning(s)",
            manifests.len(),
            report.warnings.len()
        );
        return Ok(());
    }

    let context = ImportContext {
        pool: connect(database_url).await?,
    };
    let summary = importer.import(&context).await?;

    tracing::info!(
        "Summary ({} import): {} created, {} updated",
        importer.name(),
        summary.created,
        summary.updated
    );

    Ok(())
}

async fn handle_set_admin(
    username: &str,
    is_admin: bool,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let pool = connect(database_url).await?;
    let user = UserRepository::new(&pool)
        .set_admin_by_username(username, is_admin)
        .await?;

    if user.is_admin {
        tracing::info!("✓ {} is now an administrator", user.username);
    } else {
        tracing::info!("✓ {} is no longer an administrator", user.username);
    }

    Ok(())
}
