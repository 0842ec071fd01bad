use clap::Subcommand;
use folio_config::Config;
use folio_persistence_contracts::{Database, Transaction};
use folio_persistence_postgres::{
    contact::PostgresContactRepository, MigrationStatus, PostgresDatabase,
};

use crate::database;

#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// List all pending and applied migrations
    #[command(aliases(["status", "s", "l"]))]
    List,
    /// Apply all pending migrations
    #[command(aliases(["u"]))]
    Up {
        /// Only apply the next `n` migrations
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },
    /// Revert the last migration
    #[command(aliases(["d"]))]
    Down {
        /// Revert the last `n` migrations
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,
        #[arg(long, required = true)]
        force: bool,
    },
    /// Reset the database and delete all messages
    Reset {
        #[arg(long, required = true)]
        force: bool,
    },
    /// Reset the database and fill it with demo messages
    Demo {
        #[arg(long, required = true)]
        force: bool,
    },
}

impl MigrateCommand {
    pub async fn invoke(self, config: Config) -> anyhow::Result<()> {
        let db = database::connect(&config.database).await?;
        match self {
            Self::List => list(db).await,
            Self::Up { count } => up(db, count).await,
            Self::Down { count, force: _ } => down(db, count).await,
            Self::Reset { force: _ } => reset(db).await,
            Self::Demo { force: _ } => demo(db).await,
        }
    }
}

async fn list(db: PostgresDatabase) -> anyhow::Result<()> {
    for MigrationStatus { migration, applied } in db.list_migrations().await? {
        let state = if applied { "applied" } else { "pending" };
        println!("[{state}] {}", migration.name);
    }

    Ok(())
}

async fn up(db: PostgresDatabase, cnt: Option<usize>) -> anyhow::Result<()> {
    print_migrations(&db.run_migrations(cnt).await?, "applied");
    Ok(())
}

async fn down(db: PostgresDatabase, cnt: usize) -> anyhow::Result<()> {
    print_migrations(&db.revert_migrations(Some(cnt)).await?, "reverted");
    Ok(())
}

async fn reset(db: PostgresDatabase) -> anyhow::Result<()> {
    db.reset().await?;
    println!("Database reset successful");

    Ok(())
}

async fn demo(db: PostgresDatabase) -> anyhow::Result<()> {
    reset(db.clone()).await?;
    print_migrations(&db.run_migrations(None).await?, "applied");

    let mut txn = db.begin_transaction().await?;
    folio_demo::create(&mut txn, PostgresContactRepository).await?;
    txn.commit().await?;
    println!("Demo messages have been restored");

    Ok(())
}

fn print_migrations(names: &[&str], action: &str) {
    if names.is_empty() {
        println!("No migrations have been {action}.");
    }
    for name in names {
        println!("[{action}] {name}");
    }
}
