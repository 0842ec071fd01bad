use folio_persistence_contracts::{Database, Transaction};
use folio_persistence_postgres::{
    contact::PostgresContactRepository, PostgresDatabase, PostgresDatabaseConfig,
};

pub type Db = PostgresDatabase;

/// Connect to the database from the default config, reset it, apply all
/// migrations and insert the demo dataset.
pub async fn setup() -> Db {
    let db = setup_clean().await;

    db.run_migrations(None).await.unwrap();

    let mut txn = db.begin_transaction().await.unwrap();
    folio_demo::create(&mut txn, PostgresContactRepository)
        .await
        .unwrap();
    txn.commit().await.unwrap();

    db
}

/// Connect to the database from the default config and drop everything in it.
pub async fn setup_clean() -> Db {
    let config = folio_config::load().unwrap();

    let db = Db::connect(&PostgresDatabaseConfig {
        url: config.database.url,
        max_connections: config.database.max_connections,
        min_connections: config.database.min_connections,
        acquire_timeout: config.database.acquire_timeout.into(),
        idle_timeout: config.database.idle_timeout.map(Into::into),
        max_lifetime: config.database.max_lifetime.map(Into::into),
    })
    .await
    .unwrap();

    db.reset().await.unwrap();
    db
}
