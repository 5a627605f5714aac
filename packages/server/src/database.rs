use std::path::Path;
use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

use crate::entity::{CATALOG_SCHEMA, SITE_SCHEMA};

fn sqlite_url(path: &Path) -> String {
    format!("sqlite://{}?mode=rwc", path.display())
}

async fn connect(path: &Path) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(sqlite_url(path));

    // SQLite serializes writers; one connection avoids SQLITE_BUSY between pool members.
    opt.max_connections(1)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .sqlx_logging(false);

    Database::connect(opt).await
}

/// Open (creating if needed) the global site catalog and sync its schema.
pub async fn init_catalog_db(path: &Path) -> Result<DatabaseConnection, DbErr> {
    let db = connect(path).await?;
    db.get_schema_registry(CATALOG_SCHEMA).sync(&db).await?;
    Ok(db)
}

/// Open (creating if needed) a per-site database and sync its schema.
pub async fn init_site_db(path: &Path) -> Result<DatabaseConnection, DbErr> {
    let db = connect(path).await?;
    db.get_schema_registry(SITE_SCHEMA).sync(&db).await?;
    Ok(db)
}

/// Open an existing per-site database without touching its schema.
pub async fn open_site_db(path: &Path) -> Result<DatabaseConnection, DbErr> {
    if !path.is_file() {
        return Err(DbErr::Custom(format!(
            "site database {} does not exist",
            path.display()
        )));
    }
    connect(path).await
}
