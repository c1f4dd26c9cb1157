use anyhow::Result;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::store::Store;

pub fn run(args: StatusArgs) -> Result<()> {
    let db_path = args.data.resolved_db_path();
    let storage_root = args.data.storage_root();

    info!(data_root = %args.data.data_root.display(), "status requested");

    if storage_root.is_dir() {
        info!(path = %storage_root.display(), "object storage present");
    } else {
        warn!(path = %storage_root.display(), "object storage missing");
    }

    if !db_path.exists() {
        warn!(path = %db_path.display(), "database file missing");
        return Ok(());
    }

    let store = Store::open(&db_path)?;
    for (table, count) in store.table_counts()? {
        info!(path = %db_path.display(), table, rows = count, "database status");
    }

    Ok(())
}
