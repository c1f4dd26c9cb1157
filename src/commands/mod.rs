pub mod analytics;
pub mod announcements;
pub mod output;
pub mod profiles;
pub mod reports;
pub mod split;
pub mod status;
pub mod tasks;

use anyhow::Result;

use crate::cli::DataArgs;
use crate::config::ReportConfig;
use crate::store::Store;
use crate::util::ensure_directory;

pub(crate) fn load_config(data: &DataArgs) -> Result<ReportConfig> {
    ReportConfig::load(data.config.as_deref())
}

/// Opens the store, creating its directory on first use.
pub(crate) fn open_store(data: &DataArgs) -> Result<Store> {
    let db_path = data.resolved_db_path();
    if let Some(parent) = db_path.parent() {
        ensure_directory(parent)?;
    }
    Store::open(&db_path)
}
