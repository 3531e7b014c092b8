//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `product_pack_core` linkage, storage bootstrap and repository
//!   wiring against the configured database.
//! - Keep output deterministic for quick local sanity checks.

use log::warn;
use product_pack_core::db::migrations::current_version;
use product_pack_core::db::open_db;
use product_pack_core::{
    init_logging, CoreConfig, PackOptionRepository, SearchCriteriaBuilder,
    SqlitePackOptionRepository,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = CoreConfig::from_env();
    if let Err(err) = init_logging(&config.log_level, &config.log_dir.to_string_lossy()) {
        eprintln!("product_pack logging disabled: {err}");
    }

    println!("product_pack_core ping={}", product_pack_core::ping());
    println!("product_pack_core version={}", product_pack_core::core_version());

    match probe_store(&config) {
        Ok((schema_version, total)) => {
            println!("product_pack_core db={}", config.db_path.display());
            println!("product_pack_core schema_version={schema_version}");
            println!("product_pack_core pack_options={total}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            warn!("event=cli_probe module=cli status=error error={err}");
            eprintln!("product_pack_core store probe failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn probe_store(config: &CoreConfig) -> Result<(u32, u64), Box<dyn std::error::Error>> {
    let conn = open_db(&config.db_path)?;
    let schema_version = current_version(&conn)?;
    let repo = SqlitePackOptionRepository::try_new(&conn)?;
    let criteria = SearchCriteriaBuilder::new().set_page_size(1).create();
    let results = repo.get_list(&criteria)?;
    Ok((schema_version, results.total_count))
}
