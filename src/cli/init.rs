use crate::db::{open_ledger, DB_FILE};
use crate::error::Result;
use crate::settings::{load_settings, resolve_data_dir, save_settings};

pub fn run(data_dir: Option<&str>, owner: Option<&str>) -> Result<()> {
    let dir = resolve_data_dir(data_dir);
    open_ledger(&dir)?;

    let mut settings = load_settings();
    settings.data_dir = dir.to_string_lossy().to_string();
    if let Some(owner) = owner {
        settings.default_owner = owner.to_string();
    }
    save_settings(&settings)?;

    println!("Initialized ledger at {}", dir.join(DB_FILE).display());
    Ok(())
}
