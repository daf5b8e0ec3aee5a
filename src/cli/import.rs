use std::path::Path;

use crate::error::{Result, SplitError};
use crate::importer::import_file;
use crate::settings::load_settings;

use super::open;

pub fn run(data_dir: Option<&str>, file: &str, group_id: i64, owner: Option<&str>) -> Result<()> {
    let owner = match owner {
        Some(o) => o.to_string(),
        None => load_settings().default_owner,
    };
    if owner.trim().is_empty() {
        return Err(SplitError::Settings(
            "no owner given; pass --owner or run `splitbook init --owner <name>`".to_string(),
        ));
    }

    let path = Path::new(file);
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file);
    let reader = std::io::BufReader::new(std::fs::File::open(path)?);

    let conn = open(data_dir)?;
    let result = import_file(&conn, reader, name, group_id, &owner)?;

    println!(
        "Imported {} as file {} ({} format): {} transactions",
        name, result.file.id, result.bank, result.created
    );
    Ok(())
}
