use std::io::Read;

use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::error::{Result, SplitError};
use crate::headers::{self, Translated, AMOUNT, DESCRIPTION, REQUIRED_COLUMNS, TRANSACTION_DATE};
use crate::models::{Action, File, NewTransaction, ParsedRow};
use crate::store;

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

/// Turn canonical rows into parsed rows. Dates and descriptions are kept
/// verbatim; the first missing cell or bad amount rejects the whole table.
pub fn parse_rows(translated: &Translated) -> Result<Vec<ParsedRow>> {
    let table = &translated.table;
    let mut idx = [0usize; 3];
    for (slot, name) in idx.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = table.column(name).ok_or_else(|| SplitError::MalformedRow {
            line: 1,
            reason: format!("missing column '{name}'"),
        })?;
    }
    let [date_idx, desc_idx, amount_idx] = idx;

    let mut rows = Vec::with_capacity(table.rows.len());
    for (i, record) in table.rows.iter().enumerate() {
        // Header is line 1.
        let line = i + 2;
        let cell = |idx: usize, name: &str| {
            record.get(idx).ok_or_else(|| SplitError::MalformedRow {
                line,
                reason: format!("missing value for '{name}'"),
            })
        };
        let date = cell(date_idx, TRANSACTION_DATE)?;
        let description = cell(desc_idx, DESCRIPTION)?;
        let raw_amount = cell(amount_idx, AMOUNT)?;
        let amount = headers::parse_amount(raw_amount).ok_or_else(|| SplitError::MalformedRow {
            line,
            reason: format!("unparseable amount '{raw_amount}'"),
        })?;
        rows.push(ParsedRow {
            date: date.clone(),
            description: description.clone(),
            amount,
        });
    }
    Ok(rows)
}

/// Build pending transactions for a file: every imported row starts out
/// ignored, with no previous action, owned by the uploader.
pub fn map_rows(translated: &Translated, file_id: i64, owner: &str) -> Result<Vec<NewTransaction>> {
    Ok(parse_rows(translated)?
        .into_iter()
        .map(|row| NewTransaction {
            file_id,
            date: row.date,
            description: row.description,
            amount: row.amount,
            action: Action::Ignore,
            owner: owner.to_string(),
            previous_action: None,
        })
        .collect())
}

// ---------------------------------------------------------------------------
// import_file
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct ImportResult {
    pub file: File,
    pub bank: &'static str,
    pub created: usize,
}

/// Import a statement into a group as a new file.
///
/// Every row becomes a new transaction, including rows that repeat an
/// earlier line. The file record and all of its transactions are written in
/// one database transaction; on any error nothing is kept.
pub fn import_file<R: Read>(
    conn: &Connection,
    reader: R,
    file_name: &str,
    group_id: i64,
    owner: &str,
) -> Result<ImportResult> {
    store::require_group(conn, group_id)?;

    let table = headers::read_table(reader)?;
    debug!(columns = ?table.headers, rows = table.rows.len(), "decoded statement");

    let columns = table.headers.join(", ");
    let Some(translated) = headers::translate(table)? else {
        warn!(%columns, "unsupported bank format");
        return Err(SplitError::UnsupportedFormat(columns));
    };
    debug!(bank = translated.bank.name, columns = ?translated.table.headers, "translated headers");

    let tx = conn.unchecked_transaction()?;
    let file = store::create_file(&tx, group_id, file_name, owner)?;

    let rows = map_rows(&translated, file.id, owner)?;
    for txn in &rows {
        store::create_transaction(&tx, txn)?;
    }
    tx.commit()?;

    let created = rows.len();
    info!(file_id = file.id, bank = translated.bank.name, created, "imported statement");
    Ok(ImportResult {
        file,
        bank: translated.bank.name,
        created,
    })
}
