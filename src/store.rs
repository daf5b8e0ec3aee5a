use rusqlite::{Connection, OptionalExtension, Row};

use crate::error::{Result, SplitError};
use crate::models::{Action, File, Group, NewTransaction, Transaction};

const GROUP_COLUMNS: &str = "id, name, person1, person2, is_hidden, is_archived, is_settled";
const FILE_COLUMNS: &str = "id, group_id, name, owner, balance_person1, balance_person2";
const TXN_COLUMNS: &str = "id, file_id, date, description, amount, action, owner, previous_action";

fn group_from_row(row: &Row) -> rusqlite::Result<Group> {
    Ok(Group {
        id: row.get(0)?,
        name: row.get(1)?,
        person1: row.get(2)?,
        person2: row.get(3)?,
        hidden: row.get(4)?,
        archived: row.get(5)?,
        settled: row.get(6)?,
    })
}

fn file_from_row(row: &Row) -> rusqlite::Result<File> {
    Ok(File {
        id: row.get(0)?,
        group_id: row.get(1)?,
        name: row.get(2)?,
        owner: row.get(3)?,
        balance_person1: row.get(4)?,
        balance_person2: row.get(5)?,
    })
}

fn txn_from_row(row: &Row) -> rusqlite::Result<Transaction> {
    let previous: Option<String> = row.get(7)?;
    Ok(Transaction {
        id: row.get(0)?,
        file_id: row.get(1)?,
        date: row.get(2)?,
        description: row.get(3)?,
        amount: row.get(4)?,
        action: row.get(5)?,
        owner: row.get(6)?,
        previous_action: Action::from_optional(previous.as_deref()),
    })
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

/// Lifecycle flags a group can carry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroupFlag {
    Hidden,
    Archived,
    Settled,
}

impl GroupFlag {
    fn column(&self) -> &'static str {
        match self {
            Self::Hidden => "is_hidden",
            Self::Archived => "is_archived",
            Self::Settled => "is_settled",
        }
    }
}

pub fn create_group(conn: &Connection, name: &str, person1: &str, person2: &str) -> Result<Group> {
    if get_group_by_name(conn, name)?.is_some() {
        return Err(SplitError::GroupExists(name.to_string()));
    }
    conn.execute(
        "INSERT INTO groups (name, person1, person2) VALUES (?1, ?2, ?3)",
        rusqlite::params![name, person1, person2],
    )?;
    let id = conn.last_insert_rowid();
    require_group(conn, id)
}

pub fn get_group(conn: &Connection, group_id: i64) -> Result<Option<Group>> {
    let sql = format!("SELECT {GROUP_COLUMNS} FROM groups WHERE id = ?1");
    Ok(conn.query_row(&sql, [group_id], group_from_row).optional()?)
}

/// Like [`get_group`], but absence is an error.
pub fn require_group(conn: &Connection, group_id: i64) -> Result<Group> {
    get_group(conn, group_id)?.ok_or(SplitError::not_found("Group", group_id))
}

pub fn get_group_by_name(conn: &Connection, name: &str) -> Result<Option<Group>> {
    let sql = format!("SELECT {GROUP_COLUMNS} FROM groups WHERE name = ?1");
    Ok(conn.query_row(&sql, [name], group_from_row).optional()?)
}

pub fn list_groups(conn: &Connection, include_hidden: bool, skip: i64, limit: i64) -> Result<Vec<Group>> {
    let sql = format!(
        "SELECT {GROUP_COLUMNS} FROM groups WHERE (?1 OR is_hidden = 0) ORDER BY id LIMIT ?2 OFFSET ?3"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(rusqlite::params![include_hidden, limit, skip], group_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn set_group_flag(conn: &Connection, group_id: i64, flag: GroupFlag, value: bool) -> Result<Group> {
    let sql = format!("UPDATE groups SET {} = ?1 WHERE id = ?2", flag.column());
    let changed = conn.execute(&sql, rusqlite::params![value, group_id])?;
    if changed == 0 {
        return Err(SplitError::not_found("Group", group_id));
    }
    require_group(conn, group_id)
}

/// Delete a group together with its files and their transactions.
pub fn delete_group(conn: &Connection, group_id: i64) -> Result<()> {
    let changed = conn.execute("DELETE FROM groups WHERE id = ?1", [group_id])?;
    if changed == 0 {
        return Err(SplitError::not_found("Group", group_id));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

pub fn create_file(conn: &Connection, group_id: i64, name: &str, owner: &str) -> Result<File> {
    conn.execute(
        "INSERT INTO files (group_id, name, owner) VALUES (?1, ?2, ?3)",
        rusqlite::params![group_id, name, owner],
    )?;
    let id = conn.last_insert_rowid();
    require_file(conn, id)
}

pub fn get_file(conn: &Connection, file_id: i64) -> Result<Option<File>> {
    let sql = format!("SELECT {FILE_COLUMNS} FROM files WHERE id = ?1");
    Ok(conn.query_row(&sql, [file_id], file_from_row).optional()?)
}

pub fn require_file(conn: &Connection, file_id: i64) -> Result<File> {
    get_file(conn, file_id)?.ok_or(SplitError::not_found("File", file_id))
}

pub fn list_files(conn: &Connection, group_id: i64) -> Result<Vec<File>> {
    let sql = format!("SELECT {FILE_COLUMNS} FROM files WHERE group_id = ?1 ORDER BY id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([group_id], file_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn set_file_balances(conn: &Connection, file_id: i64, person1: f64, person2: f64) -> Result<File> {
    let changed = conn.execute(
        "UPDATE files SET balance_person1 = ?1, balance_person2 = ?2 WHERE id = ?3",
        rusqlite::params![person1, person2, file_id],
    )?;
    if changed == 0 {
        return Err(SplitError::not_found("File", file_id));
    }
    require_file(conn, file_id)
}

/// Delete a file of `group_id` and every transaction attached to it.
pub fn delete_file(conn: &Connection, group_id: i64, file_id: i64) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    let changed = tx.execute(
        "DELETE FROM files WHERE id = ?1 AND group_id = ?2",
        rusqlite::params![file_id, group_id],
    )?;
    if changed == 0 {
        return Err(SplitError::not_found("File", file_id));
    }
    // Cascade covers this when foreign keys are on; older databases may not have them.
    tx.execute("DELETE FROM transactions WHERE file_id = ?1", [file_id])?;
    tx.commit()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

pub fn create_transaction(conn: &Connection, txn: &NewTransaction) -> Result<Transaction> {
    conn.execute(
        "INSERT INTO transactions (file_id, date, description, amount, action, owner, previous_action) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            txn.file_id,
            txn.date,
            txn.description,
            txn.amount,
            txn.action,
            txn.owner,
            txn.previous_action,
        ],
    )?;
    let id = conn.last_insert_rowid();
    require_transaction(conn, id)
}

pub fn get_transaction(conn: &Connection, txn_id: i64) -> Result<Option<Transaction>> {
    let sql = format!("SELECT {TXN_COLUMNS} FROM transactions WHERE id = ?1");
    Ok(conn.query_row(&sql, [txn_id], txn_from_row).optional()?)
}

pub fn require_transaction(conn: &Connection, txn_id: i64) -> Result<Transaction> {
    get_transaction(conn, txn_id)?.ok_or(SplitError::not_found("Transaction", txn_id))
}

/// Look a transaction up by its natural key. The oldest record wins if
/// plain inserts ever produced more than one.
pub fn find_transaction_by_key(
    conn: &Connection,
    file_id: i64,
    date: &str,
    description: &str,
    amount: f64,
) -> Result<Option<Transaction>> {
    let sql = format!(
        "SELECT {TXN_COLUMNS} FROM transactions \
         WHERE file_id = ?1 AND date = ?2 AND description = ?3 AND amount = ?4 \
         ORDER BY id LIMIT 1"
    );
    let mut stmt = conn.prepare_cached(&sql)?;
    Ok(stmt
        .query_row(rusqlite::params![file_id, date, description, amount], txn_from_row)
        .optional()?)
}

/// Rewrite the mutable disposition fields. Identity fields are left alone.
pub fn update_disposition(
    conn: &Connection,
    txn_id: i64,
    action: &Action,
    previous_action: Option<&Action>,
    owner: &str,
) -> Result<Transaction> {
    let changed = conn.execute(
        "UPDATE transactions SET action = ?1, previous_action = ?2, owner = ?3 WHERE id = ?4",
        rusqlite::params![action, previous_action, owner, txn_id],
    )?;
    if changed == 0 {
        return Err(SplitError::not_found("Transaction", txn_id));
    }
    require_transaction(conn, txn_id)
}

pub fn list_transactions(conn: &Connection, file_id: i64) -> Result<Vec<Transaction>> {
    let sql = format!("SELECT {TXN_COLUMNS} FROM transactions WHERE file_id = ?1 ORDER BY id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([file_id], txn_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}
