use rusqlite::Connection;
use tracing::debug;

use crate::error::{Result, SplitError};
use crate::models::{NewTransaction, Transaction};
use crate::store;

/// Outcome of reconciling one submitted transaction.
#[derive(Debug, Clone)]
pub struct Upsert {
    pub transaction: Transaction,
    pub created: bool,
}

/// Create a transaction, or update the disposition of the one sharing its
/// natural key `(file_id, date, description, amount)`.
///
/// On update only `action`, `previous_action` and `owner` change. When the
/// caller does not submit a previous action and the action changes, the
/// stored action becomes the previous one.
pub fn upsert_transaction(conn: &Connection, txn: &NewTransaction) -> Result<Upsert> {
    let existing =
        store::find_transaction_by_key(conn, txn.file_id, &txn.date, &txn.description, txn.amount)?;

    let Some(existing) = existing else {
        let transaction = store::create_transaction(conn, txn)?;
        debug!(id = transaction.id, file_id = txn.file_id, "created transaction");
        return Ok(Upsert {
            transaction,
            created: true,
        });
    };

    let previous_action = match &txn.previous_action {
        Some(submitted) => Some(submitted.clone()),
        None if existing.action != txn.action => Some(existing.action.clone()),
        None => existing.previous_action.clone(),
    };

    if existing.action == txn.action
        && existing.owner == txn.owner
        && existing.previous_action == previous_action
    {
        return Ok(Upsert {
            transaction: existing,
            created: false,
        });
    }

    let transaction = store::update_disposition(
        conn,
        existing.id,
        &txn.action,
        previous_action.as_ref(),
        &txn.owner,
    )?;
    debug!(id = transaction.id, action = %transaction.action, "updated transaction disposition");
    Ok(Upsert {
        transaction,
        created: false,
    })
}

/// Reconcile a batch of transactions submitted for a group. Every file
/// referenced must belong to the group. The batch commits as a whole.
pub fn save_transactions(
    conn: &Connection,
    group_id: i64,
    transactions: &[NewTransaction],
) -> Result<Vec<Upsert>> {
    store::require_group(conn, group_id)?;

    let tx = conn.unchecked_transaction()?;
    let mut results = Vec::with_capacity(transactions.len());
    for txn in transactions {
        let file = store::require_file(&tx, txn.file_id)?;
        if file.group_id != group_id {
            return Err(SplitError::not_found("File", txn.file_id));
        }
        results.push(upsert_transaction(&tx, txn)?);
    }
    tx.commit()?;
    Ok(results)
}

/// Insert a batch of transactions into one file without deduplication.
pub fn add_transactions(
    conn: &Connection,
    file_id: i64,
    transactions: &[NewTransaction],
) -> Result<Vec<Transaction>> {
    store::require_file(conn, file_id)?;

    let tx = conn.unchecked_transaction()?;
    let mut created = Vec::with_capacity(transactions.len());
    for txn in transactions {
        let txn = NewTransaction {
            file_id,
            ..txn.clone()
        };
        created.push(store::create_transaction(&tx, &txn)?);
    }
    tx.commit()?;
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;
    use crate::models::Action;
    use crate::store::fixtures::{file, group, new_txn};

    fn count(conn: &Connection) -> i64 {
        conn.query_row("SELECT count(*) FROM transactions", [], |r| r.get(0)).unwrap()
    }

    #[test]
    fn test_new_key_creates_record() {
        let (_dir, conn) = test_db();
        let g = group(&conn);
        let f = file(&conn, g.id);
        let result = upsert_transaction(&conn, &new_txn(f.id, "COFFEE", -4.5, Action::Ignore)).unwrap();
        assert!(result.created);
        assert_eq!(result.transaction.action, Action::Ignore);
        assert_eq!(count(&conn), 1);
    }

    #[test]
    fn test_identical_submission_is_idempotent() {
        let (_dir, conn) = test_db();
        let g = group(&conn);
        let f = file(&conn, g.id);
        let txn = new_txn(f.id, "COFFEE", -4.5, Action::Split);
        let first = upsert_transaction(&conn, &txn).unwrap();
        let second = upsert_transaction(&conn, &txn).unwrap();
        assert!(!second.created);
        assert_eq!(first.transaction, second.transaction);
        assert_eq!(count(&conn), 1);
    }

    #[test]
    fn test_changed_action_updates_in_place() {
        let (_dir, conn) = test_db();
        let g = group(&conn);
        let f = file(&conn, g.id);
        let first = upsert_transaction(&conn, &new_txn(f.id, "COFFEE", -4.5, Action::Ignore)).unwrap();
        let second = upsert_transaction(&conn, &new_txn(f.id, "COFFEE", -4.5, Action::Split)).unwrap();
        assert_eq!(count(&conn), 1);
        assert_eq!(second.transaction.id, first.transaction.id);
        assert_eq!(second.transaction.action, Action::Split);
        assert_eq!(second.transaction.previous_action, Some(Action::Ignore));
    }

    #[test]
    fn test_repeating_changed_action_keeps_history() {
        let (_dir, conn) = test_db();
        let g = group(&conn);
        let f = file(&conn, g.id);
        upsert_transaction(&conn, &new_txn(f.id, "COFFEE", -4.5, Action::Ignore)).unwrap();
        upsert_transaction(&conn, &new_txn(f.id, "COFFEE", -4.5, Action::Split)).unwrap();
        let third = upsert_transaction(&conn, &new_txn(f.id, "COFFEE", -4.5, Action::Split)).unwrap();
        assert_eq!(third.transaction.previous_action, Some(Action::Ignore));
    }

    #[test]
    fn test_submitted_previous_action_wins() {
        let (_dir, conn) = test_db();
        let g = group(&conn);
        let f = file(&conn, g.id);
        upsert_transaction(&conn, &new_txn(f.id, "COFFEE", -4.5, Action::Ignore)).unwrap();
        let mut txn = new_txn(f.id, "COFFEE", -4.5, Action::Person2);
        txn.previous_action = Some(Action::Other("Custom".to_string()));
        let result = upsert_transaction(&conn, &txn).unwrap();
        assert_eq!(result.transaction.previous_action, Some(Action::Other("Custom".to_string())));
    }

    #[test]
    fn test_changed_owner_updates_in_place() {
        let (_dir, conn) = test_db();
        let g = group(&conn);
        let f = file(&conn, g.id);
        upsert_transaction(&conn, &new_txn(f.id, "COFFEE", -4.5, Action::Ignore)).unwrap();
        let mut txn = new_txn(f.id, "COFFEE", -4.5, Action::Ignore);
        txn.owner = "bob".to_string();
        let result = upsert_transaction(&conn, &txn).unwrap();
        assert!(!result.created);
        assert_eq!(result.transaction.owner, "bob");
        assert_eq!(count(&conn), 1);
    }

    #[test]
    fn test_different_amount_is_a_new_record() {
        let (_dir, conn) = test_db();
        let g = group(&conn);
        let f = file(&conn, g.id);
        upsert_transaction(&conn, &new_txn(f.id, "COFFEE", -4.5, Action::Ignore)).unwrap();
        let result = upsert_transaction(&conn, &new_txn(f.id, "COFFEE", -5.0, Action::Ignore)).unwrap();
        assert!(result.created);
        assert_eq!(count(&conn), 2);
    }

    #[test]
    fn test_save_transactions_requires_group() {
        let (_dir, conn) = test_db();
        let err = save_transactions(&conn, 5, &[]).unwrap_err();
        assert!(matches!(err, SplitError::NotFound { kind: "Group", id: 5 }));
    }

    #[test]
    fn test_save_transactions_rejects_foreign_file() {
        let (_dir, conn) = test_db();
        let g = group(&conn);
        let other = store::create_group(&conn, "Trip", "alice", "bob").unwrap();
        let mine = file(&conn, g.id);
        let theirs = file(&conn, other.id);
        let batch = vec![
            new_txn(mine.id, "COFFEE", -4.5, Action::Split),
            new_txn(theirs.id, "TAXI", -20.0, Action::Split),
        ];
        let err = save_transactions(&conn, g.id, &batch).unwrap_err();
        assert!(matches!(err, SplitError::NotFound { kind: "File", .. }));
        assert_eq!(count(&conn), 0, "batch must roll back");
    }

    #[test]
    fn test_save_transactions_mixes_create_and_update() {
        let (_dir, conn) = test_db();
        let g = group(&conn);
        let f = file(&conn, g.id);
        upsert_transaction(&conn, &new_txn(f.id, "COFFEE", -4.5, Action::Ignore)).unwrap();
        let batch = vec![
            new_txn(f.id, "COFFEE", -4.5, Action::Split),
            new_txn(f.id, "RENT", -1200.0, Action::Split),
        ];
        let results = save_transactions(&conn, g.id, &batch).unwrap();
        assert_eq!(results.iter().filter(|r| r.created).count(), 1);
        assert_eq!(count(&conn), 2);
    }

    #[test]
    fn test_add_transactions_does_not_dedupe() {
        let (_dir, conn) = test_db();
        let g = group(&conn);
        let f = file(&conn, g.id);
        let txn = new_txn(0, "COFFEE", -4.5, Action::Ignore);
        let created = add_transactions(&conn, f.id, &[txn.clone(), txn]).unwrap();
        assert_eq!(created.len(), 2);
        assert!(created.iter().all(|t| t.file_id == f.id));
        assert_eq!(count(&conn), 2);
    }

    #[test]
    fn test_add_transactions_requires_file() {
        let (_dir, conn) = test_db();
        let err = add_transactions(&conn, 9, &[]).unwrap_err();
        assert!(matches!(err, SplitError::NotFound { kind: "File", id: 9 }));
    }
}
