use rusqlite::Connection;
use serde::Serialize;
use tracing::debug;

use crate::error::Result;
use crate::models::{Balances, File, Group};
use crate::store;

#[derive(Debug, Clone, Serialize)]
pub struct GroupBalance {
    pub id: i64,
    pub name: String,
    pub person1: String,
    pub person2: String,
    pub balance_person1: f64,
    pub balance_person2: f64,
}

impl GroupBalance {
    fn new(group: Group, totals: Balances) -> Self {
        Self {
            id: group.id,
            name: group.name,
            person1: group.person1,
            person2: group.person2,
            balance_person1: totals.person1,
            balance_person2: totals.person2,
        }
    }
}

/// Sum the cached per-file balances. File balances are taken as given; no
/// transaction amounts are consulted.
pub fn aggregate(files: &[File]) -> Balances {
    files.iter().fold(Balances::default(), |acc, f| Balances {
        person1: acc.person1 + f.balance_person1,
        person2: acc.person2 + f.balance_person2,
    })
}

pub fn group_balance(conn: &Connection, group_id: i64) -> Result<GroupBalance> {
    let group = store::require_group(conn, group_id)?;
    let files = store::list_files(conn, group_id)?;
    Ok(GroupBalance::new(group, aggregate(&files)))
}

/// Balances for every group, hidden ones included, in id order.
pub fn all_group_balances(conn: &Connection) -> Result<Vec<GroupBalance>> {
    let groups = store::list_groups(conn, true, 0, i64::MAX)?;
    let mut balances = Vec::with_capacity(groups.len());
    for group in groups {
        let files = store::list_files(conn, group.id)?;
        balances.push(GroupBalance::new(group, aggregate(&files)));
    }
    Ok(balances)
}

/// Overwrite the cached balances of one file.
pub fn update_file_balances(conn: &Connection, file_id: i64, person1: f64, person2: f64) -> Result<File> {
    let file = store::set_file_balances(conn, file_id, person1, person2)?;
    debug!(file_id, person1, person2, "updated file balances");
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_db;
    use crate::error::SplitError;
    use crate::store::fixtures::{file, group};

    fn file_with(p1: f64, p2: f64) -> File {
        File {
            id: 0,
            group_id: 0,
            name: "f.csv".to_string(),
            owner: "alice".to_string(),
            balance_person1: p1,
            balance_person2: p2,
        }
    }

    #[test]
    fn test_aggregate_empty_is_zero() {
        assert_eq!(aggregate(&[]), Balances { person1: 0.0, person2: 0.0 });
    }

    #[test]
    fn test_aggregate_sums_pairwise() {
        let files = [file_with(3.0, 4.0), file_with(-1.0, 2.0)];
        assert_eq!(aggregate(&files), Balances { person1: 2.0, person2: 6.0 });
    }

    #[test]
    fn test_aggregate_is_order_independent() {
        let a = [file_with(3.0, 4.0), file_with(-1.0, 2.0), file_with(0.5, -0.5)];
        let b = [file_with(0.5, -0.5), file_with(3.0, 4.0), file_with(-1.0, 2.0)];
        assert_eq!(aggregate(&a), aggregate(&b));
    }

    #[test]
    fn test_group_balance_from_files() {
        let (_dir, conn) = test_db();
        let g = group(&conn);
        let f1 = file(&conn, g.id);
        let f2 = file(&conn, g.id);
        update_file_balances(&conn, f1.id, 3.0, 4.0).unwrap();
        update_file_balances(&conn, f2.id, -1.0, 2.0).unwrap();
        let b = group_balance(&conn, g.id).unwrap();
        assert_eq!(b.name, "Apartment");
        assert_eq!((b.balance_person1, b.balance_person2), (2.0, 6.0));
    }

    #[test]
    fn test_group_without_files_is_zero() {
        let (_dir, conn) = test_db();
        let g = group(&conn);
        let b = group_balance(&conn, g.id).unwrap();
        assert_eq!((b.balance_person1, b.balance_person2), (0.0, 0.0));
    }

    #[test]
    fn test_group_balance_missing_group() {
        let (_dir, conn) = test_db();
        assert!(matches!(
            group_balance(&conn, 12),
            Err(SplitError::NotFound { kind: "Group", id: 12 })
        ));
    }

    #[test]
    fn test_update_missing_file() {
        let (_dir, conn) = test_db();
        assert!(matches!(
            update_file_balances(&conn, 4, 1.0, 1.0),
            Err(SplitError::NotFound { kind: "File", id: 4 })
        ));
    }

    #[test]
    fn test_all_group_balances_includes_hidden() {
        let (_dir, conn) = test_db();
        let g = group(&conn);
        let trip = store::create_group(&conn, "Trip", "alice", "bob").unwrap();
        store::set_group_flag(&conn, trip.id, store::GroupFlag::Hidden, true).unwrap();
        let f = file(&conn, trip.id);
        update_file_balances(&conn, f.id, 10.0, -10.0).unwrap();

        let all = all_group_balances(&conn).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, g.id);
        assert_eq!(all[1].balance_person1, 10.0);
    }
}
