use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::error::Result;
use crate::models::Action;

// Two-digit years first: "%Y" would also accept "25" as year 25.
const DATE_FORMATS: &[&str] = &["%m/%d/%y", "%m/%d/%Y", "%Y-%m-%d"];

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Order two raw statement dates. Parseable dates sort in calendar order and
/// rank above unparseable ones, which sort as raw strings among themselves.
fn compare_dates(a: &str, b: &str) -> Ordering {
    match (parse_date(a), parse_date(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => a.cmp(b),
    }
}

/// The action of the latest transaction with this description and owner.
/// Same-day matches resolve to the most recently created record.
pub fn suggest_action(conn: &Connection, description: &str, owner: &str) -> Result<Option<Action>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, date, action FROM transactions WHERE description = ?1 AND owner = ?2",
    )?;
    let candidates: Vec<(i64, String, Action)> = stmt
        .query_map([description, owner], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(candidates
        .into_iter()
        .max_by(|(id_a, date_a, _), (id_b, date_b, _)| {
            compare_dates(date_a, date_b).then(id_a.cmp(id_b))
        })
        .map(|(_, _, action)| action))
}

/// Batch form of [`suggest_action`]. Descriptions with no history are left
/// out of the map.
pub fn suggest_actions<S: AsRef<str>>(
    conn: &Connection,
    descriptions: &[S],
    owner: &str,
) -> Result<BTreeMap<String, Action>> {
    let mut suggestions = BTreeMap::new();
    for description in descriptions {
        let description = description.as_ref();
        if let Some(action) = suggest_action(conn, description, owner)? {
            suggestions.insert(description.to_string(), action);
        }
    }
    Ok(suggestions)
}
