use std::io::Read;

use crate::error::Result;
use crate::history::suggest_actions;
use crate::models::{Action, NewTransaction};
use crate::reconciler::{add_transactions, save_transactions, upsert_transaction};
use crate::store;

use super::files::transaction_table;
use super::open;

fn read_batch(input: &str) -> Result<Vec<NewTransaction>> {
    let content = if input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(input)?
    };
    Ok(serde_json::from_str(&content)?)
}

pub fn show(data_dir: Option<&str>, id: i64) -> Result<()> {
    let conn = open(data_dir)?;
    let txn = store::require_transaction(&conn, id)?;
    println!("{}", transaction_table(std::slice::from_ref(&txn)));
    Ok(())
}

pub fn save(data_dir: Option<&str>, group_id: i64, input: &str) -> Result<()> {
    let batch = read_batch(input)?;
    let conn = open(data_dir)?;
    let results = save_transactions(&conn, group_id, &batch)?;
    let created = results.iter().filter(|r| r.created).count();
    let txns: Vec<_> = results.into_iter().map(|r| r.transaction).collect();
    println!("{}", serde_json::to_string_pretty(&txns)?);
    eprintln!("{created} created, {} updated", txns.len() - created);
    Ok(())
}

pub fn add(data_dir: Option<&str>, file_id: i64, input: &str) -> Result<()> {
    let batch = read_batch(input)?;
    let conn = open(data_dir)?;
    let created = add_transactions(&conn, file_id, &batch)?;
    println!("{}", serde_json::to_string_pretty(&created)?);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn set(
    data_dir: Option<&str>,
    file_id: i64,
    date: &str,
    description: &str,
    amount: f64,
    action: &str,
    owner: &str,
    previous_action: Option<&str>,
) -> Result<()> {
    let conn = open(data_dir)?;
    store::require_file(&conn, file_id)?;
    let txn = NewTransaction {
        file_id,
        date: date.to_string(),
        description: description.to_string(),
        amount,
        action: Action::from(action),
        owner: owner.to_string(),
        previous_action: Action::from_optional(previous_action),
    };
    let result = upsert_transaction(&conn, &txn)?;
    let verb = if result.created { "Created" } else { "Updated" };
    println!("{verb} transaction {}", result.transaction.id);
    println!("{}", transaction_table(std::slice::from_ref(&result.transaction)));
    Ok(())
}

pub fn suggest(data_dir: Option<&str>, owner: &str, descriptions: &[String]) -> Result<()> {
    let conn = open(data_dir)?;
    let suggestions = suggest_actions(&conn, descriptions, owner)?;
    println!("{}", serde_json::to_string_pretty(&suggestions)?);
    Ok(())
}
