use comfy_table::{Cell, Table};

use crate::balances;
use crate::error::Result;
use crate::fmt::money;
use crate::models::{File, Group, Transaction};
use crate::store;

use super::open;

pub(crate) fn file_table(files: &[File], group: &Group) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "ID".to_string(),
        "Name".to_string(),
        "Owner".to_string(),
        group.person1.clone(),
        group.person2.clone(),
    ]);
    for f in files {
        table.add_row(vec![
            Cell::new(f.id),
            Cell::new(&f.name),
            Cell::new(&f.owner),
            Cell::new(money(f.balance_person1)),
            Cell::new(money(f.balance_person2)),
        ]);
    }
    table
}

pub(crate) fn transaction_table(txns: &[Transaction]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Description", "Amount", "Action", "Previous", "Owner"]);
    for t in txns {
        table.add_row(vec![
            Cell::new(t.id),
            Cell::new(&t.date),
            Cell::new(&t.description),
            Cell::new(money(t.amount)),
            Cell::new(&t.action),
            Cell::new(t.previous_action.as_ref().map(|a| a.as_str()).unwrap_or_default()),
            Cell::new(&t.owner),
        ]);
    }
    table
}

pub fn list(data_dir: Option<&str>, group_id: i64) -> Result<()> {
    let conn = open(data_dir)?;
    let group = store::require_group(&conn, group_id)?;
    let files = store::list_files(&conn, group_id)?;
    if files.is_empty() {
        println!("No files uploaded to {}.", group.name);
        return Ok(());
    }
    println!("Files\n{}", file_table(&files, &group));
    Ok(())
}

pub fn show(data_dir: Option<&str>, id: i64) -> Result<()> {
    let conn = open(data_dir)?;
    let file = store::require_file(&conn, id)?;
    let group = store::require_group(&conn, file.group_id)?;
    println!("{}", file_table(std::slice::from_ref(&file), &group));
    Ok(())
}

pub fn delete(data_dir: Option<&str>, group_id: i64, id: i64) -> Result<()> {
    let conn = open(data_dir)?;
    store::delete_file(&conn, group_id, id)?;
    println!("File {id} and associated transactions deleted");
    Ok(())
}

pub fn set_balances(data_dir: Option<&str>, id: i64, person1: f64, person2: f64) -> Result<()> {
    let conn = open(data_dir)?;
    let file = balances::update_file_balances(&conn, id, person1, person2)?;
    println!(
        "{}: {} / {}",
        file.name,
        money(file.balance_person1),
        money(file.balance_person2)
    );
    Ok(())
}

pub fn transactions(data_dir: Option<&str>, id: i64) -> Result<()> {
    let conn = open(data_dir)?;
    store::require_file(&conn, id)?;
    let txns = store::list_transactions(&conn, id)?;
    println!("Transactions\n{}", transaction_table(&txns));
    Ok(())
}
