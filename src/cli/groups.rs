use comfy_table::{Cell, Table};

use crate::balances::{self, GroupBalance};
use crate::error::Result;
use crate::fmt::{money, signed_money, yes_no};
use crate::models::Group;
use crate::store::{self, GroupFlag};

use super::open;

pub fn add(data_dir: Option<&str>, name: &str, person1: &str, person2: &str) -> Result<()> {
    let conn = open(data_dir)?;
    let group = store::create_group(&conn, name, person1, person2)?;
    println!("Added group {}: {} ({} & {})", group.id, group.name, group.person1, group.person2);
    Ok(())
}

fn group_table(groups: &[Group]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Person 1", "Person 2", "Hidden", "Archived", "Settled"]);
    for g in groups {
        table.add_row(vec![
            Cell::new(g.id),
            Cell::new(&g.name),
            Cell::new(&g.person1),
            Cell::new(&g.person2),
            Cell::new(yes_no(g.hidden)),
            Cell::new(yes_no(g.archived)),
            Cell::new(yes_no(g.settled)),
        ]);
    }
    table
}

pub fn list(data_dir: Option<&str>, all: bool, skip: i64, limit: i64) -> Result<()> {
    let conn = open(data_dir)?;
    let groups = store::list_groups(&conn, all, skip, limit)?;
    if groups.is_empty() {
        println!("No groups found.");
        return Ok(());
    }
    println!("Groups\n{}", group_table(&groups));
    Ok(())
}

pub fn show(data_dir: Option<&str>, id: i64) -> Result<()> {
    let conn = open(data_dir)?;
    let group = store::require_group(&conn, id)?;
    let files = store::list_files(&conn, id)?;
    println!("{}", group_table(std::slice::from_ref(&group)));
    if files.is_empty() {
        println!("No files uploaded.");
    } else {
        println!("Files\n{}", super::files::file_table(&files, &group));
    }
    Ok(())
}

pub fn set_flag(data_dir: Option<&str>, id: i64, flag: GroupFlag, value: bool) -> Result<()> {
    let conn = open(data_dir)?;
    let group = store::set_group_flag(&conn, id, flag, value)?;
    let verb = match (flag, value) {
        (GroupFlag::Hidden, true) => "hidden",
        (GroupFlag::Hidden, false) => "unhidden",
        (GroupFlag::Archived, true) => "archived",
        (GroupFlag::Archived, false) => "restored",
        (GroupFlag::Settled, true) => "settled",
        (GroupFlag::Settled, false) => "unsettled",
    };
    println!("Group {} {verb}", group.name);
    Ok(())
}

pub fn delete(data_dir: Option<&str>, id: i64) -> Result<()> {
    let conn = open(data_dir)?;
    store::delete_group(&conn, id)?;
    println!("Group {id} and its files deleted");
    Ok(())
}

fn print_balance(b: &GroupBalance) {
    println!(
        "{}: {} {}  {} {}",
        b.name,
        b.person1,
        signed_money(b.balance_person1),
        b.person2,
        signed_money(b.balance_person2)
    );
}

pub fn balance(data_dir: Option<&str>, id: i64) -> Result<()> {
    let conn = open(data_dir)?;
    print_balance(&balances::group_balance(&conn, id)?);
    Ok(())
}

pub fn all_balances(data_dir: Option<&str>) -> Result<()> {
    let conn = open(data_dir)?;
    let all = balances::all_group_balances(&conn)?;
    if all.is_empty() {
        println!("No groups found.");
        return Ok(());
    }
    let mut table = Table::new();
    table.set_header(vec!["ID", "Group", "Person 1", "Balance", "Person 2", "Balance"]);
    for b in &all {
        table.add_row(vec![
            Cell::new(b.id),
            Cell::new(&b.name),
            Cell::new(&b.person1),
            Cell::new(money(b.balance_person1)),
            Cell::new(&b.person2),
            Cell::new(money(b.balance_person2)),
        ]);
    }
    println!("Balances\n{table}");
    Ok(())
}
