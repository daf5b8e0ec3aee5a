mod balances;
mod cli;
mod db;
mod error;
mod fmt;
mod headers;
mod history;
mod importer;
mod models;
mod reconciler;
mod settings;
mod store;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, FilesCommands, GroupsCommands, TxCommands};
use store::GroupFlag;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let data_dir = cli.data_dir.as_deref();

    let result = match cli.command {
        Commands::Init { owner } => cli::init::run(data_dir, owner.as_deref()),
        Commands::Groups { command } => match command {
            GroupsCommands::Add {
                name,
                person1,
                person2,
            } => cli::groups::add(data_dir, &name, &person1, &person2),
            GroupsCommands::List { all, skip, limit } => cli::groups::list(data_dir, all, skip, limit),
            GroupsCommands::Show { id } => cli::groups::show(data_dir, id),
            GroupsCommands::Hide { id } => cli::groups::set_flag(data_dir, id, GroupFlag::Hidden, true),
            GroupsCommands::Unhide { id } => cli::groups::set_flag(data_dir, id, GroupFlag::Hidden, false),
            GroupsCommands::Archive { id } => cli::groups::set_flag(data_dir, id, GroupFlag::Archived, true),
            GroupsCommands::Restore { id } => cli::groups::set_flag(data_dir, id, GroupFlag::Archived, false),
            GroupsCommands::Settle { id } => cli::groups::set_flag(data_dir, id, GroupFlag::Settled, true),
            GroupsCommands::Unsettle { id } => cli::groups::set_flag(data_dir, id, GroupFlag::Settled, false),
            GroupsCommands::Delete { id } => cli::groups::delete(data_dir, id),
            GroupsCommands::Balance { id } => cli::groups::balance(data_dir, id),
            GroupsCommands::Balances => cli::groups::all_balances(data_dir),
        },
        Commands::Files { command } => match command {
            FilesCommands::List { group } => cli::files::list(data_dir, group),
            FilesCommands::Show { id } => cli::files::show(data_dir, id),
            FilesCommands::Delete { id, group } => cli::files::delete(data_dir, group, id),
            FilesCommands::Balances {
                id,
                person1,
                person2,
            } => cli::files::set_balances(data_dir, id, person1, person2),
            FilesCommands::Transactions { id } => cli::files::transactions(data_dir, id),
        },
        Commands::Import { file, group, owner } => {
            cli::import::run(data_dir, &file, group, owner.as_deref())
        }
        Commands::Tx { command } => match command {
            TxCommands::Show { id } => cli::tx::show(data_dir, id),
            TxCommands::Save { input, group } => cli::tx::save(data_dir, group, &input),
            TxCommands::Add { input, file } => cli::tx::add(data_dir, file, &input),
            TxCommands::Set {
                file,
                date,
                description,
                amount,
                action,
                owner,
                previous_action,
            } => cli::tx::set(
                data_dir,
                file,
                &date,
                &description,
                amount,
                &action,
                &owner,
                previous_action.as_deref(),
            ),
            TxCommands::Suggest {
                owner,
                descriptions,
            } => cli::tx::suggest(data_dir, &owner, &descriptions),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
