//! `parcel` command-line driver.
//!
//! # Responsibility
//! - Expose the tracker's use cases over a SQLite file for local use.
//! - Keep output plain and line-oriented.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use parcel_core::db::{open_db, open_db_in_memory, Connection};
use parcel_core::{
    default_log_level, init_logging, ClientId, Parcel, ParcelNumber, ParcelRepository,
    ParcelService, SqliteParcelRepository,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Register and track parcel shipments.")]
struct Cli {
    /// SQLite database file. Uses a throwaway in-memory store when omitted.
    #[arg(long, env = "PARCEL_DB", value_name = "PATH")]
    db: Option<PathBuf>,

    /// Log level: trace, debug, info, warn or error.
    #[arg(long, env = "PARCEL_LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for log files. Logging stays off when omitted.
    #[arg(long, env = "PARCEL_LOG_DIR", value_name = "DIR")]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a new parcel.
    Register {
        #[arg(long)]
        client: ClientId,
        #[arg(long)]
        address: String,
    },
    /// List all parcels of a client.
    List {
        #[arg(long)]
        client: ClientId,
    },
    /// Show one parcel.
    Show { number: ParcelNumber },
    /// Move a parcel to its next status.
    Advance { number: ParcelNumber },
    /// Change the address of a registered parcel.
    SetAddress {
        number: ParcelNumber,
        address: String,
    },
    /// Delete a registered parcel.
    Delete { number: ParcelNumber },
    /// Walk one client's parcels through the whole lifecycle.
    Demo {
        #[arg(long, default_value_t = 1)]
        client: ClientId,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        let dir = dir.to_str().context("log directory must be valid UTF-8")?;
        init_logging(level, dir).context("failed to initialize logging")?;
    }

    let conn = open_connection(cli.db.as_ref())?;
    info!(
        "event=cli_start module=cli status=ok version={} db={}",
        parcel_core::core_version(),
        cli.db
            .as_ref()
            .map_or_else(|| ":memory:".to_string(), |path| path.display().to_string())
    );
    let service = ParcelService::new(SqliteParcelRepository::try_new(&conn)?);

    run_command(&service, cli.command)
}

fn run_command<R: ParcelRepository>(service: &ParcelService<R>, command: Command) -> Result<()> {
    match command {
        Command::Register { client, address } => {
            let parcel = service.register(client, address)?;
            print_parcel(&parcel);
        }
        Command::List { client } => {
            for parcel in service.client_parcels(client)? {
                print_parcel(&parcel);
            }
        }
        Command::Show { number } => print_parcel(&service.get(number)?),
        Command::Advance { number } => match service.next_status(number)? {
            Some(status) => println!("parcel {number} -> {status}"),
            None => println!("parcel {number} is already delivered"),
        },
        Command::SetAddress { number, address } => {
            if !service.change_address(number, &address)? {
                bail!("parcel {number} is missing or no longer registered");
            }
            println!("parcel {number} address -> {address}");
        }
        Command::Delete { number } => {
            if !service.delete(number)? {
                bail!("parcel {number} is missing or no longer registered");
            }
            println!("parcel {number} deleted");
        }
        Command::Demo { client } => run_demo(service, client)?,
    }

    Ok(())
}

fn open_connection(path: Option<&PathBuf>) -> Result<Connection> {
    let conn = match path {
        Some(path) => open_db(path)
            .with_context(|| format!("failed to open database `{}`", path.display()))?,
        None => open_db_in_memory().context("failed to open in-memory database")?,
    };
    Ok(conn)
}

fn run_demo<R: ParcelRepository>(service: &ParcelService<R>, client: ClientId) -> Result<()> {
    let parcel = service.register(client, "Pskov, Sadovaya 5")?;
    println!("registered:");
    print_parcel(&parcel);

    let new_address = "Saratov, Verkhnyaya 3";
    service.change_address(parcel.number, new_address)?;
    println!("address changed -> {new_address}");

    if let Some(status) = service.next_status(parcel.number)? {
        println!("status changed -> {status}");
    }

    println!("parcels of client {client}:");
    for parcel in service.client_parcels(client)? {
        print_parcel(&parcel);
    }

    // Already sent, so the guarded delete leaves it in place.
    let deleted = service.delete(parcel.number)?;
    println!("delete after send applied: {deleted}");

    let second = service.register(client, "Samara, Lesnaya 7")?;
    let deleted = service.delete(second.number)?;
    println!("delete of fresh parcel {} applied: {deleted}", second.number);

    println!("parcels of client {client}:");
    for parcel in service.client_parcels(client)? {
        print_parcel(&parcel);
    }

    Ok(())
}

fn print_parcel(parcel: &Parcel) {
    println!(
        "number={} client={} status={} address={:?} created_at={}",
        parcel.number, parcel.client, parcel.status, parcel.address, parcel.created_at
    );
}
