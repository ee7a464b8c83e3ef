mod cli;
mod error;

use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};
use bookshop_config::Config;
use bookshop_store::{Book, Database, Publisher, Sale, Shop, Stock, Table, seed};
use clap::Parser;
use exn::{OptionExt, ResultExt};
use std::io::Write;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level());
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:?}");
            ExitCode::FAILURE
        },
    }
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // Only fails if a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    let mut db = Database::open(&config.database).await.or_raise(|| ErrorKind::Store)?;
    let result = execute(&mut db, cli.command, &mut std::io::stdout().lock()).await;
    if let Err(err) = db.close().await {
        warn!("{err:?}");
    }
    result
}

async fn execute(db: &mut Database, command: Command, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Init => {
            db.ensure_schema().await.or_raise(|| ErrorKind::Store)?;
            info!("schema is ready");
        },
        Command::Seed => {
            db.ensure_schema().await.or_raise(|| ErrorKind::Store)?;
            let summary = seed::sample_data(&mut db.repository())
                .await
                .or_raise(|| ErrorKind::Store)?;
            writeln!(
                out,
                "Inserted {} publishers, {} books, {} shops, {} stock rows and {} sales.",
                summary.publishers, summary.books, summary.shops, summary.stock, summary.sales,
            )
            .or_raise(|| ErrorKind::Output)?;
        },
        Command::Check { table } => {
            require_table(db, &table).await?;
            writeln!(out, "Table '{table}' exists.").or_raise(|| ErrorKind::Output)?;
        },
        Command::List { table } => {
            require_table(db, &table).await?;
            let parsed = table.parse::<Table>().or_raise(|| ErrorKind::MissingTable(table.clone()))?;
            for line in list(db, parsed).await.or_raise(|| ErrorKind::Store)? {
                writeln!(out, "{line}").or_raise(|| ErrorKind::Output)?;
            }
        },
        Command::Shops { publisher } => {
            db.ensure_schema().await.or_raise(|| ErrorKind::Store)?;
            let publisher = match publisher {
                Some(name) => name,
                None => read_publisher().await?,
            };
            let shops = db
                .repository()
                .shops_for_publisher(&publisher)
                .await
                .or_raise(|| ErrorKind::Store)?;
            writeln!(out, "Shops selling books from publisher '{publisher}':").or_raise(|| ErrorKind::Output)?;
            if shops.is_empty() {
                writeln!(out, "No shops found for this publisher.").or_raise(|| ErrorKind::Output)?;
            }
            for shop in shops {
                writeln!(out, "- {}", shop.name).or_raise(|| ErrorKind::Output)?;
            }
        },
    }
    Ok(())
}

/// Fail with [`ErrorKind::MissingTable`] unless the table exists.
///
/// Any table can be checked for, not just the bookshop ones.
async fn require_table(db: &mut Database, name: &str) -> Result<()> {
    if !db.table_exists(name).await.or_raise(|| ErrorKind::Store)? {
        exn::bail!(ErrorKind::MissingTable(name.to_string()));
    }
    Ok(())
}

/// One printable line per row; names only for publishers and shops, titles
/// for books.
async fn list(db: &mut Database, table: Table) -> bookshop_store::error::Result<Vec<String>> {
    let mut repo = db.repository();
    let lines = match table {
        Table::Publisher => repo
            .list::<Publisher>()
            .await?
            .into_iter()
            .map(|publisher| publisher.entity.name)
            .collect(),
        Table::Book => repo.list::<Book>().await?.into_iter().map(|book| book.entity.title).collect(),
        Table::Shop => repo.list::<Shop>().await?.into_iter().map(|shop| shop.entity.name).collect(),
        Table::Stock => repo
            .list::<Stock>()
            .await?
            .iter()
            .map(|stock| format!("{}: book {} at shop {}, {} in stock", stock.id, stock.book, stock.shop, stock.count))
            .collect(),
        Table::Sale => repo
            .list::<Sale>()
            .await?
            .iter()
            .map(|sale| {
                format!(
                    "{}: {} sold at {:.2} on {} from stock {}",
                    sale.id, sale.count, sale.price, sale.date_sale, sale.stock
                )
            })
            .collect(),
    };
    Ok(lines)
}

async fn read_publisher() -> Result<String> {
    eprint!("Enter publisher name: ");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let line = lines.next_line().await.or_raise(|| ErrorKind::Input)?;
    let name = line.ok_or_raise(|| ErrorKind::Input)?;
    Ok(name.trim().to_string())
}
