// Inherit lint configuration from lib.rs for consistency
#![allow(clippy::missing_errors_doc, clippy::needless_pass_by_value)]

use clap::Parser;
use tracing::Level;

use devicedb::cli::commands::{Cli, Command};
use devicedb::cli::output;
use devicedb::config::Config;
use devicedb::inventory::Inventory;
use devicedb::models::Record;
use devicedb::server;

fn main() {
    let cli = Cli::parse();

    let level = match cli.command {
        Command::Serve { .. } => Level::INFO,
        _ => Level::WARN,
    };
    init_tracing(level);

    if let Err(e) = run(cli) {
        eprintln!("{}", output::format_error(&e));
        std::process::exit(1);
    }
}

/// Logs go to stderr; stdout carries the JSON results.
fn init_tracing(level: Level) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::fmt::Display>> {
    let config = Config::new(&cli.data_dir);
    match cli.command {
        Command::Init => cmd_init(&config),
        Command::List => cmd_list(&config),
        Command::Add { json, after } => cmd_add(&config, &json, after),
        Command::Edit { line, json } => cmd_edit(&config, line, &json),
        Command::Delete { line } => cmd_delete(&config, line),
        Command::Backups => cmd_backups(&config),
        Command::Restore { name } => cmd_restore(&config, &name),
        Command::Serve { listen } => cmd_serve(config, listen),
    }
}

type CmdResult = Result<(), Box<dyn std::fmt::Display>>;

fn map_err(e: impl std::fmt::Display + 'static) -> Box<dyn std::fmt::Display> {
    Box::new(e.to_string())
}

fn get_inventory(config: &Config) -> Result<Inventory, Box<dyn std::fmt::Display>> {
    Inventory::open(config).map_err(map_err)
}

fn parse_record(json: &str) -> Result<Record, Box<dyn std::fmt::Display>> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| map_err(devicedb::error::DbError::Json(e)))?;
    Record::from_json(&value).map_err(map_err)
}

fn cmd_init(config: &Config) -> CmdResult {
    config.ensure_layout().map_err(map_err)?;
    if !config.config_path.exists() {
        config.save_settings().map_err(map_err)?;
    }
    println!("{}", output::format_success());
    Ok(())
}

fn cmd_list(config: &Config) -> CmdResult {
    let inv = get_inventory(config)?;
    let entries = inv.list().map_err(map_err)?;
    println!("{}", output::format_json(&entries));
    Ok(())
}

fn cmd_add(config: &Config, json: &str, after: Option<usize>) -> CmdResult {
    let record = parse_record(json)?;
    let inv = get_inventory(config)?;
    inv.add(&record, after).map_err(map_err)?;
    println!("{}", output::format_success());
    Ok(())
}

fn cmd_edit(config: &Config, line: usize, json: &str) -> CmdResult {
    let record = parse_record(json)?;
    let inv = get_inventory(config)?;
    inv.edit(line, &record).map_err(map_err)?;
    println!("{}", output::format_success());
    Ok(())
}

fn cmd_delete(config: &Config, line: usize) -> CmdResult {
    let inv = get_inventory(config)?;
    inv.delete(line).map_err(map_err)?;
    println!("{}", output::format_success());
    Ok(())
}

fn cmd_backups(config: &Config) -> CmdResult {
    let inv = get_inventory(config)?;
    let backups = inv.backups().map_err(map_err)?;
    println!("{}", output::format_json(&backups));
    Ok(())
}

fn cmd_restore(config: &Config, name: &str) -> CmdResult {
    let inv = get_inventory(config)?;
    inv.restore(name).map_err(map_err)?;
    println!("{}", output::format_success());
    Ok(())
}

fn cmd_serve(mut config: Config, listen: Option<String>) -> CmdResult {
    if let Some(addr) = listen {
        config.settings.server.listen_addr = addr;
    }
    let rt = tokio::runtime::Runtime::new().map_err(map_err)?;
    rt.block_on(async { server::serve(config).await.map_err(map_err) })
}
