//! Dispatch: parse arguments, wire the context, call the API, render the result.

use super::render;
use super::setup::{
    Cli, Commands, ExportArgs, KnownCommands, ListCommands, PendingCommands, RouteCommands,
};
use anyhow::{bail, Context, Result};
use clap::Parser;
use scanlistapp::commands::config::ConfigAction;
use scanlistapp::commands::CmdResult;
use scanlistapp::error::ScanError;
use scanlistapp::export::CsvOptions;
use scanlistapp::handoff::RetryPolicy;
use scanlistapp::init::{initialize, FsScanApi};
use scanlistapp::model::{Candidate, ScanMode};
use serde::Serialize;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV: &str = "SCANLIST_LOG";

#[derive(Serialize)]
struct ScanAddress {
    mode: ScanMode,
    address: String,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let ctx = initialize(cli.data.clone()).context("could not open the scanlist data directory")?;
    tracing::debug!(data = %ctx.data_dir.display(), "ready");

    let command = cli.command.unwrap_or(Commands::List(ListCommands::Ls));
    match dispatch(&ctx.api, command) {
        Ok(Output::Result(result)) => emit(&result, cli.json),
        Ok(Output::Raw(text)) => {
            println!("{}", text);
            Ok(())
        }
        Ok(Output::Address(address)) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&address)?);
            } else {
                println!("{}", address.address);
            }
            Ok(())
        }
        // Repeats are expected while a camera stays on a code
        Err(e) if e.downcast_ref::<ScanError>().is_some_and(ScanError::is_duplicate) => {
            render::print_messages(&[scanlistapp::commands::CmdMessage::info(e.to_string())]);
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Logs go to stderr. `SCANLIST_LOG` takes EnvFilter syntax; `-v` raises the default to debug.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

enum Output {
    Result(CmdResult),
    /// Printed verbatim, for output meant to be piped (CSV, text to type)
    Raw(String),
    Address(ScanAddress),
}

fn dispatch(api: &FsScanApi, command: Commands) -> Result<Output> {
    let result = match command {
        Commands::List(action) => match action {
            ListCommands::Create { name } => api.create_list(&name)?,
            ListCommands::Ls => api.list_lists()?,
            ListCommands::Rename { name, new_name } => api.rename_list(&name, &new_name)?,
            ListCommands::Delete { name, confirm } => {
                let Some(confirmation) = confirm else {
                    bail!(
                        "deleting a list needs confirmation: re-run with --confirm '{}'",
                        name.trim()
                    );
                };
                api.delete_list(&name, &confirmation)?
            }
            ListCommands::Meta {
                name,
                item_name,
                supplier_name,
            } => api.set_list_meta(&name, item_name, supplier_name)?,
        },
        Commands::Scan {
            list,
            code,
            code_type,
            label,
        } => api.add_scan(&list, &code, &code_type, label)?,
        Commands::Items { list } => api.items(&list)?,
        Commands::Label { list, item, label } => {
            let id = api.resolve_item(&list, &item)?;
            api.update_item_label(&id, label)?
        }
        Commands::Rm { list, item } => {
            let id = api.resolve_item(&list, &item)?;
            api.delete_item(&id)?
        }
        Commands::Export(args) => return export(api, args),
        Commands::Capture {
            codes,
            mode,
            list,
            symbology,
        } => {
            let candidates = codes
                .into_iter()
                .map(|code| Candidate::new(code, symbology.clone()))
                .collect();
            api.stage_capture(candidates, mode.into(), list)
        }
        Commands::Pending(action) => match action {
            PendingCommands::Show => api.pending(),
            PendingCommands::Commit { list } => api.commit_pending(list.as_deref())?,
            PendingCommands::Insert { attempts, delay_ms } => {
                let configured = api.settings().retry_policy();
                let policy = RetryPolicy {
                    attempts: attempts.unwrap_or(configured.attempts),
                    delay: delay_ms.map(Duration::from_millis).unwrap_or(configured.delay),
                };
                let mut result = api.insert_pending(Some(policy));
                return Ok(match result.text.take() {
                    Some(text) => Output::Raw(text),
                    None => Output::Result(result),
                });
            }
            PendingCommands::Clear => api.clear_pending(),
        },
        Commands::Known(action) => match action {
            KnownCommands::Ls => api.known_lists(),
            KnownCommands::Add { name } => api.add_known_list(&name)?,
            KnownCommands::Rm { name } => api.remove_known_list(&name),
        },
        Commands::Route(action) => match action {
            RouteCommands::Build { mode } => {
                let mode: ScanMode = mode.into();
                return Ok(Output::Address(ScanAddress {
                    mode,
                    address: api.scan_address(mode),
                }));
            }
            RouteCommands::Parse { address } => {
                let result = api.parse_activation(&address);
                if result.activation.is_none() {
                    bail!("not a scan address: {}", address.trim());
                }
                result
            }
        },
        Commands::Config { key, template } => {
            let action = match (key, template) {
                (_, true) => ConfigAction::Template,
                (Some(key), false) => ConfigAction::ShowKey(key),
                (None, false) => ConfigAction::ShowAll,
            };
            let mut result = api.config(action);
            if let Some(text) = result.text.take() {
                return Ok(Output::Raw(text));
            }
            result
        }
    };
    Ok(Output::Result(result))
}

fn export(api: &FsScanApi, args: ExportArgs) -> Result<Output> {
    let mut options = match args.delimiter {
        Some(delimiter) => CsvOptions::new(delimiter)?,
        None => api.settings().csv_options()?,
    };
    options.include_header = !args.no_header;

    match args.out {
        Some(dir) => Ok(Output::Result(api.export_to_dir(&args.list, Some(options), &dir)?)),
        None => {
            let result = api.export_csv(&args.list, Some(options))?;
            Ok(Output::Raw(result.text.unwrap_or_default()))
        }
    }
}

fn emit(result: &CmdResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    render::print_lists(&result.lists);
    render::print_items(&result.listed_items);
    render::print_items(&result.affected_items);
    if let Some(batch) = &result.pending {
        render::print_pending(batch);
    }
    render::print_names(&result.names);
    if let Some(activation) = &result.activation {
        render::print_activation(activation);
    }
    if let Some(config) = &result.config {
        render::print_config(config);
    }
    if let Some(path) = &result.export_path {
        println!("{}", path.display());
    }
    render::print_messages(&result.messages);
    Ok(())
}
