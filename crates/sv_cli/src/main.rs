use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use log::debug;
use serde_json::Value as JsonValue;
use sv_core::core_api::{
    Attempt, DEFAULT_MOD_SUBFOLDER, DEFAULT_SAVE_DIR, ManagerConfig, MutationReport,
    MutationRequest, OperationMode, SaveManager, overview, reference_counts,
};
use sv_core::game_data::SaveState;
use sv_core::item_kind::ItemKind;

const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;
const EXIT_BUSY: i32 = 3;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Directory holding the SaveGameData_??.dat files.
    #[arg(long = "save-dir", global = true, value_name = "DIR", default_value = DEFAULT_SAVE_DIR)]
    save_dir: PathBuf,
    /// Folder next to the save that receives backups and the staging file.
    #[arg(long = "mod-folder", global = true, value_name = "NAME", default_value = DEFAULT_MOD_SUBFOLDER)]
    mod_folder: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List saves in the save directory.
    List,
    /// Summarize the containers of a save.
    Inspect {
        #[arg(value_name = "SAVE")]
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Show where an item is referenced.
    Find {
        #[arg(value_name = "SAVE")]
        path: PathBuf,
        #[arg(long, value_name = "KIND:ID", value_parser = parse_entry)]
        entry: EntryArg,
        #[arg(long)]
        json: bool,
    },
    /// Remove every reference to the given items and write the save back.
    Remove {
        #[arg(value_name = "SAVE")]
        path: PathBuf,
        #[arg(long = "entry", value_name = "KIND:ID", required = true, value_parser = parse_entry)]
        entries: Vec<EntryArg>,
        #[arg(long)]
        json: bool,
    },
    /// Retarget every reference to the given items and write the save back.
    Replace {
        #[arg(value_name = "SAVE")]
        path: PathBuf,
        #[arg(long = "entry", value_name = "KIND:ID=NEW", required = true, value_parser = parse_entry)]
        entries: Vec<EntryArg>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EntryArg {
    kind: ItemKind,
    id: i32,
    new_id: Option<i32>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let manager = SaveManager::new(ManagerConfig {
        save_dir: cli.save_dir.clone(),
        mod_subfolder: cli.mod_folder.clone(),
    });

    match cli.command {
        Command::List => {
            let names = completed_or_exit(manager.list_saves());
            print!("{}", sv_render::render_save_list(&names));
        }
        Command::Inspect { path, json } => {
            let path = manager.resolve_save_path(&path);
            let state = load_or_exit(&manager, &path);
            let summary = overview(&state);
            if json {
                print_json(&sv_render::overview_to_json(&path, &summary));
            } else {
                print!("{}", sv_render::render_overview_text(&path, &summary));
            }
        }
        Command::Find { path, entry, json } => {
            if entry.new_id.is_some() {
                usage_error("find takes --entry KIND:ID without a replacement id");
            }
            let path = manager.resolve_save_path(&path);
            let mut state = load_or_exit(&manager, &path);
            let counts = reference_counts(&mut state, entry.kind, entry.id);
            if json {
                print_json(&sv_render::references_to_json(entry.kind, entry.id, &counts));
            } else {
                print!(
                    "{}",
                    sv_render::render_references_text(entry.kind, entry.id, &counts)
                );
            }
        }
        Command::Remove {
            path,
            entries,
            json,
        } => {
            let requests = entries
                .iter()
                .map(|entry| match entry.new_id {
                    None => MutationRequest::remove(entry.kind, entry.id),
                    Some(_) => usage_error("remove takes --entry KIND:ID without '=NEW'"),
                })
                .collect::<Vec<_>>();
            mutate_and_save(&manager, &path, OperationMode::Remove, &requests, json);
        }
        Command::Replace {
            path,
            entries,
            json,
        } => {
            let requests = entries
                .iter()
                .map(|entry| match entry.new_id {
                    Some(new_id) => MutationRequest::replace(entry.kind, entry.id, new_id),
                    None => usage_error("replace takes --entry KIND:ID=NEW"),
                })
                .collect::<Vec<_>>();
            mutate_and_save(&manager, &path, OperationMode::Replace, &requests, json);
        }
    }
}

fn mutate_and_save(
    manager: &SaveManager,
    path: &Path,
    mode: OperationMode,
    requests: &[MutationRequest],
    json: bool,
) {
    let path = manager.resolve_save_path(path);
    let mut state = load_or_exit(manager, &path);
    let report: MutationReport =
        completed_or_exit(manager.remove_or_replace(mode, &mut state, requests));

    if json {
        print_json(&sv_render::report_to_json(&report));
    } else {
        println!("{}", sv_render::render_report_text(&report));
    }

    if report.changed() == 0 {
        debug!("no entries changed; {} left untouched", path.display());
        println!("Nothing changed; save left untouched");
        return;
    }

    match manager.save(&state, &path) {
        Ok(attempt) => {
            completed_or_exit(attempt);
            println!("Backup: {}", manager.last_backup_display());
        }
        Err(e) => {
            eprintln!("Error saving {}: {e}", path.display());
            eprintln!("Backup: {}", manager.last_backup_display());
            process::exit(EXIT_ERROR);
        }
    }
}

fn load_or_exit(manager: &SaveManager, path: &Path) -> SaveState {
    let attempt = manager.load(path).unwrap_or_else(|e| {
        eprintln!("Error loading {}: {e}", path.display());
        process::exit(EXIT_ERROR);
    });
    completed_or_exit(attempt)
}

fn completed_or_exit<T>(attempt: Attempt<T>) -> T {
    match attempt {
        Attempt::Completed(value) => value,
        Attempt::Busy => {
            eprintln!("Another operation is in progress, try again later");
            process::exit(EXIT_BUSY);
        }
    }
}

fn usage_error(message: &str) -> ! {
    eprintln!("{message}");
    process::exit(EXIT_USAGE);
}

fn print_json(value: &JsonValue) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("Error rendering JSON output: {e}");
            process::exit(EXIT_ERROR);
        }
    }
}

/// Parses `KIND:ID` or `KIND:ID=NEW`, e.g. `equipment:42` or `item:5=7`.
fn parse_entry(value: &str) -> Result<EntryArg, String> {
    let (kind, rest) = value
        .split_once(':')
        .ok_or_else(|| format!("invalid entry '{value}', expected KIND:ID or KIND:ID=NEW"))?;
    let kind: ItemKind = kind.parse()?;
    let (id, new_id) = match rest.split_once('=') {
        Some((id, new_id)) => (id, Some(new_id)),
        None => (rest, None),
    };

    let id = parse_id(id)?;
    let new_id = new_id.map(parse_id).transpose()?;
    Ok(EntryArg { kind, id, new_id })
}

fn parse_id(value: &str) -> Result<i32, String> {
    value
        .trim()
        .parse::<i32>()
        .map_err(|_| format!("invalid item id '{value}'"))
}
