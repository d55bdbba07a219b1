mod init;
pub use init::cmd_init;

use std::cell::Cell;
use std::path::{Path, PathBuf};

use log::info;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::lock::FileLock;
use crate::io::logging;
use crate::io::profile_io::{FileProfileStore, ProfileStore, StoreError};
use crate::io::state::{self, SessionState};
use crate::io::workspace_io::{self, Workspace, WorkspaceError};
use crate::model::list::SharedList;
use crate::ops::engine::{Outcome, SessionObserver, TaskEngine};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let start = start_dir(cli.dir.as_deref())?;

    match cli.command {
        Commands::Init(args) => cmd_init(args, &start),
        Commands::Signout => cmd_signout(&start),

        // Read commands
        Commands::Lists => cmd_lists(&start, json),
        Commands::Show(args) => cmd_show(args, &start, json),
        Commands::Notifications(args) if !args.mark_read => cmd_notifications(&start, json),

        // Write commands
        Commands::Select(args) => cmd_select(args, &start, json),
        Commands::Add(args) => cmd_add(args, &start, json),
        Commands::Pick(args) => cmd_pick(args, &start, json, true),
        Commands::Unpick(args) => cmd_pick(args, &start, json, false),
        Commands::Complete => cmd_complete(&start, json),
        Commands::Star(args) => cmd_star(args, &start, json),
        Commands::Sort(args) => cmd_sort(args, &start, json),
        Commands::NewList(args) => cmd_new_list(args, &start, json),
        Commands::Rename(args) => cmd_rename(args, &start, json),
        Commands::DeleteList => cmd_delete_list(&start, json),
        Commands::Notifications(_) => cmd_mark_read(&start, json),
    }
}

// ---------------------------------------------------------------------------
// Session plumbing
// ---------------------------------------------------------------------------

/// Logs shared-list opens so the log shows who a list is shared with
struct LogObserver;

impl SessionObserver for LogObserver {
    fn shared_list_selected(&mut self, list: &SharedList) {
        info!(
            "event=shared_list_open module=cli list={} collaborator={}",
            list.list.id, list.shared_with.id
        );
    }
}

/// A loaded workspace with its profile in the engine and the previous
/// invocation's view restored.
struct Session {
    ws: Workspace,
    store: FileProfileStore,
    engine: TaskEngine,
    _lock: Option<FileLock>,
}

fn start_dir(dir: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match dir {
        Some(dir) => Ok(std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?),
        None => Ok(std::env::current_dir().map_err(WorkspaceError::IoError)?),
    }
}

fn load_workspace_from(start: &Path) -> Result<Workspace, WorkspaceError> {
    let root = workspace_io::discover_workspace(start)?;
    let ws = workspace_io::load_workspace(&root)?;
    start_logging(&ws);
    Ok(ws)
}

fn start_logging(ws: &Workspace) {
    if let Err(e) = logging::init_logging(&ws.config.log.level, &ws.log_dir()) {
        eprintln!("warning: {}", e);
    }
}

fn open_session(start: &Path, write: bool) -> Result<Session, Box<dyn std::error::Error>> {
    let ws = load_workspace_from(start)?;
    let lock = if write {
        Some(FileLock::acquire_default(&ws.data_dir)?)
    } else {
        None
    };

    let store = FileProfileStore::new(ws.profile_path());
    let profile = store
        .fetch()?
        .ok_or_else(|| StoreError::Missing(store.path().to_path_buf()))?;
    let profile_id = profile.id.clone();

    let mut engine = TaskEngine::new().with_observer(Box::new(LogObserver));
    engine.load(profile);

    let saved = state::read_session_state(&ws.data_dir).filter(|s| s.profile_id == profile_id);
    if let Some(saved) = saved {
        if let Outcome::Skipped(reason) = engine.restore(&saved.view) {
            info!("event=view_restore module=cli status=skipped reason={}", reason);
        }
    }

    Ok(Session {
        ws,
        store,
        engine,
        _lock: lock,
    })
}

/// Turn a skipped outcome into a command error
fn require(outcome: Outcome) -> CmdResult {
    match outcome {
        Outcome::Applied => Ok(()),
        Outcome::Skipped(reason) => Err(reason.to_string().into()),
    }
}

impl Session {
    /// Persist the profile if the engine wrote to it, then the view
    fn save(&self) -> CmdResult {
        if let Some(profile) = self.engine.profile() {
            if self.engine.revision() > 0 {
                self.store.update(profile)?;
                info!(
                    "event=profile_save module=cli status=ok revision={}",
                    self.engine.revision()
                );
            }
            let session_state = SessionState {
                profile_id: profile.id.clone(),
                view: self.engine.snapshot(),
            };
            state::write_session_state(&self.ws.data_dir, &session_state)?;
        }
        Ok(())
    }

    /// Print the current view as JSON, or `text` otherwise
    fn report(&self, json: bool, text: &str) -> CmdResult {
        if json {
            println!("{}", serde_json::to_string_pretty(&view_to_json(&self.engine))?);
        } else if !text.is_empty() {
            println!("{}", text);
        }
        Ok(())
    }
}

/// Run a mutation, persist, and report
fn write_command(
    start: &Path,
    json: bool,
    op: impl FnOnce(&mut TaskEngine) -> Outcome,
    text: impl FnOnce(&TaskEngine) -> String,
) -> CmdResult {
    let mut session = open_session(start, true)?;
    require(op(&mut session.engine))?;
    session.save()?;
    let message = text(&session.engine);
    session.report(json, &message)
}

fn current_name(engine: &TaskEngine) -> String {
    engine
        .current_list()
        .map(|c| format!("{} ({})", c.name(), c.id()))
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_lists(start: &Path, json: bool) -> CmdResult {
    let session = open_session(start, false)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&lists_to_json(&session.engine))?);
    } else {
        for line in format_lists(&session.engine) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_show(args: ShowArgs, start: &Path, json: bool) -> CmdResult {
    let session = open_session(start, false)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&view_to_json(&session.engine))?);
        return Ok(());
    }
    let show_completed = args.completed || session.ws.config.view.show_completed;
    for line in format_view(&session.engine, show_completed) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_notifications(start: &Path, json: bool) -> CmdResult {
    let session = open_session(start, false)?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&notifications_to_json(&session.engine))?
        );
    } else {
        for line in format_notifications(&session.engine) {
            println!("{}", line);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_select(args: SelectArgs, start: &Path, json: bool) -> CmdResult {
    write_command(start, json, |e| e.select_list(&args.id), current_name)
}

fn cmd_add(args: AddArgs, start: &Path, json: bool) -> CmdResult {
    let title = args.title.join(" ");
    write_command(
        start,
        json,
        |e| e.add_task(&title),
        |e| e.active().last().map(|t| t.id.clone()).unwrap_or_default(),
    )
}

fn cmd_pick(args: PickArgs, start: &Path, json: bool, checked: bool) -> CmdResult {
    write_command(
        start,
        json,
        |e| {
            for id in &args.ids {
                let outcome = e.set_selected(id, checked);
                if !outcome.is_applied() {
                    return outcome;
                }
            }
            Outcome::Applied
        },
        |e| format!("{} picked", e.selected().len()),
    )
}

fn cmd_complete(start: &Path, json: bool) -> CmdResult {
    let count = Cell::new(0);
    write_command(
        start,
        json,
        |e| {
            count.set(e.selected().len());
            e.complete_selected()
        },
        |_| format!("{} completed", count.get()),
    )
}

fn cmd_star(args: StarArgs, start: &Path, json: bool) -> CmdResult {
    write_command(
        start,
        json,
        |e| e.toggle_star(&args.id),
        |e| {
            let starred = e
                .active()
                .iter()
                .chain(e.completed())
                .find(|t| t.id == args.id)
                .is_some_and(|t| t.starred);
            format!("{} {}", args.id, if starred { "starred" } else { "unstarred" })
        },
    )
}

fn cmd_sort(args: SortArgs, start: &Path, json: bool) -> CmdResult {
    write_command(
        start,
        json,
        |e| e.sort(args.criterion),
        |e| format_view(e, false).join("\n"),
    )
}

fn cmd_new_list(args: NewListArgs, start: &Path, json: bool) -> CmdResult {
    let name = args.name.join(" ");
    write_command(
        start,
        json,
        |e| e.create_list(&name),
        |e| e.current_list().map(|c| c.id().to_string()).unwrap_or_default(),
    )
}

fn cmd_rename(args: RenameArgs, start: &Path, json: bool) -> CmdResult {
    let name = args.name.join(" ");
    write_command(start, json, |e| e.rename_list(&name), current_name)
}

fn cmd_delete_list(start: &Path, json: bool) -> CmdResult {
    write_command(start, json, |e| e.delete_list(), |e| {
        format!("now showing {}", current_name(e))
    })
}

fn cmd_mark_read(start: &Path, json: bool) -> CmdResult {
    let session = {
        let mut session = open_session(start, true)?;
        require(session.engine.mark_all_notifications_read())?;
        session.save()?;
        session
    };
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&notifications_to_json(&session.engine))?
        );
    } else {
        println!("{} marked read", session.engine.read_notifications().len());
    }
    Ok(())
}

/// Forget the current list, picks and sort. The profile itself is untouched.
fn cmd_signout(start: &Path) -> CmdResult {
    let ws = load_workspace_from(start)?;
    let _lock = FileLock::acquire_default(&ws.data_dir)?;
    state::clear_session_state(&ws.data_dir)?;
    info!("event=session_end module=cli status=ok");
    println!("signed out");
    Ok(())
}
