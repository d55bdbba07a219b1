use std::path::Path;

use chrono::Utc;
use log::info;

use crate::cli::commands::InitArgs;
use crate::io::profile_io::{FileProfileStore, ProfileStore};
use crate::io::state;
use crate::io::workspace_io;
use crate::model::profile::Profile;

/// Validate the name and email given to `tareas init`.
fn validate_identity(name: &str, email: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("profile name cannot be empty".to_string());
    }
    let Some((user, domain)) = email.trim().split_once('@') else {
        return Err(format!("invalid email '{}'", email));
    };
    if user.is_empty() || domain.is_empty() {
        return Err(format!("invalid email '{}'", email));
    }
    Ok(())
}

/// Create `tareas/` under `root` and store a fresh, empty profile.
///
/// With `--force` the config is rewritten; an existing profile is kept.
pub fn cmd_init(args: InitArgs, root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    validate_identity(&args.name, &args.email)?;

    let ws = workspace_io::init_workspace(root, args.force)?;
    super::start_logging(&ws);

    let store = FileProfileStore::new(ws.profile_path());
    if store.fetch()?.is_some() {
        info!("event=workspace_init module=cli status=ok profile=kept");
        println!("Reinitialized tareas/ in {} (profile kept)", ws.root.display());
        return Ok(());
    }

    let id = Utc::now().timestamp_millis().to_string();
    let profile = Profile::new(id, args.name.trim().to_string(), args.email.trim().to_string());
    store.create(&profile)?;
    state::clear_session_state(&ws.data_dir)?;

    info!(
        "event=workspace_init module=cli status=ok profile={}",
        profile.id
    );
    println!("Initialized tareas/ in {}", ws.root.display());
    Ok(())
}
