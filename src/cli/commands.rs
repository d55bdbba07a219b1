use clap::{Args, Parser, Subcommand};

use crate::ops::sort::SortCriterion;

#[derive(Parser)]
#[command(name = "tareas", about = concat!("tareas v", env!("CARGO_PKG_VERSION"), " - lists, shared lists and the tasks in them"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different workspace directory
    #[arg(short = 'C', long = "dir", global = true)]
    pub dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create tareas/ and a fresh profile in the current directory
    Init(InitArgs),
    /// Show owned and shared lists
    Lists,
    /// Show the current list
    Show(ShowArgs),
    /// Make a list current
    Select(SelectArgs),
    /// Add a task to the current list
    Add(AddArgs),
    /// Pick tasks for completion
    Pick(PickArgs),
    /// Unpick tasks
    Unpick(PickArgs),
    /// Complete every picked task
    Complete,
    /// Toggle the star on a task
    Star(StarArgs),
    /// Sort the current list's open tasks (view only)
    Sort(SortArgs),
    /// Create a list and make it current
    NewList(NewListArgs),
    /// Rename the current list
    Rename(RenameArgs),
    /// Delete the current list
    DeleteList,
    /// List notifications, or mark them all read
    Notifications(NotificationsArgs),
    /// End the session: forget the current list, picks and sort
    Signout,
}

#[derive(Args)]
pub struct InitArgs {
    /// Display name for the profile
    #[arg(long)]
    pub name: String,
    /// Email for the profile
    #[arg(long)]
    pub email: String,
    /// Reinitialize even if tareas/ already exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Include completed tasks even if the config hides them
    #[arg(long)]
    pub completed: bool,
}

#[derive(Args)]
pub struct SelectArgs {
    /// List ID
    pub id: String,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    #[arg(required = true, num_args = 1..)]
    pub title: Vec<String>,
}

#[derive(Args)]
pub struct PickArgs {
    /// Task IDs
    #[arg(required = true, num_args = 1..)]
    pub ids: Vec<String>,
}

#[derive(Args)]
pub struct StarArgs {
    /// Task ID
    pub id: String,
}

#[derive(Args)]
pub struct SortArgs {
    /// importance, dueDate, myDay, alphabetical or creationDate
    pub criterion: SortCriterion,
}

#[derive(Args)]
pub struct NewListArgs {
    /// List name
    #[arg(required = true, num_args = 1..)]
    pub name: Vec<String>,
}

#[derive(Args)]
pub struct RenameArgs {
    /// New list name
    #[arg(required = true, num_args = 1..)]
    pub name: Vec<String>,
}

#[derive(Args)]
pub struct NotificationsArgs {
    /// Mark every notification read
    #[arg(long)]
    pub mark_read: bool,
}
