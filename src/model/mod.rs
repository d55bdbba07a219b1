pub mod task;
pub mod list;
pub mod profile;
pub mod config;

pub use task::*;
pub use list::*;
pub use profile::*;
pub use config::*;
