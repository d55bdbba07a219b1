use clap::Parser;
use tareas::cli::commands::Cli;
use tareas::cli::handlers;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = handlers::dispatch(cli) {
        log::error!("event=command_failed module=cli status=error error={}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
