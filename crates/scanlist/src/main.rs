//! `scanlist`: scan lists with duplicate suppression, CSV export and the
//! capture/keyboard handoff, from the terminal.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
