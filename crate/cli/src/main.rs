use std::process;

use envelope_cli::envelope_main;

fn main() {
    if let Some(err) = envelope_main().err() {
        eprintln!("ERROR: {err}");
        process::exit(1);
    }
}
