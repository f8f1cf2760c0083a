//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = mapfeed_cli::run() {
        eprintln!("mapfeed: {err}");
        std::process::exit(1);
    }
}
