use clap::Parser;

use courrier::cli::{run, Cli};

fn main() {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Erreur: {e}");
        std::process::exit(1);
    }
}
