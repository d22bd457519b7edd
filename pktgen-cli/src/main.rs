use pktgen_cli::{logging, run, Cli};
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    // clap exits with status 2 on usage errors
    let cli = Cli::parse_args();
    logging::init(cli.verbose);

    let stdout = io::stdout();
    match run(&cli, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("[-] {}", e);
            ExitCode::FAILURE
        }
    }
}
