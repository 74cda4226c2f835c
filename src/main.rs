use std::process::ExitCode;

use fbtest::{app, Cli, Config};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse_lenient(std::env::args_os()).unwrap_or_else(|err| err.exit());
    let config = Config::from(cli);

    match app::run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
