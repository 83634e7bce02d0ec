use std::process::ExitCode;

use clap::Parser;
use covflow::app;
use covflow::cli::Cli;
use covflow::config::init_dotenv;
use log::error;

fn main() -> ExitCode {
    let cli = Cli::parse();
    // .env antes del logger para que RUST_LOG pueda venir de ahí
    init_dotenv();
    env_logger::Builder::new().filter_level(cli.log_level())
                              .parse_default_env()
                              .format_timestamp_millis()
                              .init();

    match app::run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("run:fatal err={e}");
            ExitCode::from(e.exit_code())
        }
    }
}
