use clap::Parser;
use lagtrader::cli::{Cli, run};
use lagtrader::logging::init_logging;

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_logging(&cli.log_level) {
        eprintln!("warning: {e}");
    }
    run(cli)
}
