use std::process::ExitCode;

use photoshare_lib::commands::{CliError, USAGE};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match photoshare_lib::run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<CliError>() {
            Some(cli_err) => {
                eprintln!("{}\n\n{}", cli_err, USAGE);
                ExitCode::from(cli_err.exit_code())
            }
            None => {
                eprintln!("错误: {:#}", err);
                ExitCode::FAILURE
            }
        },
    }
}
