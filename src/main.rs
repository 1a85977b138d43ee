//! pdfdedupe - duplicate PDF detection
//!
//! Entry point for the pdfdedupe CLI application.

use clap::Parser;
use pdfdedupe::{
    cli::Cli,
    error::{exit_code_for, StructuredError},
};

fn main() {
    let cli = Cli::parse();
    let json_errors = cli.json_errors;

    match pdfdedupe::run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            let exit_code = exit_code_for(&err);

            if json_errors {
                match serde_json::to_string_pretty(&StructuredError::new(&err, exit_code)) {
                    Ok(json) => eprintln!("{}", json),
                    Err(_) => eprintln!("[{}] Error: {:#}", exit_code.code_prefix(), err),
                }
            } else {
                eprintln!("[{}] Error: {:#}", exit_code.code_prefix(), err);
            }

            std::process::exit(exit_code.as_i32());
        }
    }
}
