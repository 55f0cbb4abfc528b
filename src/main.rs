use std::env::args_os;
use std::process::ExitCode;

use dmmt_huffman::{generate_code_tables, CLIParser};

fn main() -> ExitCode {
    let mut cli_parser = CLIParser::default();
    let arguments = cli_parser.parse(args_os());
    match generate_code_tables(&arguments) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Code table generation failed because of: {}", e);
            ExitCode::FAILURE
        }
    }
}
