use crate::Arguments;
use clap::{
    arg, builder::RangedU64ValueParser, crate_authors, crate_description, crate_name,
    crate_version, value_parser, Arg, ArgAction, ArgMatches, Command,
};
use std::ffi::OsString;
use std::path::PathBuf;
use std::{io, thread};

pub struct CLIParser {
    command: Command,
}

impl CLIParser {
    pub fn new() -> Self {
        let command = Self::create_base_command();
        let command = Self::register_arguments(command);
        CLIParser { command }
    }

    pub fn parse<I, T>(&mut self, itr: I) -> Arguments
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self
            .command
            .try_get_matches_from_mut(itr)
            .unwrap_or_else(|e| e.exit());
        Self::extract_arguments(&matches)
    }

    fn register_arguments(command: Command) -> Command {
        let command = Self::register_input_file_argument(command);
        let command = Self::register_output_file_argument(command);
        let command = Self::register_block_size_argument(command);
        let command = Self::register_threads_argument(command);
        Self::register_print_tree_argument(command)
    }

    fn register_input_file_argument(command: Command) -> Command {
        command.arg(Self::create_input_file_argument())
    }

    fn register_output_file_argument(command: Command) -> Command {
        command.arg(Self::create_output_file_argument())
    }

    fn register_block_size_argument(command: Command) -> Command {
        command.arg(Self::create_block_size_argument())
    }

    fn register_threads_argument(command: Command) -> Command {
        command.arg(Self::create_threads_argument())
    }

    fn register_print_tree_argument(command: Command) -> Command {
        command.arg(Self::create_print_tree_argument())
    }

    fn create_base_command() -> Command {
        Command::new(crate_name!())
            .version(crate_version!())
            .author(crate_authors!())
            .about(crate_description!())
    }

    fn create_input_file_argument() -> Arg {
        Arg::new("input_file")
            .help("Path to the file whose bytes are coded")
            .value_parser(value_parser!(PathBuf))
            .required(true)
    }

    fn create_output_file_argument() -> Arg {
        arg!(output_file: -o --output_file <FILE> "Write the code tables to this file instead of stdout")
            .required(false)
            .value_parser(value_parser!(PathBuf))
    }

    fn create_block_size_argument() -> Arg {
        arg!(block_size: -b --block_size <BYTES> "Build one code table per block of this many bytes, 0 for the whole file")
            .default_value("0")
            .value_parser(RangedU64ValueParser::<usize>::new())
    }

    fn create_threads_argument() -> Arg {
        arg!(-t --threads <THREADS> "Number of Threads")
            .default_value(get_number_of_threads().unwrap_or(1).to_string())
            .required(false)
            .value_parser(RangedU64ValueParser::<usize>::new().range(1..))
    }

    fn create_print_tree_argument() -> Arg {
        arg!(print_tree: --print_tree "Draw the tree of every block")
            .action(ArgAction::SetTrue)
    }

    fn extract_arguments(matches: &ArgMatches) -> Arguments {
        Arguments {
            input_file: Self::extract_input_file_argument(matches),
            output_file: Self::extract_output_file_argument(matches),
            block_size: Self::extract_block_size_argument(matches),
            number_of_threads: Self::extract_threads_argument(matches),
            print_tree: Self::extract_print_tree_argument(matches),
        }
    }

    fn extract_input_file_argument(matches: &ArgMatches) -> PathBuf {
        matches
            .get_one::<PathBuf>("input_file")
            .expect("Required argument input_file not provided")
            .clone()
    }

    fn extract_output_file_argument(matches: &ArgMatches) -> Option<PathBuf> {
        matches.get_one::<PathBuf>("output_file").cloned()
    }

    fn extract_block_size_argument(matches: &ArgMatches) -> usize {
        matches
            .get_one::<usize>("block_size")
            .expect("Block size must be provided, but was unset.")
            .to_owned()
    }

    fn extract_threads_argument(matches: &ArgMatches) -> usize {
        matches
            .get_one::<usize>("threads")
            .expect("Required argument threads not provided")
            .to_owned()
    }

    fn extract_print_tree_argument(matches: &ArgMatches) -> bool {
        matches.get_flag("print_tree")
    }
}

impl Default for CLIParser {
    fn default() -> Self {
        Self::new()
    }
}

fn get_number_of_threads() -> io::Result<usize> {
    Ok(thread::available_parallelism()?.get())
}

#[cfg(test)]
mod tests {
    use clap::{error::ErrorKind, Command};

    use super::CLIParser;

    const PROGRAM_NAME_ARGUMENT: &str = "test_program_name";

    #[test]
    fn parse_input_file_argument() {
        let input_file_name = "testfile.bin";
        let command = Command::new("test");
        let command = CLIParser::register_input_file_argument(command);
        let matches = command.get_matches_from(vec![PROGRAM_NAME_ARGUMENT, input_file_name]);
        let input_file = CLIParser::extract_input_file_argument(&matches);
        assert_eq!(input_file.file_name().unwrap(), input_file_name);
    }

    #[test]
    fn parse_output_file_argument() {
        let output_file_name = "codes.txt";
        let command = Command::new("test");
        let command = CLIParser::register_output_file_argument(command);
        let matches = command.get_matches_from(vec![
            PROGRAM_NAME_ARGUMENT,
            "--output_file",
            output_file_name,
        ]);
        let output_file = CLIParser::extract_output_file_argument(&matches);
        assert_eq!(output_file.unwrap().file_name().unwrap(), output_file_name);
    }

    #[test]
    fn parse_missing_output_file_argument() {
        let command = Command::new("test");
        let command = CLIParser::register_output_file_argument(command);
        let matches = command.get_matches_from(vec![PROGRAM_NAME_ARGUMENT]);
        assert!(CLIParser::extract_output_file_argument(&matches).is_none());
    }

    #[test]
    fn parse_block_size_argument() {
        let command = Command::new("test");
        let command = CLIParser::register_block_size_argument(command);
        let matches = command.get_matches_from(vec![PROGRAM_NAME_ARGUMENT, "-b", "4096"]);
        assert_eq!(CLIParser::extract_block_size_argument(&matches), 4096);
    }

    #[test]
    fn parse_block_size_illegal_argument() {
        let command = Command::new("test");
        let command = CLIParser::register_block_size_argument(command);
        let result =
            command.try_get_matches_from(vec![PROGRAM_NAME_ARGUMENT, "--block_size", "many"]);
        if let Err(error) = result {
            assert_eq!(error.kind(), ErrorKind::ValueValidation);
        } else {
            panic!("Illegal value for block_size not detected");
        }
    }

    #[test]
    fn parse_zero_threads_is_rejected() {
        let command = Command::new("test");
        let command = CLIParser::register_threads_argument(command);
        let result = command.try_get_matches_from(vec![PROGRAM_NAME_ARGUMENT, "--threads", "0"]);
        assert!(result.is_err(), "Zero threads not rejected");
    }

    #[test]
    fn parse_print_tree_argument() {
        let command = Command::new("test");
        let command = CLIParser::register_print_tree_argument(command);
        let matches = command.get_matches_from(vec![PROGRAM_NAME_ARGUMENT, "--print_tree"]);
        assert!(CLIParser::extract_print_tree_argument(&matches));
    }

    #[test]
    fn parse_required_arguments_only() {
        let input_file_name = "inputfile.bin";
        let input_file_path = format!("/input_directory/{}", input_file_name);
        let mut cli_parser = CLIParser::default();
        let arguments = cli_parser.parse(vec![PROGRAM_NAME_ARGUMENT, &input_file_path, "-t", "8"]);
        assert_eq!(
            arguments.input_file.file_name().unwrap(),
            input_file_name,
            "input file does not match"
        );
        assert!(arguments.output_file.is_none(), "output file must be unset");
        assert_eq!(arguments.block_size, 0, "block_size does not match");
        assert_eq!(
            arguments.number_of_threads, 8,
            "number_of_threads does not match"
        );
        assert!(!arguments.print_tree, "print_tree does not match");
    }
}
