//! Clap command tree definition.

use clap::{Arg, ArgAction, Command};

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("pickles")
        .about("Convert text to and from Python pickle data")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Config file (default: built-in defaults)")
                .global(true),
        )
        .arg(
            Arg::new("workdir")
                .long("workdir")
                .value_name("PATH")
                .help("Scratch directory (default: ~/Documents/Pickles)")
                .global(true),
        )
        .arg(
            Arg::new("module")
                .long("module")
                .value_name("MODULE")
                .help("Pickle module: pickle (default) or pickle5")
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("JSON output mode")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(build_convert("serialize", "Serialize text"))
        .subcommand(build_convert("deserialize", "Deserialize encoded data"))
        .subcommand(
            with_input(Command::new("detect").about("Guess the encoding of the input")),
        )
        .subcommand(
            Command::new("import")
                .about("Read a pickle file and print its value")
                .arg(Arg::new("path").required(true).help("Pickle file")),
        )
        .subcommand(
            Command::new("export")
                .about("Pickle text and write it to a file (.pkl appended if no extension)")
                .arg(Arg::new("path").required(true).help("Destination file"))
                .arg(Arg::new("text").help("Text to pickle (default: stdin)")),
        )
        .subcommand(
            Command::new("exec")
                .about("Run interpreter code and print its output")
                .arg(Arg::new("code").required(true).help("Code to run")),
        )
        .subcommand(build_chunked())
        .subcommand(
            Command::new("init-config")
                .about("Write the default config file if it does not exist")
                .arg(Arg::new("path").required(true).help("Config file path")),
        )
}

/// Add the `[--file PATH | TEXT]` input arguments.
fn with_input(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("file")
            .long("file")
            .short('f')
            .value_name("PATH")
            .help("Read input from a file")
            .conflicts_with("text"),
    )
    .arg(Arg::new("text").help("Input text (default: stdin)"))
}

fn encoding_arg(help: &'static str) -> Arg {
    Arg::new("encoding")
        .long("encoding")
        .short('e')
        .value_name("ENCODING")
        .help(help)
}

fn build_convert(name: &'static str, about: &'static str) -> Command {
    with_input(
        Command::new(name)
            .about(about)
            .arg(encoding_arg(
                "base64, utf8, ascii, utf16, latin1, hex, bytestring, auto",
            )),
    )
}

fn build_chunked() -> Command {
    Command::new("chunked")
        .about("Chunked Base64/hex conversion with progress on stderr")
        .subcommand_required(true)
        .subcommand(build_chunked_mode("serialize"))
        .subcommand(build_chunked_mode("deserialize"))
}

fn build_chunked_mode(name: &'static str) -> Command {
    with_input(
        Command::new(name)
            .arg(encoding_arg("base64 (default) or hex"))
            .arg(
                Arg::new("cancel-after")
                    .long("cancel-after")
                    .value_name("N")
                    .value_parser(clap::value_parser!(usize))
                    .help("Cancel after N progress events"),
            ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let matches = build_cli()
            .try_get_matches_from(["pickles", "detect", "abc", "--json", "--module", "pickle5"])
            .unwrap();
        assert!(matches.get_flag("json"));
        assert_eq!(
            matches.get_one::<String>("module").map(String::as_str),
            Some("pickle5")
        );
    }

    #[test]
    fn test_file_conflicts_with_text() {
        let result =
            build_cli().try_get_matches_from(["pickles", "serialize", "--file", "a", "text"]);
        assert!(result.is_err());
    }
}
