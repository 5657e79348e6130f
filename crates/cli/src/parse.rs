//! ArgMatches → CliAction conversion.
//!
//! Parsing never touches the interpreter or the network. Input arguments are
//! captured as an [`Input`] and read later, so an invalid flag is reported
//! before stdin is consumed.

use std::io::Read;
use std::path::PathBuf;

use clap::ArgMatches;
use pickles_executor::{EncodingKind, Mode, ModuleVariant, Payload};

/// Where the input comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Text(String),
    File(PathBuf),
    Stdin,
}

impl Input {
    /// Load the input as a payload.
    ///
    /// File and stdin bytes that are valid UTF-8 carry their text; other
    /// bytes are kept raw.
    pub fn read(&self) -> Result<Payload, String> {
        let bytes = match self {
            Input::Text(text) => return Ok(Payload::from_text(text.clone())),
            Input::File(path) => std::fs::read(path)
                .map_err(|e| format!("failed to read '{}': {}", path.display(), e))?,
            Input::Stdin => {
                let mut buf = Vec::new();
                std::io::stdin()
                    .read_to_end(&mut buf)
                    .map_err(|e| format!("failed to read stdin: {}", e))?;
                buf
            }
        };
        Ok(match String::from_utf8(bytes) {
            Ok(text) => Payload::from_text(text),
            Err(e) => Payload::from_bytes(e.into_bytes()),
        })
    }
}

/// The result of parsing the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    Convert {
        mode: Mode,
        encoding: EncodingKind,
        input: Input,
    },
    Detect {
        input: Input,
    },
    Import {
        path: PathBuf,
    },
    Export {
        path: PathBuf,
        input: Input,
    },
    Exec {
        code: String,
    },
    Chunked {
        mode: Mode,
        encoding: EncodingKind,
        input: Input,
        cancel_after: Option<usize>,
    },
    InitConfig {
        path: PathBuf,
    },
}

/// Global options that shape the session.
///
/// `--json` is not here: it picks the output format, which is needed even
/// when these options fail to parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub workdir: Option<PathBuf>,
    pub module: Option<ModuleVariant>,
}

/// Extract the global flags.
pub fn global_options(matches: &ArgMatches) -> Result<GlobalOptions, String> {
    let module = matches
        .get_one::<String>("module")
        .map(|s| s.parse::<ModuleVariant>().map_err(|e| e.to_string()))
        .transpose()?;
    Ok(GlobalOptions {
        config: matches.get_one::<String>("config").map(PathBuf::from),
        workdir: matches.get_one::<String>("workdir").map(PathBuf::from),
        module,
    })
}

/// Convert clap ArgMatches into a CliAction.
pub fn matches_to_action(matches: &ArgMatches) -> Result<CliAction, String> {
    let (sub_name, sub) = matches
        .subcommand()
        .ok_or_else(|| "No command provided".to_string())?;

    match sub_name {
        "serialize" => Ok(CliAction::Convert {
            mode: Mode::Serialize,
            encoding: encoding(sub, Mode::Serialize.default_encoding())?,
            input: input(sub),
        }),
        "deserialize" => Ok(CliAction::Convert {
            mode: Mode::Deserialize,
            encoding: encoding(sub, Mode::Deserialize.default_encoding())?,
            input: input(sub),
        }),
        "detect" => Ok(CliAction::Detect { input: input(sub) }),
        "import" => Ok(CliAction::Import {
            path: required_path(sub, "path")?,
        }),
        "export" => Ok(CliAction::Export {
            path: required_path(sub, "path")?,
            input: sub
                .get_one::<String>("text")
                .map(|t| Input::Text(t.clone()))
                .unwrap_or(Input::Stdin),
        }),
        "exec" => Ok(CliAction::Exec {
            code: sub
                .get_one::<String>("code")
                .cloned()
                .ok_or_else(|| "exec requires CODE".to_string())?,
        }),
        "chunked" => parse_chunked(sub),
        "init-config" => Ok(CliAction::InitConfig {
            path: required_path(sub, "path")?,
        }),
        other => Err(format!("Unknown command: {}", other)),
    }
}

fn parse_chunked(matches: &ArgMatches) -> Result<CliAction, String> {
    let (name, sub) = matches
        .subcommand()
        .ok_or_else(|| "chunked requires serialize or deserialize".to_string())?;
    let mode: Mode = name.parse().map_err(|e: pickles_executor::ConversionError| e.to_string())?;
    let encoding = encoding(sub, EncodingKind::Base64)?;
    if !matches!(encoding, EncodingKind::Base64 | EncodingKind::Hex) {
        return Err(format!("chunked conversion supports base64 or hex, not {}", encoding));
    }
    Ok(CliAction::Chunked {
        mode,
        encoding,
        input: input(sub),
        cancel_after: sub.get_one::<usize>("cancel-after").copied(),
    })
}

fn encoding(matches: &ArgMatches, default: EncodingKind) -> Result<EncodingKind, String> {
    match matches.get_one::<String>("encoding") {
        Some(s) => s.parse().map_err(|e: pickles_executor::ConversionError| e.to_string()),
        None => Ok(default),
    }
}

fn input(matches: &ArgMatches) -> Input {
    if let Some(path) = matches.get_one::<String>("file") {
        Input::File(PathBuf::from(path))
    } else if let Some(text) = matches.get_one::<String>("text") {
        Input::Text(text.clone())
    } else {
        Input::Stdin
    }
}

fn required_path(matches: &ArgMatches, name: &str) -> Result<PathBuf, String> {
    matches
        .get_one::<String>(name)
        .map(PathBuf::from)
        .ok_or_else(|| format!("missing {}", name.to_uppercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::build_cli;

    fn parse(args: &[&str]) -> Result<CliAction, String> {
        let matches = build_cli()
            .try_get_matches_from(args)
            .map_err(|e| e.to_string())?;
        matches_to_action(&matches)
    }

    #[test]
    fn test_serialize_defaults_to_base64() {
        assert_eq!(
            parse(&["pickles", "serialize", "hello"]).unwrap(),
            CliAction::Convert {
                mode: Mode::Serialize,
                encoding: EncodingKind::Base64,
                input: Input::Text("hello".into()),
            }
        );
    }

    #[test]
    fn test_deserialize_defaults_to_autodetect() {
        assert_eq!(
            parse(&["pickles", "deserialize", "--file", "in.txt"]).unwrap(),
            CliAction::Convert {
                mode: Mode::Deserialize,
                encoding: EncodingKind::AutoDetect,
                input: Input::File(PathBuf::from("in.txt")),
            }
        );
    }

    #[test]
    fn test_encoding_names() {
        let action = parse(&["pickles", "deserialize", "-e", "pickle-byte-string", "x"]).unwrap();
        assert!(matches!(
            action,
            CliAction::Convert {
                encoding: EncodingKind::ByteString,
                ..
            }
        ));
        assert!(parse(&["pickles", "serialize", "-e", "ebcdic", "x"]).is_err());
    }

    #[test]
    fn test_chunked() {
        assert_eq!(
            parse(&["pickles", "chunked", "deserialize", "-e", "hex", "--cancel-after", "2", "00ff"])
                .unwrap(),
            CliAction::Chunked {
                mode: Mode::Deserialize,
                encoding: EncodingKind::Hex,
                input: Input::Text("00ff".into()),
                cancel_after: Some(2),
            }
        );
        assert!(parse(&["pickles", "chunked", "serialize", "-e", "utf16", "x"]).is_err());
    }

    #[test]
    fn test_export_without_text_reads_stdin() {
        assert_eq!(
            parse(&["pickles", "export", "out"]).unwrap(),
            CliAction::Export {
                path: PathBuf::from("out"),
                input: Input::Stdin,
            }
        );
    }

    #[test]
    fn test_global_options() {
        let matches = build_cli()
            .try_get_matches_from(["pickles", "--workdir", "/tmp/w", "exec", "print(1)"])
            .unwrap();
        let opts = global_options(&matches).unwrap();
        assert_eq!(opts.workdir, Some(PathBuf::from("/tmp/w")));
        assert_eq!(opts.module, None);

        let matches = build_cli()
            .try_get_matches_from(["pickles", "--module", "cpickle", "exec", "x"])
            .unwrap();
        assert!(global_options(&matches).is_err());
    }

    #[test]
    fn test_file_input_keeps_binary_bytes() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("blob");
        std::fs::write(&path, [0xff, 0x00]).unwrap();

        let payload = Input::File(path).read().unwrap();
        assert_eq!(payload.bytes, vec![0xff, 0x00]);
        assert_eq!(payload.text, None);
    }
}
