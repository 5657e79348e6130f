//! Pickles CLI - convert text to and from Python pickle data.
//!
//! Every invocation runs one subcommand and exits: 0 on success, 1 on any
//! error. Errors print as `(error) <message>`, or as a JSON object with
//! `--json`. Logs go to stderr and are controlled by `RUST_LOG`.

mod commands;
mod format;
mod parse;

use std::path::Path;
use std::process;

use pickles_executor::{
    Command, ConversionError, Output, Payload, PicklesConfig, Session, TransferEvent,
};
use tracing_subscriber::EnvFilter;

use commands::build_cli;
use format::{format_error, format_message_error, format_output, format_progress, OutputMode};
use parse::{global_options, matches_to_action, CliAction, GlobalOptions};

/// Failure of one CLI run.
enum CliError {
    Conversion(ConversionError),
    Message(String),
}

impl From<ConversionError> for CliError {
    fn from(e: ConversionError) -> Self {
        CliError::Conversion(e)
    }
}

impl From<String> for CliError {
    fn from(message: String) -> Self {
        CliError::Message(message)
    }
}

/// What a successful run prints.
enum Outcome {
    Output(Output),
    Cancelled,
    Message(String),
}

fn main() {
    init_tracing();

    let matches = build_cli().get_matches();
    let mode = OutputMode::from_matches(&matches);

    let result = global_options(&matches)
        .map_err(CliError::from)
        .and_then(|opts| {
            let action = matches_to_action(&matches)?;
            run(action, &opts)
        });

    match result {
        Ok(outcome) => print_outcome(outcome, mode),
        Err(CliError::Conversion(e)) => {
            eprintln!("{}", format_error(&e, mode));
            process::exit(1);
        }
        Err(CliError::Message(message)) => {
            eprintln!("{}", format_message_error(&message, mode));
            process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(opts: &GlobalOptions) -> Result<PicklesConfig, CliError> {
    let mut config = match &opts.config {
        Some(path) => PicklesConfig::from_file(path)?,
        None => PicklesConfig::default(),
    };
    if let Some(dir) = &opts.workdir {
        config.working_dir = Some(dir.clone());
    }
    Ok(config)
}

fn open_session(opts: &GlobalOptions) -> Result<Session, CliError> {
    let config = load_config(opts)?;
    let mut session = Session::from_config(&config)?;
    if let Some(module) = opts.module {
        session.set_module_variant(module);
    }
    Ok(session)
}

fn run(action: CliAction, opts: &GlobalOptions) -> Result<Outcome, CliError> {
    // Needs no session: the config being written may not exist yet.
    let action = match action {
        CliAction::InitConfig { path } => return init_config(&path),
        other => other,
    };

    tracing::debug!(target: "pickles::cli", action = ?action, "dispatching");
    let mut session = open_session(opts)?;
    let output = match action {
        CliAction::Convert {
            mode,
            encoding,
            input,
        } => {
            session.set_mode(mode);
            session.set_encoding(encoding)?;
            Output::Payload(session.convert(&input.read()?)?)
        }
        CliAction::Detect { input } => Output::Detected(session.detect(&input.read()?)),
        CliAction::Import { path } => Output::Payload(session.import_file(&path)?),
        CliAction::Export { path, input } => session.execute(Command::ExportFile {
            path,
            payload: input.read()?,
            module: session.module_variant(),
        })?,
        CliAction::Exec { code } => Output::Transcript(session.execute_script(&code)?),
        CliAction::Chunked {
            mode,
            encoding,
            input,
            cancel_after,
        } => {
            session.set_mode(mode);
            session.set_encoding(encoding)?;
            return run_chunked(&session, &input.read()?, cancel_after);
        }
        CliAction::InitConfig { path } => return init_config(&path),
    };
    Ok(Outcome::Output(output))
}

fn init_config(path: &Path) -> Result<Outcome, CliError> {
    let existed = path.exists();
    PicklesConfig::write_default_if_missing(path)?;
    Ok(Outcome::Message(if existed {
        format!("Config already exists at {}", path.display())
    } else {
        format!("Wrote default config to {}", path.display())
    }))
}

fn run_chunked(
    session: &Session,
    payload: &Payload,
    cancel_after: Option<usize>,
) -> Result<Outcome, CliError> {
    let mut handle = session.start_chunked_convert(payload)?;
    let mut seen = 0usize;

    while let Some(event) = handle.next_event() {
        match event {
            TransferEvent::Progress {
                fraction,
                processed_units,
                total_units,
            } => {
                seen += 1;
                eprintln!("{}", format_progress(fraction, processed_units, total_units));
                if cancel_after == Some(seen) {
                    session.cancel(&handle);
                }
            }
            TransferEvent::Completed(result) => {
                return Ok(Outcome::Output(Output::Payload(result)))
            }
            TransferEvent::Cancelled => return Ok(Outcome::Cancelled),
            TransferEvent::Failed(e) => return Err(e.into()),
        }
    }
    Err(CliError::Message(
        "transfer ended without a result".to_string(),
    ))
}

fn print_outcome(outcome: Outcome, mode: OutputMode) {
    match outcome {
        Outcome::Output(output) => {
            let formatted = format_output(&output, mode);
            if !formatted.is_empty() {
                println!("{}", formatted);
            }
        }
        Outcome::Cancelled => match mode {
            OutputMode::Json => println!("{}", serde_json::json!({ "cancelled": true })),
            OutputMode::Human => println!("(cancelled)"),
        },
        Outcome::Message(message) => match mode {
            OutputMode::Json => println!("{}", serde_json::json!({ "message": message })),
            OutputMode::Human => println!("{}", message),
        },
    }
}
