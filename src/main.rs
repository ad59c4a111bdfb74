use std::io;
use std::path::{Path, PathBuf};
use std::process;

use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};
use segval::cmd::validate::{self, DEFAULT_RULES_PATH, ReportDestination, ValidateCommandArgs};
use segval::engine::{SharedValueMode, ValidatorOptions};
use segval::io::IoError;
use serde::Serialize;
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "segval",
    version,
    about = "Validate video summary segment metadata against declarative rules"
)]
struct Cli {
    /// JSON document containing a `segments` array. Reads stdin when omitted.
    document: Option<PathBuf>,

    /// Rules file (.yaml, .yml, .json or .toml).
    #[arg(long, short = 'r', env = "SEGVAL_RULES", default_value = DEFAULT_RULES_PATH)]
    rules: PathBuf,

    /// Write the report here instead of stdout.
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// How segment-level `confidence` and `score` are checked.
    #[arg(long, value_enum, default_value_t = CliSharedValues::PerField)]
    shared_values: CliSharedValues,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliSharedValues {
    PerField,
    PerSegment,
}

impl From<CliSharedValues> for SharedValueMode {
    fn from(value: CliSharedValues) -> Self {
        match value {
            CliSharedValues::PerField => Self::PerField,
            CliSharedValues::PerSegment => Self::PerSegment,
        }
    }
}

#[derive(Serialize)]
struct CliError<'a> {
    error: &'a str,
    message: String,
    code: i32,
    details: Value,
}

fn main() {
    process::exit(run());
}

fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => return handle_parse_error(error),
    };

    init_tracing(cli.verbose);

    let args = ValidateCommandArgs {
        document: cli.document,
        rules: cli.rules,
        options: ValidatorOptions {
            shared_values: cli.shared_values.into(),
        },
    };

    let stdin = io::stdin();
    let response = validate::run_with_stdin(&args, stdin.lock());

    match response.exit_code {
        0 | 2 => match emit_report(&response.payload, cli.output.as_deref()) {
            Ok(()) => response.exit_code,
            Err(error) => {
                emit_error(
                    "internal_error",
                    format!("failed to write validation report: {error}"),
                    json!({"command": "validate"}),
                    1,
                );
                1
            }
        },
        3 | 1 => {
            if emit_json_stderr(&response.payload) {
                response.exit_code
            } else {
                emit_error(
                    "internal_error",
                    "failed to serialize validate error".to_string(),
                    json!({"command": "validate"}),
                    1,
                );
                1
            }
        }
        other => {
            emit_error(
                "internal_error",
                format!("unexpected validate exit code: {other}"),
                json!({"command": "validate"}),
                1,
            );
            1
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn handle_parse_error(error: clap::Error) -> i32 {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            print!("{error}");
            0
        }
        _ => {
            emit_error(
                "input_usage_error",
                error.to_string(),
                json!({"kind": "cli_parse_error"}),
                3,
            );
            3
        }
    }
}

/// Writes the report to `output`, falling back to stdout when that fails.
fn emit_report(payload: &Value, output: Option<&Path>) -> Result<(), IoError> {
    let stdout = io::stdout();
    if let ReportDestination::Stdout(Some(error)) =
        validate::route_report(payload, output, stdout.lock())?
    {
        let path = output.map(|path| path.display().to_string()).unwrap_or_default();
        emit_error(
            "output_write_error",
            format!("failed to write output file `{path}`: {error}"),
            json!({"command": "validate", "output": path}),
            1,
        );
    }
    Ok(())
}

fn emit_json_stderr(value: &Value) -> bool {
    match serde_json::to_string(value) {
        Ok(serialized) => {
            eprintln!("{serialized}");
            true
        }
        Err(_) => false,
    }
}

fn emit_error(error: &'static str, message: String, details: Value, code: i32) {
    let payload = CliError {
        error,
        message,
        code,
        details,
    };
    match serde_json::to_string(&payload) {
        Ok(serialized) => eprintln!("{serialized}"),
        Err(_) => eprintln!(
            "{{\"error\":\"internal_error\",\"message\":\"failed to serialize error\",\"code\":1}}"
        ),
    }
}
