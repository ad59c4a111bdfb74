use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Value, json};

use crate::domain::report::ValidationReport;
use crate::engine::{self, RuleSetSource, ValidatorOptions};
use crate::io::{self, IoError};

/// Rules file consulted when none is given.
pub const DEFAULT_RULES_PATH: &str = "summary_validation_rules.yaml";

/// Input arguments for validate command execution API.
#[derive(Debug, Clone)]
pub struct ValidateCommandArgs {
    /// Document file; stdin when `None`.
    pub document: Option<PathBuf>,
    pub rules: PathBuf,
    pub options: ValidatorOptions,
}

/// Structured command response that carries exit-code mapping and JSON payload.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValidateCommandResponse {
    pub exit_code: i32,
    pub payload: Value,
}

pub fn run_with_stdin<R: Read>(args: &ValidateCommandArgs, stdin: R) -> ValidateCommandResponse {
    match execute(args, stdin) {
        Ok(report) => report_response(&report),
        Err(CommandError::InputUsage(message)) => ValidateCommandResponse {
            exit_code: 3,
            payload: json!({
                "error": "input_usage_error",
                "message": message,
            }),
        },
    }
}

/// Writes the payload as indented JSON to `path`.
pub fn write_payload(path: &Path, payload: &Value) -> Result<(), IoError> {
    let file = File::create(path)?;
    io::writer::write_pretty_json(file, payload)
}

/// Where [`route_report`] put the report.
#[derive(Debug)]
pub enum ReportDestination {
    /// Saved to the output file; a confirmation line went to stdout.
    File,
    /// Printed to stdout. Carries the output file error when stdout was the fallback.
    Stdout(Option<IoError>),
}

/// Saves the report to `output` when given, otherwise (or when that write fails) prints it to
/// `stdout`. Errors are stdout write failures only.
pub fn route_report<W: Write>(
    payload: &Value,
    output: Option<&Path>,
    mut stdout: W,
) -> Result<ReportDestination, IoError> {
    let file_error = match output {
        Some(path) => match write_payload(path, payload) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "validation report saved");
                writeln!(stdout, "Validation report saved to {}", path.display())?;
                return Ok(ReportDestination::File);
            }
            Err(error) => Some(error),
        },
        None => None,
    };
    io::writer::write_pretty_json(stdout, payload)?;
    Ok(ReportDestination::Stdout(file_error))
}

fn report_response(report: &ValidationReport) -> ValidateCommandResponse {
    let exit_code = if report.valid { 0 } else { 2 };
    match serde_json::to_value(report) {
        Ok(payload) => ValidateCommandResponse { exit_code, payload },
        Err(_) => ValidateCommandResponse {
            exit_code: 1,
            payload: json!({
                "error": "internal_error",
                "message": "failed to serialize validation report"
            }),
        },
    }
}

fn execute<R: Read>(
    args: &ValidateCommandArgs,
    stdin: R,
) -> Result<ValidationReport, CommandError> {
    let document = read_document(args.document.as_deref(), stdin)?;
    tracing::debug!(rules = %args.rules.display(), "validating document");
    Ok(engine::validate_document(
        &document,
        RuleSetSource::Path(&args.rules),
        args.options,
    ))
}

fn read_document<R: Read>(path: Option<&Path>, mut stdin: R) -> Result<String, CommandError> {
    let mut text = String::new();
    match path {
        Some(path) => {
            let mut file = File::open(path).map_err(|err| {
                CommandError::InputUsage(format!(
                    "failed to open document file `{}`: {err}",
                    path.display()
                ))
            })?;
            file.read_to_string(&mut text).map_err(|err| {
                CommandError::InputUsage(format!(
                    "failed to read document file `{}`: {err}",
                    path.display()
                ))
            })?;
        }
        None => {
            stdin.read_to_string(&mut text).map_err(|err| {
                CommandError::InputUsage(format!("failed to read document from stdin: {err}"))
            })?;
        }
    }
    Ok(text)
}

enum CommandError {
    InputUsage(String),
}
