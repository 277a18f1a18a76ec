//! Step outputs and failure annotations.
//!
//! Outputs go to the file named by `GITHUB_OUTPUT` using heredoc blocks, or to
//! stdout as legacy `::set-output` workflow commands when no file is provided.

use crate::error::{InputError, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Environment variable naming the step output file
pub const OUTPUT_FILE_ENV: &str = "GITHUB_OUTPUT";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Sink {
    File(PathBuf),
    Stdout,
}

/// Writer for step outputs
#[derive(Debug, Clone)]
pub struct StepOutputs {
    sink: Sink,
}

impl StepOutputs {
    /// Use `GITHUB_OUTPUT` when set, stdout otherwise
    pub fn from_env() -> Self {
        match std::env::var_os(OUTPUT_FILE_ENV) {
            Some(path) if !path.is_empty() => Self::to_file(PathBuf::from(path)),
            _ => Self { sink: Sink::Stdout },
        }
    }

    /// Append outputs to `path`
    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self {
            sink: Sink::File(path.into()),
        }
    }

    /// Set several outputs with a single write
    pub fn set_all(&self, outputs: &[(&str, String)]) -> Result<()> {
        match &self.sink {
            Sink::File(path) => {
                let mut block = String::new();
                for (name, value) in outputs {
                    let delimiter = format!("ghadelimiter_{}", uuid::Uuid::new_v4());
                    block.push_str(&file_command(name, value, &delimiter)?);
                }
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                file.write_all(block.as_bytes())?;
                log::debug!("Wrote {} output(s) to {}", outputs.len(), path.display());
            }
            Sink::Stdout => {
                let stdout = std::io::stdout();
                let mut handle = stdout.lock();
                for (name, value) in outputs {
                    writeln!(
                        handle,
                        "::set-output name={}::{}",
                        escape_property(name),
                        escape_data(value)
                    )?;
                }
            }
        }
        Ok(())
    }
}

/// `name<<delimiter\nvalue\ndelimiter\n`
pub fn file_command(name: &str, value: &str, delimiter: &str) -> Result<String> {
    if name.contains(delimiter) || value.contains(delimiter) {
        return Err(InputError::InvalidInput {
            name: name.to_string(),
            reason: "output collides with its heredoc delimiter".to_string(),
        }
        .into());
    }
    Ok(format!("{name}<<{delimiter}\n{value}\n{delimiter}\n"))
}

/// Escape a workflow command message
pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Escape a workflow command property value
pub fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}

/// `::error::` annotation that marks the step as failed in the CI log
pub fn error_annotation(message: &str) -> String {
    format!("::error::{}", escape_data(message))
}
