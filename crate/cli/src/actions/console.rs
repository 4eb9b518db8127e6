use std::path::Path;

use serde::Serialize;

use crate::error::result::CliResult;

pub const ENVELOPE_CLI_FORMAT: &str = "ENVELOPE_CLI_FORMAT";
pub const CLI_DEFAULT_FORMAT: &str = "text";
pub const CLI_JSON_FORMAT: &str = "json";

/// What a command reports on stdout, as text or as JSON depending on
/// `ENVELOPE_CLI_FORMAT`.
#[derive(Serialize, Debug, Default)]
pub struct Stdout {
    stdout: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    wrapped_key_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<String>,
}

impl Stdout {
    #[must_use]
    pub fn new(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_owned(),
            ..Default::default()
        }
    }

    pub fn set_output_file(&mut self, output_file: &Path) {
        self.output_file = Some(output_file.display().to_string());
    }

    pub fn set_wrapped_key_file(&mut self, wrapped_key_file: &Path) {
        self.wrapped_key_file = Some(wrapped_key_file.display().to_string());
    }

    pub fn set_mode<T: ToString>(&mut self, mode: &T) {
        self.mode = Some(mode.to_string());
    }

    /// Print on stdout.
    ///
    /// # Errors
    /// Fails if the JSON serialization fails.
    pub fn write(&self) -> CliResult<()> {
        let json_format_from_env = std::env::var(ENVELOPE_CLI_FORMAT)
            .unwrap_or_else(|_| CLI_DEFAULT_FORMAT.to_owned())
            .to_lowercase()
            == CLI_JSON_FORMAT;

        if json_format_from_env {
            let console_stdout = serde_json::to_string_pretty(&self)?;
            println!("{console_stdout}");
        } else {
            if !self.stdout.is_empty() {
                println!("{}", self.stdout);
            }
            if let Some(output_file) = &self.output_file {
                println!("\t  Output file: {output_file}");
            }
            if let Some(wrapped_key_file) = &self.wrapped_key_file {
                println!("\t  Wrapped key file: {wrapped_key_file}");
            }
            if let Some(mode) = &self.mode {
                println!("\t  Mode: {mode}");
            }
        }

        Ok(())
    }
}
