use std::fmt::Write as FmtWrite;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use pts_lib::{ErrorPayload, ExtractionResult};

use crate::cli::OutputFormat;

/// Write a successful result in the requested format.
pub fn write_output(
    body: &ExtractionResult,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => write_json(body, output.as_deref())?,
        OutputFormat::Pretty => {
            write_pretty(body, output.as_deref(), |colorize| format_result(body, colorize))?
        }
    };
    Ok(())
}

/// Render an error payload and return the error exit code.
pub fn render_error(payload: ErrorPayload, format: OutputFormat, output: Option<PathBuf>) -> ExitCode {
    match format {
        OutputFormat::Json => {
            let content =
                serde_json::to_string(&payload).unwrap_or_else(|_| "{\"error\":\"unknown\"}".into());
            if let Some(path) = output {
                if let Err(write_err) = std::fs::write(&path, &content) {
                    eprintln!("Failed to write error output: {}", write_err);
                    println!("{content}");
                }
            } else {
                println!("{content}");
            }
        }
        OutputFormat::Pretty => {
            let written = write_pretty(&payload, output.as_deref(), |colorize| {
                format_error(&payload, colorize)
            });
            if let Err(write_err) = written {
                eprintln!("Failed to write error output: {}", write_err);
            }
        }
    };

    ExitCode::from(2)
}

fn write_json<T: serde::Serialize>(
    body: &T,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let content = serde_json::to_string(body)?;
    if let Some(path) = output {
        std::fs::write(path, content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

/// Human text on a terminal; pretty JSON for files and pipes.
fn write_pretty<T, F>(body: &T, output: Option<&Path>, human: F) -> io::Result<()>
where
    T: serde::Serialize,
    F: FnOnce(bool) -> String,
{
    if output.is_none() && std::io::stdout().is_terminal() {
        println!("{}", human(true));
        return Ok(());
    }

    let content =
        serde_json::to_string_pretty(body).unwrap_or_else(|_| "{\"error\":\"unknown\"}".to_string());
    if let Some(path) = output {
        std::fs::write(path, &content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

pub fn format_result(body: &ExtractionResult, colorize: bool) -> String {
    let mut buf = String::new();
    writeln!(buf, "{} {}", color("OK", "32", colorize), body.url).ok();
    writeln!(
        buf,
        "{}",
        color(
            &format!("{} chars at {}", body.text.chars().count(), body.timestamp),
            "2",
            colorize
        )
    )
    .ok();
    writeln!(buf).ok();
    write!(buf, "{}", body.text).ok();
    buf
}

pub fn format_error(payload: &ErrorPayload, colorize: bool) -> String {
    let mut buf = String::new();
    write!(buf, "{} {}", color("ERROR", "31", colorize), payload.error).ok();
    if let Some(url) = &payload.url {
        write!(buf, "\nURL: {url}").ok();
    }
    if let Some(details) = &payload.details {
        write!(buf, "\nDetails: {details}").ok();
    }
    if let Some(hint) = &payload.hint {
        write!(buf, "\n{}", color(&format!("Hint: {hint}"), "33", colorize)).ok();
    }
    buf
}

fn color(text: &str, code: &str, colorize: bool) -> String {
    if colorize {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}
