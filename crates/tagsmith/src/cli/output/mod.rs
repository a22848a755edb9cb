//! Output formatting utilities

use std::io::Write;
use std::path::Path;

use console::{style, Style};

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red().bold(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", style("→").blue(), message);
}

/// Create a styled header
pub fn header(text: &str) -> String {
    style(text).bold().to_string()
}

/// Create a styled key-value line
pub fn key_value(key: &str, value: &str) -> String {
    format!("  {}: {}", style(key).dim(), value)
}

/// Style for version numbers
pub fn version_style() -> Style {
    Style::new().green().bold()
}

/// Style for tags
pub fn tag_style() -> Style {
    Style::new().yellow()
}

/// Style for paths
pub fn path_style() -> Style {
    Style::new().cyan()
}

/// Append a step output to the file named by `GITHUB_OUTPUT`, when set
pub fn github_output(key: &str, value: &str) -> std::io::Result<bool> {
    match std::env::var_os("GITHUB_OUTPUT") {
        Some(path) => {
            append_output(Path::new(&path), key, value)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Append `key=value` to a GitHub Actions output file; multi-line values use a heredoc delimiter
pub fn append_output(path: &Path, key: &str, value: &str) -> std::io::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;

    if value.contains('\n') {
        let delimiter = "EOF";
        writeln!(file, "{}<<{}", key, delimiter)?;
        writeln!(file, "{}", value)?;
        writeln!(file, "{}", delimiter)?;
    } else {
        writeln!(file, "{}={}", key, value)?;
    }
    Ok(())
}
