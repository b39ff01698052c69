use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Logs a message to a file with timestamp
///
/// # Arguments
///
/// * `log_dir` - Directory holding the log file, created if missing
/// * `filename` - The name of the log file
/// * `message` - The message to log
///
/// # Returns
///
/// * `io::Result<()>` - Success or error result
pub fn log_to_file(log_dir: &Path, filename: &str, message: &str) -> io::Result<()> {
    fs::create_dir_all(log_dir)?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(filename))?;

    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");

    writeln!(file, "\n--- Log entry at {} ---", timestamp)?;
    writeln!(file, "{}", message)?;
    writeln!(file, "--- End of entry ---\n")?;

    file.flush()?;

    Ok(())
}

/// Logs a message to a file with a detailed formatted header
///
/// # Arguments
///
/// * `log_dir` - Directory holding the log file
/// * `filename` - The name of the log file
/// * `header` - A descriptive header for this log entry
/// * `message` - The message to log
pub fn log_with_header(log_dir: &Path, filename: &str, header: &str, message: &str) -> io::Result<()> {
    let formatted_message = format!(
        "===== {} =====\n{}\n====================",
        header, message
    );
    log_to_file(log_dir, filename, &formatted_message)
}

/// Appends a row to a CSV file, writing headers first if the file is new.
/// A timestamp column is prepended to every row.
pub fn log_csv(log_dir: &Path, filename: &str, headers: &[&str], data: &[&str]) -> io::Result<()> {
    fs::create_dir_all(log_dir)?;

    let path = log_dir.join(filename);
    let file_exists = path.exists();

    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

    if !file_exists && !headers.is_empty() {
        writeln!(file, "timestamp,{}", headers.join(","))?;
    }

    writeln!(file, "{},{}", Local::now().to_rfc3339(), data.join(","))?;
    file.flush()?;

    Ok(())
}
