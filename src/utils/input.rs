use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result, bail};

/// Open the export at `path`, or standard input when no path is given
///
/// The file is checked through the open handle, so a path swapped for a
/// directory between the check and the read is still caught.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, its metadata cannot be
/// read, or it is not a regular file.
pub fn open_input(path: Option<&Path>) -> Result<Box<dyn Read>> {
    let Some(path) = path else {
        return Ok(Box::new(io::stdin().lock()));
    };

    let file = File::open(path)
        .with_context(|| format!("Failed to open export file: {}", path.display()))?;
    let metadata = file
        .metadata()
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;
    if !metadata.is_file() {
        bail!("Not a regular file: {}", path.display());
    }

    Ok(Box::new(BufReader::new(file)))
}

/// Human-readable name of the input for messages
pub fn describe_input(path: Option<&Path>) -> String {
    match path {
        Some(path) => path.display().to_string(),
        None => "<stdin>".to_string(),
    }
}
