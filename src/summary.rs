use crate::error::Result;
use crate::github::issues::Issue;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One summary line, without the trailing newline
pub fn format_line(issue: &Issue) -> String {
    format!("{} - {}", issue.number, issue.title)
}

/// Writes one `"<number> - <title>"` line per issue, replacing any existing file.
///
/// The file is closed when this returns, whether or not writing succeeded.
pub fn write_summary(issues: &[Issue], path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for issue in issues {
        writeln!(writer, "{}", format_line(issue))?;
    }
    writer.flush()?;
    Ok(())
}
