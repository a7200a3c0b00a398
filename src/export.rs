use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::Local;

/// Column header, matching what spreadsheet users expect to import.
const HEADER: &str = "Lap Number,Time (s),Timestamp";

/// Write lap rows as CSV: 1-based lap index, duration in seconds, and the
/// timestamp of the export itself (not of the lap).
fn write_csv<W: Write>(mut out: W, laps: &[f64], timestamp: &str) -> std::io::Result<()> {
    writeln!(out, "{HEADER}")?;
    for (index, lap) in laps.iter().enumerate() {
        writeln!(out, "{},{},{}", index + 1, lap, timestamp)?;
    }
    out.flush()
}

/// Export lap data to `path`. Refuses to write anything when there are no
/// laps; the caller surfaces that to the user before any file is touched.
pub fn export_laps(path: &Path, laps: &[f64]) -> Result<(), Box<dyn std::error::Error>> {
    if laps.is_empty() {
        return Err("no lap data to export".into());
    }
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let file = BufWriter::new(File::create(path)?);
    write_csv(file, laps, &timestamp)?;
    log::info!("Exported {} lap(s) to {}", laps.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_plus_one_row_per_lap() {
        let mut out = Vec::new();
        write_csv(&mut out, &[1.5, 2.5], "2026-08-24 12:00:00").unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Lap Number,Time (s),Timestamp",
                "1,1.5,2026-08-24 12:00:00",
                "2,2.5,2026-08-24 12:00:00",
            ]
        );
    }

    #[test]
    fn export_writes_a_readable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("laps.csv");
        export_laps(&path, &[0.75]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Lap Number,Time (s),Timestamp\n"));
        assert!(text.contains("1,0.75,"));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn export_without_laps_is_refused_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("laps.csv");
        assert!(export_laps(&path, &[]).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn timestamp_format_is_date_then_time() {
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        assert_eq!(stamp.len(), 19);
        assert_eq!(&stamp[4..5], "-");
        assert_eq!(&stamp[10..11], " ");
        assert_eq!(&stamp[13..14], ":");
    }
}
