use nalgebra::Vector3;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum CellError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Cell-info file has no data records")]
    NoRecords,
    #[error("Cell record on line {line} has {found} fields, expected at least 13")]
    ShortRecord { line: usize, found: usize },
    #[error("Invalid float in cell record on line {line} (value: '{value}')")]
    InvalidFloat { line: usize, value: String },
}

/// The periodic-cell description from the last record of an extended-system
/// cell log: three basis vectors and an origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRecord {
    pub basis: [Vector3<f64>; 3],
    pub origin: Vector3<f64>,
}

/// Reads the last data record of an extended-system cell file.
///
/// Each data record is `step a.x a.y a.z b.x b.y b.z c.x c.y c.z o.x o.y
/// o.z ...`; lines starting with `#` are comments. Only the final record
/// matters: it describes the cell at the end of the preceding simulation.
///
/// # Errors
///
/// Returns an error if the file has no data records or the last record is
/// malformed.
pub fn read_last_cell_record(path: &Path) -> Result<CellRecord, CellError> {
    let content = fs::read_to_string(path)?;
    let (line_num, record) = content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty() && !line.trim_start().starts_with('#'))
        .last()
        .ok_or(CellError::NoRecords)?;
    let line_num = line_num + 1;

    let fields: Vec<&str> = record.split_whitespace().collect();
    if fields.len() < 13 {
        return Err(CellError::ShortRecord {
            line: line_num,
            found: fields.len(),
        });
    }

    let mut values = [0.0f64; 12];
    for (i, field) in fields[1..13].iter().enumerate() {
        values[i] = field.parse().map_err(|_| CellError::InvalidFloat {
            line: line_num,
            value: (*field).into(),
        })?;
    }

    Ok(CellRecord {
        basis: [
            Vector3::new(values[0], values[1], values[2]),
            Vector3::new(values[3], values[4], values[5]),
            Vector3::new(values[6], values[7], values[8]),
        ],
        origin: Vector3::new(values[9], values[10], values[11]),
    })
}

fn format_keyed_line(key: &str, v: &Vector3<f64>) -> String {
    format!("{} {:.6} {:.6} {:.6}", key, v.x, v.y, v.z)
}

/// Rewrites the four cell-geometry lines of a simulation config file in
/// place: `cellBasisVector1/2/3` and `cellOrigin`. Every other line is
/// preserved verbatim. Lines whose key is absent from the file are left
/// alone (the config may inherit the cell from a restart file instead).
///
/// # Errors
///
/// Returns an error if the config file cannot be read or rewritten.
pub fn apply_cell_to_config(record: &CellRecord, config_path: &Path) -> Result<(), CellError> {
    let content = fs::read_to_string(config_path)?;
    let mut replaced = 0usize;

    let rewritten: Vec<String> = content
        .lines()
        .map(|line| {
            let key = line.split_whitespace().next().unwrap_or("");
            let new_line = match key {
                "cellBasisVector1" => format_keyed_line(key, &record.basis[0]),
                "cellBasisVector2" => format_keyed_line(key, &record.basis[1]),
                "cellBasisVector3" => format_keyed_line(key, &record.basis[2]),
                "cellOrigin" => format_keyed_line(key, &record.origin),
                _ => return line.to_string(),
            };
            replaced += 1;
            new_line
        })
        .collect();

    fs::write(config_path, rewritten.join("\n") + "\n")?;
    debug!(
        config = %config_path.display(),
        replaced, "Applied cell record to simulation config"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const CELL_LOG: &str = "\
# extended system trajectory
100 90.0 0.0 0.0 0.0 90.0 0.0 0.0 0.0 90.0 0.0 0.0 0.0 0.0 0.0 0.0
200 88.5 0.0 0.0 0.0 88.5 0.0 0.0 0.0 88.5 1.0 2.0 3.0 0.0 0.0 0.0
";

    #[test]
    fn reads_last_record_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.xsc");
        fs::write(&path, CELL_LOG).unwrap();

        let record = read_last_cell_record(&path).unwrap();
        assert_eq!(record.basis[0], Vector3::new(88.5, 0.0, 0.0));
        assert_eq!(record.basis[2], Vector3::new(0.0, 0.0, 88.5));
        assert_eq!(record.origin, Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn comment_only_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.xsc");
        fs::write(&path, "# nothing\n# here\n").unwrap();
        assert!(matches!(
            read_last_cell_record(&path),
            Err(CellError::NoRecords)
        ));
    }

    #[test]
    fn short_record_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.xsc");
        fs::write(&path, "200 88.5 0.0 0.0\n").unwrap();
        assert!(matches!(
            read_last_cell_record(&path),
            Err(CellError::ShortRecord { found: 4, .. })
        ));
    }

    #[test]
    fn rewrites_only_the_four_keyed_lines() {
        let dir = tempdir().unwrap();
        let cell_path = dir.path().join("run.xsc");
        fs::write(&cell_path, CELL_LOG).unwrap();
        let record = read_last_cell_record(&cell_path).unwrap();

        let config_path = dir.path().join("run.conf");
        fs::write(
            &config_path,
            "structure system.psf\n\
             cellBasisVector1 999.0 0.0 0.0\n\
             cellBasisVector2 0.0 999.0 0.0\n\
             cellBasisVector3 0.0 0.0 999.0\n\
             cellOrigin 0.0 0.0 0.0\n\
             timestep 2.0\n",
        )
        .unwrap();

        apply_cell_to_config(&record, &config_path).unwrap();

        let rewritten = fs::read_to_string(&config_path).unwrap();
        assert!(rewritten.contains("structure system.psf"));
        assert!(rewritten.contains("cellBasisVector1 88.500000 0.000000 0.000000"));
        assert!(rewritten.contains("cellOrigin 1.000000 2.000000 3.000000"));
        assert!(rewritten.contains("timestep 2.0"));
        assert!(!rewritten.contains("999.0"));
    }

    #[test]
    fn config_without_cell_lines_is_left_unchanged() {
        let dir = tempdir().unwrap();
        let cell_path = dir.path().join("run.xsc");
        fs::write(&cell_path, CELL_LOG).unwrap();
        let record = read_last_cell_record(&cell_path).unwrap();

        let config_path = dir.path().join("run.conf");
        let original = "structure system.psf\ntimestep 2.0\n";
        fs::write(&config_path, original).unwrap();

        apply_cell_to_config(&record, &config_path).unwrap();
        assert_eq!(fs::read_to_string(&config_path).unwrap(), original);
    }
}
