use std::fs;

use camino::Utf8Path;

use super::error::AlignError;

/// One row of a time reference log: `sequence, timestamp_a[, timestamp_b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeReferenceRecord {
    pub sequence: i64,
    pub timestamp_a: i64,
    pub timestamp_b: Option<i64>,
}

impl TimeReferenceRecord {
    fn from_line(
        line: &str,
        min_fields: usize,
        path: &Utf8Path,
        line_no: usize,
    ) -> Result<Self, AlignError> {
        let malformed = |reason: String| AlignError::MalformedLine {
            path: path.to_path_buf(),
            line: line_no,
            reason,
        };
        let values = line.split(',').map(str::trim).collect::<Vec<&str>>();
        if values.len() < min_fields {
            return Err(malformed(format!(
                "expected at least {} fields, found {}",
                min_fields,
                values.len()
            )));
        }
        let parse = |value: &str| {
            value
                .parse::<i64>()
                .map_err(|e| malformed(format!("`{}`: {}", value, e)))
        };

        Ok(TimeReferenceRecord {
            sequence: parse(values[0])?,
            timestamp_a: parse(values[1])?,
            // extra columns are only read when the mode needs them
            timestamp_b: match min_fields {
                n if n >= 3 => Some(parse(values[2])?),
                _ => None,
            },
        })
    }

    /// Reference timestamp minus local timestamp, when the row carries both.
    pub fn delta(&self) -> Option<i64> {
        self.timestamp_b
            .and_then(|local| self.timestamp_a.checked_sub(local))
    }
}

fn read_lines(path: &Utf8Path) -> Result<Vec<String>, AlignError> {
    let content = fs::read_to_string(path).map_err(|e| AlignError::io(path, e))?;
    Ok(content.lines().map(str::to_string).collect())
}

/// Reads line `seq` (1-based) of the log at `path`, which must hold at least
/// `min_fields` comma separated integers.
pub fn read_reference_record<P: AsRef<Utf8Path>>(
    path: P,
    seq: usize,
    min_fields: usize,
) -> Result<TimeReferenceRecord, AlignError> {
    let path = path.as_ref();
    let lines = read_lines(path)?;
    if seq == 0 || seq > lines.len() {
        return Err(AlignError::MissingReferenceLine {
            path: path.to_path_buf(),
            requested: seq,
            available: lines.len(),
        });
    }
    TimeReferenceRecord::from_line(&lines[seq - 1], min_fields, path, seq)
}

/// One integer timestamp per line, in frame order. Blank lines are skipped.
pub fn read_frame_timestamps<P: AsRef<Utf8Path>>(path: P) -> Result<Vec<i64>, AlignError> {
    let path = path.as_ref();
    let lines = read_lines(path)?;
    let mut timestamps = Vec::with_capacity(lines.len());
    for (idx, line) in lines.iter().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let timestamp = line
            .parse::<i64>()
            .map_err(|e| AlignError::MalformedLine {
                path: path.to_path_buf(),
                line: idx + 1,
                reason: format!("`{}`: {}", line, e),
            })?;
        timestamps.push(timestamp);
    }
    Ok(timestamps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    fn write_log(content: &str) -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("time_ref.csv")).unwrap();
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn selects_one_based_line() {
        let (_guard, path) = write_log("1,100\n2,200\n7,1000\n");
        let record = read_reference_record(&path, 3, 2).unwrap();
        assert_eq!(
            record,
            TimeReferenceRecord {
                sequence: 7,
                timestamp_a: 1000,
                timestamp_b: None
            }
        );
        assert_eq!(record.delta(), None);
    }

    #[test]
    fn extra_columns_are_ignored_for_two_field_reads() {
        let (_guard, path) = write_log("7,1000,gps\n8,2000,\n9,3000,1.5\n");
        for (seq, sequence, timestamp) in [(1, 7, 1000), (2, 8, 2000), (3, 9, 3000)] {
            let record = read_reference_record(&path, seq, 2).unwrap();
            assert_eq!(record.sequence, sequence);
            assert_eq!(record.timestamp_a, timestamp);
            assert_eq!(record.timestamp_b, None);
        }
        assert!(matches!(
            read_reference_record(&path, 1, 3),
            Err(AlignError::MalformedLine { line: 1, .. })
        ));
    }

    #[test]
    fn three_field_line_gives_delta() {
        let (_guard, path) = write_log("4, 1500 ,1200\n");
        let record = read_reference_record(&path, 1, 3).unwrap();
        assert_eq!(record.timestamp_b, Some(1200));
        assert_eq!(record.delta(), Some(300));
    }

    #[test]
    fn out_of_range_sequence_fails() {
        let (_guard, path) = write_log("1,100\n");
        assert!(matches!(
            read_reference_record(&path, 2, 2),
            Err(AlignError::MissingReferenceLine {
                requested: 2,
                available: 1,
                ..
            })
        ));
        assert!(matches!(
            read_reference_record(&path, 0, 2),
            Err(AlignError::MissingReferenceLine { .. })
        ));
    }

    #[test]
    fn short_or_garbled_lines_fail() {
        let (_guard, path) = write_log("1,100\nx,200\n");
        assert!(matches!(
            read_reference_record(&path, 1, 3),
            Err(AlignError::MalformedLine { line: 1, .. })
        ));
        assert!(matches!(
            read_reference_record(&path, 2, 2),
            Err(AlignError::MalformedLine { line: 2, .. })
        ));
    }

    #[test]
    fn frame_timestamps_skip_blank_lines() {
        let (_guard, path) = write_log("10\n20\n\n30\n");
        assert_eq!(read_frame_timestamps(&path).unwrap(), vec![10, 20, 30]);

        let (_guard, path) = write_log("10\nabc\n");
        assert!(read_frame_timestamps(&path).is_err());
    }
}
