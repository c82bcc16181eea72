//! Plain-text serialization of Bezier paths.
//!
//! The format is a whitespace-separated table. The first non-empty line
//! holds `num_points num_cols`; each following non-empty line is one
//! knot row. A 3-column file carries knot positions only and the path is
//! fitted through them; a 9-column file carries `point in_cv out_cv`
//! triples and is loaded verbatim. The format stores no open/closed
//! flag, so the caller supplies one when reading.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use pathline_core::{PathError, Result};
use pathline_math::Point3;

use crate::bezier::BezierPath;

/// Read a path from a text file.
///
/// With 3 data columns the knots are interpolated with the smooth fit,
/// exactly as [`BezierPath::through_points`]; with 9 columns the control
/// vertices are taken as written. A malformed header, an unsupported
/// column count, a bad number, or too few rows yields
/// [`PathError::Parse`]; filesystem failures yield [`PathError::Io`].
pub fn read_path_file(path: &Path, closed: bool) -> Result<BezierPath> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut lines = reader.lines();
    let mut line_no = 0usize;

    let header = loop {
        let line = match lines.next() {
            Some(line) => line?,
            None => return Err(PathError::Parse("empty path file".to_string())),
        };
        line_no += 1;
        if !line.trim().is_empty() {
            break line;
        }
    };

    let (num_points, num_cols) = parse_header(&header)?;
    if num_cols != 3 && num_cols != 9 {
        return Err(PathError::Parse(format!(
            "unsupported column count {} (expected 3 or 9)",
            num_cols
        )));
    }

    // The header count is unverified input; cap the pre-allocation
    let mut rows: Vec<Vec<f64>> = Vec::with_capacity(num_points.min(4096));
    while rows.len() < num_points {
        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }
        rows.push(parse_row(&line, num_cols, line_no)?);
    }
    if rows.len() < num_points {
        return Err(PathError::Parse(format!(
            "expected {} data rows, found {}",
            num_points,
            rows.len()
        )));
    }

    if num_cols == 3 {
        let knots = rows.iter().map(|r| Point3::new(r[0], r[1], r[2])).collect();
        BezierPath::through_points(knots, closed)
    } else {
        let mut points = Vec::with_capacity(num_points);
        let mut in_cv = Vec::with_capacity(num_points);
        let mut out_cv = Vec::with_capacity(num_points);
        for r in &rows {
            points.push(Point3::new(r[0], r[1], r[2]));
            in_cv.push(Point3::new(r[3], r[4], r[5]));
            out_cv.push(Point3::new(r[6], r[7], r[8]));
        }
        BezierPath::new(points, in_cv, out_cv, closed)
    }
}

/// Write a path as a 9-column text file readable by [`read_path_file`].
///
/// The full control net is written even for fitted paths, so reading the
/// file back reproduces the path without re-running the fit.
pub fn write_path_file(path: &Path, curve: &BezierPath) -> Result<()> {
    let mut file = File::create(path)?;
    writeln!(file, "{} 9", curve.num_points())?;
    for i in 0..curve.num_points() {
        let p = curve.points()[i];
        let icv = curve.in_cv()[i];
        let ocv = curve.out_cv()[i];
        writeln!(
            file,
            "{} {} {} {} {} {} {} {} {}",
            p.x, p.y, p.z, icv.x, icv.y, icv.z, ocv.x, ocv.y, ocv.z
        )?;
    }
    Ok(())
}

/// Parse the `num_points num_cols` header line.
fn parse_header(line: &str) -> Result<(usize, usize)> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 2 {
        return Err(PathError::Parse(format!(
            "header: expected 'num_points num_cols', found '{}'",
            line.trim()
        )));
    }
    let num_points = fields[0]
        .parse::<usize>()
        .map_err(|_| PathError::Parse(format!("header: invalid point count '{}'", fields[0])))?;
    let num_cols = fields[1]
        .parse::<usize>()
        .map_err(|_| PathError::Parse(format!("header: invalid column count '{}'", fields[1])))?;
    Ok((num_points, num_cols))
}

/// Parse one data row of exactly `expect` floats.
fn parse_row(line: &str, expect: usize, line_no: usize) -> Result<Vec<f64>> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != expect {
        return Err(PathError::Parse(format!(
            "line {}: expected {} values, found {}",
            line_no,
            expect,
            fields.len()
        )));
    }
    fields
        .iter()
        .map(|f| {
            f.parse::<f64>()
                .map_err(|_| PathError::Parse(format!("line {}: invalid number '{}'", line_no, f)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathline_math::DVec3;
    use std::f64::consts::TAU;
    use tempfile::NamedTempFile;

    fn sample_path() -> BezierPath {
        BezierPath::through_points(
            vec![
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(1.0, 2.0, 0.0),
                DVec3::new(3.0, 1.0, -1.0),
                DVec3::new(4.0, 4.0, 2.0),
                DVec3::new(6.0, 3.0, 1.0),
            ],
            false,
        )
        .unwrap()
    }

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_write_then_read_round_trip() {
        let original = sample_path();
        let file = NamedTempFile::new().unwrap();

        write_path_file(file.path(), &original).unwrap();
        let restored = read_path_file(file.path(), false).unwrap();

        // f64 Display output parses back to the identical value
        assert_eq!(restored.points(), original.points());
        assert_eq!(restored.in_cv(), original.in_cv());
        assert_eq!(restored.out_cv(), original.out_cv());
        assert!(!restored.is_closed());
        assert_eq!(restored.num_segments(), original.num_segments());
    }

    #[test]
    fn test_round_trip_of_closed_path() {
        let knots = (0..8)
            .map(|k| {
                let angle = TAU * k as f64 / 8.0;
                DVec3::new(angle.cos(), angle.sin(), 0.0)
            })
            .collect();
        let original = BezierPath::through_points(knots, true).unwrap();
        let file = NamedTempFile::new().unwrap();

        write_path_file(file.path(), &original).unwrap();
        // The file stores no closed flag; the caller restores it
        let restored = read_path_file(file.path(), true).unwrap();

        assert!(restored.is_closed());
        assert_eq!(restored.points(), original.points());
        assert_eq!(restored.in_cv(), original.in_cv());
        assert_eq!(restored.out_cv(), original.out_cv());
    }

    #[test]
    fn test_three_column_file_fits_through_knots() {
        let file = write_temp("3 3\n0.0 0.0 0.0\n1.0 2.0 0.0\n3.0 1.0 -1.0\n");
        let from_file = read_path_file(file.path(), false).unwrap();

        let fitted = BezierPath::through_points(
            vec![
                DVec3::new(0.0, 0.0, 0.0),
                DVec3::new(1.0, 2.0, 0.0),
                DVec3::new(3.0, 1.0, -1.0),
            ],
            false,
        )
        .unwrap();

        assert_eq!(from_file.points(), fitted.points());
        assert_eq!(from_file.in_cv(), fitted.in_cv());
        assert_eq!(from_file.out_cv(), fitted.out_cv());
    }

    #[test]
    fn test_nine_column_file_reads_explicit_control_points() {
        let file = write_temp(
            "2 9\n\
             0 0 0  0 0 0  1 0 0\n\
             3 0 0  2 0 0  3 0 0\n",
        );
        let path = read_path_file(file.path(), false).unwrap();

        assert_eq!(path.num_points(), 2);
        assert_eq!(path.points()[0], DVec3::new(0.0, 0.0, 0.0));
        assert_eq!(path.points()[1], DVec3::new(3.0, 0.0, 0.0));
        assert_eq!(path.out_cv()[0], DVec3::new(1.0, 0.0, 0.0));
        assert_eq!(path.in_cv()[1], DVec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let file = write_temp("\n2 3\n\n1 0 0\n\n2 0 0\n\n");
        let path = read_path_file(file.path(), false).unwrap();
        assert_eq!(path.num_points(), 2);
        assert_eq!(path.points()[0], DVec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_malformed_header_is_rejected() {
        let file = write_temp("three points please\n");
        let result = read_path_file(file.path(), false);
        assert!(matches!(result, Err(PathError::Parse(_))));
    }

    #[test]
    fn test_unsupported_column_count_is_rejected() {
        let file = write_temp("2 5\n1 2 3 4 5\n6 7 8 9 10\n");
        let result = read_path_file(file.path(), false);
        assert!(matches!(result, Err(PathError::Parse(_))));
    }

    #[test]
    fn test_short_file_is_rejected() {
        let file = write_temp("4 3\n0 0 0\n1 0 0\n");
        match read_path_file(file.path(), false) {
            Err(PathError::Parse(msg)) => {
                assert!(msg.contains("expected 4 data rows"), "message: {}", msg)
            }
            other => panic!("expected Parse error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_absurd_header_count_is_rejected() {
        // A header may claim more rows than any real file could hold;
        // the reader must report the shortfall, not attempt to allocate
        let file = write_temp(&format!("{} 3\n0 0 0\n1 0 0\n", usize::MAX));
        match read_path_file(file.path(), false) {
            Err(PathError::Parse(msg)) => {
                assert!(msg.contains("found 2"), "message: {}", msg)
            }
            other => panic!("expected Parse error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_bad_number_is_rejected() {
        let file = write_temp("2 3\n0 0 0\n1 oops 0\n");
        match read_path_file(file.path(), false) {
            Err(PathError::Parse(msg)) => {
                assert!(msg.contains("oops"), "message: {}", msg)
            }
            other => panic!("expected Parse error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_wrong_row_arity_is_rejected() {
        let file = write_temp("2 3\n0 0 0\n1 2\n");
        let result = read_path_file(file.path(), false);
        assert!(matches!(result, Err(PathError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = read_path_file(Path::new("/nonexistent/path/to/curve.txt"), false);
        assert!(matches!(result, Err(PathError::Io(_))));
    }
}
