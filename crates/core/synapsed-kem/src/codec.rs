//! Plain-text persistence
//!
//! Matrices are stored one row per line with entries separated by a single
//! tab, in decimal, with no header. Shared secrets are stored as a single
//! `"<label>: <lowercase hex>"` line. Readers tolerate trailing whitespace
//! (including the trailing tab older writers emit) but never pad short rows.

use crate::derive::SharedSecret;
use crate::error::{Error, Result};
use crate::matrix::Matrix;
use std::fs;
use std::ops::Range;
use std::path::Path;

/// Encode a matrix as tab-separated rows
pub fn encode_matrix(matrix: &Matrix) -> String {
    let mut out = String::new();
    for row in matrix.iter_rows() {
        let line: Vec<String> = row.iter().map(i64::to_string).collect();
        out.push_str(&line.join("\t"));
        out.push('\n');
    }
    out
}

fn parse_row(line: &str, line_no: usize) -> Result<Vec<i64>> {
    line.trim_end()
        .split('\t')
        .enumerate()
        .map(|(col, token)| {
            token.trim().parse::<i64>().map_err(|e| {
                Error::deserialization(line_no, format!("column {}: {token:?}: {e}", col + 1))
            })
        })
        .collect()
}

/// Parse a matrix, inferring its shape from the text
pub fn parse_matrix(text: &str) -> Result<Matrix> {
    let mut rows = Vec::new();
    let mut width = None;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            // only trailing blank lines are allowed
            if text.lines().skip(idx).all(|rest| rest.trim().is_empty()) {
                break;
            }
            return Err(Error::deserialization(line_no, "blank line inside matrix"));
        }

        let row = parse_row(line, line_no)?;
        match width {
            None => width = Some(row.len()),
            Some(w) if w != row.len() => {
                return Err(Error::deserialization(
                    line_no,
                    format!("expected {w} columns, found {}", row.len()),
                ));
            }
            Some(_) => {}
        }
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(Error::deserialization(0, "no matrix rows"));
    }
    Matrix::from_rows(rows)
}

/// Parse a matrix whose shape is known in advance
pub fn decode_matrix(text: &str, rows: usize, cols: usize) -> Result<Matrix> {
    let matrix = parse_matrix(text)?;
    if matrix.cols() != cols {
        return Err(Error::deserialization(
            1,
            format!("expected {cols} columns, found {}", matrix.cols()),
        ));
    }
    if matrix.rows() != rows {
        return Err(Error::deserialization(
            matrix.rows().min(rows) + 1,
            format!("expected {rows} rows, found {}", matrix.rows()),
        ));
    }
    Ok(matrix)
}

/// Decode a matrix of the expected shape whose entries must all lie in
/// `range`. The error names the first offending line and column.
pub fn decode_matrix_in_range(
    text: &str,
    rows: usize,
    cols: usize,
    range: Range<i64>,
) -> Result<Matrix> {
    let matrix = decode_matrix(text, rows, cols)?;
    if let Some(idx) = matrix.entries().iter().position(|x| !range.contains(x)) {
        return Err(Error::deserialization(
            idx / cols + 1,
            format!(
                "column {}: {} outside [{}, {})",
                idx % cols + 1,
                matrix.entries()[idx],
                range.start,
                range.end
            ),
        ));
    }
    Ok(matrix)
}

/// Format a `"<label>: <hex>"` secret line
pub fn format_secret_line(label: &str, secret: &SharedSecret) -> String {
    format!("{label}: {}", secret.to_hex())
}

/// Split a secret line into its label and secret
pub fn parse_secret_line(line: &str) -> Result<(String, SharedSecret)> {
    let line = line.trim();
    let (label, digest) = line
        .rsplit_once(':')
        .ok_or_else(|| Error::deserialization(1, "missing ':' separator"))?;
    let secret = SharedSecret::from_hex(digest.trim()).map_err(|e| match e {
        Error::Deserialization { reason, .. } => Error::deserialization(1, reason),
        other => other,
    })?;
    Ok((label.trim().to_string(), secret))
}

/// Write a matrix to `path`
pub fn save_matrix(path: impl AsRef<Path>, matrix: &Matrix) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, encode_matrix(matrix))?;
    tracing::debug!(path = %path.display(), dims = ?matrix.dims(), "saved matrix");
    Ok(())
}

/// Read a `rows x cols` matrix from `path`
pub fn load_matrix(path: impl AsRef<Path>, rows: usize, cols: usize) -> Result<Matrix> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    decode_matrix(&text, rows, cols)
}

/// Read a matrix file and reject any entry outside `range`
pub fn load_matrix_in_range(
    path: impl AsRef<Path>,
    rows: usize,
    cols: usize,
    range: Range<i64>,
) -> Result<Matrix> {
    let text = fs::read_to_string(path.as_ref())?;
    decode_matrix_in_range(&text, rows, cols, range)
}

/// Write a labelled secret to `path`
pub fn save_secret(path: impl AsRef<Path>, label: &str, secret: &SharedSecret) -> Result<()> {
    let mut line = format_secret_line(label, secret);
    line.push('\n');
    fs::write(path, line)?;
    Ok(())
}

/// Read a labelled secret from the first line of `path`
pub fn load_secret(path: impl AsRef<Path>) -> Result<(String, SharedSecret)> {
    let text = fs::read_to_string(path)?;
    let first = text
        .lines()
        .next()
        .ok_or_else(|| Error::deserialization(1, "empty secret file"))?;
    parse_secret_line(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::derive;

    #[test]
    fn test_encode_layout() {
        let m = Matrix::from_rows(vec![vec![1, -2, 3], vec![40, 0, 96]]).unwrap();
        assert_eq!(encode_matrix(&m), "1\t-2\t3\n40\t0\t96\n");
    }

    #[test]
    fn test_parse_tolerates_trailing_tab_and_spaces() {
        let m = parse_matrix("1\t2\t\n3\t4  \r\n\n").unwrap();
        assert_eq!(m, Matrix::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap());
    }

    #[test]
    fn test_parse_rejects_short_row() {
        let err = parse_matrix("1\t2\n3\n").unwrap_err();
        assert!(matches!(err, Error::Deserialization { line: 2, .. }));
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        let err = parse_matrix("1\tx\n").unwrap_err();
        assert!(matches!(err, Error::Deserialization { line: 1, ref reason } if reason.contains("column 2")));
    }

    #[test]
    fn test_parse_rejects_empty_and_inner_blank() {
        assert!(parse_matrix("").is_err());
        assert!(parse_matrix("1\n\n2\n").is_err());
    }

    #[test]
    fn test_decode_checks_shape() {
        assert!(decode_matrix("1\t2\n3\t4\n", 2, 2).is_ok());
        assert!(decode_matrix("1\t2\n3\t4\n", 3, 2).is_err());
        assert!(decode_matrix("1\t2\n3\t4\n", 2, 3).is_err());
    }

    #[test]
    fn test_decode_in_range_names_offending_entry() {
        assert!(decode_matrix_in_range("0\t96\n5\t1\n", 2, 2, 0..97).is_ok());

        let err = decode_matrix_in_range("0\t96\n5\t97\n", 2, 2, 0..97).unwrap_err();
        assert!(matches!(err, Error::Deserialization { line: 2, ref reason } if reason.contains("column 2")));

        let err = decode_matrix_in_range("-1\t0\n", 1, 2, 0..97).unwrap_err();
        assert!(matches!(err, Error::Deserialization { line: 1, .. }));
    }

    #[test]
    fn test_secret_line() {
        let secret = derive(&Matrix::identity(2));
        let line = format_secret_line("Shared Secret (Decapsulation)", &secret);
        assert!(line.starts_with("Shared Secret (Decapsulation): "));

        let (label, parsed) = parse_secret_line(&format!("{line}  ")).unwrap();
        assert_eq!(label, "Shared Secret (Decapsulation)");
        assert_eq!(parsed, secret);
    }

    #[test]
    fn test_secret_line_errors() {
        assert!(parse_secret_line("no separator").is_err());
        assert!(parse_secret_line("label: 1234").is_err());
    }
}
