//! SMS text format: `"<n> <m> <type>\n"` header followed by 1-based
//! `"<i> <j> <x>\n"` triples, terminated by the sentinel `"0 0 0\n"`.
//!
//! Line-oriented, tolerant of blank lines, with structured per-line errors
//! carrying the offending line number — this format's grammar has no
//! comment lines and no separate size line (`n`, `m`, and the type
//! character share the first line).

use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::matrix::CsrMatrix;
use crate::matrix::triplet::TripletMatrix;

#[derive(Debug, Error)]
pub enum SmsError {
    #[error("I/O error reading/writing an SMS stream: {0}")]
    Io(#[from] io::Error),

    #[error("bad SMS header at line {line}: expected '<n> <m> <type>', got {text:?}")]
    InvalidHeader { line: usize, text: String },

    #[error("SMS dimensions must be positive, got {n}x{m} at line {line}")]
    NonPositiveDimensions { line: usize, n: i64, m: i64 },

    #[error("only the 'M' (modular) SMS type is supported when reading values, got '{found}' at line {line}")]
    UnsupportedType { line: usize, found: char },

    #[error("bad SMS entry at line {line}: expected '<i> <j> <x>', got {text:?}")]
    InvalidEntry { line: usize, text: String },

    #[error("SMS entry at line {line} uses a 1-based index of 0 before the 0 0 0 sentinel")]
    ZeroIndexBeforeSentinel { line: usize },

    #[error("SMS stream ended without a 0 0 0 sentinel line")]
    MissingSentinel,
}

/// Load an SMS stream into a [`TripletMatrix`].
///
/// `prime`: `Some(p)` loads values (and requires the header type to be
/// `'M'`); `None` loads a pattern-only matrix and does not enforce the type
/// character at all.
pub fn load_sms<R: BufRead>(reader: R, prime: Option<u64>) -> Result<TripletMatrix, SmsError> {
    let mut lines = reader.lines().enumerate();

    let (header_line, header) = next_nonblank(&mut lines)?
        .ok_or_else(|| SmsError::InvalidHeader { line: 1, text: String::new() })?;
    let tokens: Vec<&str> = header.split_whitespace().collect();
    if tokens.len() != 3 {
        return Err(SmsError::InvalidHeader { line: header_line, text: header });
    }
    let n: i64 = tokens[0]
        .parse()
        .map_err(|_| SmsError::InvalidHeader { line: header_line, text: header.clone() })?;
    let m: i64 = tokens[1]
        .parse()
        .map_err(|_| SmsError::InvalidHeader { line: header_line, text: header.clone() })?;
    if n <= 0 || m <= 0 {
        return Err(SmsError::NonPositiveDimensions { line: header_line, n, m });
    }
    let type_char = tokens[2]
        .chars()
        .next()
        .ok_or_else(|| SmsError::InvalidHeader { line: header_line, text: header.clone() })?;
    if prime.is_some() && type_char != 'M' {
        return Err(SmsError::UnsupportedType { line: header_line, found: type_char });
    }

    let (n, m) = (n as usize, m as usize);
    let mut t = TripletMatrix::new(n, m, prime.unwrap_or(0), prime.is_some());

    let mut saw_sentinel = false;
    for (i, line) in lines {
        let line_no = i + 1;
        let line = line.map_err(SmsError::Io)?;
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        let parts: Vec<&str> = text.split_whitespace().collect();
        if parts.len() != 3 {
            return Err(SmsError::InvalidEntry { line: line_no, text: text.to_string() });
        }
        let parse_i64 = |s: &str| -> Result<i64, SmsError> {
            s.parse()
                .map_err(|_| SmsError::InvalidEntry { line: line_no, text: text.to_string() })
        };
        let ri = parse_i64(parts[0])?;
        let cj = parse_i64(parts[1])?;
        let x = parse_i64(parts[2])?;

        if ri == 0 && cj == 0 && x == 0 {
            saw_sentinel = true;
            break;
        }
        if ri == 0 || cj == 0 {
            return Err(SmsError::ZeroIndexBeforeSentinel { line: line_no });
        }

        let row = (ri - 1) as usize;
        let col = (cj - 1) as usize;
        if row >= n || col >= m {
            return Err(SmsError::InvalidEntry { line: line_no, text: text.to_string() });
        }

        match prime {
            Some(p) => {
                let v = ((x % p as i64 + p as i64) % p as i64) as u64;
                t.push(row, col, v)
                    .map_err(|_| SmsError::InvalidEntry { line: line_no, text: text.to_string() })?;
            }
            None => {
                t.push_pattern(row, col)
                    .map_err(|_| SmsError::InvalidEntry { line: line_no, text: text.to_string() })?;
            }
        }
    }

    if !saw_sentinel {
        return Err(SmsError::MissingSentinel);
    }
    Ok(t)
}

fn next_nonblank<R: BufRead>(
    lines: &mut std::iter::Enumerate<std::io::Lines<R>>,
) -> Result<Option<(usize, String)>, SmsError> {
    for (i, line) in lines {
        let line = line.map_err(SmsError::Io)?;
        let t = line.trim().trim_start_matches('\u{feff}');
        if !t.is_empty() {
            return Ok(Some((i + 1, t.to_string())));
        }
    }
    Ok(None)
}

/// Write a CSR matrix as an SMS stream: `"<n> <m> M\n"` header, one
/// `"<i> <j> <x>\n"` line per stored entry (1-based), re-centering values
/// above `p/2` to `x - p` so the dump reads as small signed residues, then
/// the `"0 0 0\n"` sentinel.
pub fn save_sms<W: Write>(mut w: W, a: &CsrMatrix) -> io::Result<()> {
    writeln!(w, "{} {} M", a.dim.nrows, a.dim.ncols)?;
    let half = a.p / 2;
    for i in 0..a.dim.nrows {
        let (cols, vals) = a.row(i);
        for (k, &j) in cols.iter().enumerate() {
            let raw = vals.get(k).copied().unwrap_or(1);
            let signed: i64 = if raw > half { raw as i64 - a.p as i64 } else { raw as i64 };
            writeln!(w, "{} {} {}", i + 1, j + 1, signed)?;
        }
    }
    writeln!(w, "0 0 0")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn loads_an_identity_matrix() {
        let sms = "3 3 M\n1 1 1\n2 2 1\n3 3 1\n0 0 0\n";
        let t = load_sms(Cursor::new(sms), Some(257)).unwrap();
        let a = t.compress();
        assert_eq!(a.dim.nrows, 3);
        assert_eq!(a.dim.ncols, 3);
        assert_eq!(a.nnz(), 3);
    }

    #[test]
    fn round_trips_through_save_and_load() {
        let sms = "2 2 M\n1 1 200\n2 2 5\n0 0 0\n";
        let t = load_sms(Cursor::new(sms), Some(257)).unwrap();
        let a = t.compress();

        let mut buf = Vec::new();
        save_sms(&mut buf, &a).unwrap();
        let dumped = String::from_utf8(buf).unwrap();

        let reloaded = load_sms(Cursor::new(dumped), Some(257)).unwrap().compress();
        assert_eq!(reloaded.column_indices, a.column_indices);
        assert_eq!(reloaded.values, a.values);
    }

    #[test]
    fn save_centers_large_residues_as_negative() {
        let mut t = TripletMatrix::new(1, 1, 257, true);
        t.push(0, 0, 200).unwrap(); // > 257/2, should print as 200 - 257 = -57
        let a = t.compress();
        let mut buf = Vec::new();
        save_sms(&mut buf, &a).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("1 1 -57"));
    }

    #[test]
    fn rejects_non_modular_type_when_loading_values() {
        let sms = "1 1 N\n0 0 0\n";
        let err = load_sms(Cursor::new(sms), Some(257)).unwrap_err();
        assert!(matches!(err, SmsError::UnsupportedType { found: 'N', .. }));
    }

    #[test]
    fn rejects_missing_sentinel() {
        let sms = "1 1 M\n1 1 1\n";
        let err = load_sms(Cursor::new(sms), Some(257)).unwrap_err();
        assert!(matches!(err, SmsError::MissingSentinel));
    }

    #[test]
    fn pattern_only_load_ignores_type_character() {
        let sms = "1 1 X\n1 1 1\n0 0 0\n";
        let t = load_sms(Cursor::new(sms), None).unwrap();
        let a = t.compress();
        assert!(a.values.is_none());
    }
}
