//! PBM/PGM/PPM sparsity-plot dumps: scatter each row into a dense workspace
//! row, print it, then clear only what was touched — the same discipline
//! `Workspace` uses for `x`.

use std::io::{self, Write};

use crate::dm::{CellClass, DmBlocks};
use crate::matrix::CsrMatrix;

/// `P1` bitmap: one pixel per matrix cell, `1` where `A` has an entry.
pub fn write_pbm<W: Write>(mut w: W, a: &CsrMatrix) -> io::Result<()> {
    let (n, m) = (a.dim.nrows, a.dim.ncols);
    writeln!(w, "P1")?;
    writeln!(w, "{m} {n}")?;

    let mut row = vec![0u8; m];
    for i in 0..n {
        let cols = a.row_cols(i);
        for &j in cols {
            row[j] = 1;
        }
        let line: Vec<String> = row.iter().map(|b| b.to_string()).collect();
        writeln!(w, "{}", line.join(" "))?;
        for &j in cols {
            row[j] = 0;
        }
    }
    Ok(())
}

/// `P2` graymap downsampled to a `x_dim` by `y_dim` grid: each output cell
/// aggregates a rectangular region of `A`, and its gray value is
/// `255 * (1 - count/expected)` where `expected` assumes a uniform fill,
/// clamped to `[0, 255]`.
pub fn write_pgm<W: Write>(mut w: W, x_dim: usize, y_dim: usize, a: &CsrMatrix) -> io::Result<()> {
    let (n, m) = (a.dim.nrows, a.dim.ncols);
    let x_dim = x_dim.min(m).max(1);
    let y_dim = y_dim.min(n).max(1);

    writeln!(w, "P2")?;
    writeln!(w, "{x_dim} {y_dim}")?;
    writeln!(w, "255")?;

    let expected = (m as f64 / x_dim as f64) * (n as f64 / y_dim as f64);
    let rows_per_cell = (n / y_dim).max(1);

    let mut counts = vec![0u32; x_dim];
    let mut printed_on_line = 0usize;
    let mut i = 0usize;
    while i < n {
        let mut k = 0usize;
        while k < rows_per_cell && i < n {
            for &j in a.row_cols(i) {
                let cell = (j * x_dim) / m;
                counts[cell] += 1;
            }
            i += 1;
            k += 1;
        }

        for &count in &counts {
            let intensity = (1.0 - count as f64 / expected).clamp(0.0, 1.0);
            write!(w, "{:.0} ", 255.0 * intensity)?;
            printed_on_line += 1;
            if printed_on_line % 32 == 0 {
                writeln!(w)?;
            }
        }
        counts.fill(0);
    }
    writeln!(w)?;
    Ok(())
}

/// 11-entry palette used by the PPM dump: index 0 is the unmatched
/// background; the remaining ten distinguish diagonal/off-diagonal/other
/// cells across up to several diagonal blocks.
const PALETTE: [u32; 11] = [
    0xFFFFFF, 0xFF0000, 0xFF6633, 0xCC0000, 0x990000, 0xFFFF66, 0xFFCC00, 0xCC9900, 0x669933,
    0x99FF99, 0x33CC00,
];

fn rgb(color: u32) -> (u8, u8, u8) {
    (((color >> 16) & 0xFF) as u8, ((color >> 8) & 0xFF) as u8, (color & 0xFF) as u8)
}

/// `P3` colored pixmap: background cells are colored by Dulmage–Mendelsohn
/// block membership (diagonal / off-diagonal / other), and every nonzero
/// entry of `A` overwrites its pixel to black regardless of block color.
/// `dm = None` degrades to a plain black-on-white sparsity plot (every cell
/// classified "other").
pub fn write_ppm<W: Write>(mut w: W, a: &CsrMatrix, dm: Option<&DmBlocks>) -> io::Result<()> {
    let (n, m) = (a.dim.nrows, a.dim.ncols);
    writeln!(w, "P3")?;
    writeln!(w, "{m} {n}")?;
    writeln!(w, "255")?;

    let mut pixel = vec![0u32; m];
    let mut printed_on_line = 0usize;

    for i in 0..n {
        for (j, slot) in pixel.iter_mut().enumerate() {
            *slot = match dm.map(|d| d.classify(i, j)) {
                Some(CellClass::Diagonal) => PALETTE[1],
                Some(CellClass::OffDiagonal) => PALETTE[2],
                _ => PALETTE[0],
            };
        }
        for &j in a.row_cols(i) {
            pixel[j] = 0x000000;
        }
        for &p in &pixel {
            let (r, g, b) = rgb(p);
            write!(w, "{r} {g} {b} ")?;
            printed_on_line += 1;
            if printed_on_line % 8 == 0 {
                writeln!(w)?;
            }
        }
    }
    writeln!(w)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::triplet::TripletMatrix;

    fn small() -> CsrMatrix {
        let mut t = TripletMatrix::new(2, 3, 257, true);
        t.push(0, 0, 1).unwrap();
        t.push(1, 2, 1).unwrap();
        t.compress()
    }

    #[test]
    fn pbm_marks_exactly_the_nonzero_cells() {
        let a = small();
        let mut buf = Vec::new();
        write_pbm(&mut buf, &a).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "P1");
        assert_eq!(lines.next().unwrap(), "3 2");
        assert_eq!(lines.next().unwrap(), "1 0 0");
        assert_eq!(lines.next().unwrap(), "0 0 1");
    }

    #[test]
    fn pgm_header_reports_requested_dimensions() {
        let a = small();
        let mut buf = Vec::new();
        write_pgm(&mut buf, 3, 2, &a).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "P2");
        assert_eq!(lines.next().unwrap(), "3 2");
        assert_eq!(lines.next().unwrap(), "255");
    }

    #[test]
    fn ppm_without_dm_paints_background_white_and_entries_black() {
        let a = small();
        let mut buf = Vec::new();
        write_ppm(&mut buf, &a, None).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("255 255 255"));
        assert!(text.contains("0 0 0"));
    }
}
