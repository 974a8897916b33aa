//! Plain-text form of a matrix: one row per line, values separated by spaces.
//!
//! Values use Rust's shortest round-trip float formatting, so parsing the
//! output reproduces every leaf value bit for bit.

use std::io::{BufRead, Write};

use super::{Layout, QuadMatrix};
use crate::error::{MatmulError, Result};

/// Iterator over the text rows of a matrix, top to bottom.
pub struct Rows<'a> {
    matrix: &'a QuadMatrix,
    buf: Vec<f64>,
    next: usize,
}

impl Iterator for Rows<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.next == self.matrix.size() {
            return None;
        }
        self.matrix.read_row(self.next, &mut self.buf);
        self.next += 1;
        Some(format_row(&self.buf))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.matrix.size() - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Rows<'_> {}

fn format_row(values: &[f64]) -> String {
    let mut line = String::with_capacity(values.len() * 20);
    for (j, value) in values.iter().enumerate() {
        if j > 0 {
            line.push(' ');
        }
        line.push_str(&value.to_string());
    }
    line
}

impl QuadMatrix {
    /// Text rows in global row-major order, independent of the block layout.
    ///
    /// ```
    /// use quadmul::QuadMatrix;
    ///
    /// let m = QuadMatrix::from_dense(2, 1, &[1.0, 2.5, -3.0, 0.0]).unwrap();
    /// let rows: Vec<String> = m.rows().collect();
    /// assert_eq!(rows, vec!["1 2.5", "-3 0"]);
    /// ```
    pub fn rows(&self) -> Rows<'_> {
        Rows {
            matrix: self,
            buf: vec![0.0; self.size()],
            next: 0,
        }
    }

    /// Writes every row followed by a newline.
    pub fn write_text<W: Write>(&self, mut out: W) -> Result<()> {
        for row in self.rows() {
            writeln!(out, "{}", row)?;
        }
        out.flush()?;
        Ok(())
    }

    /// Parses the output of [`QuadMatrix::write_text`] into a tree with the given block threshold.
    ///
    /// Blank lines are ignored. The matrix must be square.
    pub fn parse_text<R: BufRead>(input: R, block: usize) -> Result<Self> {
        let mut values = Vec::new();
        let mut size = None;
        let mut rows = 0;

        for (idx, line) in input.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let lineno = idx + 1;
            let before = values.len();
            for token in line.split_whitespace() {
                let value = token.parse::<f64>().map_err(|err| MatmulError::Parse {
                    line: lineno,
                    message: format!("invalid number {:?}: {}", token, err),
                })?;
                values.push(value);
            }

            let width = values.len() - before;
            let expected = *size.get_or_insert(width);
            if width != expected {
                return Err(MatmulError::Parse {
                    line: lineno,
                    message: format!("expected {} values, found {}", expected, width),
                });
            }
            rows += 1;
        }

        let size = size.ok_or_else(|| MatmulError::Parse {
            line: 0,
            message: "no rows".to_string(),
        })?;
        if rows != size {
            return Err(MatmulError::Parse {
                line: rows,
                message: format!("expected {} rows for a square matrix, found {}", size, rows),
            });
        }

        let mut matrix = QuadMatrix::zeros(Layout::new(size, block)?)?;
        for (i, row) in values.chunks_exact(size).enumerate() {
            matrix.write_row(i, row);
        }
        Ok(matrix)
    }
}
