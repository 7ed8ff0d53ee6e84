//! Convolution kernels and the text parser that builds them.
//!
//! A [`Kernel`] is a square `size`×`size` matrix of `f32` weights stored in
//! row-major order. Kernels come from two places:
//!
//! - [`Kernel::from_weights`] for programmatic use (any square size);
//! - [`parse`] for user-typed input: a size field plus one text cell per
//!   weight, as collected by a form, a CLI flag, or an HTTP request. The parser
//!   bounds the size (see [`DEFAULT_MAX_SIZE`]) to keep input tractable.

use super::filters::FilterError;
use thiserror::Error;

/// Largest kernel size accepted by [`parse`] unless configured otherwise.
pub const DEFAULT_MAX_SIZE: usize = 10;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    #[error("Invalid kernel size '{text}': expected an integer between 1 and {max}")]
    InvalidSize { text: String, max: usize },
    #[error("Invalid kernel value '{text}' at row {row}, column {col}")]
    InvalidValue { row: usize, col: usize, text: String },
    #[error("Missing kernel value at row {row}, column {col}")]
    MissingValue { row: usize, col: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    size: usize,
    weights: Vec<f32>,
}

impl Kernel {
    /// Build a kernel from row-major weights.
    ///
    /// Fails with [`FilterError::InvalidKernel`] if `weights` is empty or its
    /// length is not a perfect square.
    pub fn from_weights(weights: Vec<f32>) -> Result<Self, FilterError> {
        let len = weights.len();
        let size = (len as f64).sqrt() as usize;
        if len == 0 || size * size != len {
            return Err(FilterError::InvalidKernel(len));
        }
        Ok(Self { size, weights })
    }

    /// 3×3 box average, every weight `1/9`.
    pub fn box_blur() -> Self {
        Self {
            size: 3,
            weights: vec![1.0 / 9.0; 9],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Weight at `(row, col)`.
    pub fn at(&self, row: usize, col: usize) -> f32 {
        self.weights[row * self.size + col]
    }
}

/// Parse a kernel from a size field and a grid of cell texts.
///
/// `cells` is consumed row-major; only the first `size * size` cells are read.
/// Surrounding whitespace in every field is ignored.
///
/// ```
/// # use simple_darkroom::imaging::kernel::parse;
/// let k = parse("2", &["1", "0", "0", "1"], 10).unwrap();
/// assert_eq!(k.size(), 2);
/// assert_eq!(k.weights(), &[1.0, 0.0, 0.0, 1.0]);
/// ```
pub fn parse<S: AsRef<str>>(
    size_text: &str,
    cells: &[S],
    max_size: usize,
) -> Result<Kernel, KernelError> {
    let size = parse_size(size_text, max_size)?;

    let mut weights = Vec::with_capacity(size * size);
    for row in 0..size {
        for col in 0..size {
            let cell = cells
                .get(row * size + col)
                .ok_or(KernelError::MissingValue { row, col })?
                .as_ref()
                .trim();
            let value = cell
                .parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| KernelError::InvalidValue {
                    row,
                    col,
                    text: cell.to_string(),
                })?;
            weights.push(value);
        }
    }

    Ok(Kernel { size, weights })
}

/// Parse a kernel from whitespace- or comma-separated values.
///
/// Convenience for single-field front ends (`--values "0 -1 0 -1 5 -1 0 -1 0"`).
pub fn parse_flat(size_text: &str, values: &str, max_size: usize) -> Result<Kernel, KernelError> {
    let cells: Vec<&str> = values
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .collect();
    parse(size_text, &cells, max_size)
}

fn parse_size(text: &str, max_size: usize) -> Result<usize, KernelError> {
    let invalid = || KernelError::InvalidSize {
        text: text.to_string(),
        max: max_size,
    };
    let size: i64 = text.trim().parse().map_err(|_| invalid())?;
    if size <= 0 || size as u64 > max_size as u64 {
        return Err(invalid());
    }
    Ok(size as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHARPEN: [&str; 9] = ["0", "-1", "0", "-1", "5", "-1", "0", "-1", "0"];

    #[test]
    fn parse_3x3_row_major() {
        let k = parse("3", &SHARPEN, DEFAULT_MAX_SIZE).unwrap();
        assert_eq!(k.size(), 3);
        assert_eq!(
            k.weights(),
            &[0.0, -1.0, 0.0, -1.0, 5.0, -1.0, 0.0, -1.0, 0.0]
        );
        assert_eq!(k.at(1, 1), 5.0);
        assert_eq!(k.at(0, 1), -1.0);
    }

    #[test]
    fn parse_missing_cell_names_position() {
        let err = parse("3", &SHARPEN[..8], DEFAULT_MAX_SIZE).unwrap_err();
        assert_eq!(err, KernelError::MissingValue { row: 2, col: 2 });
        assert!(err.to_string().contains("row 2, column 2"));
    }

    #[test]
    fn parse_invalid_value_names_cell() {
        let mut cells = SHARPEN.to_vec();
        cells[4] = "five";
        let err = parse("3", &cells, DEFAULT_MAX_SIZE).unwrap_err();
        assert_eq!(
            err,
            KernelError::InvalidValue {
                row: 1,
                col: 1,
                text: "five".to_string()
            }
        );
    }

    #[test]
    fn parse_rejects_non_finite() {
        let cells = ["inf"];
        assert!(matches!(
            parse("1", &cells, DEFAULT_MAX_SIZE),
            Err(KernelError::InvalidValue { row: 0, col: 0, .. })
        ));
    }

    #[test]
    fn parse_size_errors() {
        for bad in ["", "abc", "0", "-3", "11", "2.5"] {
            assert!(
                matches!(
                    parse(bad, &SHARPEN, DEFAULT_MAX_SIZE),
                    Err(KernelError::InvalidSize { .. })
                ),
                "size {bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn parse_size_bound_is_configurable() {
        let cells = vec!["1"; 144];
        assert!(parse("12", &cells, DEFAULT_MAX_SIZE).is_err());
        assert_eq!(parse("12", &cells, 16).unwrap().size(), 12);
    }

    #[test]
    fn parse_trims_whitespace_and_ignores_extra_cells() {
        let k = parse(" 1 ", &[" 2.5 ", "junk"], DEFAULT_MAX_SIZE).unwrap();
        assert_eq!(k.weights(), &[2.5]);
    }

    #[test]
    fn parse_flat_splits_on_commas_and_spaces() {
        let k = parse_flat("2", "1, 2\n3 4", DEFAULT_MAX_SIZE).unwrap();
        assert_eq!(k.weights(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn from_weights_requires_perfect_square() {
        assert!(Kernel::from_weights(vec![1.0; 9]).is_ok());
        assert_eq!(Kernel::from_weights(vec![1.0; 16]).unwrap().size(), 4);
        assert!(matches!(
            Kernel::from_weights(vec![1.0; 8]),
            Err(FilterError::InvalidKernel(8))
        ));
        assert!(matches!(
            Kernel::from_weights(Vec::new()),
            Err(FilterError::InvalidKernel(0))
        ));
    }

    #[test]
    fn box_blur_weights() {
        let k = Kernel::box_blur();
        assert_eq!(k.size(), 3);
        assert!(k.weights().iter().all(|w| (*w - 1.0 / 9.0).abs() < f32::EPSILON));
    }
}
