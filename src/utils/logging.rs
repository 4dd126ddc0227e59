use std::fmt::Write;

use crate::math::MatrixArray;

/// Render the buffer of `array` as nested brackets for diagnostics.
///
/// At most `max_matrices` matrices are printed (all by default). When a row is
/// longer than twice `max_cols`, only its first and last `max_cols` entries
/// are shown.
pub fn format_matrix_array(
    array: &MatrixArray,
    decimal_places: usize,
    max_matrices: Option<usize>,
    max_cols: Option<usize>,
) -> String {
    let (length, rank, _) = array.shape();
    let data = array.data();
    let max_cols = max_cols.unwrap_or(rank).min(rank);
    let matrices_to_print = max_matrices.unwrap_or(length).min(length);

    let mut out = String::new();
    let _ = writeln!(out, "{} {}", array, array.space());
    out.push('[');
    for m in 0..matrices_to_print {
        out.push_str("\n  [");
        for i in 0..rank {
            out.push_str("\n    [");
            let entries: Vec<String> = if max_cols * 2 < rank {
                let head = (0..max_cols).map(|j| format!("{:.*e}", decimal_places, data[[m, i, j]]));
                let tail = ((rank - max_cols)..rank)
                    .map(|j| format!("{:.*e}", decimal_places, data[[m, i, j]]));
                head.chain(std::iter::once("...".to_string()))
                    .chain(tail)
                    .collect()
            } else {
                (0..rank)
                    .map(|j| format!("{:.*e}", decimal_places, data[[m, i, j]]))
                    .collect()
            };
            out.push_str(&entries.join(", "));
            out.push(']');
            if i + 1 < rank {
                out.push(',');
            }
        }
        out.push_str("\n  ]");
        if m + 1 < length {
            out.push(',');
        }
    }
    if matrices_to_print < length {
        let _ = write!(out, "\n  ... ({} more)", length - matrices_to_print);
    }
    out.push_str("\n]");
    out
}

/// Emit [`format_matrix_array`] at trace level when that level is enabled.
pub fn trace_matrix_array(label: &str, array: &MatrixArray, decimal_places: usize) {
    if log::log_enabled!(log::Level::Trace) {
        log::trace!(
            "{}:\n{}",
            label,
            format_matrix_array(array, decimal_places, Some(4), Some(4))
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::Space;

    #[test]
    fn test_format_small_array() {
        let mut array = MatrixArray::new(2, 2);
        array.set_column(0, 1, &[1.0, 2.0]).unwrap();
        let text = format_matrix_array(&array, 1, None, None);

        assert!(text.starts_with("<MatrixArray rank:2 length:2> Real"));
        assert!(text.contains("[0.0e0, 1.0e0]"));
        assert!(text.contains("[2.0e0, 0.0e0]"));
        assert!(!text.contains("more"));
    }

    #[test]
    fn test_format_truncates_matrices_and_columns() {
        let array = MatrixArray::identity(5, 6, Space::Fourier);
        let text = format_matrix_array(&array, 0, Some(2), Some(2));

        assert!(text.contains("... (3 more)"));
        assert!(text.contains("[1e0, 0e0, ..., 0e0, 0e0]"));
        assert_eq!(text.matches("...,").count(), 2 * 6);
    }

    #[test]
    fn test_trace_does_not_panic_without_logger() {
        let array = MatrixArray::new(1, 1);
        trace_matrix_array("empty", &array, 3);
    }
}
