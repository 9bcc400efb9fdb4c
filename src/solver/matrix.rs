//! Dense 4x4 inversion for the normal equations.

use nalgebra::Matrix4;

/// Inverts a 4x4 matrix by Gauss-Jordan elimination with partial
/// pivoting over the augmented `[m | I]` system. Returns `None` when the
/// best available pivot magnitude is at or below `pivot_threshold`:
/// the caller treats the normal equations as singular and skips the
/// epoch.
pub(crate) fn try_invert_4x4(m: &Matrix4<f64>, pivot_threshold: f64) -> Option<Matrix4<f64>> {
    let mut a = *m;
    let mut inv = Matrix4::<f64>::identity();

    for col in 0..4 {
        // partial pivoting: largest magnitude in the remaining column
        let mut pivot_row = col;
        for row in col + 1..4 {
            if a[(row, col)].abs() > a[(pivot_row, col)].abs() {
                pivot_row = row;
            }
        }

        let pivot = a[(pivot_row, col)];
        if pivot.abs() <= pivot_threshold {
            return None;
        }

        if pivot_row != col {
            a.swap_rows(pivot_row, col);
            inv.swap_rows(pivot_row, col);
        }

        for k in 0..4 {
            a[(col, k)] /= pivot;
            inv[(col, k)] /= pivot;
        }

        for row in 0..4 {
            if row == col {
                continue;
            }

            let factor = a[(row, col)];
            for k in 0..4 {
                a[(row, k)] -= factor * a[(col, k)];
                inv[(row, k)] -= factor * inv[(col, k)];
            }
        }
    }

    Some(inv)
}
