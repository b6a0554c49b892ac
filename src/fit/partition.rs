//! Inlier/outlier partitioning.
//!
//! A row is an outlier when its x lies outside the x interval or its y lies
//! outside the y interval; otherwise it is an inlier. One pass, order
//! preserving.

use crate::domain::{Interval, Partition};
use crate::error::CoreError;

/// Split `(x, y)` by the rectangle `x_bounds × y_bounds`.
pub fn partition(
    x: &[f64],
    y: &[f64],
    x_bounds: Interval,
    y_bounds: Interval,
) -> Result<Partition, CoreError> {
    if x.len() != y.len() {
        return Err(CoreError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }

    let mut out = Partition::default();
    for (i, (&xi, &yi)) in x.iter().zip(y.iter()).enumerate() {
        if !(x_bounds.contains(xi) && y_bounds.contains(yi)) {
            out.x_outliers.push(xi);
            out.y_outliers.push(yi);
            out.outlier_rows.push(i);
        } else {
            out.x_inliers.push(xi);
            out.y_inliers.push(yi);
            out.inlier_rows.push(i);
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_values_are_inliers() {
        let x = [-1.0, 0.0, 5.0, 10.0, 11.0];
        let y = [0.0; 5];
        let p = partition(&x, &y, Interval::new(0.0, 10.0), Interval::new(-1.0, 1.0)).unwrap();
        assert_eq!(p.x_inliers, vec![0.0, 5.0, 10.0]);
        assert_eq!(p.x_outliers, vec![-1.0, 11.0]);
        assert_eq!(p.inlier_rows, vec![1, 2, 3]);
        assert_eq!(p.outlier_rows, vec![0, 4]);
    }

    #[test]
    fn y_bound_alone_makes_an_outlier() {
        let p = partition(
            &[1.0, 2.0, 3.0],
            &[0.0, 5.0, 0.0],
            Interval::new(0.0, 10.0),
            Interval::new(-1.0, 1.0),
        )
        .unwrap();
        assert_eq!(p.outlier_rows, vec![1]);
        assert_eq!(p.y_outliers, vec![5.0]);
    }

    #[test]
    fn inverted_interval_marks_everything_outlier() {
        let p = partition(
            &[1.0, 2.0, 3.0],
            &[1.0, 2.0, 3.0],
            Interval::new(3.0, 1.0),
            Interval::new(0.0, 10.0),
        )
        .unwrap();
        assert_eq!(p.inlier_count(), 0);
        assert_eq!(p.outlier_count(), 3);
    }

    #[test]
    fn rows_follow_interval_contains() {
        let xb = Interval::new(-1.0, 2.5);
        let yb = Interval::new(0.0, 4.0);
        let x = [-1.0, -1.5, 0.0, 2.5, 3.0, 1.0];
        let y = [0.0, 1.0, 4.0, 4.5, 1.0, 2.0];
        let p = partition(&x, &y, xb, yb).unwrap();
        for i in 0..x.len() {
            let inside = xb.contains(x[i]) && yb.contains(y[i]);
            assert_eq!(p.inlier_rows.contains(&i), inside, "row {i}");
        }
        assert_eq!(p.inlier_rows, vec![0, 2, 5]);
    }

    #[test]
    fn empty_input_is_empty_partition() {
        let p = partition(&[], &[], Interval::new(0.0, 1.0), Interval::new(0.0, 1.0)).unwrap();
        assert_eq!(p, Partition::default());
    }

    #[test]
    fn length_mismatch_is_rejected() {
        let err = partition(&[1.0], &[], Interval::new(0.0, 1.0), Interval::new(0.0, 1.0)).unwrap_err();
        assert_eq!(err, CoreError::LengthMismatch { x: 1, y: 0 });
    }
}
