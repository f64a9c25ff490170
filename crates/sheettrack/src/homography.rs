//! Four-point perspective transforms via DLT with Hartley normalization.

use nalgebra::{DMatrix, Matrix3, Vector3};

#[derive(Debug, Clone, PartialEq)]
pub enum HomographyError {
    TooFewPoints { needed: usize, got: usize },
    NumericalFailure(String),
}

impl std::fmt::Display for HomographyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewPoints { needed, got } => {
                write!(f, "too few points: need {}, got {}", needed, got)
            }
            Self::NumericalFailure(msg) => write!(f, "numerical failure: {}", msg),
        }
    }
}

impl std::error::Error for HomographyError {}

/// Project a 2D point through a 3×3 homography: H * [x, y, 1]^T → [u, v].
pub fn project(h: &Matrix3<f64>, x: f64, y: f64) -> [f64; 2] {
    let p = h * Vector3::new(x, y, 1.0);
    if p[2].abs() < 1e-15 {
        return [f64::NAN, f64::NAN];
    }
    [p[0] / p[2], p[1] / p[2]]
}

/// Row-major copy of `h`.
pub fn matrix3_to_array(h: &Matrix3<f64>) -> [[f64; 3]; 3] {
    [
        [h[(0, 0)], h[(0, 1)], h[(0, 2)]],
        [h[(1, 0)], h[(1, 1)], h[(1, 2)]],
        [h[(2, 0)], h[(2, 1)], h[(2, 2)]],
    ]
}

/// Similarity moving the centroid to the origin with mean radius √2.
fn conditioning(pts: &[[f64; 2]]) -> Matrix3<f64> {
    let n = pts.len() as f64;
    let (sx, sy) = pts.iter().fold((0.0, 0.0), |(ax, ay), p| (ax + p[0], ay + p[1]));
    let (cx, cy) = (sx / n, sy / n);
    let mean_r = pts
        .iter()
        .map(|p| (p[0] - cx).hypot(p[1] - cy))
        .sum::<f64>()
        / n;
    let s = if mean_r > 1e-15 {
        std::f64::consts::SQRT_2 / mean_r
    } else {
        1.0
    };
    Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0)
}

fn apply(t: &Matrix3<f64>, p: [f64; 2]) -> [f64; 2] {
    [
        t[(0, 0)] * p[0] + t[(0, 2)],
        t[(1, 1)] * p[1] + t[(1, 2)],
    ]
}

/// Homography `H` with `dst ≈ project(H, src)` from ≥4 correspondences.
pub fn estimate_homography_dlt(
    src: &[[f64; 2]],
    dst: &[[f64; 2]],
) -> Result<Matrix3<f64>, HomographyError> {
    let n = src.len().min(dst.len());
    if n < 4 {
        return Err(HomographyError::TooFewPoints { needed: 4, got: n });
    }
    if src.len() != dst.len() {
        return Err(HomographyError::NumericalFailure(format!(
            "{} source vs {} destination points",
            src.len(),
            dst.len()
        )));
    }

    let t_src = conditioning(src);
    let t_dst = conditioning(dst);

    // Two rows per correspondence of A·h = 0.
    let mut a = DMatrix::zeros(2 * n, 9);
    for (i, (s, d)) in src.iter().zip(dst).enumerate() {
        let [x, y] = apply(&t_src, *s);
        let [u, v] = apply(&t_dst, *d);
        let rows = [
            [0.0, 0.0, 0.0, -x, -y, -1.0, v * x, v * y, v],
            [x, y, 1.0, 0.0, 0.0, 0.0, -u * x, -u * y, -u],
        ];
        for (k, row) in rows.iter().enumerate() {
            for (j, &val) in row.iter().enumerate() {
                a[(2 * i + k, j)] = val;
            }
        }
    }

    let eig = nalgebra::SymmetricEigen::new(a.transpose() * &a);
    let col = eig.eigenvalues.iamin();
    let h_cond = Matrix3::from_fn(|r, c| eig.eigenvectors[(3 * r + c, col)]);

    let t_dst_inv = t_dst
        .try_inverse()
        .ok_or_else(|| HomographyError::NumericalFailure("conditioning not invertible".into()))?;
    let h = t_dst_inv * h_cond * t_src;

    let scale = h[(2, 2)];
    Ok(if scale.abs() < 1e-15 { h } else { h / scale })
}

/// Exact transform taking the four `src` corners onto the four `dst` corners.
///
/// Fails when either quadrilateral is degenerate (three collinear corners or
/// repeated points), which shows up as a singular or non-finite matrix.
pub fn perspective_transform(
    src: &[[f64; 2]; 4],
    dst: &[[f64; 2]; 4],
) -> Result<Matrix3<f64>, HomographyError> {
    let h = estimate_homography_dlt(src, dst)?;
    if h.iter().any(|v| !v.is_finite()) {
        return Err(HomographyError::NumericalFailure(
            "non-finite transform".into(),
        ));
    }
    let det = h.determinant();
    if !det.is_finite() || det.abs() < 1e-12 {
        return Err(HomographyError::NumericalFailure(format!(
            "singular transform (det {:.3e})",
            det
        )));
    }
    // A near-degenerate quad still gives a full-rank fit, so check the fit
    // reproduces every corner.
    for (s, d) in src.iter().zip(dst) {
        let p = project(&h, s[0], s[1]);
        let err = ((p[0] - d[0]).powi(2) + (p[1] - d[1]).powi(2)).sqrt();
        if !err.is_finite() || err > 1e-3 * (1.0 + d[0].abs().max(d[1].abs())) {
            return Err(HomographyError::NumericalFailure(format!(
                "corner reprojection error {:.3e}",
                err
            )));
        }
    }
    Ok(h)
}
