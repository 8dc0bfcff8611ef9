//! Exact homography between two quadrilaterals.
//!
//! Four correspondences fix the eight free entries of H (h22 = 1), so the
//! transform is the solution of an 8×8 linear system rather than a
//! least-squares fit.

use nalgebra::{Matrix3, SMatrix, SVector, Vector3};

/// Four image-space points of a quadrilateral.
pub type Quad = [[f64; 2]; 4];

#[derive(Debug, Clone, PartialEq)]
pub enum HomographyError {
    /// A corner coordinate is NaN or infinite.
    NonFinitePoint,
    /// Three corners of the named quad are collinear (or coincide).
    Degenerate { quad: &'static str },
    /// The 8×8 system has no unique solution.
    Singular,
}

impl std::fmt::Display for HomographyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFinitePoint => write!(f, "quad corner is not finite"),
            Self::Degenerate { quad } => {
                write!(f, "{} quad has three collinear corners", quad)
            }
            Self::Singular => write!(f, "homography system is singular"),
        }
    }
}

impl std::error::Error for HomographyError {}

/// Map a point through H: `H * [x, y, 1]^T → [u, v]`.
///
/// Points on the line at infinity come back as NaN.
pub fn homography_project(h: &Matrix3<f64>, x: f64, y: f64) -> [f64; 2] {
    let p = h * Vector3::new(x, y, 1.0);
    if p[2].abs() < 1e-15 {
        return [f64::NAN, f64::NAN];
    }
    [p[0] / p[2], p[1] / p[2]]
}

/// True when no three corners are collinear, relative to the quad's extent.
fn in_general_position(q: &Quad) -> bool {
    let (mut min, mut max) = (q[0], q[0]);
    for p in q {
        min = [min[0].min(p[0]), min[1].min(p[1])];
        max = [max[0].max(p[0]), max[1].max(p[1])];
    }
    let extent = (max[0] - min[0]).max(max[1] - min[1]);
    if extent <= 0.0 {
        return false;
    }
    let tol = 1e-9 * extent * extent;
    let cross = |a: [f64; 2], b: [f64; 2], c: [f64; 2]| {
        (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
    };
    [(0, 1, 2), (0, 1, 3), (0, 2, 3), (1, 2, 3)]
        .iter()
        .all(|&(i, j, k)| cross(q[i], q[j], q[k]).abs() > tol)
}

/// Homography H with `dst[i] = project(H, src[i])` for all four corners.
///
/// Each corner pair contributes two rows of the system
/// `[x y 1 0 0 0 -xu -yu] h = u` and `[0 0 0 x y 1 -xv -yv] h = v`,
/// solved by LU decomposition. Returned with h22 = 1.
pub fn solve_quad_homography(src: &Quad, dst: &Quad) -> Result<Matrix3<f64>, HomographyError> {
    if src.iter().chain(dst).flatten().any(|v| !v.is_finite()) {
        return Err(HomographyError::NonFinitePoint);
    }
    if !in_general_position(src) {
        return Err(HomographyError::Degenerate { quad: "source" });
    }
    if !in_general_position(dst) {
        return Err(HomographyError::Degenerate { quad: "destination" });
    }

    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();
    for (i, (s, d)) in src.iter().zip(dst).enumerate() {
        let ([x, y], [u, v]) = (*s, *d);
        let r = 2 * i;
        a.row_mut(r)
            .copy_from_slice(&[x, y, 1.0, 0.0, 0.0, 0.0, -x * u, -y * u]);
        a.row_mut(r + 1)
            .copy_from_slice(&[0.0, 0.0, 0.0, x, y, 1.0, -x * v, -y * v]);
        b[r] = u;
        b[r + 1] = v;
    }

    let h = a.lu().solve(&b).ok_or(HomographyError::Singular)?;
    if h.iter().any(|v| !v.is_finite()) {
        return Err(HomographyError::Singular);
    }
    #[rustfmt::skip]
    let m = Matrix3::new(
        h[0], h[1], h[2],
        h[3], h[4], h[5],
        h[6], h[7], 1.0,
    );
    Ok(m)
}
