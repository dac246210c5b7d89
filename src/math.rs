// src/math.rs
// Fixed-size 3x3 linear algebra for the coupled pendulum chain.
// The system never grows beyond three bodies, so vectors and matrices are plain [f64; 3] arrays
// with the handful of operations the integrator needs: sums, scaling, products and inversion.
// Inversion is Gauss-Jordan elimination with partial pivoting on the augmented [M | I] block.
// Indices are 0-based throughout: entry (row, col), vector[0] is the first body.
// Operator impls (+, -, *, unary -) take values, as every type here is Copy.

use crate::error::PendulumError; // SingularMatrix from try_inverse
use std::ops::{Add, Index, IndexMut, Mul, Neg, Sub}; // Operator sugar for the integrator formulas

/// Dimension of every vector and matrix in this module.
pub const DIM: usize = 3;

/// Column vector of three reals, one entry per pendulum body.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3(pub [f64; DIM]);

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self([x, y, z])
    }

    pub const fn zeros() -> Self {
        Self([0.0; DIM])
    }

    /// Multiplies every entry by `k`.
    pub fn scale(&self, k: f64) -> Self {
        Self(self.0.map(|v| v * k))
    }

    /// Largest |entry|, or infinity if any entry is NaN or infinite.
    pub fn max_abs(&self) -> f64 {
        if self.0.iter().any(|v| !v.is_finite()) {
            return f64::INFINITY;
        }
        self.0.iter().fold(0.0, |m, v| m.max(v.abs()))
    }
}

impl From<[f64; DIM]> for Vector3 {
    fn from(a: [f64; DIM]) -> Self {
        Self(a)
    }
}

impl Index<usize> for Vector3 {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.0[i]
    }
}

impl IndexMut<usize> for Vector3 {
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        &mut self.0[i]
    }
}

impl Add for Vector3 {
    type Output = Vector3;

    fn add(self, rhs: Vector3) -> Vector3 {
        Vector3([self[0] + rhs[0], self[1] + rhs[1], self[2] + rhs[2]])
    }
}

impl Sub for Vector3 {
    type Output = Vector3;

    fn sub(self, rhs: Vector3) -> Vector3 {
        Vector3([self[0] - rhs[0], self[1] - rhs[1], self[2] - rhs[2]])
    }
}

impl Neg for Vector3 {
    type Output = Vector3;

    fn neg(self) -> Vector3 {
        Vector3(self.0.map(|v| -v))
    }
}

impl Mul<f64> for Vector3 {
    type Output = Vector3;

    fn mul(self, k: f64) -> Vector3 {
        self.scale(k)
    }
}

/// Dense 3x3 matrix stored row-major.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Matrix3(pub [[f64; DIM]; DIM]);

impl Matrix3 {
    pub const fn zeros() -> Self {
        Self([[0.0; DIM]; DIM])
    }

    pub const fn identity() -> Self {
        Self::from_diagonal([1.0, 1.0, 1.0])
    }

    /// Diagonal matrix with `d` on the main diagonal.
    pub const fn from_diagonal(d: [f64; DIM]) -> Self {
        Self([[d[0], 0.0, 0.0], [0.0, d[1], 0.0], [0.0, 0.0, d[2]]])
    }

    pub const fn from_rows(rows: [[f64; DIM]; DIM]) -> Self {
        Self(rows)
    }

    pub fn transpose(&self) -> Self {
        let mut t = Self::zeros();
        for row in 0..DIM {
            for col in 0..DIM {
                t.0[col][row] = self.0[row][col]; // mirror across the diagonal
            }
        }
        t
    }

    /// Exact symmetry check, `m[i][j] == m[j][i]` for every pair.
    pub fn is_symmetric(&self) -> bool {
        *self == self.transpose()
    }

    /// True when every off-diagonal entry is zero.
    pub fn is_diagonal(&self) -> bool {
        (0..DIM).all(|row| (0..DIM).all(|col| row == col || self.0[row][col] == 0.0))
    }

    pub fn diagonal(&self) -> Vector3 {
        Vector3([self.0[0][0], self.0[1][1], self.0[2][2]])
    }

    pub fn scale(&self, k: f64) -> Self {
        Self(self.0.map(|row| row.map(|v| v * k)))
    }

    /// Matrix-vector product `M·v`.
    pub fn mul_vec(&self, v: &Vector3) -> Vector3 {
        let mut out = Vector3::zeros();
        for row in 0..DIM {
            let mut sum = 0.0; // dot product of row with v
            for col in 0..DIM {
                sum += self.0[row][col] * v[col];
            }
            out[row] = sum; // summed left to right, so results are reproducible
        }
        out
    }

    /// Matrix-matrix product `M·N`.
    pub fn mul_mat(&self, other: &Matrix3) -> Matrix3 {
        let mut out = Matrix3::zeros();
        for row in 0..DIM {
            for col in 0..DIM {
                let mut sum = 0.0; // row of self against column of other
                for k in 0..DIM {
                    sum += self.0[row][k] * other.0[k][col];
                }
                out.0[row][col] = sum;
            }
        }
        out
    }

    /// Inverse by Gauss-Jordan elimination with partial pivoting.
    /// Fails with `SingularMatrix` when no non-zero pivot is left in a column.
    pub fn try_inverse(&self) -> Result<Matrix3, PendulumError> {
        let mut mat = self.0; // left half, reduced to I
        let mut inv = Matrix3::identity().0; // right half, becomes M⁻¹
        for i in 0..DIM {
            // Largest remaining entry in column i becomes the pivot.
            let mut max_row = i;
            for k in (i + 1)..DIM {
                if mat[k][i].abs() > mat[max_row][i].abs() {
                    max_row = k;
                }
            }
            let pivot = mat[max_row][i];
            if pivot == 0.0 || !pivot.is_finite() {
                return Err(PendulumError::SingularMatrix);
            }
            mat.swap(i, max_row); // swap whole rows in both halves
            inv.swap(i, max_row);

            for j in 0..DIM {
                mat[i][j] /= pivot; // pivot row normalised to a leading 1
                inv[i][j] /= pivot;
            }
            // Clear column i from every other row.
            for k in 0..DIM {
                if k == i {
                    continue;
                }
                let c = mat[k][i]; // elimination coefficient
                if c == 0.0 {
                    continue; // already clear, the common case for diagonal inputs
                }
                for j in 0..DIM {
                    mat[k][j] -= c * mat[i][j];
                    inv[k][j] -= c * inv[i][j];
                }
            }
        }
        Ok(Matrix3(inv))
    }
}

impl Index<(usize, usize)> for Matrix3 {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.0[row][col]
    }
}

impl IndexMut<(usize, usize)> for Matrix3 {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        &mut self.0[row][col]
    }
}

impl Add for Matrix3 {
    type Output = Matrix3;

    fn add(self, rhs: Matrix3) -> Matrix3 {
        let mut out = self;
        for row in 0..DIM {
            for col in 0..DIM {
                out.0[row][col] += rhs.0[row][col];
            }
        }
        out
    }
}

impl Mul<Vector3> for Matrix3 {
    type Output = Vector3;

    fn mul(self, v: Vector3) -> Vector3 {
        self.mul_vec(&v)
    }
}

impl Mul for Matrix3 {
    type Output = Matrix3;

    fn mul(self, rhs: Matrix3) -> Matrix3 {
        self.mul_mat(&rhs)
    }
}
