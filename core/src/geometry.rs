use na::Vector3;
use serde::{Deserialize, Serialize};
use crate::fold;

/// Rectangular periodic simulation box with its origin at zero.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxGeometry {
    /// Edge lengths of the box
    pub length: Vector3<f64>,
}

impl BoxGeometry {
    pub fn new(length: Vector3<f64>) -> Self {
        Self { length }
    }

    pub fn cubic(length: f64) -> Self {
        Self::new(Vector3::new(length, length, length))
    }

    pub fn volume(&self) -> f64 {
        self.length.x * self.length.y * self.length.z
    }

    /// Shortest edge of the box.
    pub fn min_length(&self) -> f64 {
        self.length.min()
    }

    /// Position folded into the primary cell.
    pub fn fold_position(&self, position: &Vector3<f64>) -> Vector3<f64> {
        Vector3::new(
            fold(position.x, self.length.x),
            fold(position.y, self.length.y),
            fold(position.z, self.length.z),
        )
    }

    /// Minimum image of `a - b`.
    ///
    /// Every component is shifted by half a box, folded into `[0, L)` and
    /// shifted back, so the result lies in `[-L/2, L/2)` and only depends on
    /// the two absolute positions. Axes with infinite length are left as is.
    ///
    /// # Examples
    ///
    /// ```
    /// # use nalgebra::Vector3;
    /// # use mdpress_core::BoxGeometry;
    /// let geometry = BoxGeometry::cubic(10.0);
    /// let d = geometry.get_mi_vector(&Vector3::new(9.5, 0.0, 0.0), &Vector3::new(0.5, 0.0, 0.0));
    /// assert_eq!(d, Vector3::new(-1.0, 0.0, 0.0));
    /// ```
    pub fn get_mi_vector(&self, a: &Vector3<f64>, b: &Vector3<f64>) -> Vector3<f64> {
        let mut d = a - b;
        for axis in 0..3 {
            // open axis
            if self.length[axis].is_infinite() {
                continue;
            }
            let half = 0.5 * self.length[axis];
            d[axis] = fold(d[axis] + half, self.length[axis]) - half;
        }
        d
    }
}
