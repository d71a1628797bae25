//! Axis-aligned bounds

use crate::vector::Vec3f;

/// Axis-aligned 3D box, stored as lower and upper corners
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct Box3f {
    pub lower: Vec3f,
    pub upper: Vec3f,
}

impl Box3f {
    /// Inverted box that contains nothing; extending it yields the first point
    pub const EMPTY: Self = Self {
        lower: Vec3f::splat(f32::INFINITY),
        upper: Vec3f::splat(f32::NEG_INFINITY),
    };

    #[inline]
    pub const fn new(lower: Vec3f, upper: Vec3f) -> Self {
        Self { lower, upper }
    }

    /// Build from six scalars laid out as `lower.xyz, upper.xyz`
    pub fn from_slice(values: &[f32]) -> Option<Self> {
        if values.len() != 6 {
            return None;
        }
        Some(Self::new(
            Vec3f::from_slice(&values[..3])?,
            Vec3f::from_slice(&values[3..])?,
        ))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.lower.all_le(self.upper)
    }

    /// Grow the box to contain `point`
    #[inline]
    pub fn extend(&mut self, point: Vec3f) {
        self.lower = self.lower.min(point);
        self.upper = self.upper.max(point);
    }

    #[inline]
    pub fn center(&self) -> Vec3f {
        (self.lower + self.upper) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vec3f {
        self.upper - self.lower
    }

    pub fn to_array(&self) -> [f32; 6] {
        let [lx, ly, lz] = self.lower.to_array();
        let [ux, uy, uz] = self.upper.to_array();
        [lx, ly, lz, ux, uy, uz]
    }
}

impl Default for Box3f {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_box_extends_to_point() {
        let mut b = Box3f::EMPTY;
        assert!(b.is_empty());
        b.extend(Vec3f::new(1.0, 2.0, 3.0));
        assert!(!b.is_empty());
        assert_eq!(b.lower, b.upper);
    }

    #[test]
    fn test_center_and_size() {
        let b = Box3f::new(Vec3f::new(-1.0, 0.0, 2.0), Vec3f::new(3.0, 4.0, 2.5));
        let c = b.center();
        assert_relative_eq!(c.x, 1.0);
        assert_relative_eq!(c.y, 2.0);
        assert_relative_eq!(c.z, 2.25);
        assert_eq!(b.size(), Vec3f::new(4.0, 4.0, 0.5));
    }

    #[test]
    fn test_from_slice() {
        let b = Box3f::from_slice(&[0.0, 0.0, 0.0, 1.0, 2.0, 3.0]).unwrap();
        assert_eq!(b.upper, Vec3f::new(1.0, 2.0, 3.0));
        assert!(Box3f::from_slice(&[0.0; 5]).is_none());
    }
}
