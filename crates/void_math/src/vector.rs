//! Small fixed-size vectors used as scene-graph parameter payloads
//!
//! Float (`Vec2f`, `Vec3f`, `Vec4f`) and integer (`Vec2i`, `Vec3i`, `Vec4i`)
//! flavours share one definition so that every type exposes the same API.

use core::fmt;
use core::ops::{Add, Mul, Neg, Sub};

macro_rules! vector_type {
    ($(#[$meta:meta])* $name:ident, $scalar:ty, $len:literal, $($field:ident),+) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq)]
        #[repr(C)]
        pub struct $name {
            $(pub $field: $scalar,)+
        }

        impl $name {
            /// Number of components
            pub const LEN: usize = $len;

            #[inline]
            pub const fn new($($field: $scalar),+) -> Self {
                Self { $($field),+ }
            }

            #[inline]
            pub const fn splat(v: $scalar) -> Self {
                Self { $($field: v),+ }
            }

            #[inline]
            pub const fn to_array(self) -> [$scalar; $len] {
                [$(self.$field),+]
            }

            /// Build from a slice, `None` unless the slice has exactly `LEN` items
            pub fn from_slice(values: &[$scalar]) -> Option<Self> {
                let array: [$scalar; $len] = values.try_into().ok()?;
                Some(Self::from(array))
            }

            /// True when every component of `self` is `<=` the matching one in `other`
            #[inline]
            pub fn all_le(self, other: Self) -> bool {
                true $(&& self.$field <= other.$field)+
            }

            #[inline]
            pub fn min(self, other: Self) -> Self {
                Self { $($field: if other.$field < self.$field { other.$field } else { self.$field }),+ }
            }

            #[inline]
            pub fn max(self, other: Self) -> Self {
                Self { $($field: if other.$field > self.$field { other.$field } else { self.$field }),+ }
            }
        }

        impl From<[$scalar; $len]> for $name {
            #[inline]
            fn from(a: [$scalar; $len]) -> Self {
                let [$($field),+] = a;
                Self { $($field),+ }
            }
        }

        impl From<$name> for [$scalar; $len] {
            #[inline]
            fn from(v: $name) -> Self {
                v.to_array()
            }
        }

        impl Add for $name {
            type Output = Self;
            #[inline] fn add(self, rhs: Self) -> Self { Self { $($field: self.$field + rhs.$field),+ } }
        }

        impl Sub for $name {
            type Output = Self;
            #[inline] fn sub(self, rhs: Self) -> Self { Self { $($field: self.$field - rhs.$field),+ } }
        }

        impl Mul<$scalar> for $name {
            type Output = Self;
            #[inline] fn mul(self, rhs: $scalar) -> Self { Self { $($field: self.$field * rhs),+ } }
        }

        impl Neg for $name {
            type Output = Self;
            #[inline] fn neg(self) -> Self { Self { $($field: -self.$field),+ } }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let parts = [$(self.$field.to_string()),+];
                write!(f, "({})", parts.join(", "))
            }
        }
    };
}

vector_type!(
    /// 2D float vector
    Vec2f, f32, 2, x, y
);
vector_type!(
    /// 3D float vector
    Vec3f, f32, 3, x, y, z
);
vector_type!(
    /// 4D float vector (homogeneous coordinates, colors)
    Vec4f, f32, 4, x, y, z, w
);
vector_type!(
    /// 2D integer vector (image sizes, pixel coordinates)
    Vec2i, i32, 2, x, y
);
vector_type!(
    /// 3D integer vector
    Vec3i, i32, 3, x, y, z
);
vector_type!(
    /// 4D integer vector
    Vec4i, i32, 4, x, y, z, w
);

impl Vec3f {
    pub const ZERO: Self = Self::splat(0.0);
    pub const ONE: Self = Self::splat(1.0);
}

impl Vec2i {
    /// Number of elements in a `x * y` grid, zero for negative extents.
    ///
    /// `None` when the count does not fit in `usize`.
    #[inline]
    pub fn area(self) -> Option<usize> {
        if self.x <= 0 || self.y <= 0 {
            return Some(0);
        }
        (self.x as usize).checked_mul(self.y as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3f_arithmetic() {
        let a = Vec3f::new(1.0, 2.0, 3.0);
        let b = Vec3f::new(4.0, 5.0, 6.0);
        assert_eq!(a + b, Vec3f::new(5.0, 7.0, 9.0));
        assert_eq!(b - a, Vec3f::splat(3.0));
        assert_eq!(a * 2.0, Vec3f::new(2.0, 4.0, 6.0));
    }

    #[test]
    fn test_from_slice_checks_length() {
        assert_eq!(Vec2i::from_slice(&[1, 2]), Some(Vec2i::new(1, 2)));
        assert_eq!(Vec2i::from_slice(&[1, 2, 3]), None);
        assert_eq!(Vec4f::from_slice(&[]), None);
    }

    #[test]
    fn test_all_le_is_componentwise() {
        let lo = Vec3i::new(0, 0, 0);
        let hi = Vec3i::new(10, 10, 10);
        assert!(lo.all_le(hi));
        assert!(!Vec3i::new(0, 11, 0).all_le(hi));
    }

    #[test]
    fn test_display() {
        assert_eq!(Vec2i::new(3, -4).to_string(), "(3, -4)");
        assert_eq!(Vec3f::new(1.0, 0.5, 2.0).to_string(), "(1, 0.5, 2)");
    }

    #[test]
    fn test_area() {
        assert_eq!(Vec2i::new(4, 3).area(), Some(12));
        assert_eq!(Vec2i::new(-1, 3).area(), Some(0));
    }
}
