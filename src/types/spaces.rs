//! Kinematic vector spaces and typed vectors
//!
//! Positions, velocities and displacements are distinct types so that a
//! velocity can never be added to a position without first being scaled by a
//! time interval.

use ::core::marker::PhantomData;
use ::core::ops::{Add, Index, Mul, Neg, Sub};
use nalgebra::SVector;

// ============================================================================
// Vector Space Markers
// ============================================================================

/// Marker for absolute positions (field coordinates, metres).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionSpace;

/// Marker for velocities (metres per second).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VelocitySpace;

/// Marker for displacements between two positions (metres).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplacementSpace;

// ============================================================================
// Typed Vector
// ============================================================================

/// A vector parameterized by dimension and kinematic space.
///
/// The `Space` parameter keeps positions, velocities and displacements from
/// being mixed by accident.
#[repr(transparent)]
#[derive(Debug, PartialEq)]
pub struct Vector<const N: usize, Space> {
    inner: SVector<f64, N>,
    _marker: PhantomData<Space>,
}

impl<const N: usize, Space> Clone for Vector<N, Space> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<const N: usize, Space> Copy for Vector<N, Space> {}

impl<const N: usize, Space> Default for Vector<N, Space> {
    fn default() -> Self {
        Self::zeros()
    }
}

impl<const N: usize, Space> Vector<N, Space> {
    /// Creates a new vector from raw components.
    #[inline]
    pub fn from_array(data: [f64; N]) -> Self {
        Self {
            inner: SVector::from(data),
            _marker: PhantomData,
        }
    }

    /// Creates a new vector from an nalgebra SVector.
    #[inline]
    pub fn from_svector(inner: SVector<f64, N>) -> Self {
        Self {
            inner,
            _marker: PhantomData,
        }
    }

    /// Creates a zero vector.
    #[inline]
    pub fn zeros() -> Self {
        Self::from_svector(SVector::zeros())
    }

    /// Returns a reference to the underlying nalgebra vector.
    #[inline]
    pub fn as_svector(&self) -> &SVector<f64, N> {
        &self.inner
    }

    /// Returns the raw components.
    #[inline]
    pub fn to_array(&self) -> [f64; N] {
        let mut out = [0.0; N];
        out.copy_from_slice(self.inner.as_slice());
        out
    }

    /// Returns the raw components as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        self.inner.as_slice()
    }

    /// Euclidean norm.
    #[inline]
    pub fn norm(&self) -> f64 {
        self.inner.norm()
    }

    /// Scales the vector by a scalar.
    #[inline]
    pub fn scale(&self, s: f64) -> Self {
        Self::from_svector(self.inner.scale(s))
    }

    /// True if every component is finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.inner.iter().all(|v| v.is_finite())
    }
}

impl<const N: usize, Space> Index<usize> for Vector<N, Space> {
    type Output = f64;

    #[inline]
    fn index(&self, index: usize) -> &f64 {
        &self.inner[index]
    }
}

// ============================================================================
// Type Aliases
// ============================================================================

/// An absolute position.
pub type Position<const N: usize> = Vector<N, PositionSpace>;

/// A velocity.
pub type Velocity<const N: usize> = Vector<N, VelocitySpace>;

/// The difference between two positions.
pub type Displacement<const N: usize> = Vector<N, DisplacementSpace>;

// ============================================================================
// Operations
// ============================================================================

impl<const N: usize> Add for Displacement<N> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::from_svector(self.inner + rhs.inner)
    }
}

impl<const N: usize> Add for Velocity<N> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::from_svector(self.inner + rhs.inner)
    }
}

impl<const N: usize, Space> Neg for Vector<N, Space> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self::from_svector(-self.inner)
    }
}

impl<const N: usize, Space> Mul<f64> for Vector<N, Space> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self::from_svector(self.inner * rhs)
    }
}

/// Position - Position = Displacement
impl<const N: usize> Sub for Position<N> {
    type Output = Displacement<N>;

    #[inline]
    fn sub(self, rhs: Self) -> Displacement<N> {
        Displacement::from_svector(self.inner - rhs.inner)
    }
}

/// Position + Displacement = Position
impl<const N: usize> Add<Displacement<N>> for Position<N> {
    type Output = Position<N>;

    #[inline]
    fn add(self, rhs: Displacement<N>) -> Position<N> {
        Position::from_svector(self.inner + rhs.inner)
    }
}

impl<const N: usize> Velocity<N> {
    /// Displacement covered over `dt` seconds.
    #[inline]
    pub fn over(&self, dt: f64) -> Displacement<N> {
        Displacement::from_svector(self.inner * dt)
    }
}

impl<const N: usize> Displacement<N> {
    /// Average velocity of a displacement covered in `dt` seconds.
    #[inline]
    pub fn per(&self, dt: f64) -> Velocity<N> {
        Velocity::from_svector(self.inner / dt)
    }
}

impl<const N: usize> Position<N> {
    /// Position after moving with constant `velocity` for `dt` seconds.
    #[inline]
    pub fn advanced(&self, velocity: &Velocity<N>, dt: f64) -> Self {
        *self + velocity.over(dt)
    }

    /// Position pulled back onto the disc of `radius` around `center`.
    pub fn clipped_to(&self, center: &Position<N>, radius: f64) -> Self {
        let offset = *self - *center;
        let distance = offset.norm();
        if distance <= radius || distance == 0.0 {
            *self
        } else {
            *center + offset.scale(radius / distance)
        }
    }

    /// The position with its first two (ground-plane) components kept.
    pub fn ground(&self) -> Position<2> {
        let x = if N > 0 { self.inner[0] } else { 0.0 };
        let y = if N > 1 { self.inner[1] } else { 0.0 };
        Position::from_array([x, y])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_difference_is_displacement() {
        let a: Position<2> = Position::from_array([10.0, 20.0]);
        let b: Position<2> = Position::from_array([9.5, 19.0]);

        let d = a - b;
        assert!((d[0] - 0.5).abs() < 1e-10);
        assert!((d[1] - 1.0).abs() < 1e-10);
        assert_eq!(b + d, a);
    }

    #[test]
    fn test_constant_velocity_advance() {
        let p: Position<2> = Position::from_array([10.0, 0.0]);
        let v: Velocity<2> = Velocity::from_array([2.0, 0.0]);

        let moved = p.advanced(&v, 0.5);
        assert!((moved[0] - 11.0).abs() < 1e-12);
        assert!(moved[1].abs() < 1e-12);
    }

    #[test]
    fn test_clip_to_radius() {
        let own: Position<2> = Position::from_array([1.0, 1.0]);
        let far: Position<2> = Position::from_array([1.0, 11.0]);

        let clipped = far.clipped_to(&own, 4.0);
        assert!((clipped[0] - 1.0).abs() < 1e-12);
        assert!((clipped[1] - 5.0).abs() < 1e-12);

        let near: Position<2> = Position::from_array([2.0, 2.0]);
        assert_eq!(near.clipped_to(&own, 4.0), near);
    }

    #[test]
    fn test_ground_projection() {
        let p: Position<3> = Position::from_array([1.0, 2.0, 0.3]);
        assert_eq!(p.ground(), Position::from_array([1.0, 2.0]));
    }
}
