//! N-dimensional points and the coordinate contract.

use std::fmt;
use std::ops::{Add, Index, Mul, Sub};

use serde::de::{SeqAccess, Visitor};
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{TreeError, TreeResult};

/// Contract a coordinate type must satisfy.
///
/// The tree needs subtraction and multiplication for area and margin
/// arithmetic, ordering for sorts and comparisons, and a zero element
/// obtained from `Default`. Both integer and floating-point coordinates
/// qualify; the blanket implementation covers any type with the listed
/// bounds. Overflow of area computations is the caller's responsibility.
pub trait Coordinate:
    Copy
    + Default
    + PartialEq
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + fmt::Debug
    + fmt::Display
{
    /// Whether this value is the zero element of the coordinate type.
    fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

impl<T> Coordinate for T where
    T: Copy
        + Default
        + PartialEq
        + PartialOrd
        + Add<Output = T>
        + Sub<Output = T>
        + Mul<Output = T>
        + fmt::Debug
        + fmt::Display
{
}

/// A point in `D`-dimensional space.
///
/// Equality is componentwise. The default point has every coordinate equal
/// to the coordinate type's zero element.
///
/// # Examples
///
/// ```rust
/// use boxtree::Point;
///
/// let origin = Point::<i64, 2>::default();
/// let pt = Point::new([5, 6]);
/// assert_ne!(origin, pt);
/// assert_eq!(pt[1], 6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point<K, const D: usize> {
    coords: [K; D],
}

impl<K: Coordinate, const D: usize> Default for Point<K, D> {
    fn default() -> Self {
        Self {
            coords: [K::default(); D],
        }
    }
}

impl<K: Coordinate, const D: usize> Point<K, D> {
    /// Creates a point from exactly `D` coordinates.
    pub fn new(coords: [K; D]) -> Self {
        Self { coords }
    }

    /// Creates a point from a slice of coordinates.
    ///
    /// Fails with [`TreeError::DimensionMismatch`] unless the slice holds
    /// exactly `D` values.
    pub fn from_slice(coords: &[K]) -> TreeResult<Self> {
        if coords.len() != D {
            return Err(TreeError::DimensionMismatch {
                expected: D,
                actual: coords.len(),
            });
        }

        let mut out = [K::default(); D];
        out.copy_from_slice(coords);
        Ok(Self { coords: out })
    }

    /// The coordinate along dimension `dim`.
    #[inline]
    pub fn coord(&self, dim: usize) -> K {
        self.coords[dim]
    }

    /// Mutable access to the coordinate along dimension `dim`.
    #[inline]
    pub fn coord_mut(&mut self, dim: usize) -> &mut K {
        &mut self.coords[dim]
    }

    /// All coordinates as a slice.
    pub fn as_slice(&self) -> &[K] {
        &self.coords
    }
}

impl<K: Coordinate, const D: usize> From<[K; D]> for Point<K, D> {
    fn from(coords: [K; D]) -> Self {
        Self::new(coords)
    }
}

impl<K, const D: usize> Index<usize> for Point<K, D> {
    type Output = K;

    fn index(&self, dim: usize) -> &K {
        &self.coords[dim]
    }
}

impl<K: Coordinate, const D: usize> fmt::Display for Point<K, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.coords.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, ")")
    }
}

// serde support is hand-written because the derive cannot express a
// const-generic array field for deserialization. A point serializes as a
// fixed-length tuple of its coordinates.

impl<K: Coordinate + Serialize, const D: usize> Serialize for Point<K, D> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tup = serializer.serialize_tuple(D)?;
        for c in &self.coords {
            tup.serialize_element(c)?;
        }
        tup.end()
    }
}

impl<'de, K, const D: usize> Deserialize<'de> for Point<K, D>
where
    K: Coordinate + Deserialize<'de>,
{
    fn deserialize<Dz: Deserializer<'de>>(deserializer: Dz) -> Result<Self, Dz::Error> {
        struct PointVisitor<K, const D: usize> {
            marker: std::marker::PhantomData<K>,
        }

        impl<'de, K, const D: usize> Visitor<'de> for PointVisitor<K, D>
        where
            K: Coordinate + Deserialize<'de>,
        {
            type Value = Point<K, D>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a sequence of {} coordinates", D)
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut coords = [K::default(); D];
                for (i, slot) in coords.iter_mut().enumerate() {
                    *slot = seq
                        .next_element()?
                        .ok_or_else(|| serde::de::Error::invalid_length(i, &self))?;
                }
                Ok(Point { coords })
            }
        }

        deserializer.deserialize_tuple(
            D,
            PointVisitor {
                marker: std::marker::PhantomData,
            },
        )
    }
}
