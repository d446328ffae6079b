//! Axial hex coordinates and distance math

use serde::{Deserialize, Serialize};

/// Axial hex coordinates. The third cube coordinate is implicit: `s = -q - r`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hex {
    pub q: i32,
    pub r: i32,
}

/// Direction vectors in axial coordinates (dq, dr), walking clockwise
pub const DIRECTIONS: [(i32, i32); 6] = [(1, -1), (1, 0), (0, 1), (-1, 1), (-1, 0), (0, -1)];

impl Hex {
    pub const ORIGIN: Hex = Hex::new(0, 0);

    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Implicit third coordinate
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Distance from the origin, i.e. max(|q|, |r|, |s|)
    pub fn ring_index(&self) -> i32 {
        self.q.abs().max(self.r.abs()).max(self.s().abs())
    }

    /// Check if this hex lies on a hexagonal board of the given radius
    pub fn is_within(&self, radius: i32) -> bool {
        self.q.abs() <= radius && self.r.abs() <= radius && (self.q + self.r).abs() <= radius
    }

    /// Distance between two hexes
    pub fn distance_to(&self, other: Hex) -> i32 {
        let dq = self.q - other.q;
        let dr = self.r - other.r;
        (dq.abs() + dr.abs() + (dq + dr).abs()) / 2
    }

    /// Neighbor in direction (0-5)
    pub fn neighbor(&self, direction: usize) -> Hex {
        let (dq, dr) = DIRECTIONS[direction % 6];
        Hex::new(self.q + dq, self.r + dr)
    }

    /// All hexes at exactly `distance` from this one, unbounded by any board.
    ///
    /// Distance 0 yields the hex itself; otherwise the ring has `6 * distance`
    /// members.
    pub fn ring(&self, distance: i32) -> Vec<Hex> {
        if distance <= 0 {
            return vec![*self];
        }

        let mut hexes = Vec::with_capacity(6 * distance as usize);
        // Start at the hex `distance` steps in direction 4 and walk the six edges
        let (sq, sr) = DIRECTIONS[4];
        let mut cursor = Hex::new(self.q + sq * distance, self.r + sr * distance);
        for direction in 0..6 {
            for _ in 0..distance {
                hexes.push(cursor);
                cursor = cursor.neighbor(direction);
            }
        }
        hexes
    }
}

impl std::fmt::Display for Hex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hexes_within(radius: i32) -> Vec<Hex> {
        let mut out = Vec::new();
        for q in -radius..=radius {
            for r in -radius..=radius {
                let h = Hex::new(q, r);
                if h.is_within(radius) {
                    out.push(h);
                }
            }
        }
        out
    }

    #[test]
    fn test_hex_validity() {
        assert!(Hex::new(0, 0).is_within(4));
        assert!(Hex::new(4, 0).is_within(4));
        assert!(Hex::new(0, -4).is_within(4));
        assert!(!Hex::new(5, 0).is_within(4));
        assert!(!Hex::new(3, 3).is_within(4)); // s = -6
    }

    #[test]
    fn test_distance_basics() {
        assert_eq!(Hex::ORIGIN.distance_to(Hex::new(1, 0)), 1);
        assert_eq!(Hex::ORIGIN.distance_to(Hex::new(2, 2)), 4);
        assert_eq!(Hex::new(-2, 4).distance_to(Hex::new(1, 2)), 3);
        assert_eq!(Hex::new(-4, 0).distance_to(Hex::new(4, -4)), 8);
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        for h in hexes_within(3) {
            assert_eq!(h.distance_to(h), 0);
        }
    }

    #[test]
    fn test_distance_is_symmetric_and_satisfies_triangle_inequality() {
        let hexes = hexes_within(2);
        for &a in &hexes {
            for &b in &hexes {
                assert_eq!(a.distance_to(b), b.distance_to(a));
                for &c in &hexes {
                    assert!(a.distance_to(c) <= a.distance_to(b) + b.distance_to(c));
                }
            }
        }
    }

    #[test]
    fn test_ring_members_are_at_exact_distance() {
        let center = Hex::new(1, -2);
        for d in 1..=6 {
            let ring = center.ring(d);
            assert_eq!(ring.len(), 6 * d as usize);
            assert!(ring.iter().all(|h| center.distance_to(*h) == d));
            let unique: std::collections::HashSet<_> = ring.iter().collect();
            assert_eq!(unique.len(), ring.len());
        }
        assert_eq!(center.ring(0), vec![center]);
    }

    #[test]
    fn test_ring_index_matches_distance_to_origin() {
        for h in hexes_within(4) {
            assert_eq!(h.ring_index(), h.distance_to(Hex::ORIGIN));
        }
    }
}
