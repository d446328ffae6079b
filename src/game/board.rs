//! Hexagonal board generation and tile classification

use serde::{Deserialize, Serialize};

use super::hex::Hex;

/// Default board radius (distance from center to edge)
pub const DEFAULT_BOARD_RADIUS: i32 = 4;

/// Tile classification.
///
/// Interior tiles are split into six 60° sectors, named after the colours the
/// client paints them with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Center,
    Base,
    /// [0°, 60°)
    SectorA,
    /// [60°, 120°)
    SectorB,
    /// [120°, 180°)
    SectorC,
    /// [180°, 240°)
    SectorD,
    /// [240°, 300°)
    SectorE,
    /// [300°, 360°)
    SectorF,
    /// Never produced by the generator
    Neutral,
}

impl TileKind {
    /// Sector for an angle in degrees, normalised to [0, 360)
    pub fn sector_for_angle(angle: f64) -> Self {
        if angle < 60.0 {
            Self::SectorA
        } else if angle < 120.0 {
            Self::SectorB
        } else if angle < 180.0 {
            Self::SectorC
        } else if angle < 240.0 {
            Self::SectorD
        } else if angle < 300.0 {
            Self::SectorE
        } else {
            Self::SectorF
        }
    }

    pub fn is_sector(&self) -> bool {
        !matches!(self, Self::Center | Self::Base | Self::Neutral)
    }
}

/// A single board tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub q: i32,
    pub r: i32,
    pub kind: TileKind,
}

impl Tile {
    pub fn hex(&self) -> Hex {
        Hex::new(self.q, self.r)
    }
}

/// Generated board: all tiles plus the ordered border tiles eligible as bases
#[derive(Debug, Clone)]
pub struct Board {
    radius: i32,
    tiles: Vec<Tile>,
    base_candidates: Vec<Hex>,
}

impl Board {
    /// Generate the full hexagonal region of the given radius.
    ///
    /// Tiles come out ordered by q, then r. Border tiles are recorded in
    /// `base_candidates` in that same order.
    pub fn generate(radius: i32) -> Self {
        let radius = radius.max(0);
        let mut tiles = Vec::with_capacity(tile_count(radius));
        let mut base_candidates = Vec::with_capacity(6 * radius as usize);

        for q in -radius..=radius {
            let r_min = (-radius).max(-q - radius);
            let r_max = radius.min(-q + radius);
            for r in r_min..=r_max {
                let hex = Hex::new(q, r);
                let kind = if q == 0 && r == 0 {
                    TileKind::Center
                } else if hex.ring_index() == radius {
                    base_candidates.push(hex);
                    TileKind::Base
                } else {
                    TileKind::sector_for_angle(angle_degrees(hex))
                };
                tiles.push(Tile { q, r, kind });
            }
        }

        Self {
            radius,
            tiles,
            base_candidates,
        }
    }

    pub fn radius(&self) -> i32 {
        self.radius
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn base_candidates(&self) -> &[Hex] {
        &self.base_candidates
    }

    pub fn contains(&self, hex: Hex) -> bool {
        hex.is_within(self.radius)
    }

    pub fn tile_at(&self, hex: Hex) -> Option<&Tile> {
        if !self.contains(hex) {
            return None;
        }
        self.tiles.iter().find(|t| t.q == hex.q && t.r == hex.r)
    }

    /// Every board hex at exactly `distance` from `from`
    pub fn hexes_at_distance(&self, from: Hex, distance: i32) -> Vec<Hex> {
        from.ring(distance)
            .into_iter()
            .filter(|h| self.contains(*h))
            .collect()
    }
}

/// Number of tiles on a board of the given radius: 3R² + 3R + 1
pub fn tile_count(radius: i32) -> usize {
    let r = radius.max(0) as usize;
    3 * r * r + 3 * r + 1
}

/// atan2(r, q) in degrees, normalised to [0, 360)
fn angle_degrees(hex: Hex) -> f64 {
    let angle = f64::from(hex.r).atan2(f64::from(hex.q)).to_degrees();
    (angle + 360.0) % 360.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_counts_for_several_radii() {
        for radius in 1..=7 {
            let board = Board::generate(radius);
            assert_eq!(board.tiles().len(), tile_count(radius));

            let centers = board.tiles().iter().filter(|t| t.kind == TileKind::Center).count();
            let bases = board.tiles().iter().filter(|t| t.kind == TileKind::Base).count();
            assert_eq!(centers, 1);
            assert_eq!(bases, 6 * radius as usize);
            assert_eq!(board.base_candidates().len(), bases);
        }
    }

    #[test]
    fn test_radius_four_board() {
        let board = Board::generate(4);
        assert_eq!(board.tiles().len(), 61);
        assert_eq!(board.base_candidates().len(), 24);
        assert_eq!(board.tiles()[0], Tile { q: -4, r: 0, kind: TileKind::Base });
        assert_eq!(board.base_candidates()[5], Hex::new(-3, -1));
        assert_eq!(board.base_candidates()[23], Hex::new(4, 0));
    }

    #[test]
    fn test_center_is_origin_and_bases_are_on_the_border() {
        let board = Board::generate(4);
        for tile in board.tiles() {
            match tile.kind {
                TileKind::Center => assert_eq!(tile.hex(), Hex::ORIGIN),
                TileKind::Base => assert_eq!(tile.hex().ring_index(), 4),
                _ => {
                    assert!(tile.kind.is_sector());
                    assert!(tile.hex().ring_index() < 4);
                }
            }
        }
    }

    #[test]
    fn test_sector_classification() {
        let board = Board::generate(4);
        let kind = |q, r| board.tile_at(Hex::new(q, r)).map(|t| t.kind);

        assert_eq!(kind(1, 0), Some(TileKind::SectorA)); // 0°
        assert_eq!(kind(0, 1), Some(TileKind::SectorB)); // 90°
        assert_eq!(kind(-1, 1), Some(TileKind::SectorC)); // 135°
        assert_eq!(kind(-1, 0), Some(TileKind::SectorD)); // 180°
        assert_eq!(kind(0, -1), Some(TileKind::SectorE)); // 270°
        assert_eq!(kind(1, -1), Some(TileKind::SectorF)); // 315°
        assert_eq!(kind(5, 0), None);
    }

    #[test]
    fn test_no_tile_is_neutral() {
        let board = Board::generate(5);
        assert!(board.tiles().iter().all(|t| t.kind != TileKind::Neutral));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = Board::generate(4);
        let b = Board::generate(4);
        assert_eq!(a.tiles(), b.tiles());
        assert_eq!(a.base_candidates(), b.base_candidates());
    }

    #[test]
    fn test_hexes_at_distance_are_clipped_to_the_board() {
        let board = Board::generate(4);
        // From the center every ring fits entirely
        assert_eq!(board.hexes_at_distance(Hex::ORIGIN, 3).len(), 18);
        // From a corner only a third of the ring is on the board
        let corner = Hex::new(4, -4);
        let reachable = board.hexes_at_distance(corner, 1);
        assert_eq!(reachable.len(), 3);
        assert!(reachable.iter().all(|h| board.contains(*h)));
    }
}
