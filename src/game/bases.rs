//! Deterministic home-base distribution across players

use serde::{Deserialize, Serialize};

use super::hex::Hex;
use super::PlayerIndex;

/// A player-owned border tile usable as a pawn entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Base {
    pub q: i32,
    pub r: i32,
    pub owner: PlayerIndex,
}

impl Base {
    pub fn hex(&self) -> Hex {
        Hex::new(self.q, self.r)
    }
}

/// Bases handed to each player for a given player count
pub fn bases_per_player(player_count: usize) -> usize {
    match player_count {
        2 => 3,
        3 => 2,
        _ => 1,
    }
}

/// Assign bases from the ordered border candidates.
///
/// Player `p`'s `i`-th base is candidate `(p * spacing + i * spacing) % M`
/// where `spacing = M / (players * bases_per_player)`. Adjacent players can
/// share candidates, and a zero spacing stacks every base on candidate 0;
/// both are accepted as-is.
pub fn distribute_bases(candidates: &[Hex], player_count: usize) -> Vec<Base> {
    let m = candidates.len();
    if m == 0 || player_count == 0 {
        return Vec::new();
    }

    let per_player = bases_per_player(player_count);
    let spacing = m / (player_count * per_player);

    let mut bases = Vec::with_capacity(player_count * per_player);
    for p in 0..player_count {
        for i in 0..per_player {
            let hex = candidates[(p * spacing + i * spacing) % m];
            bases.push(Base {
                q: hex.q,
                r: hex.r,
                owner: p as PlayerIndex,
            });
        }
    }
    bases
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::{Board, TileKind};

    #[test]
    fn test_bases_per_player() {
        assert_eq!(bases_per_player(2), 3);
        assert_eq!(bases_per_player(3), 2);
        assert_eq!(bases_per_player(4), 1);
        assert_eq!(bases_per_player(6), 1);
    }

    #[test]
    fn test_two_players_on_radius_four() {
        let board = Board::generate(4);
        let bases = distribute_bases(board.base_candidates(), 2);

        // spacing = 24 / 6 = 4
        let expected = [
            (-4, 0, 0),
            (-4, 4, 0),
            (-2, 4, 0),
            (-4, 4, 1),
            (-2, 4, 1),
            (0, 4, 1),
        ];
        assert_eq!(bases.len(), expected.len());
        for (base, (q, r, owner)) in bases.iter().zip(expected) {
            assert_eq!((base.q, base.r, base.owner), (q, r, owner));
        }
    }

    #[test]
    fn test_bases_are_border_tiles() {
        let board = Board::generate(4);
        for players in 2..=6 {
            let bases = distribute_bases(board.base_candidates(), players);
            assert_eq!(bases.len(), players * bases_per_player(players));
            for base in &bases {
                let tile = board.tile_at(base.hex()).expect("base on board");
                assert_eq!(tile.kind, TileKind::Base);
                assert!(board.base_candidates().contains(&base.hex()));
            }
        }
    }

    #[test]
    fn test_distribution_is_deterministic() {
        let board = Board::generate(4);
        for players in 2..=6 {
            assert_eq!(
                distribute_bases(board.base_candidates(), players),
                distribute_bases(board.base_candidates(), players)
            );
        }
    }

    #[test]
    fn test_zero_spacing_stacks_on_first_candidate() {
        let candidates = [Hex::new(1, 0), Hex::new(0, 1), Hex::new(-1, 1)];
        // 3 candidates, 2 players * 3 bases => spacing 0
        let bases = distribute_bases(&candidates, 2);
        assert_eq!(bases.len(), 6);
        assert!(bases.iter().all(|b| b.hex() == candidates[0]));
    }

    #[test]
    fn test_no_candidates_yields_no_bases() {
        assert!(distribute_bases(&[], 3).is_empty());
    }
}
