//! Attack tables built by `const` evaluation.

use crate::bitboard::Bitboard;

const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (1, 2), (2, 1), (2, -1), (1, -2),
    (-1, -2), (-2, -1), (-2, 1), (-1, 2),
];

const KING_DELTAS: [(i8, i8); 8] = [
    (0, 1), (1, 1), (1, 0), (1, -1),
    (0, -1), (-1, -1), (-1, 0), (-1, 1),
];

/// Ray directions as (file, rank) steps. The first four increase the square
/// index, the last four decrease it.
pub(super) const DIRECTIONS: [(i8, i8); 8] = [
    (0, 1),   // N
    (1, 1),   // NE
    (1, 0),   // E
    (-1, 1),  // NW
    (0, -1),  // S
    (-1, -1), // SW
    (-1, 0),  // W
    (1, -1),  // SE
];

pub(super) const NORTH: usize = 0;
pub(super) const NORTH_EAST: usize = 1;
pub(super) const EAST: usize = 2;
pub(super) const NORTH_WEST: usize = 3;
pub(super) const SOUTH: usize = 4;
pub(super) const SOUTH_WEST: usize = 5;
pub(super) const WEST: usize = 6;
pub(super) const SOUTH_EAST: usize = 7;

const fn on_board(file: i8, rank: i8) -> bool {
    file >= 0 && file < 8 && rank >= 0 && rank < 8
}

const fn leaper_table(deltas: &[(i8, i8)]) -> [Bitboard; 64] {
    let mut table = [Bitboard::EMPTY; 64];
    let mut sq = 0;
    while sq < 64 {
        let file = (sq % 8) as i8;
        let rank = (sq / 8) as i8;
        let mut bits = 0u64;
        let mut i = 0;
        while i < deltas.len() {
            let (df, dr) = deltas[i];
            if on_board(file + df, rank + dr) {
                bits |= 1 << ((rank + dr) * 8 + file + df);
            }
            i += 1;
        }
        table[sq] = Bitboard::new(bits);
        sq += 1;
    }
    table
}

pub(super) const KNIGHT_ATTACKS: [Bitboard; 64] = leaper_table(&KNIGHT_DELTAS);
pub(super) const KING_ATTACKS: [Bitboard; 64] = leaper_table(&KING_DELTAS);

/// Indexed by color (white first), then square.
pub(super) const PAWN_ATTACKS: [[Bitboard; 64]; 2] = [
    leaper_table(&[(-1, 1), (1, 1)]),
    leaper_table(&[(-1, -1), (1, -1)]),
];

/// Squares reachable from each square along each direction on an empty board.
pub(super) const RAYS: [[Bitboard; 64]; 8] = {
    let mut rays = [[Bitboard::EMPTY; 64]; 8];
    let mut dir = 0;
    while dir < 8 {
        let (df, dr) = DIRECTIONS[dir];
        let mut sq = 0;
        while sq < 64 {
            let mut file = (sq % 8) as i8 + df;
            let mut rank = (sq / 8) as i8 + dr;
            let mut bits = 0u64;
            while on_board(file, rank) {
                bits |= 1 << (rank * 8 + file);
                file += df;
                rank += dr;
            }
            rays[dir][sq] = Bitboard::new(bits);
            sq += 1;
        }
        dir += 1;
    }
    rays
};
