//! Zobrist keys, generated at compile time.

use crate::castle_rights::CastleRights;
use crate::color::Color;
use crate::piece::Piece;
use crate::square::Square;

pub(crate) struct Keys {
    pub pieces: [[u64; 64]; 12],
    pub side: u64,
    pub castling: [u64; 16],
    pub en_passant: [u64; 8],
}

/// splitmix64 step on a counter, so every key is an independent function of its slot.
const fn splitmix(index: u64) -> u64 {
    let mut z = 0x7e51_3a9c_04d2_66b1u64.wrapping_add(index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

pub(crate) static KEYS: Keys = {
    let mut counter = 0u64;

    let mut pieces = [[0u64; 64]; 12];
    let mut p = 0;
    while p < 12 {
        let mut sq = 0;
        while sq < 64 {
            pieces[p][sq] = splitmix(counter);
            counter += 1;
            sq += 1;
        }
        p += 1;
    }

    let side = splitmix(counter);
    counter += 1;

    let mut castling = [0u64; 16];
    // Rights are hashed as the XOR of one key per right held.
    let mut single = [0u64; 4];
    let mut i = 0;
    while i < 4 {
        single[i] = splitmix(counter);
        counter += 1;
        i += 1;
    }
    let mut bits = 0;
    while bits < 16 {
        let mut key = 0;
        let mut i = 0;
        while i < 4 {
            if bits & (1 << i) != 0 {
                key ^= single[i];
            }
            i += 1;
        }
        castling[bits] = key;
        bits += 1;
    }

    let mut en_passant = [0u64; 8];
    let mut file = 0;
    while file < 8 {
        en_passant[file] = splitmix(counter);
        counter += 1;
        file += 1;
    }

    Keys { pieces, side, castling, en_passant }
};

#[inline]
pub(crate) fn piece(piece: Piece, sq: Square) -> u64 {
    KEYS.pieces[piece.index()][sq.index()]
}

#[inline]
pub(crate) fn castling(rights: CastleRights) -> u64 {
    KEYS.castling[rights.bits() as usize]
}

#[inline]
pub(crate) fn en_passant(sq: Option<Square>) -> u64 {
    match sq {
        Some(sq) => KEYS.en_passant[sq.file() as usize],
        None => 0,
    }
}

#[inline]
pub(crate) fn side(color: Color) -> u64 {
    match color {
        Color::White => 0,
        Color::Black => KEYS.side,
    }
}
