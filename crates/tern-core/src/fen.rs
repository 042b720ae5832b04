//! FEN parsing and serialization.

use std::fmt::Write as _;
use std::str::FromStr;

use tracing::warn;

use crate::attacks::pawn_attacks;
use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::castle_rights::{CastleRights, CastleSide};
use crate::color::Color;
use crate::error::FenError;
use crate::piece::Piece;
use crate::piece_kind::PieceKind;
use crate::square::Square;

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

fn parse_placement(board: &mut Board, placement: &str) -> Result<(), FenError> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::RankCount(ranks.len()));
    }

    for (row, text) in ranks.iter().enumerate() {
        let rank = 7 - row as u8;
        let mut file = 0usize;
        for c in text.chars() {
            if let Some(skip) = c.to_digit(10).filter(|d| (1..=8).contains(d)) {
                file += skip as usize;
                continue;
            }
            let piece = Piece::from_fen_char(c).ok_or(FenError::PieceChar(c))?;
            if file >= 8 {
                return Err(FenError::RankLength { rank: rank as usize + 1, squares: file + 1 });
            }
            board.put_piece(piece, Square::from_coords(file as u8, rank));
            file += 1;
        }
        if file != 8 {
            return Err(FenError::RankLength { rank: rank as usize + 1, squares: file });
        }
    }
    Ok(())
}

fn validate_material(board: &Board) -> Result<(), FenError> {
    for (color, name) in [(Color::White, "white"), (Color::Black, "black")] {
        let count = board.colored(color, PieceKind::King).count();
        if count != 1 {
            return Err(FenError::KingCount { color: name, count });
        }
    }
    let back_ranks = Bitboard::RANK_1 | Bitboard::RANK_8;
    if (board.pieces(PieceKind::Pawn) & back_ranks).is_nonempty() {
        return Err(FenError::PawnsOnBackRank);
    }
    Ok(())
}

/// Drop castling rights whose king or rook is not on its home square.
fn sanitize_castling(board: &Board, rights: CastleRights) -> CastleRights {
    let mut kept = rights;
    for color in Color::BOTH {
        let rank = color.back_rank();
        let king_home = board.piece_on(Square::from_coords(4, rank))
            == Some(Piece::new(color, PieceKind::King));
        for (side, rook_file) in [(CastleSide::King, 7), (CastleSide::Queen, 0)] {
            if !rights.has(color, side) {
                continue;
            }
            let rook_home = board.piece_on(Square::from_coords(rook_file, rank))
                == Some(Piece::new(color, PieceKind::Rook));
            if !(king_home && rook_home) {
                warn!(%color, ?side, "dropping castling right without king and rook in place");
                kept.revoke(color, side);
            }
        }
    }
    kept
}

fn parse_en_passant(board: &Board, field: &str) -> Result<Option<Square>, FenError> {
    if field == "-" {
        return Ok(None);
    }
    let invalid = || FenError::EnPassant(field.to_string());
    let sq = Square::from_algebraic(field).ok_or_else(invalid)?;
    let us = board.side_to_move();
    // The target sits behind a pawn that just double-pushed.
    let expected_rank = (!us).pawn_start_rank() as i8 + (!us).forward();
    if sq.rank() as i8 != expected_rank {
        return Err(invalid());
    }
    // Only keep targets a pawn can capture on, matching what make_move records.
    let capturable = (pawn_attacks(!us, sq) & board.colored(us, PieceKind::Pawn)).is_nonempty();
    Ok(capturable.then_some(sq))
}

fn parse_counter(field: &'static str, value: Option<&&str>, default: u16) -> Result<u16, FenError> {
    match value {
        None => Ok(default),
        Some(text) => text.parse().map_err(|_| FenError::Counter {
            field,
            value: text.to_string(),
        }),
    }
}

/// Parses a FEN record. The move counters may be omitted and default to `0 1`.
impl FromStr for Board {
    type Err = FenError;

    fn from_str(fen: &str) -> Result<Board, FenError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if !(4..=6).contains(&fields.len()) {
            return Err(FenError::FieldCount(fields.len()));
        }

        let mut board = Board::empty();
        parse_placement(&mut board, fields[0])?;
        validate_material(&board)?;

        board.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(FenError::SideToMove(other.to_string())),
        };

        let rights = CastleRights::from_fen(fields[2])
            .ok_or_else(|| FenError::Castling(fields[2].to_string()))?;
        board.castling = sanitize_castling(&board, rights);
        board.en_passant = parse_en_passant(&board, fields[3])?;
        board.halfmove_clock = parse_counter("halfmove clock", fields.get(4), 0)?;
        board.fullmove_number = parse_counter("fullmove number", fields.get(5), 1)?.max(1);

        let them = !board.side_to_move;
        if board.is_attacked(board.king_square(them), board.side_to_move) {
            return Err(FenError::OpponentInCheck);
        }

        board.hash = board.compute_hash();
        Ok(board)
    }
}

impl Board {
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(90);
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                match self.piece_on(Square::from_coords(file, rank)) {
                    Some(piece) => {
                        if empty > 0 {
                            let _ = write!(fen, "{empty}");
                            empty = 0;
                        }
                        fen.push(piece.fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                let _ = write!(fen, "{empty}");
            }
            if rank > 0 {
                fen.push('/');
            }
        }
        let en_passant = self.en_passant.map_or_else(|| "-".to_string(), |sq| sq.to_string());
        let _ = write!(
            fen,
            " {} {} {} {} {}",
            self.side_to_move, self.castling, en_passant, self.halfmove_clock, self.fullmove_number
        );
        fen
    }
}
