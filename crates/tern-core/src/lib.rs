//! Board collaborator for the tern search: position state, make/undo,
//! pseudo-legal move generation and FEN.

mod attacks;
mod bitboard;
mod board;
mod castle_rights;
mod chess_move;
mod color;
mod error;
mod fen;
mod make_move;
mod movegen;
mod piece;
mod piece_kind;
mod square;
mod zobrist;

pub use attacks::{
    bishop_attacks, king_attacks, knight_attacks, pawn_attacks, queen_attacks, rook_attacks,
};
pub use bitboard::Bitboard;
pub use board::Board;
pub use castle_rights::{CastleRights, CastleSide};
pub use chess_move::{Move, MoveFlag};
pub use color::Color;
pub use error::{FenError, MoveParseError};
pub use fen::STARTING_FEN;
pub use movegen::{MoveSink, generate_noisy, generate_quiet, legal_moves};
pub use piece::Piece;
pub use piece_kind::PieceKind;
pub use square::Square;
