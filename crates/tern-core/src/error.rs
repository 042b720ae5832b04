//! Errors for FEN and move-string parsing.

use thiserror::Error;

/// Reasons a FEN string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FenError {
    #[error("expected 4 to 6 FEN fields, found {0}")]
    FieldCount(usize),
    #[error("expected 8 ranks in piece placement, found {0}")]
    RankCount(usize),
    #[error("rank {rank} describes {squares} squares, expected 8")]
    RankLength { rank: usize, squares: usize },
    #[error("invalid piece character '{0}'")]
    PieceChar(char),
    #[error("invalid side to move \"{0}\"")]
    SideToMove(String),
    #[error("invalid castling field \"{0}\"")]
    Castling(String),
    #[error("invalid en passant square \"{0}\"")]
    EnPassant(String),
    #[error("invalid {field} \"{value}\"")]
    Counter { field: &'static str, value: String },
    #[error("{color} must have exactly one king, found {count}")]
    KingCount { color: &'static str, count: u32 },
    #[error("pawns on the first or eighth rank")]
    PawnsOnBackRank,
    #[error("the side not to move is in check")]
    OpponentInCheck,
}

/// Reasons a long-algebraic move string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveParseError {
    #[error("malformed move \"{0}\"")]
    Syntax(String),
    #[error("illegal move \"{0}\" in this position")]
    Illegal(String),
}

#[cfg(test)]
mod tests {
    use super::{FenError, MoveParseError};

    #[test]
    fn messages() {
        assert_eq!(
            FenError::FieldCount(2).to_string(),
            "expected 4 to 6 FEN fields, found 2"
        );
        assert_eq!(
            FenError::KingCount { color: "black", count: 0 }.to_string(),
            "black must have exactly one king, found 0"
        );
        assert_eq!(
            MoveParseError::Illegal("e2e5".into()).to_string(),
            "illegal move \"e2e5\" in this position"
        );
    }
}
