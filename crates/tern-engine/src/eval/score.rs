//! Middlegame/endgame score pair.

use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use super::phase::MAX_PHASE;

/// Separate middlegame and endgame values, blended by game phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Score {
    pub mg: i32,
    pub eg: i32,
}

impl Score {
    pub const ZERO: Score = Score { mg: 0, eg: 0 };

    /// Interpolate between the endgame (`phase = 0`) and middlegame
    /// (`phase = MAX_PHASE`) values.
    #[inline]
    pub fn taper(self, phase: i32) -> i32 {
        let phase = phase.clamp(0, MAX_PHASE);
        (self.mg * phase + self.eg * (MAX_PHASE - phase)) / MAX_PHASE
    }
}

/// `S(mg, eg)`, the usual shorthand for score table literals.
#[allow(non_snake_case)]
#[inline]
pub const fn S(mg: i32, eg: i32) -> Score {
    Score { mg, eg }
}

impl Add for Score {
    type Output = Score;

    #[inline]
    fn add(self, rhs: Score) -> Score {
        S(self.mg + rhs.mg, self.eg + rhs.eg)
    }
}

impl Sub for Score {
    type Output = Score;

    #[inline]
    fn sub(self, rhs: Score) -> Score {
        S(self.mg - rhs.mg, self.eg - rhs.eg)
    }
}

impl Neg for Score {
    type Output = Score;

    #[inline]
    fn neg(self) -> Score {
        S(-self.mg, -self.eg)
    }
}

impl AddAssign for Score {
    #[inline]
    fn add_assign(&mut self, rhs: Score) {
        *self = *self + rhs;
    }
}

impl SubAssign for Score {
    #[inline]
    fn sub_assign(&mut self, rhs: Score) {
        *self = *self - rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::{S, Score};
    use crate::eval::phase::MAX_PHASE;

    #[test]
    fn taper_endpoints() {
        let s = S(100, -40);
        assert_eq!(s.taper(MAX_PHASE), 100);
        assert_eq!(s.taper(0), -40);
        assert_eq!(s.taper(MAX_PHASE / 2), 30);
    }

    #[test]
    fn arithmetic() {
        let mut s = S(10, 20) + S(1, 2) - S(5, 5);
        assert_eq!(s, S(6, 17));
        s -= S(6, 17);
        assert_eq!(s, Score::ZERO);
        assert_eq!(-S(3, -4), S(-3, 4));
    }
}
