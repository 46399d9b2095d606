//! Integer Elo rating adjustment.
//!
//! Expected scores come from a fixed table so the update is reproducible
//! without floating point: `10000 / (1 + 10^(-d / 400))` in basis points,
//! sampled every [`TABLE_STEP`] rating points for `d` in `[0, MAX_DIFF]`.

/// Basis points representing a full score (a win).
pub const SCORE_SCALE: i64 = 10_000;

/// Rating differences beyond this are treated as this.
pub const MAX_DIFF: i64 = 800;

/// Rating points between two table entries.
pub const TABLE_STEP: i64 = 25;

const EXPECTED_SCORE_TABLE: [i64; 33] = [
    5000, 5359, 5715, 6063, 6401, 6725, 7034, 7325, 7597, 7850, 8083, 8296, 8490, 8666, 8823, 8965,
    9091, 9203, 9302, 9390, 9468, 9536, 9595, 9648, 9693, 9733, 9768, 9799, 9825, 9848, 9868, 9886,
    9901,
];

/// Expected score of a player `diff` rating points above the opponent, in basis points.
///
/// Negative differences mirror the table: `E(-d) = 10000 - E(d)`.
pub fn expected_score(diff: i64) -> i64 {
    let clamped = diff.clamp(-MAX_DIFF, MAX_DIFF);
    if clamped < 0 {
        return SCORE_SCALE - expected_score(-clamped);
    }

    let index = (clamped / TABLE_STEP) as usize;
    let remainder = clamped % TABLE_STEP;
    let low = EXPECTED_SCORE_TABLE[index];
    match EXPECTED_SCORE_TABLE.get(index + 1) {
        Some(high) => low + (high - low) * remainder / TABLE_STEP,
        None => low,
    }
}

/// Applies one battle result to both ratings.
///
/// `ka` and `kd` are the learning rates of the attacker and defender. Each new
/// rating is `r + k * (actual - expected) / 10000`, truncated toward zero and
/// saturated to `[0, u16::MAX]`.
pub fn adjust_ratings(ka: u16, kd: u16, rating_a: u16, rating_d: u16, did_a_win: bool) -> (u16, u16) {
    let expected_a = expected_score(i64::from(rating_a) - i64::from(rating_d));
    let expected_d = SCORE_SCALE - expected_a;
    let (actual_a, actual_d) = if did_a_win {
        (SCORE_SCALE, 0)
    } else {
        (0, SCORE_SCALE)
    };

    (
        updated(rating_a, ka, actual_a - expected_a),
        updated(rating_d, kd, actual_d - expected_d),
    )
}

fn updated(rating: u16, k: u16, surprise: i64) -> u16 {
    let delta = i64::from(k) * surprise / SCORE_SCALE;
    let next = (i64::from(rating) + delta).clamp(0, i64::from(u16::MAX));
    next as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_endpoints_and_interpolation() {
        assert_eq!(expected_score(0), 5000);
        assert_eq!(expected_score(25), 5359);
        assert_eq!(expected_score(800), 9901);
        assert_eq!(expected_score(5_000), 9901);
        // halfway between 5000 and 5359, truncated
        assert_eq!(expected_score(12), 5000 + 359 * 12 / 25);
        assert_eq!(expected_score(-25), 10_000 - 5359);
        assert_eq!(expected_score(-65_535), 99);
    }

    #[test]
    fn equal_ratings_move_by_half_k() {
        assert_eq!(adjust_ratings(32, 16, 1000, 1000, true), (1016, 992));
        assert_eq!(adjust_ratings(32, 16, 1000, 1000, false), (984, 1008));
    }

    #[test]
    fn favourite_gains_little_underdog_gains_much() {
        let (favourite, _) = adjust_ratings(32, 32, 1400, 1000, true);
        let (underdog, _) = adjust_ratings(32, 32, 1000, 1400, true);
        assert!(favourite - 1400 < underdog - 1000);
    }

    #[test]
    fn extreme_pairs_saturate() {
        assert_eq!(adjust_ratings(32, 16, 0, u16::MAX, false), (0, u16::MAX));
        assert_eq!(adjust_ratings(32, 16, 0, u16::MAX, true), (31, u16::MAX - 15));
        assert_eq!(
            adjust_ratings(u16::MAX, u16::MAX, u16::MAX, 0, true),
            (u16::MAX, 0)
        );
        assert_eq!(
            adjust_ratings(u16::MAX, u16::MAX, u16::MAX, u16::MAX, false),
            (u16::MAX - 32_767, u16::MAX)
        );
    }
}
