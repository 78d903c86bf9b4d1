//! Guess scoring: `points = 100 + timeBonus + orderBonus`, plus the
//! drawer's flat per-guesser bonus.

use super::rules::{BASE_GUESS_POINTS, DRAWER_BONUS_PER_GUESSER};

/// Points a correct guesser earns. `guessed_count_after` is the 1-based
/// arrival index among guessers of this turn, counted *after* the
/// current guesser has been inserted into `guessedPlayers`.
pub fn guesser_points(time_left: u32, draw_time: u32, guessed_count_after: u32) -> u32 {
    let time_bonus = ((time_left as f64 / draw_time as f64) * 100.0).floor() as u32;
    let order_bonus = 100u32.saturating_sub(guessed_count_after * 20);
    BASE_GUESS_POINTS + time_bonus + order_bonus
}

/// Flat bonus the drawer earns for one distinct correct guesser.
pub fn drawer_bonus() -> u32 {
    DRAWER_BONUS_PER_GUESSER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_s1_first_guesser() {
        // timeLeft=25, drawTime=30, first guesser (k=1).
        assert_eq!(guesser_points(25, 30, 1), 263);
    }

    #[test]
    fn order_bonus_floors_at_zero() {
        // k=6 guessers: 100 - 6*20 = -20, clamped to 0.
        assert_eq!(guesser_points(0, 80, 6), 100);
    }

    #[test]
    fn zero_time_left_gives_no_time_bonus() {
        assert_eq!(guesser_points(0, 80, 1), 180);
    }

    #[test]
    fn full_time_left_gives_full_time_bonus() {
        assert_eq!(guesser_points(80, 80, 1), 280);
    }

    #[test]
    fn drawer_bonus_is_flat() {
        assert_eq!(drawer_bonus(), 25);
    }
}
