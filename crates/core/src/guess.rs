//! Compares a chat line against the current word (§4.4 of the room
//! engine's guess arbitration policy).

/// Outcome of comparing a guess to the drawing's current word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    Correct,
    Close,
    Miss,
}

/// Evaluate `text` against `word`. Both are compared case-insensitively
/// after trimming; `text` is the raw chat line, `word` the secret word
/// currently in play.
pub fn evaluate(text: &str, word: &str) -> GuessOutcome {
    let g = text.trim().to_lowercase();
    let w = word.trim().to_lowercase();

    if g == w {
        return GuessOutcome::Correct;
    }

    if is_close(&g, &w) {
        GuessOutcome::Close
    } else {
        GuessOutcome::Miss
    }
}

/// Close iff (a) the length difference is at most 1 and the per-position
/// mismatch count over the shared prefix is at most 2, or (b) one string
/// contains the other and the guess is at least 3 characters long.
fn is_close(g: &str, w: &str) -> bool {
    let gc: Vec<char> = g.chars().collect();
    let wc: Vec<char> = w.chars().collect();

    let len_diff = (gc.len() as i64 - wc.len() as i64).abs();
    if len_diff <= 1 {
        let shared = gc.len().min(wc.len());
        let mismatches = (0..shared).filter(|&i| gc[i] != wc[i]).count();
        if mismatches <= 2 {
            return true;
        }
    }

    if gc.len() >= 3 && (w.contains(g) || g.contains(w)) {
        return true;
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_is_correct() {
        assert_eq!(evaluate("Chat", "chat"), GuessOutcome::Correct);
        assert_eq!(evaluate("  chat  ", "chat"), GuessOutcome::Correct);
    }

    #[test]
    fn one_off_edit_is_close() {
        // "pomme" vs "pome": length diff 1, single mismatch in shared prefix.
        assert_eq!(evaluate("pome", "pomme"), GuessOutcome::Close);
    }

    #[test]
    fn substring_containment_is_close_when_long_enough() {
        assert_eq!(evaluate("chien", "chie"), GuessOutcome::Close);
        assert_eq!(evaluate("ch", "chat"), GuessOutcome::Miss); // len < 3
    }

    #[test]
    fn unrelated_word_is_a_miss() {
        assert_eq!(evaluate("soleil", "chat"), GuessOutcome::Miss);
    }

    #[test]
    fn too_many_positional_mismatches_is_a_miss() {
        // Same length, but every character differs.
        assert_eq!(evaluate("wxyz", "abcd"), GuessOutcome::Miss);
    }
}
