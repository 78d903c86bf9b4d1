//! Themed word lists plus the masking/hint-reveal helpers the drawing
//! phase uses to build `maskedWord`.

use rand::seq::SliceRandom;
use rand::Rng;

/// A themed catalogue of words available to offer a drawer.
#[derive(Debug, Clone)]
pub struct WordCatalogue {
    themes: Vec<(&'static str, &'static [&'static str])>,
}

const GENERAL: &[&str] = &[
    "chat", "chien", "soleil", "maison", "voiture", "arbre", "fleur", "table", "fenetre", "porte",
    "ordinateur", "telephone", "montagne", "riviere", "nuage", "etoile", "lune", "plage", "foret",
    "gateau",
];
const ANIMALS: &[&str] = &[
    "elephant", "girafe", "lion", "tigre", "singe", "zebre", "pingouin", "dauphin", "requin",
    "papillon", "abeille", "araignee", "serpent", "tortue", "hibou", "renard", "ours", "loup",
    "kangourou", "chameau",
];
const FOOD: &[&str] = &[
    "pizza", "burger", "sushi", "pomme", "banane", "fraise", "chocolat", "fromage", "pain",
    "soupe", "salade", "pates", "riz", "glace", "croissant", "baguette", "crepe", "tarte",
    "biscuit", "miel",
];

impl Default for WordCatalogue {
    fn default() -> Self {
        Self {
            themes: vec![("general", GENERAL), ("animals", ANIMALS), ("food", FOOD)],
        }
    }
}

impl WordCatalogue {
    fn words_for(&self, theme: &str) -> &'static [&'static str] {
        self.themes
            .iter()
            .find(|(name, _)| *name == theme)
            .map(|(_, words)| *words)
            .unwrap_or(GENERAL)
    }

    /// Return `n` distinct random words from `theme`'s list. Falls back to
    /// the `general` theme for an unrecognised name. Panics only if `n`
    /// exceeds the theme's catalogue size, which cannot happen for the
    /// fixed `n = 3` the room engine uses.
    pub fn pick_distinct(&self, theme: &str, n: usize, rng: &mut impl Rng) -> Vec<String> {
        let words = self.words_for(theme);
        let mut pool: Vec<&str> = words.to_vec();
        pool.shuffle(rng);
        pool.into_iter().take(n).map(String::from).collect()
    }
}

/// Replace every letter of `word` with an underscore placeholder; any
/// other character (spaces, hyphens) is preserved as-is.
pub fn mask(word: &str) -> String {
    word.chars().map(|c| if c.is_alphabetic() { '_' } else { c }).collect()
}

/// Reveal one uniformly-random still-masked letter position of `masked`,
/// replacing it with the corresponding letter from `word`. Returns the
/// unchanged string if there is nothing left to reveal.
pub fn reveal_one(masked: &str, word: &str, rng: &mut impl Rng) -> String {
    let masked_chars: Vec<char> = masked.chars().collect();
    let word_chars: Vec<char> = word.chars().collect();

    let hidden: Vec<usize> = masked_chars
        .iter()
        .enumerate()
        .filter(|(_, c)| **c == '_')
        .map(|(i, _)| i)
        .collect();

    let Some(&pick) = hidden.choose(rng) else {
        return masked.to_string();
    };

    let mut out = masked_chars;
    out[pick] = word_chars[pick];
    out.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn pick_distinct_returns_n_unique_words() {
        let catalogue = WordCatalogue::default();
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let words = catalogue.pick_distinct("general", 3, &mut rng);
        assert_eq!(words.len(), 3);
        let unique: std::collections::HashSet<_> = words.iter().collect();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn unknown_theme_falls_back_to_general() {
        let catalogue = WordCatalogue::default();
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let words = catalogue.pick_distinct("does-not-exist", 3, &mut rng);
        assert_eq!(words.len(), 3);
        assert!(words.iter().all(|w| GENERAL.contains(&w.as_str())));
    }

    #[test]
    fn mask_preserves_length_and_non_letters() {
        assert_eq!(mask("chat"), "____");
        assert_eq!(mask("ice cream"), "___ _____");
    }

    #[test]
    fn reveal_one_replaces_exactly_one_hidden_letter() {
        let word = "chat";
        let masked = mask(word);
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let revealed = reveal_one(&masked, word, &mut rng);

        let newly_revealed =
            revealed.chars().zip(masked.chars()).filter(|(a, b)| a != b).count();
        assert_eq!(newly_revealed, 1);
        assert_eq!(revealed.len(), masked.len());
    }

    #[test]
    fn reveal_one_is_noop_when_fully_revealed() {
        let word = "chat";
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        assert_eq!(reveal_one(word, word, &mut rng), word);
    }
}
