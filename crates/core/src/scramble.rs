//! Letter scrambling for the jumble prompt.

use rand::Rng;
use rand::seq::SliceRandom;

/// Shuffles attempted before falling back to a deterministic swap.
pub const MAX_SHUFFLES: usize = 100;

/// Random permutation of `word`'s characters that differs from `word` when possible.
///
/// Words of zero or one character come back unchanged. If every shuffle
/// reproduces the input (only likely for very short words), the first two
/// characters are swapped instead. A word made of one repeated character has
/// no other permutation, so it is returned as is.
#[must_use]
pub fn scramble<R>(word: &str, rng: &mut R) -> String
where
    R: Rng + ?Sized,
{
    let mut letters: Vec<char> = word.chars().collect();
    if letters.len() <= 1 {
        return word.to_owned();
    }

    for _ in 0..MAX_SHUFFLES {
        letters.shuffle(rng);
        let candidate: String = letters.iter().collect();
        if candidate != word {
            return candidate;
        }
    }

    let mut letters: Vec<char> = word.chars().collect();
    letters.swap(0, 1);
    letters.into_iter().collect()
}
