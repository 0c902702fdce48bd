//! Answer checking against a word and its accepted spellings.

use crate::model::WordEntry;

/// Case-insensitive exact match of `submitted` against every accepted spelling.
///
/// Accepted spellings are the word itself, its primary when `word` is an
/// alternate, and, when `word` is primary, each entry of `alternates` that
/// names it as primary. Anything else in `alternates` is ignored.
///
/// ```
/// # use bee_core::answer::is_correct;
/// # use bee_core::model::{NewWord, Tier, WordId, WordRole};
/// let color = NewWord::new("color", Tier::One, WordRole::Primary).assign_id(WordId::new(1));
/// let colour = NewWord::new("colour", Tier::One, WordRole::Alternate { primary: "color".into() })
///     .assign_id(WordId::new(2));
/// assert!(is_correct("Colour", &color, &[colour]));
/// assert!(!is_correct("culler", &color, &[]));
/// ```
#[must_use]
pub fn is_correct(submitted: &str, word: &WordEntry, alternates: &[WordEntry]) -> bool {
    accepted_spellings(word, alternates)
        .any(|spelling| spelling.to_lowercase() == submitted.to_lowercase())
}

/// Every spelling that counts as a correct answer for `word`.
pub fn accepted_spellings<'a>(
    word: &'a WordEntry,
    alternates: &'a [WordEntry],
) -> impl Iterator<Item = &'a str> + 'a {
    let primary = word.primary_word();
    let own_alternates = alternates
        .iter()
        .filter(move |alt| word.is_primary() && alt.primary_word() == Some(word.spelling.as_str()))
        .map(|alt| alt.spelling.as_str());

    std::iter::once(word.spelling.as_str())
        .chain(primary)
        .chain(own_alternates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewWord, Tier, WordId, WordRole};

    fn primary(id: u64, spelling: &str) -> WordEntry {
        NewWord::new(spelling, Tier::One, WordRole::Primary).assign_id(WordId::new(id))
    }

    fn alternate(id: u64, spelling: &str, of: &str) -> WordEntry {
        NewWord::new(
            spelling,
            Tier::One,
            WordRole::Alternate { primary: of.into() },
        )
        .assign_id(WordId::new(id))
    }

    #[test]
    fn matches_own_spelling_case_insensitively() {
        let cat = primary(1, "cat");
        assert!(is_correct("cat", &cat, &[]));
        assert!(is_correct("CAT", &cat, &[]));
        assert!(!is_correct("kat", &cat, &[]));
        assert!(!is_correct(" cat", &cat, &[]));
    }

    #[test]
    fn primary_accepts_registered_alternates() {
        let color = primary(1, "color");
        let alts = [alternate(2, "colour", "color"), alternate(3, "grey", "gray")];
        assert!(is_correct("colour", &color, &alts));
        assert!(!is_correct("grey", &color, &alts));
    }

    #[test]
    fn alternate_accepts_its_primary() {
        let colour = alternate(2, "colour", "color");
        assert!(is_correct("color", &colour, &[]));
        assert!(is_correct("colour", &colour, &[]));
    }

    #[test]
    fn alternate_does_not_inherit_sibling_alternates() {
        let theatre = alternate(2, "theatre", "theater");
        let sibling = [alternate(3, "theatr", "theater")];
        assert!(!is_correct("theatr", &theatre, &sibling));
    }

    #[test]
    fn stored_spelling_case_is_ignored() {
        let word = primary(1, "Tuesday");
        assert!(is_correct("tuesday", &word, &[]));
    }

    #[test]
    fn lists_accepted_spellings() {
        let color = primary(1, "color");
        let alts = [alternate(2, "colour", "color")];
        let spellings: Vec<&str> = accepted_spellings(&color, &alts).collect();
        assert_eq!(spellings, vec!["color", "colour"]);
    }
}
