//! Whole-word masking of a fixed profanity list.

/// Words replaced by [`MASK`], compared case-insensitively.
pub const PROFANE_WORDS: [&str; 3] = ["kerfuffle", "sharbert", "fornax"];

/// Replacement for a profane word.
pub const MASK: &str = "****";

/// Replace every profane word in `body` with [`MASK`].
///
/// Words are the pieces between single spaces, so punctuation attached to a
/// word ("fornax!") keeps it from matching. Spacing is preserved exactly.
pub fn mask_profanity(body: &str) -> String {
    body.split(' ')
        .map(|word| if is_profane(word) { MASK } else { word })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_profane(word: &str) -> bool {
    let lower = word.to_lowercase();
    PROFANE_WORDS.contains(&lower.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn masks_any_case() {
        assert_eq!(
            mask_profanity("I had a Kerfuffle with FORNAX and sharbert"),
            "I had a **** with **** and ****"
        );
    }

    #[test]
    fn whole_words_only() {
        assert_eq!(mask_profanity("fornaxes"), "fornaxes");
        assert_eq!(mask_profanity("fornax!"), "fornax!");
    }

    #[test]
    fn spacing_is_preserved() {
        assert_eq!(mask_profanity("  fornax  x "), "  ****  x ");
        assert_eq!(mask_profanity(""), "");
    }

    proptest! {
        #[test]
        fn clean_text_is_unchanged(body in "[a-z ]{0,140}") {
            prop_assume!(!body.split(' ').any(is_profane));
            prop_assert_eq!(mask_profanity(&body), body);
        }

        #[test]
        fn no_profane_word_survives(words in proptest::collection::vec(
            prop_oneof![
                Just("kerfuffle".to_string()),
                Just("SHARBERT".to_string()),
                Just("Fornax".to_string()),
                "[a-z]{1,8}",
            ],
            0..20,
        )) {
            let masked = mask_profanity(&words.join(" "));
            prop_assert!(!masked.split(' ').any(is_profane));
            prop_assert_eq!(masked.split(' ').count(), words.join(" ").split(' ').count());
        }
    }
}
