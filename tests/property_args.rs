use proptest::prelude::*;

use mudscript::args::{split_arguments, split_first_word};

proptest! {
    // Unquoted input splits exactly like whitespace splitting.
    #[test]
    fn test_unquoted_arguments_match_whitespace_split(
        words in proptest::collection::vec("[a-zA-Z0-9_.%-]{1,8}", 0..8),
        sep in "[ \t]{1,3}",
    ) {
        let input = words.join(&sep);
        prop_assert_eq!(split_arguments(&input), words);
    }

    // A quoted word survives as one argument, spaces included.
    #[test]
    fn test_quoted_word_is_one_argument(
        head in "[a-z]{1,6}",
        quoted in proptest::collection::vec("[a-z]{1,6}", 1..4),
    ) {
        let phrase = quoted.join(" ");
        let input = format!("{head} \"{phrase}\"");
        prop_assert_eq!(split_arguments(&input), vec![head, phrase]);
    }

    #[test]
    fn test_first_word_plus_rest_rebuilds_line(
        first in "[a-z]{1,8}",
        rest in proptest::option::of("[a-z][a-z ]{0,12}[a-z]"),
    ) {
        let line = match &rest {
            Some(rest) => format!("  {first}   {rest}"),
            None => format!("{first}  "),
        };
        let (word, remainder) = split_first_word(&line);
        prop_assert_eq!(word, first.as_str());
        prop_assert_eq!(remainder, rest.as_deref());
    }
}

#[test]
fn test_split_arguments_examples() {
    assert_eq!(split_arguments("foo bar"), vec!["foo", "bar"]);
    assert!(split_arguments("   ").is_empty());
    assert_eq!(split_arguments("a \"\" b"), vec!["a", "", "b"]);
    assert_eq!(split_arguments("say \"unterminated here"), vec!["say", "unterminated here"]);
}
