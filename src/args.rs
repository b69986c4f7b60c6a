// src/args.rs

//! Splitting of command lines and script argument strings.

/// Split a command line into its first word and the raw remainder.
///
/// Leading whitespace is ignored; the remainder keeps its inner spacing but
/// loses the whitespace that separated it from the first word. Returns
/// `None` for the remainder when there is nothing after the first word.
pub fn split_first_word(line: &str) -> (&str, Option<&str>) {
    let line = line.trim_start();
    match line.find(char::is_whitespace) {
        Some(idx) => {
            let rest = line[idx..].trim_start();
            let rest = if rest.is_empty() { None } else { Some(rest) };
            (&line[..idx], rest)
        }
        None => (line, None),
    }
}

/// Split a script argument string into words.
///
/// Words are separated by whitespace. A double-quoted section is kept as part
/// of a single word with the quotes removed, so `say "hello there"` yields
/// `["say", "hello there"]`. An unterminated quote runs to the end of input.
pub fn split_arguments(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut in_quotes = false;

    for ch in input.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                in_word = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if in_word {
        words.push(current);
    }

    words
}
