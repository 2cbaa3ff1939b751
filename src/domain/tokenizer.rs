//! Quote-aware command line splitting.
//!
//! Tokens are separated by unquoted ASCII spaces. A double-quoted span is kept
//! verbatim, and inside it `\"` stands for a literal quote. An unterminated
//! quote simply runs to the end of the input.

use tracing::trace;

const QUOTE: char = '"';
const ESCAPE: char = '\\';
const DELIMITER: char = ' ';

/// Split a raw command line into tokens.
///
/// ```
/// use cmdlet::domain::split;
///
/// let tokens = split(r#"test -o "x-\"x\"" AAAA"#);
/// assert_eq!(tokens, vec!["test", "-o", "x-\"x\"", "AAAA"]);
/// ```
pub fn split(raw: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut buffer = String::with_capacity(raw.len());
    let mut in_quote = false;
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quote {
            match c {
                ESCAPE if chars.peek() == Some(&QUOTE) => {
                    chars.next();
                    buffer.push(QUOTE);
                }
                QUOTE => {
                    // a closed quote always yields a token, even `""`
                    tokens.push(std::mem::take(&mut buffer));
                    in_quote = false;
                }
                _ => buffer.push(c),
            }
        } else {
            match c {
                QUOTE => in_quote = true,
                DELIMITER => {
                    if !buffer.is_empty() {
                        tokens.push(std::mem::take(&mut buffer));
                    }
                }
                _ => buffer.push(c),
            }
        }
    }

    if in_quote {
        trace!("unterminated quote in {:?}", raw);
    }
    if !buffer.is_empty() {
        tokens.push(buffer);
    }

    trace!("split {:?} into {} tokens", raw, tokens.len());
    tokens
}
