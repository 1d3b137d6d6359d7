//! File-name glob matching for rule directories
//!
//! Supports `*` (any run of characters), `?` (one character) and bracket
//! classes such as `[abc]`, `[0-9]` or `[!x]`. Patterns are compiled to an
//! anchored regex.

use regex::Regex;

use crate::error::RuleLoadError;

#[derive(Debug, Clone)]
pub struct FilePattern {
    source: String,
    regex: Regex,
}

impl FilePattern {
    pub fn new(pattern: &str) -> Result<Self, RuleLoadError> {
        let regex = Regex::new(&glob_to_regex(pattern)).map_err(|source| RuleLoadError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.regex.is_match(file_name)
    }
}

impl std::fmt::Display for FilePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

fn glob_to_regex(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::from("^");
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => match bracket_class(&chars[i + 1..]) {
                Some((class, consumed)) => {
                    out.push_str(&class);
                    i += consumed;
                }
                // Unterminated class: the bracket is literal
                None => out.push_str(r"\["),
            },
            c => out.push_str(&regex::escape(c.encode_utf8(&mut [0u8; 4]))),
        }
        i += 1;
    }

    out.push('$');
    out
}

/// Translate the body of a `[...]` class. Returns the regex class and the
/// number of pattern characters consumed after the opening bracket.
fn bracket_class(rest: &[char]) -> Option<(String, usize)> {
    let mut class = String::from("[");
    let mut j = 0;

    if rest.first() == Some(&'!') {
        class.push('^');
        j += 1;
    }
    // A leading ']' is a literal member, not the terminator
    if rest.get(j) == Some(&']') {
        class.push_str(r"\]");
        j += 1;
    }

    while j < rest.len() {
        match rest[j] {
            ']' => {
                class.push(']');
                return Some((class, j + 1));
            }
            '\\' | '[' | '^' | '&' | '~' => {
                class.push('\\');
                class.push(rest[j]);
            }
            c => class.push(c),
        }
        j += 1;
    }

    None
}
