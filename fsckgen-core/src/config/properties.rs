//! Reader for `.properties` key/value files.
//!
//! Supports the subset of the `java.util.Properties` text format that real
//! `server.properties` files use: `#`/`!` comments, `=`/`:`/whitespace
//! separators, backslash line continuations and the usual escapes.

use std::collections::HashMap;

/// Parsed key/value pairs from a properties document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: HashMap<String, String>,
}

impl Properties {
    /// Parses a properties document. Later duplicates override earlier keys.
    ///
    /// Lines end at `\r\n`, `\n` or a lone `\r`. Parsing never fails; lines
    /// that carry no key are ignored.
    ///
    /// # Example
    /// ```rust
    /// use fsckgen_core::config::Properties;
    ///
    /// let props = Properties::parse("# server\nrootDir = /opt/opentsdb\napiQuery:/api/suggest");
    /// assert_eq!(props.get("rootDir"), Some("/opt/opentsdb"));
    /// assert_eq!(props.get("apiQuery"), Some("/api/suggest"));
    /// ```
    pub fn parse(text: &str) -> Self {
        let mut entries = HashMap::new();
        let mut lines = text.split("\r\n").flat_map(|part| part.split(['\n', '\r']));

        while let Some(raw) = lines.next() {
            let line = raw.trim_start_matches(is_blank);
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }

            let mut logical = line.to_string();
            while has_continuation(&logical) {
                logical.pop();
                match lines.next() {
                    Some(next) => logical.push_str(next.trim_start_matches(is_blank)),
                    None => break,
                }
            }

            let (key, value) = split_entry(&logical);
            entries.insert(unescape(key), unescape(value));
        }

        Self { entries }
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the document held no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

const fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

/// A line continues when it ends in an odd number of backslashes.
fn has_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|c| *c == '\\').count() % 2 == 1
}

/// Splits a logical line at the first unescaped `=`, `:` or blank.
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    let mut key_end = line.len();

    for (idx, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || is_blank(c) {
            key_end = idx;
            break;
        }
    }

    let (key, rest) = line.split_at(key_end);
    let rest = rest.trim_start_matches(is_blank);
    let value = rest
        .strip_prefix(['=', ':'])
        .map_or(rest, |stripped| stripped.trim_start_matches(is_blank));

    (key, value)
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\x0c'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let decoded = (hex.len() == 4)
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                match decoded {
                    Some(ch) => out.push(ch),
                    None => {
                        // keep malformed escapes visible rather than dropping them
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separators() {
        let props = Properties::parse("a=1\nb:2\nc 3\nd = 4\ne : 5\nf\t\t6");

        assert_eq!(props.get("a"), Some("1"));
        assert_eq!(props.get("b"), Some("2"));
        assert_eq!(props.get("c"), Some("3"));
        assert_eq!(props.get("d"), Some("4"));
        assert_eq!(props.get("e"), Some("5"));
        assert_eq!(props.get("f"), Some("6"));
        assert_eq!(props.len(), 6);
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let props = Properties::parse("# comment\n! also a comment\n\n   \n  key=value\n");

        assert_eq!(props.len(), 1);
        assert_eq!(props.get("key"), Some("value"));
    }

    #[test]
    fn test_value_is_verbatim_after_separator() {
        let props = Properties::parse(
            "openTSDBUrl=http://localhost:4242\napiQuery=/api/suggest?type=metrics&max=10000   ",
        );

        assert_eq!(props.get("openTSDBUrl"), Some("http://localhost:4242"));
        // trailing whitespace belongs to the value
        assert_eq!(
            props.get("apiQuery"),
            Some("/api/suggest?type=metrics&max=10000   ")
        );
    }

    #[test]
    fn test_second_separator_is_part_of_value() {
        let props = Properties::parse("key==value\nother = : x");

        assert_eq!(props.get("key"), Some("=value"));
        assert_eq!(props.get("other"), Some(": x"));
    }

    #[test]
    fn test_line_continuation() {
        let props = Properties::parse("studyString=first,\\\n    second,\\\n    third\nnext=1");

        assert_eq!(props.get("studyString"), Some("first,second,third"));
        assert_eq!(props.get("next"), Some("1"));
    }

    #[test]
    fn test_escaped_backslash_is_not_continuation() {
        let props = Properties::parse("folderPath=C:\\\\data\\\\\nnext=1");

        assert_eq!(props.get("folderPath"), Some("C:\\data\\"));
        assert_eq!(props.get("next"), Some("1"));
    }

    #[test]
    fn test_escapes() {
        let props = Properties::parse("a\\=b=c\\td\nname=caf\\u00e9\nbad=\\uZZZZ");

        assert_eq!(props.get("a=b"), Some("c\td"));
        assert_eq!(props.get("name"), Some("café"));
        assert_eq!(props.get("bad"), Some("\\uZZZZ"));
    }

    #[test]
    fn test_key_without_value() {
        let props = Properties::parse("emptyKey\nalsoEmpty=");

        assert_eq!(props.get("emptyKey"), Some(""));
        assert_eq!(props.get("alsoEmpty"), Some(""));
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let props = Properties::parse("rootDir=/old\nrootDir=/new");
        assert_eq!(props.get("rootDir"), Some("/new"));
    }

    #[test]
    fn test_crlf_line_endings() {
        let props = Properties::parse("a=1\r\nb=2\r\n");

        assert_eq!(props.get("a"), Some("1"));
        assert_eq!(props.get("b"), Some("2"));
    }

    #[test]
    fn test_cr_only_line_endings() {
        let props = Properties::parse("rootDir=/opt/tsdb\rprocessedFile=fsck.sh\r");

        assert_eq!(props.get("rootDir"), Some("/opt/tsdb"));
        assert_eq!(props.get("processedFile"), Some("fsck.sh"));
        assert_eq!(props.len(), 2);
    }

    #[test]
    fn test_mixed_line_endings_with_continuation() {
        let props = Properties::parse("a=one \\\r  two\r\nb=2\nc=3\r");

        assert_eq!(props.get("a"), Some("one two"));
        assert_eq!(props.get("b"), Some("2"));
        assert_eq!(props.get("c"), Some("3"));
    }

    #[test]
    fn test_empty_document() {
        assert!(Properties::parse("").is_empty());
    }
}
