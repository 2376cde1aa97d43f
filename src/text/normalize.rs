// Text normalizer: the single cleaning path shared by training and inference.
//
// Steps run in a fixed order: lower-case, drop [bracketed] annotations,
// drop URLs, drop <tags>, drop punctuation, drop newlines, drop any token
// that contains a digit. Whitespace is left as-is, so removed spans can
// leave double spaces behind; the analyzer splits on whitespace anyway.

use std::sync::LazyLock;

use regex_lite::Regex;

static BRACKETED: LazyLock<Regex> = LazyLock::new(|| compile(r"\[.*?\]"));
static URL: LazyLock<Regex> = LazyLock::new(|| compile(r"https?://\S+|www\.\S+"));
static TAG: LazyLock<Regex> = LazyLock::new(|| compile(r"<.*?>+"));

fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        // Patterns are literals above; a failure here is a typo caught by the tests.
        Err(e) => panic!("invalid normalizer pattern {pattern:?}: {e}"),
    }
}

/// Normalize raw document text into the canonical form the model sees.
///
/// Pure and total: never fails, `normalize("")` is `""`, and applying it
/// twice gives the same result as applying it once.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let without_brackets = BRACKETED.replace_all(&lowered, "");
    let without_urls = URL.replace_all(&without_brackets, "");
    let without_tags = TAG.replace_all(&without_urls, "");

    let without_punct: String = without_tags
        .chars()
        .filter(|&c| !is_punctuation(c) && c != '\n' && c != '\r')
        .collect();

    drop_numeric_tokens(&without_punct)
}

/// Remove every whitespace-delimited token holding a numeric character
/// (any script), keeping the surrounding whitespace untouched.
fn drop_numeric_tokens(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut token_start: Option<usize> = None;

    let keep = |token: &str| !token.chars().any(char::is_numeric);

    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            if let Some(start) = token_start.take() {
                if keep(&text[start..i]) {
                    out.push_str(&text[start..i]);
                }
            }
            out.push(c);
        } else if token_start.is_none() {
            token_start = Some(i);
        }
    }
    if let Some(start) = token_start {
        if keep(&text[start..]) {
            out.push_str(&text[start..]);
        }
    }
    out
}

/// ASCII punctuation plus the typographic punctuation common in pasted
/// news copy (curly quotes, dashes, ellipses, guillemets).
fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
        || matches!(c, '\u{2010}'..='\u{2027}' | '\u{2030}'..='\u{205E}')
        || matches!(c, '\u{00A1}' | '\u{00AB}' | '\u{00B7}' | '\u{00BB}' | '\u{00BF}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pinned_example() {
        assert_eq!(
            normalize("BREAKING!!! http://fake.com <b>Shocking</b> news123"),
            "breaking  shocking "
        );
    }

    #[test]
    fn test_empty() {
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_brackets_removed() {
        assert_eq!(normalize("Reuters [edited] report"), "reuters  report");
    }

    #[test]
    fn test_www_url_removed() {
        assert_eq!(normalize("see www.example.org/page now"), "see  now");
    }

    #[test]
    fn test_newlines_removed() {
        assert_eq!(normalize("line one\nline two"), "line oneline two");
    }

    #[test]
    fn test_digit_tokens_removed_whole() {
        assert_eq!(normalize("covid19 cases in 2020 rose"), " cases in  rose");
    }

    #[test]
    fn test_digit_tokens_with_non_ascii_letters_removed_whole() {
        assert_eq!(normalize("zürich2020 café1 ok"), "  ok");
        assert_eq!(normalize("straße9 bleibt"), " bleibt");
    }

    #[test]
    fn test_non_ascii_digits_remove_token() {
        // Arabic-Indic three, superscript two, vulgar half.
        assert_eq!(normalize("ok \u{0663}abc x\u{00B2} \u{00BD}cup fin"), "ok    fin");
    }

    #[test]
    fn test_unicode_punctuation_removed() {
        assert_eq!(normalize("“Quoted” — text…"), "quoted  text");
    }

    #[test]
    fn test_non_ascii_letters_kept() {
        assert_eq!(normalize("Café Zürich"), "café zürich");
    }

    #[test]
    fn test_idempotent_on_tricky_input() {
        let inputs = [
            "ht[x]tp://a.b c",
            "http<i>://</i>evil.com done",
            "[unclosed <tag and www.site",
            "A1B2 c3 ... d",
            "Mixed\r\nNEWLINES\n[x]y",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {input:?}");
        }
    }
}
