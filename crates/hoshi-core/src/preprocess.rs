use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Characters that can be part of a looked-up word. Everything else
/// (punctuation, brackets, whitespace) ends the lookup window.
static LOOKUP_CHAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9A-Za-z○◯々-〇〻ぁ-ゖゝ-ゞァ-ヺー０-９Ａ-Ｚａ-ｚｦ-ﾝ\p{Radical}\p{Unified_Ideograph}]")
        .expect("lookup character class is valid")
});

static BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<body.*?</body>").expect("valid regex"));
static RUBY_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<rt>.*?</rt>").expect("valid regex"));
static SCRIPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<script[^>]*>.*?</script>").expect("valid regex"));
static STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<style[^>]*>.*?</style>").expect("valid regex"));
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

pub trait Preprocessor {
    // Default JP preprocessor
    fn process(&self, text: &str) -> String {
        let mut text = text.trim().to_string();

        if text.is_empty() {
            return text;
        }

        // Unicode normalization (NFKC)
        text = text.nfkc().collect();

        text = text.replace(['\n', '\r'], "").trim().to_string();

        text
    }
}

pub struct DefaultPreprocessor;
impl Preprocessor for DefaultPreprocessor {}

pub fn is_lookup_char(c: char) -> bool {
    let mut buf = [0u8; 4];
    LOOKUP_CHAR.is_match(c.encode_utf8(&mut buf))
}

/// Voicing marks that NFKC folds into the preceding kana, e.g. `ﾃﾞ` → `デ`
pub fn is_sound_mark(c: char) -> bool {
    matches!(c, '\u{3099}' | '\u{309A}' | '\u{FF9E}' | '\u{FF9F}')
}

/// Counts the readable characters of an XHTML chapter, ignoring markup,
/// furigana and anything outside the lookup character class.
pub fn character_count(html: &str) -> usize {
    let text = BODY.find(html).map_or(html, |m| m.as_str());
    let text = RUBY_TEXT.replace_all(text, "");
    let text = SCRIPT.replace_all(&text, "");
    let text = STYLE.replace_all(&text, "");
    let text = TAG.replace_all(&text, "");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">");

    text.chars().filter(|c| is_lookup_char(*c)).count()
}
