use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

pub const USER_MENTION: &str = "<USER_MENTION>";
pub const URL_PLACEHOLDER: &str = "<URL_HERE>";

lazy_static! {
    static ref MENTION_RE: Regex = Regex::new(r"@[a-z0-9_-]*").expect("valid regex");
    static ref URL_RE: Regex = Regex::new(
        r"http[s]?://(?:[a-zA-Z]|[0-9]|[$-_@.&+]|[!*\(\),]|(?:%[0-9a-fA-F][0-9a-fA-F]))+"
    )
    .expect("valid regex");
}

/// Normalize message text for keyword matching: NFKC, lowercase, then mask
/// user mentions and URLs.
///
/// Mentions are masked before URLs, so an `@` inside a URL is consumed as a
/// mention first.
pub fn normalize(text: &str) -> String {
    let lowered = text.nfkc().collect::<String>().to_lowercase();
    let masked = MENTION_RE.replace_all(&lowered, USER_MENTION);
    URL_RE.replace_all(&masked, URL_PLACEHOLDER).into_owned()
}

/// Normalize a candidate keyword so it compares against normalized text.
pub fn normalize_keyword(keyword: &str) -> String {
    keyword.trim().nfkc().collect::<String>().to_lowercase()
}
