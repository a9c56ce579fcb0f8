use regex::Regex;
use std::sync::LazyLock;

/// Question/exclamation marks, check marks and the private-use tick glyph
/// some IPID templates embed.
static NOISE: LazyLock<Regex> = LazyLock::new(|| Regex::new("[?!✓\u{f0fb}]+").unwrap());
static COLON: LazyLock<Regex> = LazyLock::new(|| Regex::new(":").unwrap());
static HORIZONTAL_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\S\n]+").unwrap());
static SOFT_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[^\S\n]?(\p{Ll})").unwrap());
static WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static DASHES: LazyLock<Regex> = LazyLock::new(|| Regex::new("-+").unwrap());
static EMPTY_BULLETS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n-(?:\s*\n-)+").unwrap());

/// Clean an extracted span for presentation.
///
/// Steps, in order:
/// 1. Punctuation noise (`?`, `!`, check marks) becomes a ` - ` separator
/// 2. Colons become spaces
/// 3. Horizontal whitespace runs collapse to one space
/// 4. A line break followed by a lowercase letter is a wrapped line, not a
///    paragraph: it is joined with a space, then all whitespace collapses
/// 5. Dash runs become bullet markers (`" \n- "`)
/// 6. Consecutive empty bullets merge into one
/// 7. Whitespace collapses again and the result is trimmed
///
/// Normalizing already normalized text returns it unchanged.
pub fn normalize(text: &str) -> String {
    let text = NOISE.replace_all(text, " - ");
    let text = COLON.replace_all(&text, " ");
    let text = HORIZONTAL_WS.replace_all(&text, " ");

    let text = SOFT_BREAK.replace_all(&text, " $1");
    let text = WS.replace_all(&text, " ");

    let text = DASHES.replace_all(&text, " \n- ");
    let text = EMPTY_BULLETS.replace_all(&text, "\n-");
    let text = WS.replace_all(&text, " ");

    text.trim().to_string()
}
