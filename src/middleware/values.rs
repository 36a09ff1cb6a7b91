//! Value Primitives - String rewrites exploiting LDAP parser tolerances
//!
//! Every primitive is total. When the input does not have the shape a
//! primitive targets, the input is returned unchanged.
//!
//! References:
//! - DEF CON 32, "MaLDAPtive: Obfuscation and De-Obfuscation"
//! - MS-ADTS 3.1.1.3.1.3 (search filters) and RFC 4515 / RFC 1779

use rand::Rng;
use regex::Regex;

/// Characters used for timestamp garbage; digits would alter the fraction
const TIMESTAMP_GARBAGE: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generalized time: YYYYMMDDHH[MM[SS]][(.|,)fraction](Z|+-HH[MM])
const GENERALIZED_TIME: &str = r"^(?P<datetime>\d{10}(?:\d{2}(?:\d{2})?)?)(?:(?P<sep>[.,])(?P<fraction>\d+))?(?P<zone>Z|[+-]\d{2}(?:\d{2})?)$";

/// Uniform draw from `0..n`, or 0 when the range is empty
pub fn below<R: Rng + ?Sized>(rng: &mut R, n: usize) -> usize {
    if n == 0 {
        0
    } else {
        rng.gen_range(0..n)
    }
}

/// Uniform draw from `0..=n`
pub fn up_to<R: Rng + ?Sized>(rng: &mut R, n: usize) -> usize {
    rng.gen_range(0..=n)
}

/// Bernoulli draw; `prob` outside `[0, 1]` is clamped
pub fn chance<R: Rng + ?Sized>(rng: &mut R, prob: f32) -> bool {
    let p = if prob.is_finite() { prob.clamp(0.0, 1.0) } else { 0.0 };
    rng.gen_bool(p as f64)
}

/// One lexical unit of an escaped filter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    /// `\hh`, or a backslash followed by any other character
    Escaped(&'a str),
    Char(char),
}

impl Token<'_> {
    /// Byte an escape stands for, when it is a valid `\hh` escape
    fn escaped_byte(&self) -> Option<u8> {
        match self {
            Token::Escaped(s) if s.len() == 3 => u8::from_str_radix(&s[1..], 16).ok(),
            _ => None,
        }
    }
}

fn tokenize(value: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut iter = value.char_indices();

    while let Some((i, c)) = iter.next() {
        if c != '\\' {
            tokens.push(Token::Char(c));
            continue;
        }

        let rest = &value[i + 1..];
        let hex: Vec<char> = rest.chars().take(2).collect();
        if hex.len() == 2 && hex.iter().all(|h| h.is_ascii_hexdigit()) {
            tokens.push(Token::Escaped(&value[i..i + 3]));
            iter.next();
            iter.next();
        } else if let Some((j, next)) = iter.next() {
            tokens.push(Token::Escaped(&value[i..j + next.len_utf8()]));
        } else {
            tokens.push(Token::Char(c));
        }
    }

    tokens
}

/// Byte offsets between the lexical units of an escaped value, both ends
/// included. Splitting at any of them never cuts an escape in half.
pub fn token_boundaries(value: &str) -> Vec<usize> {
    let mut offsets = vec![0];
    let mut at = 0;
    for token in tokenize(value) {
        at += match token {
            Token::Escaped(s) => s.len(),
            Token::Char(c) => c.len_utf8(),
        };
        offsets.push(at);
    }
    offsets
}

/// Replace each unescaped character by its `\hh` escape with probability `prob`.
///
/// Multi-byte characters are escaped byte by byte. Existing escapes are kept
/// as they are, so an already escaped value never gets double-escaped.
pub fn randomly_hex_encode<R: Rng + ?Sized>(value: &str, prob: f32, rng: &mut R) -> String {
    let mut out = String::with_capacity(value.len() * 2);
    for token in tokenize(value) {
        match token {
            Token::Escaped(s) => out.push_str(s),
            Token::Char(c) => {
                if chance(rng, prob) {
                    let mut buf = [0u8; 4];
                    for byte in c.encode_utf8(&mut buf).bytes() {
                        out.push_str(&format!("\\{:02x}", byte));
                    }
                } else {
                    out.push(c);
                }
            }
        }
    }
    out
}

/// Flip the case of ASCII letters with probability `prob`; escapes are kept
pub fn random_case<R: Rng + ?Sized>(value: &str, prob: f32, rng: &mut R) -> String {
    let mut out = String::with_capacity(value.len());
    for token in tokenize(value) {
        match token {
            Token::Escaped(s) => out.push_str(s),
            Token::Char(c) if c.is_ascii_alphabetic() && chance(rng, prob) => {
                if c.is_ascii_uppercase() {
                    out.push(c.to_ascii_lowercase());
                } else {
                    out.push(c.to_ascii_uppercase());
                }
            }
            Token::Char(c) => out.push(c),
        }
    }
    out
}

/// Prepend `0..=max_zeros` zeros to an optionally signed decimal integer
pub fn prepend_zeros<R: Rng + ?Sized>(value: &str, max_zeros: usize, rng: &mut R) -> String {
    let (sign, digits) = match value.strip_prefix(|c: char| c == '-' || c == '+') {
        Some(rest) => (&value[..1], rest),
        None => ("", value),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return value.to_string();
    }

    let zeros = up_to(rng, max_zeros);
    format!("{}{}{}", sign, "0".repeat(zeros), digits)
}

/// Random string of `size` characters drawn from `charset`
pub fn random_garbage<R: Rng + ?Sized>(size: usize, charset: &str, rng: &mut R) -> String {
    let chars: Vec<char> = charset.chars().collect();
    if chars.is_empty() {
        return String::new();
    }
    (0..size).map(|_| chars[rng.gen_range(0..chars.len())]).collect()
}

fn spaces<R: Rng + ?Sized>(rng: &mut R, max_spaces: usize) -> String {
    " ".repeat(up_to(rng, max_spaces))
}

/// Widen an ANR value with random whitespace.
///
/// ANR splits its input on whitespace, so extra spaces at the edges and
/// inside existing whitespace runs do not change the tokens it searches
/// for. A leading `=` (exact-match ANR) stays first.
pub fn add_anr_spacing<R: Rng + ?Sized>(value: &str, max_spaces: usize, rng: &mut R) -> String {
    let (exact, body) = match value.strip_prefix('=') {
        Some(rest) => ("=", rest),
        None => ("", value),
    };

    let mut out = String::with_capacity(body.len() + max_spaces * 2);
    out.push_str(exact);
    out.push_str(&spaces(rng, max_spaces));

    let tokens = tokenize(body);
    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Escaped(s) => out.push_str(s),
            Token::Char(c) => {
                out.push(*c);
                let run_ends = c.is_whitespace()
                    && !matches!(tokens.get(i + 1), Some(Token::Char(n)) if n.is_whitespace());
                if run_ends {
                    out.push_str(&spaces(rng, max_spaces));
                }
            }
        }
    }

    out.push_str(&spaces(rng, max_spaces));
    out
}

/// Insert random spaces around unescaped DN separators (`,` `;` `+` `=`).
///
/// RFC 1779 style parsers ignore optional space around separators. Quoted
/// strings and DN-escaped characters (a filter-escaped backslash `\5c`
/// followed by the escaped character) are left untouched.
pub fn add_dn_spacing<R: Rng + ?Sized>(value: &str, max_spaces: usize, rng: &mut R) -> String {
    let mut out = String::with_capacity(value.len() + max_spaces * 4);
    let mut in_quotes = false;
    let mut dn_escaped = false;

    for token in tokenize(value) {
        if dn_escaped {
            dn_escaped = false;
            match token {
                Token::Escaped(s) => out.push_str(s),
                Token::Char(c) => out.push(c),
            }
            continue;
        }

        match token {
            Token::Escaped(s) => {
                out.push_str(s);
                if token.escaped_byte() == Some(b'\\') {
                    dn_escaped = true;
                }
            }
            Token::Char('"') => {
                in_quotes = !in_quotes;
                out.push('"');
            }
            Token::Char(c) if !in_quotes && matches!(c, ',' | ';' | '+' | '=') => {
                out.push_str(&spaces(rng, max_spaces));
                out.push(c);
                out.push_str(&spaces(rng, max_spaces));
            }
            Token::Char(c) => out.push(c),
        }
    }

    out
}

/// Pieces of a recognized timestamp
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampShape<'a> {
    /// Date and time digits
    pub datetime: &'a str,
    /// Fraction separator and digits, when present
    pub fraction: Option<(char, &'a str)>,
    /// `Z` or a numeric offset
    pub zone: &'a str,
}

/// Decides whether a value is timestamp shaped
pub trait TimestampRecognizer: Send + Sync {
    fn recognize<'a>(&self, value: &'a str) -> Option<TimestampShape<'a>>;
}

/// Recognizes RFC 4517 generalized time with plausible calendar fields
#[derive(Debug, Clone)]
pub struct GeneralizedTimeRecognizer {
    pattern: Option<Regex>,
}

impl Default for GeneralizedTimeRecognizer {
    fn default() -> Self {
        Self {
            pattern: Regex::new(GENERALIZED_TIME).ok(),
        }
    }
}

impl GeneralizedTimeRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom pattern. It must define the named groups `datetime` and
    /// `zone`, and may define `sep` and `fraction`.
    pub fn with_pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Some(Regex::new(pattern)?),
        })
    }
}

fn plausible_datetime(datetime: &str) -> bool {
    let field = |range: std::ops::Range<usize>| -> Option<u32> {
        datetime.get(range).and_then(|s| s.parse().ok())
    };
    matches!(field(4..6), Some(1..=12))
        && matches!(field(6..8), Some(1..=31))
        && matches!(field(8..10), Some(0..=23))
        && field(10..12).map_or(true, |m| m <= 59)
        && field(12..14).map_or(true, |s| s <= 60)
}

impl TimestampRecognizer for GeneralizedTimeRecognizer {
    fn recognize<'a>(&self, value: &'a str) -> Option<TimestampShape<'a>> {
        let caps = self.pattern.as_ref()?.captures(value)?;
        let datetime = caps.name("datetime")?.as_str();
        let zone = caps.name("zone")?.as_str();

        if datetime.len() >= 10 && !plausible_datetime(datetime) {
            return None;
        }

        let fraction = match (caps.name("sep"), caps.name("fraction")) {
            (Some(sep), Some(digits)) => sep
                .as_str()
                .chars()
                .next()
                .map(|c| (c, digits.as_str())),
            _ => None,
        };

        Some(TimestampShape {
            datetime,
            fraction,
            zone,
        })
    }
}

/// Pad the fractional-seconds section of a timestamp with letter garbage.
///
/// `prepend` inserts garbage right after the fraction separator, `append`
/// right before the zone. A missing fraction is introduced as `.0`. Values
/// the recognizer rejects come back unchanged.
pub fn replace_timestamp<R: Rng + ?Sized>(
    value: &str,
    prepend: bool,
    append: bool,
    max_chars: usize,
    recognizer: &dyn TimestampRecognizer,
    rng: &mut R,
) -> String {
    let Some(shape) = recognizer.recognize(value) else {
        return value.to_string();
    };

    let mut garbage = |enabled: bool| -> String {
        if !enabled {
            return String::new();
        }
        let count = up_to(rng, max_chars);
        (0..count)
            .map(|_| TIMESTAMP_GARBAGE[rng.gen_range(0..TIMESTAMP_GARBAGE.len())] as char)
            .collect()
    };

    let before = garbage(prepend);
    let after = garbage(append);
    if before.is_empty() && after.is_empty() {
        return value.to_string();
    }

    let (sep, digits) = shape.fraction.unwrap_or(('.', "0"));
    format!(
        "{}{}{}{}{}{}",
        shape.datetime, sep, before, digits, after, shape.zone
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn rng(seed: u64) -> SmallRng {
        SmallRng::seed_from_u64(seed)
    }

    /// Decode `\hh` escapes back to raw bytes
    fn unescape(value: &str) -> String {
        let mut bytes = Vec::new();
        for token in tokenize(value) {
            match token.escaped_byte() {
                Some(b) => bytes.push(b),
                None => match token {
                    Token::Escaped(s) => bytes.extend_from_slice(s.as_bytes()),
                    Token::Char(c) => {
                        let mut buf = [0u8; 4];
                        bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                    }
                },
            }
        }
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn tokenize_recognizes_escapes() {
        let tokens = tokenize(r"a\2ab\\");
        assert_eq!(
            tokens,
            vec![
                Token::Char('a'),
                Token::Escaped(r"\2a"),
                Token::Char('b'),
                Token::Escaped(r"\\"),
            ]
        );
        assert_eq!(tokenize(r"x\"), vec![Token::Char('x'), Token::Char('\\')]);
    }

    #[test]
    fn hex_encode_with_probability_one_escapes_everything() {
        let out = randomly_hex_encode("John", 1.0, &mut rng(1));
        assert_eq!(out, r"\4a\6f\68\6e");
    }

    #[test]
    fn hex_encode_with_probability_zero_is_identity() {
        assert_eq!(randomly_hex_encode("John", 0.0, &mut rng(1)), "John");
    }

    #[test]
    fn hex_encode_preserves_meaning() {
        for seed in 0..50 {
            let value = r"Jo\2ahn Sm\c3\a9th é";
            let out = randomly_hex_encode(value, 0.5, &mut rng(seed));
            assert_eq!(unescape(&out), unescape(value));
        }
    }

    #[test]
    fn hex_encode_escapes_multibyte_per_byte() {
        assert_eq!(randomly_hex_encode("é", 1.0, &mut rng(3)), r"\c3\a9");
    }

    #[test]
    fn random_case_only_touches_letters() {
        let out = random_case(r"ab\2a-1", 1.0, &mut rng(2));
        assert_eq!(out, r"AB\2a-1");
        assert_eq!(random_case("Ab", 0.0, &mut rng(2)), "Ab");
    }

    #[test]
    fn prepend_zeros_keeps_integer_value() {
        for seed in 0..50 {
            let out = prepend_zeros("1", 3, &mut rng(seed));
            assert!(out.len() >= 1 && out.len() <= 4, "{}", out);
            assert!(out.trim_start_matches('0') == "1");
            assert_eq!(out.parse::<i64>().unwrap(), 1);
        }
    }

    #[test]
    fn prepend_zeros_handles_sign() {
        for seed in 0..20 {
            let out = prepend_zeros("-42", 4, &mut rng(seed));
            assert!(out.starts_with('-'));
            assert_eq!(out.parse::<i64>().unwrap(), -42);
        }
    }

    #[test]
    fn prepend_zeros_rejects_non_integers() {
        assert_eq!(prepend_zeros("abc", 4, &mut rng(1)), "abc");
        assert_eq!(prepend_zeros("", 4, &mut rng(1)), "");
        assert_eq!(prepend_zeros("-", 4, &mut rng(1)), "-");
        assert_eq!(prepend_zeros("1.5", 4, &mut rng(1)), "1.5");
    }

    #[test]
    fn random_garbage_uses_charset() {
        let out = random_garbage(16, "xy", &mut rng(4));
        assert_eq!(out.len(), 16);
        assert!(out.chars().all(|c| c == 'x' || c == 'y'));
        assert_eq!(random_garbage(5, "", &mut rng(4)), "");
    }

    #[test]
    fn anr_spacing_keeps_tokens() {
        for seed in 0..50 {
            let out = add_anr_spacing("John  Smith", 3, &mut rng(seed));
            let tokens: Vec<&str> = out.split_whitespace().collect();
            assert_eq!(tokens, vec!["John", "Smith"]);
            assert!(out.contains("John  "));
        }
    }

    #[test]
    fn anr_spacing_keeps_exact_marker_first() {
        for seed in 0..20 {
            let out = add_anr_spacing("=John", 3, &mut rng(seed));
            assert!(out.starts_with('='));
            assert_eq!(out[1..].trim(), "John");
        }
    }

    #[test]
    fn dn_spacing_only_touches_separators() {
        for seed in 0..50 {
            let dn = "CN=John Smith,OU=Users,DC=corp,DC=local";
            let out = add_dn_spacing(dn, 2, &mut rng(seed));
            let squeezed: String = out
                .split(',')
                .map(|rdn| {
                    rdn.split('=')
                        .map(str::trim)
                        .collect::<Vec<_>>()
                        .join("=")
                })
                .collect::<Vec<_>>()
                .join(",");
            assert_eq!(squeezed, dn);
        }
    }

    #[test]
    fn dn_spacing_skips_escaped_and_quoted_separators() {
        let dn = r#"CN=Smith\5c,John,OU="a,b""#;
        let out = add_dn_spacing(dn, 0, &mut rng(1));
        assert_eq!(out, dn);

        let out = add_dn_spacing(dn, 3, &mut rng(9));
        assert!(out.contains(r"Smith\5c,John"));
        assert!(out.contains(r#""a,b""#));
    }

    #[test]
    fn recognizer_accepts_generalized_time() {
        let recognizer = GeneralizedTimeRecognizer::new();
        let shape = recognizer.recognize("20230812123456.0Z").unwrap();
        assert_eq!(shape.datetime, "20230812123456");
        assert_eq!(shape.fraction, Some(('.', "0")));
        assert_eq!(shape.zone, "Z");

        let shape = recognizer.recognize("2023081212-0500").unwrap();
        assert_eq!(shape.datetime, "2023081212");
        assert_eq!(shape.fraction, None);
        assert_eq!(shape.zone, "-0500");
    }

    #[test]
    fn recognizer_rejects_other_values() {
        let recognizer = GeneralizedTimeRecognizer::new();
        assert!(recognizer.recognize("John").is_none());
        assert!(recognizer.recognize("133490000000000000").is_none());
        assert!(recognizer.recognize("20231345123456Z").is_none());
        assert!(recognizer.recognize("20230812123456").is_none());
    }

    #[test]
    fn custom_recognizer_pattern() {
        let recognizer =
            GeneralizedTimeRecognizer::with_pattern(r"^(?P<datetime>\d{8})(?P<zone>Z)$").unwrap();
        assert!(recognizer.recognize("20230812Z").is_some());
        assert!(GeneralizedTimeRecognizer::with_pattern("(").is_err());
    }

    #[test]
    fn replace_timestamp_keeps_instant() {
        let recognizer = GeneralizedTimeRecognizer::new();
        for seed in 0..50 {
            let out = replace_timestamp(
                "20230812123456.0Z",
                true,
                true,
                6,
                &recognizer,
                &mut rng(seed),
            );
            assert!(out.starts_with("20230812123456."));
            assert!(out.ends_with('Z'));
            let digits: String = out[15..out.len() - 1]
                .chars()
                .filter(|c| c.is_ascii_digit())
                .collect();
            assert_eq!(digits, "0");
            assert!(out.len() <= "20230812123456.0Z".len() + 12);
        }
    }

    #[test]
    fn replace_timestamp_adds_fraction_when_missing() {
        let recognizer = GeneralizedTimeRecognizer::new();
        let mut changed = false;
        for seed in 0..20 {
            let out =
                replace_timestamp("20230812123456Z", false, true, 4, &recognizer, &mut rng(seed));
            if out != "20230812123456Z" {
                assert!(out.starts_with("20230812123456.0"));
                changed = true;
            }
        }
        assert!(changed);
    }

    #[test]
    fn replace_timestamp_passes_through_non_timestamps() {
        let recognizer = GeneralizedTimeRecognizer::new();
        assert_eq!(
            replace_timestamp("John", true, true, 6, &recognizer, &mut rng(1)),
            "John"
        );
        assert_eq!(
            replace_timestamp("20230812123456Z", false, false, 6, &recognizer, &mut rng(1)),
            "20230812123456Z"
        );
    }

    #[test]
    fn draws_respect_bounds() {
        let mut r = rng(5);
        assert_eq!(below(&mut r, 0), 0);
        for _ in 0..100 {
            assert!(below(&mut r, 3) < 3);
            assert!(up_to(&mut r, 3) <= 3);
        }
        assert!(!chance(&mut r, 0.0));
        assert!(chance(&mut r, 1.0));
        assert!(chance(&mut r, 7.0));
    }

    #[test]
    fn token_boundaries_skip_escape_interiors() {
        assert_eq!(token_boundaries(""), vec![0]);
        assert_eq!(token_boundaries("ab"), vec![0, 1, 2]);
        assert_eq!(token_boundaries(r"a\2ab"), vec![0, 1, 4, 5]);
        assert_eq!(token_boundaries("é"), vec![0, 2]);
    }
}
