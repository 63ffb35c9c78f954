/// Wildcard syntax — locating `?{...}` placeholders and parsing their modifiers.
///
/// Grammar:
///
/// ```text
/// wildcard  := "?{" keyword [ "|" countspec [ "%" ] ] "}"
/// countspec := integer | integer "-" integer
/// ```
///
/// Scanning is not brace-balanced: a wildcard runs from the leftmost `?{`
/// to the first `}` after it. Template authors must not put a literal `}`
/// inside a wildcard body.

use rand::Rng;
use thiserror::Error;

pub const WILDCARD_OPEN: &str = "?{";
pub const WILDCARD_CLOSE: &str = "}";
const COUNT_MARK: char = '|';
const REPEAT_MARK: char = '%';
const RANGE_MARK: char = '-';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModifierError {
    #[error("empty count in '{0}'")]
    EmptyCount(String),
    #[error("'{0}' is not a valid count")]
    NotANumber(String),
    #[error("range {low}-{high} is empty or inverted")]
    EmptyRange { low: usize, high: usize },
    #[error("unexpected text after repeat marker in '{0}'")]
    TrailingText(String),
}

/// A wildcard located inside a string, by byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WildcardMatch<'a> {
    /// Offset of the `?` of the opening delimiter.
    pub start: usize,
    /// Offset one past the closing `}`.
    pub end: usize,
    /// Text between the delimiters.
    pub body: &'a str,
}

/// Find the leftmost wildcard: the first `?{` and the nearest `}` after it.
pub fn find_wildcard(text: &str) -> Option<WildcardMatch<'_>> {
    let start = text.find(WILDCARD_OPEN)?;
    let body_start = start + WILDCARD_OPEN.len();
    let close = text[body_start..].find(WILDCARD_CLOSE)? + body_start;
    Some(WildcardMatch {
        start,
        end: close + WILDCARD_CLOSE.len(),
        body: &text[body_start..close],
    })
}

/// Iterate over every wildcard in a template without expanding anything.
///
/// Scanning resumes after each match's closing delimiter.
pub fn scan_wildcards(text: &str) -> impl Iterator<Item = WildcardMatch<'_>> {
    let mut offset = 0;
    std::iter::from_fn(move || {
        let found = find_wildcard(&text[offset..])?;
        let shifted = WildcardMatch {
            start: found.start + offset,
            end: found.end + offset,
            body: found.body,
        };
        offset = shifted.end;
        Some(shifted)
    })
}

/// How many items a wildcard asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountSpec {
    Exact(usize),
    /// Half-open `[low, high)`.
    Range { low: usize, high: usize },
}

impl CountSpec {
    /// `N` or `LOW-HIGH`. Bounds past the second are ignored.
    fn parse(input: &str) -> Result<CountSpec, ModifierError> {
        let mut bounds = input.split(RANGE_MARK);
        let low = parse_count(bounds.next().unwrap_or_default())?;
        let Some(high) = bounds.next() else {
            return Ok(CountSpec::Exact(low));
        };
        let high = parse_count(high)?;
        if low >= high {
            return Err(ModifierError::EmptyRange { low, high });
        }
        Ok(CountSpec::Range { low, high })
    }

    /// Pick the concrete count. Ranges draw uniformly, upper bound excluded.
    /// Zero is a valid count and means the wildcard expands to nothing.
    pub fn resolve<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        match *self {
            CountSpec::Exact(n) => n,
            CountSpec::Range { low, high } => rng.gen_range(low..high),
        }
    }

    /// Largest count this spec can produce.
    pub fn max(&self) -> usize {
        match *self {
            CountSpec::Exact(n) => n,
            CountSpec::Range { high, .. } => high - 1,
        }
    }
}

fn parse_count(input: &str) -> Result<usize, ModifierError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ModifierError::EmptyCount(input.to_string()));
    }
    trimmed
        .parse()
        .map_err(|_| ModifierError::NotANumber(trimmed.to_string()))
}

/// A parsed wildcard body. Built while scanning one template and dropped
/// right after its expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardExpression {
    pub keyword: String,
    pub count: Option<CountSpec>,
    pub repeat_allowed: bool,
}

impl WildcardExpression {
    /// Parse the text between `?{` and `}`.
    ///
    /// - `kw` → one item
    /// - `kw|N` → N items, no repeats unless the pool is too small
    /// - `kw|N%` → N items, repeats allowed
    /// - `kw|LOW-HIGH` / `kw|LOW-HIGH%` → random count in `[LOW, HIGH)`
    pub fn parse(body: &str) -> Result<WildcardExpression, ModifierError> {
        let Some((keyword, modifier)) = body.split_once(COUNT_MARK) else {
            return Ok(WildcardExpression {
                keyword: body.to_string(),
                count: None,
                repeat_allowed: false,
            });
        };

        let (countspec, repeat_allowed) = match modifier.split_once(REPEAT_MARK) {
            Some((countspec, "")) => (countspec, true),
            Some(_) => return Err(ModifierError::TrailingText(modifier.to_string())),
            None => (modifier, false),
        };

        Ok(WildcardExpression {
            keyword: keyword.to_string(),
            count: Some(CountSpec::parse(countspec)?),
            repeat_allowed,
        })
    }

    /// The keyword part of a body, even when the modifier is malformed.
    pub fn keyword_of(body: &str) -> &str {
        body.split_once(COUNT_MARK).map_or(body, |(keyword, _)| keyword)
    }
}
