/// Expander — recursive wildcard expansion with fail-soft fallback.
///
/// A keyword is looked up in the library, one (or several) of its templates
/// are drawn, and every `?{...}` in the result is expanded in turn, leftmost
/// first, until none remain. Any failure at a node replaces that node with
/// its keyword in upper case; callers always get a string back.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::library::TemplateLibrary;
use crate::core::selector;
use crate::core::wildcard::{find_wildcard, ModifierError, WildcardExpression};

/// Deepest nesting level that may still expand.
pub const MAX_DEPTH: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpansionError {
    #[error("unknown keyword: {0}")]
    UnknownKeyword(String),
    #[error("keyword '{0}' has no templates")]
    EmptyPool(String),
    #[error("expansion depth {depth} exceeds limit {limit}")]
    DepthExceeded { depth: usize, limit: usize },
    #[error("malformed wildcard modifier: {0}")]
    MalformedModifier(#[from] ModifierError),
}

/// Bounds on a single generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionLimits {
    /// Nodes deeper than this fall back instead of expanding.
    pub max_depth: usize,
    /// Requested amounts are clamped into `1..=max_amount`.
    pub max_amount: usize,
}

impl Default for ExpansionLimits {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            max_amount: 10,
        }
    }
}

impl ExpansionLimits {
    fn clamp_amount(&self, amount: usize) -> usize {
        let clamped = amount.clamp(1, self.max_amount.max(1));
        if clamped != amount {
            tracing::debug!(requested = amount, clamped, "selection amount clamped");
        }
        clamped
    }
}

/// Where a node sits in the expansion tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpansionContext {
    pub depth: usize,
}

impl ExpansionContext {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn descend(self) -> Self {
        Self {
            depth: self.depth + 1,
        }
    }
}

/// Expands keywords against a borrowed library. Holds no mutable state, so
/// one library can back any number of expanders on any number of threads.
#[derive(Debug, Clone, Copy)]
pub struct Expander<'a> {
    library: &'a TemplateLibrary,
    limits: ExpansionLimits,
}

impl<'a> Expander<'a> {
    pub fn new(library: &'a TemplateLibrary) -> Self {
        Self::with_limits(library, ExpansionLimits::default())
    }

    pub fn with_limits(library: &'a TemplateLibrary, limits: ExpansionLimits) -> Self {
        Self { library, limits }
    }

    /// Expand one template for `keyword`.
    pub fn generate<R: Rng + ?Sized>(&self, keyword: &str, rng: &mut R) -> String {
        self.generate_with(keyword, 1, false, rng)
    }

    /// Expand `amount` templates for `keyword`, joined as a list.
    pub fn generate_with<R: Rng + ?Sized>(
        &self,
        keyword: &str,
        amount: usize,
        allow_repeat: bool,
        rng: &mut R,
    ) -> String {
        self.expand_or_fallback(keyword, amount, allow_repeat, ExpansionContext::root(), rng)
    }

    /// Like [`Expander::generate_with`] but reports the root failure instead
    /// of falling back. Nested failures still fall back in place.
    pub fn try_generate<R: Rng + ?Sized>(
        &self,
        keyword: &str,
        amount: usize,
        allow_repeat: bool,
        rng: &mut R,
    ) -> Result<String, ExpansionError> {
        self.expand(keyword, amount, allow_repeat, ExpansionContext::root(), rng)
    }

    fn expand_or_fallback<R: Rng + ?Sized>(
        &self,
        keyword: &str,
        amount: usize,
        allow_repeat: bool,
        ctx: ExpansionContext,
        rng: &mut R,
    ) -> String {
        match self.expand(keyword, amount, allow_repeat, ctx, rng) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(keyword, depth = ctx.depth, error = %e, "expansion fell back");
                fallback(keyword)
            }
        }
    }

    fn expand<R: Rng + ?Sized>(
        &self,
        keyword: &str,
        amount: usize,
        allow_repeat: bool,
        ctx: ExpansionContext,
        rng: &mut R,
    ) -> Result<String, ExpansionError> {
        if ctx.depth > self.limits.max_depth {
            return Err(ExpansionError::DepthExceeded {
                depth: ctx.depth,
                limit: self.limits.max_depth,
            });
        }

        let pool = self
            .library
            .get(keyword)
            .ok_or_else(|| ExpansionError::UnknownKeyword(keyword.to_string()))?;
        let amount = self.limits.clamp_amount(amount);
        let mut output = selector::select(pool, amount, allow_repeat, rng)
            .ok_or_else(|| ExpansionError::EmptyPool(keyword.to_string()))?;

        // Each pass consumes one "}": a finished expansion has no "}" after
        // its first "?{".
        while let Some(wildcard) = find_wildcard(&output) {
            let replacement = match WildcardExpression::parse(wildcard.body) {
                Ok(expr) => match expr.count.map_or(1, |spec| spec.resolve(rng)) {
                    // a zero count drops the wildcard
                    0 => String::new(),
                    count => self.expand_or_fallback(
                        &expr.keyword,
                        count,
                        expr.repeat_allowed,
                        ctx.descend(),
                        rng,
                    ),
                },
                Err(e) => {
                    let nested = WildcardExpression::keyword_of(wildcard.body);
                    tracing::debug!(keyword = nested, error = %e, "malformed wildcard");
                    fallback(nested)
                }
            };

            let span = wildcard.start..wildcard.end;
            output.replace_range(span, &replacement);
        }

        Ok(output)
    }
}

/// The visible placeholder left behind by a failed node.
pub fn fallback(keyword: &str) -> String {
    keyword.to_uppercase()
}

/// Generate one expansion of `keyword` with default limits.
pub fn generate<R: Rng + ?Sized>(keyword: &str, library: &TemplateLibrary, rng: &mut R) -> String {
    Expander::new(library).generate(keyword, rng)
}

/// Generate `amount` top-level picks of `keyword`, joined into one sentence.
pub fn generate_with<R: Rng + ?Sized>(
    keyword: &str,
    library: &TemplateLibrary,
    amount: usize,
    allow_repeat: bool,
    rng: &mut R,
) -> String {
    Expander::new(library).generate_with(keyword, amount, allow_repeat, rng)
}
