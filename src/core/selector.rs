/// Selector — draws items from a pool and joins them into a list sentence.

use rand::Rng;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Deserializer, Serialize};

/// The candidates a selection is drawn from.
///
/// Library files may give a keyword either one template or a list of them,
/// so both shapes are accepted and normalized before any drawing happens.
/// Numbers and booleans in a library file are read as their text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Pool {
    /// A single value. Selecting `n` items yields `n` copies of it.
    Scalar(String),
    /// An ordered list of candidates.
    Collection(Vec<String>),
}

impl Pool {
    /// True when there is nothing to draw from.
    pub fn is_empty(&self) -> bool {
        match self {
            Pool::Scalar(_) => false,
            Pool::Collection(items) => items.is_empty(),
        }
    }

    /// Number of distinct values in the pool.
    pub fn distinct_len(&self) -> usize {
        match self {
            Pool::Scalar(_) => 1,
            Pool::Collection(items) => items.iter().collect::<FxHashSet<_>>().len(),
        }
    }

    /// All candidate strings, in order.
    pub fn items(&self) -> Vec<&str> {
        match self {
            Pool::Scalar(value) => vec![value.as_str()],
            Pool::Collection(items) => items.iter().map(String::as_str).collect(),
        }
    }

    /// Flatten into the working sequence used for drawing.
    fn normalize(&self, amount: usize) -> Vec<&str> {
        match self {
            Pool::Scalar(value) => vec![value.as_str(); amount],
            Pool::Collection(items) => items.iter().map(String::as_str).collect(),
        }
    }
}

/// A scalar as written in a library file.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawScalar {
    Text(String),
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl From<RawScalar> for String {
    fn from(raw: RawScalar) -> Self {
        match raw {
            RawScalar::Text(text) => text,
            RawScalar::Bool(b) => b.to_string(),
            RawScalar::Int(n) => n.to_string(),
            RawScalar::UInt(n) => n.to_string(),
            RawScalar::Float(x) => x.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPool {
    One(RawScalar),
    Many(Vec<RawScalar>),
}

impl<'de> Deserialize<'de> for Pool {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawPool::deserialize(deserializer)? {
            RawPool::One(value) => Pool::Scalar(value.into()),
            RawPool::Many(items) => Pool::Collection(items.into_iter().map(String::from).collect()),
        })
    }
}

impl From<&str> for Pool {
    fn from(value: &str) -> Self {
        Pool::Scalar(value.to_string())
    }
}

impl From<Vec<String>> for Pool {
    fn from(items: Vec<String>) -> Self {
        Pool::Collection(items)
    }
}

impl From<Vec<&str>> for Pool {
    fn from(items: Vec<&str>) -> Self {
        Pool::Collection(items.into_iter().map(str::to_string).collect())
    }
}

/// Draw `amount` values from `pool` and join them as "a, b and c".
///
/// When the pool holds fewer distinct values than `amount`, repetition is
/// allowed regardless of `allow_repeat`. Without repetition every drawn
/// value is removed from the working pool before the next draw.
///
/// Returns `None` for an empty pool or a zero amount.
pub fn select<R: Rng + ?Sized>(
    pool: &Pool,
    amount: usize,
    allow_repeat: bool,
    rng: &mut R,
) -> Option<String> {
    if amount == 0 || pool.is_empty() {
        return None;
    }

    let mut working = pool.normalize(amount);
    let allow_repeat = allow_repeat || pool.distinct_len() < amount;

    let mut picked = Vec::with_capacity(amount);
    for _ in 0..amount {
        if working.is_empty() {
            return None;
        }
        let choice = working[rng.gen_range(0..working.len())];
        picked.push(choice);
        if !allow_repeat {
            working.retain(|item| *item != choice);
        }
    }

    Some(join_list(&picked))
}

/// Join items as a natural-language list: "a", "a and b", "a, b and c".
pub fn join_list(items: &[&str]) -> String {
    let mut output = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 && i + 1 == items.len() {
            output.push_str(" and ");
        } else if i > 0 {
            output.push_str(", ");
        }
        output.push_str(item);
    }
    output
}
