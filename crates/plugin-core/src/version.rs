//! Comparable plugin versions.
//!
//! Versions follow Maven's ordering rules. A version string is split into
//! numeric and qualifier items at `.`, at `-` and at every transition
//! between digits and letters; a `-` (or such a transition) opens a nested
//! list. Trailing "null" items (`0`, the empty qualifier and its aliases
//! `ga`, `final`, `release`) are dropped, so `1`, `1.0` and `1.0.0-final`
//! are all equal.
//!
//! Well-known qualifiers order as
//! `alpha < beta < milestone < rc < snapshot < "" < sp`; `a1`, `b1` and
//! `m1` are short for `alpha1`, `beta1` and `milestone1`, and `cr` is `rc`.
//! Unknown qualifiers sort after all of them, alphabetically.
//!
//! ```
//! use plugin_core::PluginVersion;
//!
//! let v = |s: &str| s.parse::<PluginVersion>().unwrap();
//! assert!(v("1.0-alpha1") < v("1.0-beta"));
//! assert!(v("1.0-SNAPSHOT") < v("1.0"));
//! assert!(v("1.0") < v("1.0-sp"));
//! assert_eq!(v("1.0.0"), v("1"));
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

const QUALIFIERS: [&str; 7] = ["alpha", "beta", "milestone", "rc", "snapshot", "", "sp"];

/// Index of the empty qualifier in [`QUALIFIERS`], as compared against.
const RELEASE_INDEX: &str = "5";

/// A version string that does not follow the version grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionParseError {
    #[error("version string is empty")]
    Empty,

    #[error("version '{version}' contains invalid character '{found}'")]
    InvalidCharacter { version: String, found: char },
}

#[derive(Debug, Clone)]
enum Item {
    /// Digits without leading zeros; zero is "0".
    Int(String),
    /// Lowercase qualifier with aliases resolved.
    Qualifier(String),
    List(Vec<Item>),
}

impl Item {
    fn int(digits: &str) -> Self {
        let trimmed = digits.trim_start_matches('0');
        Item::Int(if trimmed.is_empty() { "0" } else { trimmed }.to_string())
    }

    fn qualifier(value: &str, followed_by_digit: bool) -> Self {
        let value = match (followed_by_digit, value) {
            (true, "a") => "alpha",
            (true, "b") => "beta",
            (true, "m") => "milestone",
            (_, "ga" | "final" | "release") => "",
            (_, "cr") => "rc",
            (_, other) => other,
        };
        Item::Qualifier(value.to_string())
    }

    fn parse(is_digit: bool, text: &str) -> Self {
        if is_digit {
            Self::int(text)
        } else {
            Self::qualifier(text, false)
        }
    }

    fn is_null(&self) -> bool {
        match self {
            Item::Int(v) => v == "0",
            Item::Qualifier(q) => q.is_empty(),
            Item::List(items) => items.is_empty(),
        }
    }

    /// Compare against an absent item (the shorter side of a list).
    fn cmp_null(&self) -> Ordering {
        match self {
            Item::Int(v) if v == "0" => Ordering::Equal,
            Item::Int(_) => Ordering::Greater,
            Item::Qualifier(q) => comparable(q).as_str().cmp(RELEASE_INDEX),
            Item::List(items) => items.first().map_or(Ordering::Equal, Item::cmp_null),
        }
    }

    fn cmp_item(&self, other: &Item) -> Ordering {
        match (self, other) {
            (Item::Int(a), Item::Int(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (Item::Int(_), _) => Ordering::Greater,
            (Item::Qualifier(_), Item::Int(_)) => Ordering::Less,
            (Item::Qualifier(a), Item::Qualifier(b)) => comparable(a).cmp(&comparable(b)),
            (Item::Qualifier(_), Item::List(_)) => Ordering::Less,
            (Item::List(_), Item::Int(_)) => Ordering::Less,
            (Item::List(_), Item::Qualifier(_)) => Ordering::Greater,
            (Item::List(a), Item::List(b)) => cmp_lists(a, b),
        }
    }
}

fn comparable(qualifier: &str) -> String {
    match QUALIFIERS.iter().position(|q| *q == qualifier) {
        Some(index) => index.to_string(),
        None => format!("{}-{qualifier}", QUALIFIERS.len()),
    }
}

fn cmp_lists(a: &[Item], b: &[Item]) -> Ordering {
    let len = a.len().max(b.len());
    for i in 0..len {
        let ordering = match (a.get(i), b.get(i)) {
            (Some(l), Some(r)) => l.cmp_item(r),
            (Some(l), None) => l.cmp_null(),
            (None, Some(r)) => r.cmp_null().reverse(),
            (None, None) => Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Drop trailing null items, looking through nested lists.
fn normalize(items: &mut Vec<Item>) {
    let mut i = items.len();
    while i > 0 {
        i -= 1;
        if items[i].is_null() {
            items.remove(i);
        } else if !matches!(items[i], Item::List(_)) {
            break;
        }
    }
}

/// A parsed, totally ordered plugin version.
///
/// Equality follows the ordering: `1.0` equals `1`. The original text is
/// kept for display.
#[derive(Debug, Clone)]
pub struct PluginVersion {
    raw: String,
    items: Vec<Item>,
}

impl PluginVersion {
    /// Parse a version string.
    ///
    /// Leading and trailing whitespace is ignored. Letters, digits and the
    /// separators `.`, `-`, `_` and `+` are accepted.
    pub fn parse(version: &str) -> Result<Self, VersionParseError> {
        let raw = version.trim();
        if raw.is_empty() {
            return Err(VersionParseError::Empty);
        }
        if let Some(found) = raw
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '+')))
        {
            return Err(VersionParseError::InvalidCharacter {
                version: raw.to_string(),
                found,
            });
        }

        let lower = raw.to_ascii_lowercase();
        // Each open list is a stack frame; a frame is attached to its parent
        // when it is closed.
        let mut stack: Vec<Vec<Item>> = vec![Vec::new()];
        let mut is_digit = false;
        let mut start = 0;

        for (i, c) in lower.char_indices() {
            let current = stack.len() - 1;
            match c {
                '.' | '-' => {
                    let item = if i == start {
                        Item::Int("0".to_string())
                    } else {
                        Item::parse(is_digit, &lower[start..i])
                    };
                    stack[current].push(item);
                    start = i + 1;
                    if c == '-' {
                        stack.push(Vec::new());
                    }
                }
                _ if c.is_ascii_digit() => {
                    if !is_digit && i > start {
                        stack[current].push(Item::qualifier(&lower[start..i], true));
                        start = i;
                        stack.push(Vec::new());
                    }
                    is_digit = true;
                }
                _ => {
                    if is_digit && i > start {
                        stack[current].push(Item::parse(true, &lower[start..i]));
                        start = i;
                        stack.push(Vec::new());
                    }
                    is_digit = false;
                }
            }
        }

        if lower.len() > start {
            let current = stack.len() - 1;
            stack[current].push(Item::parse(is_digit, &lower[start..]));
        }

        let mut items = Vec::new();
        while let Some(mut list) = stack.pop() {
            normalize(&mut list);
            match stack.last_mut() {
                Some(parent) => parent.push(Item::List(list)),
                None => items = list,
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            items,
        })
    }

    /// The version every unversioned plugin compares as.
    pub fn zero() -> Self {
        Self {
            raw: "0".to_string(),
            items: Vec::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for PluginVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PluginVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Ord for PluginVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_lists(&self.items, &other.items)
    }
}

impl PartialOrd for PluginVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for PluginVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PluginVersion {}

impl Serialize for PluginVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}
