//! Ordering properties of plugin versions

use std::cmp::Ordering;

use plugin_core::PluginVersion;
use proptest::prelude::*;

/// Dotted numeric versions with an optional well-known qualifier.
fn version_string() -> impl Strategy<Value = String> {
    let numbers = prop::collection::vec(0u32..12, 1..4)
        .prop_map(|parts| {
            parts
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(".")
        });
    let qualifier = prop::option::of((
        prop::sample::select(vec!["alpha", "beta", "milestone", "rc", "snapshot"]),
        prop::option::of(0u32..4),
    ));
    (numbers, qualifier).prop_map(|(numbers, qualifier)| match qualifier {
        None => numbers,
        Some((q, None)) => format!("{numbers}-{q}"),
        Some((q, Some(n))) => format!("{numbers}-{q}{n}"),
    })
}

fn v(s: &str) -> PluginVersion {
    PluginVersion::parse(s).unwrap()
}

proptest! {
    #[test]
    fn comparison_is_antisymmetric(a in version_string(), b in version_string()) {
        let (a, b) = (v(&a), v(&b));
        prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
    }

    #[test]
    fn exactly_one_relation_holds(a in version_string(), b in version_string()) {
        let (a, b) = (v(&a), v(&b));
        let holds = [a < b, a == b, a > b];
        prop_assert_eq!(holds.iter().filter(|h| **h).count(), 1);
    }

    #[test]
    fn comparison_is_transitive(
        a in version_string(),
        b in version_string(),
        c in version_string(),
    ) {
        let (a, b, c) = (v(&a), v(&b), v(&c));
        if a <= b && b <= c {
            prop_assert!(a <= c, "{} <= {} <= {}", a, b, c);
        }
        if a >= b && b >= c {
            prop_assert!(a >= c, "{} >= {} >= {}", a, b, c);
        }
    }

    #[test]
    fn trailing_zeros_do_not_matter(a in version_string()) {
        if !a.contains('-') {
            prop_assert_eq!(v(&a).cmp(&v(&format!("{a}.0"))), Ordering::Equal);
        }
    }

    #[test]
    fn qualified_sorts_before_release(numbers in prop::collection::vec(0u32..12, 1..4)) {
        let base = numbers.iter().map(u32::to_string).collect::<Vec<_>>().join(".");
        for q in ["alpha", "beta", "milestone", "rc", "snapshot"] {
            let qualified = format!("{base}-{q}");
            prop_assert!(v(&qualified) < v(&base), "{} < {}", qualified, base);
        }
    }
}
