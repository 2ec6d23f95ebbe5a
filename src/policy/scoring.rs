//! Heuristic scoring for entry and conversion points.
//!
//! Scorers are pure functions of a page, the persona, and the policy, so
//! they are unit-testable in isolation.

use std::collections::BTreeSet;

use super::JourneyPolicy;
use crate::types::{tokenize, Node, Persona};

/// Entry-point score for a page under a persona.
///
/// Formula:
/// ```text
/// entry_score = importance / max(url_depth, 1)
/// if interests(persona) ∩ keywords(page) ≠ ∅: entry_score *= interest_boost
/// ```
pub fn entry_score(page: &Node, persona: &Persona, policy: &JourneyPolicy) -> f64 {
    let depth = page.url_depth().max(1);
    let mut score = page.importance() / f64::from(depth);
    if !persona.interests.is_disjoint(&page.keywords()) {
        score *= policy.interest_boost;
    }
    score
}

/// Conversion-point score for a page.
///
/// Formula:
/// ```text
/// conversion_score = action_weight   · [action keyword in url/title]
///                  + category_weight · [category ∈ conversion categories]
///                  + inbound_weight  · [inbound links ≥ corpus percentile]
/// ```
pub fn conversion_score(
    page: &Node,
    inbound_links: usize,
    inbound_threshold: f64,
    policy: &JourneyPolicy,
) -> f64 {
    let mut score = 0.0;
    if action_keyword_in_url_or_title(page, &policy.action_keywords) {
        score += policy.action_weight;
    }
    if page
        .category()
        .is_some_and(|c| policy.conversion_categories.contains(&c.to_ascii_lowercase()))
    {
        score += policy.category_weight;
    }
    if inbound_links as f64 >= inbound_threshold {
        score += policy.inbound_weight;
    }
    score
}

/// Whether any action-intent keyword appears among the URL path tokens.
pub fn action_keyword_in_url(page: &Node, keywords: &BTreeSet<String>) -> bool {
    page.url()
        .map(crate::types::url_path)
        .is_some_and(|path| tokenize(path).iter().any(|t| keywords.contains(t)))
}

/// Whether any action-intent keyword appears among URL path or title tokens.
pub fn action_keyword_in_url_or_title(page: &Node, keywords: &BTreeSet<String>) -> bool {
    if action_keyword_in_url(page, keywords) {
        return true;
    }
    page.title()
        .is_some_and(|title| tokenize(title).iter().any(|t| keywords.contains(t)))
}

/// Nearest-rank percentile of a set of counts. `p` in [0, 1].
/// Returns 0 for an empty slice.
pub fn percentile(counts: &[usize], p: f64) -> f64 {
    if counts.is_empty() {
        return 0.0;
    }
    let mut sorted = counts.to_vec();
    sorted.sort_unstable();
    let p = p.clamp(0.0, 1.0);
    let rank = (p * sorted.len() as f64).ceil() as usize;
    sorted[rank.saturating_sub(1).min(sorted.len() - 1)] as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeType;
    use proptest::prelude::*;

    fn page(url: &str, importance: f64) -> Node {
        Node::new(url, NodeType::Page)
            .with_attr("url", url)
            .with_attr("importance", importance)
    }

    #[test]
    fn test_entry_score_depth_penalty() {
        let persona = Persona::new("p", "P", Vec::<String>::new());
        let policy = JourneyPolicy::default();

        let root = page("https://uni.edu/", 0.9);
        let deep = page("https://uni.edu/a/b", 0.9);

        let s_root = entry_score(&root, &persona, &policy);
        let s_deep = entry_score(&deep, &persona, &policy);
        assert!((s_root - 0.9).abs() < 1e-9);
        assert!((s_deep - 0.45).abs() < 1e-9);
    }

    #[test]
    fn test_entry_score_interest_boost() {
        let policy = JourneyPolicy::default();
        let page = page("https://uni.edu/research", 0.6);

        let matching = Persona::new("p1", "P1", ["research"]);
        let other = Persona::new("p2", "P2", ["athletics"]);

        let boosted = entry_score(&page, &matching, &policy);
        let plain = entry_score(&page, &other, &policy);
        assert!((boosted - 0.9).abs() < 1e-9);
        assert!((plain - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_conversion_score_components() {
        let policy = JourneyPolicy::default();

        let apply = page("https://uni.edu/apply", 0.5).with_attr("category", "admissions");
        // action (0.5) + category (0.3) + inbound (0.2)
        assert!((conversion_score(&apply, 10, 4.0, &policy) - 1.0).abs() < 1e-9);
        // below the inbound threshold
        assert!((conversion_score(&apply, 3, 4.0, &policy) - 0.8).abs() < 1e-9);

        let news = page("https://uni.edu/news", 0.5);
        assert!((conversion_score(&news, 0, 4.0, &policy)).abs() < 1e-9);
    }

    #[test]
    fn test_action_keyword_matches_tokens_not_substrings() {
        let policy = JourneyPolicy::default();
        // "applesauce" must not match "apply"
        let apples = page("https://uni.edu/applesauce", 0.5);
        assert!(!action_keyword_in_url(&apples, &policy.action_keywords));

        let apply_now = page("https://uni.edu/apply-now", 0.5);
        assert!(action_keyword_in_url(&apply_now, &policy.action_keywords));
    }

    #[test]
    fn test_action_keyword_in_title() {
        let policy = JourneyPolicy::default();
        let p = page("https://uni.edu/how-to", 0.5).with_attr("title", "Register your interest");
        assert!(!action_keyword_in_url(&p, &policy.action_keywords));
        assert!(action_keyword_in_url_or_title(&p, &policy.action_keywords));
    }

    #[test]
    fn test_percentile_nearest_rank() {
        assert_eq!(percentile(&[], 0.75), 0.0);
        assert_eq!(percentile(&[5], 0.75), 5.0);
        assert_eq!(percentile(&[1, 2, 3, 4], 0.75), 3.0);
        assert_eq!(percentile(&[4, 1, 3, 2], 1.0), 4.0);
        assert_eq!(percentile(&[1, 2, 3, 4], 0.0), 1.0);
    }

    proptest! {
        #[test]
        fn prop_entry_score_nonnegative_and_bounded(
            importance in 0.0f64..=1.0,
            depth in 0i64..=12,
            boost_applies in any::<bool>(),
        ) {
            let policy = JourneyPolicy::default();
            let persona = if boost_applies {
                Persona::new("p", "P", ["topic"])
            } else {
                Persona::new("p", "P", Vec::<String>::new())
            };
            let page = Node::new("n", NodeType::Page)
                .with_attr("importance", importance)
                .with_attr("url_depth", depth)
                .with_attr("keywords", "topic");
            let score = entry_score(&page, &persona, &policy);
            prop_assert!(score >= 0.0);
            prop_assert!(score <= policy.interest_boost);
        }

        #[test]
        fn prop_conversion_score_bounded_by_weight_sum(
            inbound in 0usize..200,
            threshold in 0.0f64..100.0,
        ) {
            let policy = JourneyPolicy::default();
            let p = page("https://uni.edu/apply", 0.5).with_attr("category", "admissions");
            let score = conversion_score(&p, inbound, threshold, &policy);
            let max = policy.action_weight + policy.category_weight + policy.inbound_weight;
            prop_assert!(score >= 0.0);
            prop_assert!(score <= max + 1e-9);
        }
    }
}
