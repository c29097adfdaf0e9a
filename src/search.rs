//! Ranked fuzzy item name search

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::models::ItemDesc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MatchRank {
    Exact,
    Prefix,
    Fuzzy,
}

struct Hit<'a> {
    rank: MatchRank,
    score: i64,
    item: &'a ItemDesc,
}

/// Items whose name contains the characters of `query` in order, ignoring
/// case, best matches first.
///
/// Exact names rank above prefixes and prefixes above other matches. Within
/// the remaining matches a higher fuzzy score wins. Ties go to the shorter
/// name, then alphabetical order.
pub fn search<'a>(
    items: impl IntoIterator<Item = &'a ItemDesc>,
    query: &str,
    limit: usize,
) -> Vec<&'a ItemDesc> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default().ignore_case();
    let lowered = query.to_lowercase();

    let mut hits: Vec<Hit<'a>> = items
        .into_iter()
        .filter_map(|item| {
            let score = matcher.fuzzy_match(&item.name, query)?;
            let name = item.name.to_lowercase();
            let rank = if name == lowered {
                MatchRank::Exact
            } else if name.starts_with(&lowered) {
                MatchRank::Prefix
            } else {
                MatchRank::Fuzzy
            };
            // Score only orders the fuzzy tier.
            let score = if rank == MatchRank::Fuzzy { score } else { 0 };
            Some(Hit { rank, score, item })
        })
        .collect();

    hits.sort_by(|a, b| {
        a.rank
            .cmp(&b.rank)
            .then(b.score.cmp(&a.score))
            .then(a.item.name.len().cmp(&b.item.name.len()))
            .then_with(|| a.item.name.cmp(&b.item.name))
    });

    hits.into_iter().take(limit).map(|hit| hit.item).collect()
}
