//! Output formatting: terminal table and JSON.

use duelrank_core::{ModelKind, RatingModel, VoteLog};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::bail;

#[derive(Debug, Serialize, PartialEq)]
pub struct RankedItem {
    pub rank: usize,
    pub item: String,
    pub rating: f64,
    pub votes: usize,
    pub starred: bool,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    model: ModelKind,
    items: &'a [RankedItem],
    total_votes: usize,
}

/// Rank `items` by the model's rating, highest first. Equal ratings are
/// ordered by item id. Items without votes sit at the model's baseline.
pub fn rank_items<M: RatingModel + ?Sized>(
    items: &[String],
    model: &M,
    votes: &VoteLog,
    starred: &BTreeSet<String>,
) -> Vec<RankedItem> {
    let counts = votes.vote_count_per_item();
    let mut rated: Vec<(&String, f64)> =
        items.iter().map(|item| (item, model.rating(item))).collect();
    rated.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    rated
        .into_iter()
        .enumerate()
        .map(|(i, (item, rating))| RankedItem {
            rank: i + 1,
            item: item.clone(),
            rating,
            votes: counts.get(item).copied().unwrap_or(0),
            starred: starred.contains(item),
        })
        .collect()
}

/// Print results as a formatted terminal table.
pub fn print_table(rankings: &[RankedItem], model: ModelKind, total_votes: usize) {
    // Find the widest item name for padding, at least "Item"
    let name_width = rankings.iter().map(|r| r.item.len()).max().unwrap_or(4).max(4);
    let precision = match model {
        ModelKind::Elo => 1,
        ModelKind::Davidson => 4,
    };

    println!("   # | {:<name_width$} |    Rating | Votes", "Item");
    println!("-----|-{}-|-----------|------", "-".repeat(name_width));

    for r in rankings {
        let star = if r.starred { " *" } else { "" };
        println!(
            "{:>4} | {:<name_width$} | {:>9.precision$} | {:>5}{star}",
            r.rank, r.item, r.rating, r.votes,
        );
    }

    let starred = rankings.iter().filter(|r| r.starred).count();
    println!(
        "\n{} items ranked from {} votes ({:?} model, {} starred)",
        rankings.len(),
        total_votes,
        model,
        starred
    );
}

/// Print results as JSON.
pub fn print_json(rankings: &[RankedItem], model: ModelKind, total_votes: usize) {
    let output = JsonOutput {
        model,
        items: rankings,
        total_votes,
    };
    let json = serde_json::to_string_pretty(&output)
        .unwrap_or_else(|e| bail(format!("Failed to encode JSON: {e}")));
    println!("{json}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use duelrank_core::{EloRatings, Outcome, Ratings, Vote};

    #[test]
    fn test_rank_items_orders_by_rating_then_id() {
        let ratings: Ratings =
            [("b", 1100.0), ("c", 900.0)].into_iter().map(|(k, v)| (k.to_string(), v)).collect();
        let model = EloRatings::new(ratings);
        let votes = VoteLog::from_votes(vec![Vote::new("b", "c", Outcome::AWins)]);
        let starred: BTreeSet<String> = ["c".to_string()].into_iter().collect();
        let items: Vec<String> = ["d", "c", "b", "a"].iter().map(|s| s.to_string()).collect();

        let ranked = rank_items(&items, &model, &votes, &starred);
        let order: Vec<&str> = ranked.iter().map(|r| r.item.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "d", "c"]);
        assert_eq!(ranked[1].rating, 1000.0);
        assert_eq!(ranked[0].votes, 1);
        assert_eq!(ranked[1].votes, 0);
        assert!(ranked[3].starred);
        assert_eq!(ranked.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }
}
