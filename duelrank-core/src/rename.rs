//! Carry history across renamed or copied files.
//!
//! Item ids are `/`-separated paths relative to the collection root. When an id
//! referenced by history is no longer enumerated, a replacement is looked for in
//! the same directory whose file stem contains the old stem, e.g.
//! `cat.jpg -> cat (1).jpg` or `cat.jpg -> (1) cat.png`.
//!
//! Matching is first-found, not best-found: candidates are tried in enumeration
//! order and the first acceptable one wins. Two extra rules keep the map 1:1:
//! a candidate that history already references is never taken, and a candidate
//! claimed by one missing item is not offered to another.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::{debug, info};

use crate::snapshot::Snapshot;

/// Old id -> new id. Computed once per load, applied, then dropped.
pub type RenameMap = BTreeMap<String, String>;

/// Everything before the last `/`, or `""` for top-level items.
pub fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// Last path component without its extension.
pub fn file_stem(path: &str) -> &str {
    let name = path.rsplit_once('/').map_or(path, |(_, name)| name);
    match name.rfind('.') {
        Some(dot) if dot > 0 => &name[..dot],
        _ => name,
    }
}

/// Propose a replacement for every history item missing from `current_items`.
pub fn detect_renames(history: &BTreeSet<String>, current_items: &[String]) -> RenameMap {
    let current: HashSet<&str> = current_items.iter().map(String::as_str).collect();
    let mut claimed: HashSet<&str> = HashSet::new();
    let mut renames = RenameMap::new();

    for old in history {
        if current.contains(old.as_str()) {
            continue;
        }
        let old_stem = file_stem(old);
        if old_stem.is_empty() {
            continue;
        }
        let old_dir = parent_dir(old);

        let candidate = current_items.iter().find(|new| {
            !history.contains(*new)
                && !claimed.contains(new.as_str())
                && parent_dir(new) == old_dir
                && file_stem(new).contains(old_stem)
        });

        match candidate {
            Some(new) => {
                debug!(old = %old, new = %new, "renamed item detected");
                claimed.insert(new.as_str());
                renames.insert(old.clone(), new.clone());
            }
            None => debug!(item = %old, "missing item has no rename candidate"),
        }
    }

    renames
}

/// Rewrite a snapshot under `renames`. The input is left as is; a fresh copy
/// comes back with every vote slot, starred entry and rating key updated.
pub fn apply_renames(snapshot: &Snapshot, renames: &RenameMap) -> Snapshot {
    let mut renamed = snapshot.clone();
    if renames.is_empty() {
        return renamed;
    }

    for vote in renamed.votes.votes_mut() {
        if let Some(new) = renames.get(&vote.item_a) {
            vote.item_a = new.clone();
        }
        if let Some(new) = renames.get(&vote.item_b) {
            vote.item_b = new.clone();
        }
    }

    if let Some(starred) = renamed.starred.as_mut() {
        for item in starred.iter_mut() {
            if let Some(new) = renames.get(item) {
                *item = new.clone();
            }
        }
    }

    if let Some(ratings) = renamed.ratings.as_mut() {
        for (old, new) in renames {
            if let Some(rating) = ratings.remove(old) {
                ratings.insert(new.clone(), rating);
            }
        }
    }

    renamed
}

/// Detect and apply renames against the freshly enumerated items.
pub fn reconcile(snapshot: &Snapshot, current_items: &[String]) -> (Snapshot, RenameMap) {
    let mut history = snapshot.votes.items_appearing_in_votes();
    history.extend(snapshot.starred_set());

    let renames = detect_renames(&history, current_items);
    if !renames.is_empty() {
        info!(count = renames.len(), "reconciled renamed items");
    }
    (apply_renames(snapshot, &renames), renames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Outcome, Ratings, Vote};
    use crate::vote_log::VoteLog;

    fn strings(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn history(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_path_helpers() {
        assert_eq!(parent_dir("a/b/c.jpg"), "a/b");
        assert_eq!(parent_dir("c.jpg"), "");
        assert_eq!(file_stem("a/b/c.tar.gz"), "c.tar");
        assert_eq!(file_stem("dir/.hidden"), ".hidden");
        assert_eq!(file_stem("noext"), "noext");
    }

    #[test]
    fn test_detects_suffix_and_prefix_renames() {
        let renames = detect_renames(
            &history(&["pics/cat.jpg", "pics/dog.png"]),
            &strings(&["pics/cat (1).jpg", "pics/(1) dog.png"]),
        );
        assert_eq!(renames["pics/cat.jpg"], "pics/cat (1).jpg");
        assert_eq!(renames["pics/dog.png"], "pics/(1) dog.png");
    }

    #[test]
    fn test_extension_change_is_allowed() {
        let renames = detect_renames(&history(&["clip.mov"]), &strings(&["clip.mp4"]));
        assert_eq!(renames["clip.mov"], "clip.mp4");
    }

    #[test]
    fn test_requires_same_directory() {
        let renames = detect_renames(&history(&["a/cat.jpg"]), &strings(&["b/cat.jpg"]));
        assert!(renames.is_empty());
    }

    #[test]
    fn test_present_items_are_not_renamed() {
        let renames = detect_renames(&history(&["cat.jpg"]), &strings(&["cat.jpg", "cat (1).jpg"]));
        assert!(renames.is_empty());
    }

    #[test]
    fn test_first_candidate_wins() {
        let renames = detect_renames(
            &history(&["cat.jpg"]),
            &strings(&["cat - Copy (2).jpg", "cat (1).jpg"]),
        );
        assert_eq!(renames["cat.jpg"], "cat - Copy (2).jpg");
    }

    #[test]
    fn test_candidates_stay_one_to_one() {
        // "cat" and "cat 2" both match "cat 2 final.jpg"; only the first claims it.
        let renames =
            detect_renames(&history(&["cat 2.jpg", "cat.jpg"]), &strings(&["cat 2 final.jpg"]));
        assert_eq!(renames.len(), 1);
        assert_eq!(renames["cat 2.jpg"], "cat 2 final.jpg");
    }

    #[test]
    fn test_never_merges_into_known_item() {
        // "cat (1).jpg" already has its own history.
        let renames =
            detect_renames(&history(&["cat.jpg", "cat (1).jpg"]), &strings(&["cat (1).jpg"]));
        assert!(renames.is_empty());
    }

    #[test]
    fn test_apply_rewrites_votes_starred_and_ratings() {
        let mut votes = VoteLog::new();
        votes.append(Vote::new("old.jpg", "x.jpg", Outcome::AWins)).unwrap();
        votes.append(Vote::new("x.jpg", "old.jpg", Outcome::Tie)).unwrap();
        votes.append(Vote::new("old.jpg", "other.jpg", Outcome::BWins)).unwrap();
        let ratings: Ratings =
            [("old.jpg".to_string(), 0.0), ("x.jpg".to_string(), 980.0)].into_iter().collect();
        let snapshot = Snapshot {
            starred: Some(strings(&["old.jpg", "x.jpg"])),
            ratings: Some(ratings),
            votes,
            ..Snapshot::default()
        };
        let renames: RenameMap =
            [("old.jpg".to_string(), "new.jpg".to_string())].into_iter().collect();

        let renamed = apply_renames(&snapshot, &renames);

        assert_eq!(renamed.votes.len(), 3);
        assert!(!renamed.votes.items_appearing_in_votes().contains("old.jpg"));
        assert_eq!(renamed.votes.votes()[0], Vote::new("new.jpg", "x.jpg", Outcome::AWins));
        assert_eq!(renamed.votes.votes()[1], Vote::new("x.jpg", "new.jpg", Outcome::Tie));
        assert_eq!(renamed.votes.votes()[2].outcome, Outcome::BWins);
        assert_eq!(renamed.starred, Some(strings(&["new.jpg", "x.jpg"])));

        let ratings = renamed.ratings.as_ref().unwrap();
        // A zero rating is carried like any other.
        assert_eq!(ratings.get("new.jpg"), Some(&0.0));
        assert!(!ratings.contains_key("old.jpg"));
        assert_eq!(ratings["x.jpg"], 980.0);

        // Source snapshot untouched.
        assert_eq!(snapshot.votes.votes()[0].item_a, "old.jpg");
    }

    #[test]
    fn test_reconcile_covers_starred_only_items() {
        let mut votes = VoteLog::new();
        votes.append(Vote::new("a.jpg", "b.jpg", Outcome::AWins)).unwrap();
        let snapshot = Snapshot {
            starred: Some(strings(&["fav.png"])),
            votes,
            ..Snapshot::default()
        };

        let (reconciled, renames) =
            reconcile(&snapshot, &strings(&["a.jpg", "b (1).jpg", "fav (edited).png"]));
        assert_eq!(renames.len(), 2);
        assert_eq!(reconciled.votes.votes()[0], Vote::new("a.jpg", "b (1).jpg", Outcome::AWins));
        assert_eq!(reconciled.starred_set(), history(&["fav (edited).png"]));
    }

    #[test]
    fn test_reconcile_orphans_unmatched_items() {
        let mut votes = VoteLog::new();
        votes.append(Vote::new("gone.jpg", "kept.jpg", Outcome::Tie)).unwrap();
        let snapshot = Snapshot { votes, ..Snapshot::default() };

        let (reconciled, renames) = reconcile(&snapshot, &strings(&["kept.jpg", "unrelated.jpg"]));
        assert!(renames.is_empty());
        assert_eq!(reconciled, snapshot);
    }
}
