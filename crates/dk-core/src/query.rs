//! # Query / Filter Engine
//!
//! Pure functions producing filtered, ordered views of in-memory collections.
//! Matching is case-insensitive substring matching; every supplied filter
//! must match. Inputs are never mutated.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::{Item, Thread};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemSort {
    /// `updated_at` descending, missing last.
    #[default]
    #[serde(rename = "recent")]
    MostRecent,
    /// `upvotes` descending; ties by `updated_at` descending.
    #[serde(rename = "upvotes")]
    MostUpvoted,
    /// Case-sensitive lexicographic, missing titles last.
    #[serde(rename = "title")]
    TitleAsc,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreadSort {
    /// `created_at` descending.
    #[default]
    #[serde(rename = "recent")]
    MostRecent,
    /// Post count descending; ties by `created_at` descending.
    #[serde(rename = "replies")]
    MostReplied,
    #[serde(rename = "title")]
    TitleAsc,
}

/// Directory search parameters. Blank strings count as "not supplied".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemQuery {
    /// Free text over title, project code, work type and tags.
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub work_type: Option<String>,
    #[serde(default)]
    pub sort: ItemSort,
}

/// Forum search parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreadQuery {
    /// Free text over title, post text and tags.
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub sort: ThreadSort,
}

/// Lowercased needle, or `None` when the filter was left blank.
/// Whitespace inside a non-blank needle is significant.
fn needle(raw: &Option<String>) -> Option<String> {
    raw.as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_lowercase)
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

impl ItemQuery {
    pub fn matches(&self, item: &Item) -> bool {
        if let Some(q) = needle(&self.q) {
            let hit = contains_ci(&item.title, &q)
                || contains_ci(&item.project_code, &q)
                || contains_ci(&item.work_type, &q)
                || item.tags.iter().any(|t| contains_ci(t, &q));
            if !hit {
                return false;
            }
        }
        if let Some(code) = needle(&self.code) {
            if !contains_ci(&item.project_code, &code) {
                return false;
            }
        }
        if let Some(wt) = needle(&self.work_type) {
            if !contains_ci(&item.work_type, &wt) {
                return false;
            }
        }
        true
    }
}

impl ThreadQuery {
    pub fn matches(&self, thread: &Thread) -> bool {
        let Some(q) = needle(&self.q) else {
            return true;
        };
        contains_ci(&thread.title, &q)
            || thread.posts.iter().any(|p| contains_ci(&p.text, &q))
            || thread.tags.iter().any(|t| contains_ci(t, &q))
    }
}

/// Descending order with `None` after every `Some`.
fn desc_missing_last<T: Ord>(a: &Option<T>, b: &Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Ascending titles, empty (missing) titles last.
fn title_asc(a: &str, b: &str) -> Ordering {
    (a.is_empty(), a).cmp(&(b.is_empty(), b))
}

/// Filters and orders directory items. Sorting is stable.
pub fn filter_items(items: &[Item], query: &ItemQuery) -> Vec<Item> {
    let mut out: Vec<Item> = items.iter().filter(|i| query.matches(i)).cloned().collect();
    match query.sort {
        ItemSort::MostRecent => out.sort_by(|a, b| desc_missing_last(&a.updated_at, &b.updated_at)),
        ItemSort::MostUpvoted => out.sort_by(|a, b| {
            b.upvotes
                .cmp(&a.upvotes)
                .then_with(|| desc_missing_last(&a.updated_at, &b.updated_at))
        }),
        ItemSort::TitleAsc => out.sort_by(|a, b| title_asc(&a.title, &b.title)),
    }
    out
}

/// Filters and orders forum threads. Sorting is stable.
pub fn filter_threads(threads: &[Thread], query: &ThreadQuery) -> Vec<Thread> {
    let mut out: Vec<Thread> = threads.iter().filter(|t| query.matches(t)).cloned().collect();
    match query.sort {
        ThreadSort::MostRecent => out.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        ThreadSort::MostReplied => out.sort_by(|a, b| {
            b.posts
                .len()
                .cmp(&a.posts.len())
                .then_with(|| b.created_at.cmp(&a.created_at))
        }),
        ThreadSort::TitleAsc => out.sort_by(|a, b| title_asc(&a.title, &b.title)),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Post;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use uuid::Uuid;

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn item(title: &str, code: &str, work: &str, tags: &[&str], upvotes: u64, updated: Option<i64>) -> Item {
        Item {
            id: Uuid::now_v7(),
            title: title.into(),
            project_code: code.into(),
            work_type: work.into(),
            links: vec![],
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created_by: "ana".into(),
            created_at: at(0),
            updated_at: updated.map(at),
            upvotes,
        }
    }

    fn thread(title: &str, texts: &[&str], tags: &[&str], created: i64) -> Thread {
        Thread {
            id: Uuid::now_v7(),
            title: title.into(),
            created_by: "ana".into(),
            created_at: at(created),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            posts: texts
                .iter()
                .map(|t| Post { id: Uuid::now_v7(), by: "ana".into(), at: at(created), text: t.to_string() })
                .collect(),
        }
    }

    fn sample() -> Vec<Item> {
        vec![
            item("Carta Status", "FT02", "subestação", &["carta"], 3, Some(10)),
            item("Relatório mensal", "0738", "via", &["status"], 5, Some(20)),
            item("Planta drenagem", "FT03", "drenagem", &[], 5, None),
            item("", "X1", "via", &[], 0, Some(5)),
        ]
    }

    fn titles(items: &[Item]) -> Vec<&str> {
        items.iter().map(|i| i.title.as_str()).collect()
    }

    #[test]
    fn free_text_matches_any_field_case_insensitively() {
        let items = sample();
        let q = ItemQuery { q: Some("ft02".into()), ..Default::default() };
        assert_eq!(titles(&filter_items(&items, &q)), vec!["Carta Status"]);

        // tag hit
        let q = ItemQuery { q: Some("STATUS".into()), sort: ItemSort::TitleAsc, ..Default::default() };
        assert_eq!(titles(&filter_items(&items, &q)), vec!["Carta Status", "Relatório mensal"]);

        // non-ASCII work type
        let q = ItemQuery { q: Some("SUBESTAÇÃO".into()), ..Default::default() };
        assert_eq!(filter_items(&items, &q).len(), 1);
    }

    #[test]
    fn filters_combine_with_and() {
        let items = sample();
        let q = ItemQuery {
            code: Some("ft".into()),
            work_type: Some("DREN".into()),
            ..Default::default()
        };
        assert_eq!(titles(&filter_items(&items, &q)), vec!["Planta drenagem"]);

        let q = ItemQuery { q: Some("carta".into()), work_type: Some("via".into()), ..Default::default() };
        assert!(filter_items(&items, &q).is_empty());
    }

    #[test]
    fn blank_filters_are_ignored() {
        let items = sample();
        let q = ItemQuery { q: Some("   ".into()), code: Some(String::new()), ..Default::default() };
        assert_eq!(filter_items(&items, &q).len(), items.len());
    }

    #[test]
    fn surrounding_whitespace_is_part_of_the_needle() {
        let items = sample();
        let q = ItemQuery { q: Some("status ".into()), ..Default::default() };
        assert!(filter_items(&items, &q).is_empty());

        let q = ItemQuery { q: Some("carta status".into()), ..Default::default() };
        assert_eq!(titles(&filter_items(&items, &q)), vec!["Carta Status"]);

        let threads = vec![thread("Drenagem atraso", &["ok"], &[], 1)];
        let q = ThreadQuery { q: Some(" drenagem".into()), ..Default::default() };
        assert!(filter_threads(&threads, &q).is_empty());
        let q = ThreadQuery { q: Some("DRENAGEM ATRASO".into()), ..Default::default() };
        assert_eq!(filter_threads(&threads, &q).len(), 1);
    }

    #[test]
    fn filtering_is_idempotent() {
        let items = sample();
        let q = ItemQuery { q: Some("a".into()), ..Default::default() };
        let once = filter_items(&items, &q);
        let twice = filter_items(&once, &q);
        assert_eq!(once, twice);
    }

    #[test]
    fn most_recent_puts_missing_updated_at_last() {
        let out = filter_items(&sample(), &ItemQuery::default());
        assert_eq!(titles(&out), vec!["Relatório mensal", "Carta Status", "", "Planta drenagem"]);
    }

    #[test]
    fn most_upvoted_breaks_ties_on_updated_at() {
        let q = ItemQuery { sort: ItemSort::MostUpvoted, ..Default::default() };
        let out = filter_items(&sample(), &q);
        assert_eq!(titles(&out), vec!["Relatório mensal", "Planta drenagem", "Carta Status", ""]);
    }

    #[test]
    fn title_ascending_is_case_sensitive_with_missing_last() {
        let mut items = sample();
        items.push(item("alpha", "Z", "via", &[], 0, None));
        let q = ItemQuery { sort: ItemSort::TitleAsc, ..Default::default() };
        let out = filter_items(&items, &q);
        assert_eq!(
            titles(&out),
            vec!["Carta Status", "Planta drenagem", "Relatório mensal", "alpha", ""]
        );
        let non_empty: Vec<&str> = titles(&out).into_iter().filter(|t| !t.is_empty()).collect();
        assert!(non_empty.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn filter_does_not_mutate_input() {
        let items = sample();
        let before = items.clone();
        let _ = filter_items(&items, &ItemQuery { sort: ItemSort::TitleAsc, ..Default::default() });
        assert_eq!(items, before);
    }

    #[test]
    fn thread_search_covers_title_posts_and_tags() {
        let threads = vec![
            thread("Drenagem atraso", &["Precisamos de revisão"], &[], 0),
            thread("Contrato", &["ver anexo"], &["FT02"], 1),
            thread("Outro", &["nada"], &[], 2),
        ];
        let by = |q: &str| {
            filter_threads(&threads, &ThreadQuery { q: Some(q.into()), sort: ThreadSort::TitleAsc })
                .into_iter()
                .map(|t| t.title)
                .collect::<Vec<_>>()
        };
        assert_eq!(by("drenagem"), vec!["Drenagem atraso"]);
        assert_eq!(by("REVISÃO"), vec!["Drenagem atraso"]);
        assert_eq!(by("ft02"), vec!["Contrato"]);
    }

    #[test]
    fn thread_sort_modes() {
        let threads = vec![
            thread("b", &["1"], &[], 0),
            thread("a", &["1", "2", "3"], &[], 1),
            thread("c", &["1", "2"], &[], 2),
        ];
        let order = |sort| {
            filter_threads(&threads, &ThreadQuery { q: None, sort })
                .into_iter()
                .map(|t| t.title)
                .collect::<Vec<_>>()
        };
        assert_eq!(order(ThreadSort::MostRecent), vec!["c", "a", "b"]);
        assert_eq!(order(ThreadSort::MostReplied), vec!["a", "c", "b"]);
        assert_eq!(order(ThreadSort::TitleAsc), vec!["a", "b", "c"]);
    }

    #[test]
    fn sort_params_use_short_names() {
        let q: ItemQuery = serde_json::from_value(serde_json::json!({"sort": "upvotes"})).unwrap();
        assert_eq!(q.sort, ItemSort::MostUpvoted);
        let q: ThreadQuery = serde_json::from_value(serde_json::json!({"sort": "replies"})).unwrap();
        assert_eq!(q.sort, ThreadSort::MostReplied);
    }
}
