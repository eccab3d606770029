//! Journal and prayer list filtering (search, month, tag, status).
//!
//! Everything here is pure: filters re-scan the loaded list and keep its
//! order, so the caller's ordering (newest experience first) carries through.

use std::collections::BTreeSet;

use chrono::{Datelike, Month};

use crate::models::{JournalEntry, PrayerRequest, PrayerStatus};

/// Month names shown in the journal sidebar, January first.
pub const MONTH_NAMES: [&str; 12] = [
    "Ianuarie",
    "Februarie",
    "Martie",
    "Aprilie",
    "Mai",
    "Iunie",
    "Iulie",
    "August",
    "Septembrie",
    "Octombrie",
    "Noiembrie",
    "Decembrie",
];

/// Month for a 0-based index (0 = January). `None` above 11.
#[must_use]
pub fn month_from_index(index: u32) -> Option<Month> {
    u8::try_from(index + 1)
        .ok()
        .and_then(|number| Month::try_from(number).ok())
}

/// 0-based index of `month` (January = 0).
#[must_use]
pub fn month_index(month: Month) -> u32 {
    month.number_from_month() - 1
}

/// Active journal list criteria. All set criteria must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    pub query: String,
    pub month: Option<Month>,
    pub tag: Option<String>,
}

impl EntryFilter {
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    #[must_use]
    pub const fn with_month(mut self, month: Month) -> Self {
        self.month = Some(month);
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Clear every criterion.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.query.trim().is_empty() && self.month.is_none() && self.tag.is_none()
    }

    #[must_use]
    pub fn matches(&self, entry: &JournalEntry) -> bool {
        entry_matches_query(entry, &normalize_query(&self.query))
            && entry_matches_month(entry, self.month)
            && entry_matches_tag(entry, self.tag.as_deref())
    }
}

/// Entries matching `filter`, in input order.
#[must_use]
pub fn filter_entries(entries: &[JournalEntry], filter: &EntryFilter) -> Vec<JournalEntry> {
    let query = normalize_query(&filter.query);
    entries
        .iter()
        .filter(|entry| entry_matches_query(entry, &query))
        .filter(|entry| entry_matches_month(entry, filter.month))
        .filter(|entry| entry_matches_tag(entry, filter.tag.as_deref()))
        .cloned()
        .collect()
}

/// Sorted, deduplicated tag list across entries.
#[must_use]
pub fn collect_tags(entries: &[JournalEntry]) -> Vec<String> {
    let mut tags = BTreeSet::new();
    for entry in entries {
        for tag in entry.tags.iter() {
            tags.insert(tag.to_string());
        }
    }
    tags.into_iter().collect()
}

/// Trimmed and lowercased; a blank query matches every entry.
fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

// Content is matched as stored, markup included.
fn entry_matches_query(entry: &JournalEntry, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    entry.title.to_lowercase().contains(query) || entry.content.to_lowercase().contains(query)
}

fn entry_matches_month(entry: &JournalEntry, month: Option<Month>) -> bool {
    let Some(month) = month else {
        return true;
    };
    entry
        .experience_date
        .is_some_and(|date| date.month() == month.number_from_month())
}

fn entry_matches_tag(entry: &JournalEntry, tag: Option<&str>) -> bool {
    tag.map_or(true, |tag| entry.has_tag(tag))
}

/// Prayer list status filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    InProgress,
    Answered,
}

impl StatusFilter {
    #[must_use]
    pub fn matches(self, status: PrayerStatus) -> bool {
        match self {
            Self::All => true,
            Self::InProgress => status == PrayerStatus::InProgress,
            Self::Answered => status == PrayerStatus::Answered,
        }
    }
}

/// Prayers whose status passes `status`, in input order.
#[must_use]
pub fn filter_prayers(prayers: &[PrayerRequest], status: StatusFilter) -> Vec<PrayerRequest> {
    prayers
        .iter()
        .filter(|prayer| status.matches(prayer.status))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{EntryId, PrayerId, TagSet, UserId};

    fn entry(title: &str, content: &str, date: Option<(i32, u32, u32)>, tags: &[&str]) -> JournalEntry {
        JournalEntry {
            id: EntryId::new(),
            title: title.to_string(),
            content: content.to_string(),
            experience_date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            tags: tags.iter().copied().collect::<TagSet>(),
            images: Vec::new(),
            user_id: UserId::new("user-1"),
        }
    }

    fn scenario() -> Vec<JournalEntry> {
        vec![
            entry(
                "Answered prayer",
                "<p>Thank you Lord</p>",
                Some((2025, 1, 9)),
                &["multumire"],
            ),
            entry(
                "Struggle",
                "<p>A hard day</p>",
                Some((2025, 1, 7)),
                &["lupta"],
            ),
            entry("Spring walk", "<p>Peace</p>", Some((2025, 3, 2)), &["pace"]),
            entry("Undated", "<p>thoughts</p>", None, &["lupta"]),
        ]
    }

    fn titles(entries: &[JournalEntry]) -> Vec<&str> {
        entries.iter().map(|entry| entry.title.as_str()).collect()
    }

    #[test]
    fn query_matches_title_or_content_case_insensitively() {
        let entries = scenario();
        let filter = EntryFilter::default().with_query("thank");
        assert_eq!(titles(&filter_entries(&entries, &filter)), vec!["Answered prayer"]);

        let filter = EntryFilter::default().with_query("  STRUGGLE ");
        assert_eq!(titles(&filter_entries(&entries, &filter)), vec!["Struggle"]);
    }

    #[test]
    fn whitespace_only_query_matches_everything() {
        let entries = scenario();
        let filter = EntryFilter::default().with_query(" \t ");
        assert_eq!(filter_entries(&entries, &filter).len(), entries.len());

        let filter = EntryFilter::default().with_query(" hard day\n");
        assert_eq!(titles(&filter_entries(&entries, &filter)), vec!["Struggle"]);
    }

    #[test]
    fn month_filter_uses_experience_date() {
        let entries = scenario();
        let january = month_from_index(0).unwrap();
        let filter = EntryFilter::default().with_month(january);
        assert_eq!(
            titles(&filter_entries(&entries, &filter)),
            vec!["Answered prayer", "Struggle"]
        );
    }

    #[test]
    fn undated_entries_never_match_a_month() {
        let entries = scenario();
        for index in 0..12 {
            let filter = EntryFilter::default().with_month(month_from_index(index).unwrap());
            assert!(!titles(&filter_entries(&entries, &filter)).contains(&"Undated"));
        }
    }

    #[test]
    fn tag_filter_is_exact() {
        let entries = scenario();
        let filter = EntryFilter::default().with_tag("lupta");
        assert_eq!(titles(&filter_entries(&entries, &filter)), vec!["Struggle", "Undated"]);

        let filter = EntryFilter::default().with_tag("lup");
        assert!(filter_entries(&entries, &filter).is_empty());
    }

    #[test]
    fn empty_filter_returns_input_unchanged() {
        let entries = scenario();
        let filter = EntryFilter::default().with_query("   ");
        assert!(filter.is_empty());
        assert_eq!(filter_entries(&entries, &filter), entries);
    }

    #[test]
    fn combined_filter_is_intersection_of_single_filters() {
        let entries = scenario();
        let query = EntryFilter::default().with_query("a");
        let month = EntryFilter::default().with_month(Month::January);
        let tag = EntryFilter::default().with_tag("lupta");
        let combined = EntryFilter {
            query: "a".to_string(),
            month: Some(Month::January),
            tag: Some("lupta".to_string()),
        };

        let by_query = filter_entries(&entries, &query);
        let by_month = filter_entries(&entries, &month);
        let by_tag = filter_entries(&entries, &tag);
        let intersection: Vec<JournalEntry> = entries
            .iter()
            .filter(|entry| {
                by_query.contains(entry) && by_month.contains(entry) && by_tag.contains(entry)
            })
            .cloned()
            .collect();

        assert_eq!(filter_entries(&entries, &combined), intersection);
        assert_eq!(titles(&intersection), vec!["Struggle"]);
        assert!(entries.iter().all(|entry| combined.matches(entry) == intersection.contains(entry)));
    }

    #[test]
    fn reset_clears_all_criteria() {
        let mut filter = EntryFilter::default()
            .with_query("x")
            .with_month(Month::May)
            .with_tag("pace");
        filter.reset();
        assert_eq!(filter, EntryFilter::default());
    }

    #[test]
    fn month_index_round_trips_bounds() {
        assert_eq!(month_from_index(0), Some(Month::January));
        assert_eq!(month_from_index(11), Some(Month::December));
        assert_eq!(month_from_index(12), None);
        assert_eq!(month_index(Month::March), 2);
        assert_eq!(MONTH_NAMES[month_index(Month::March) as usize], "Martie");
    }

    #[test]
    fn collects_sorted_unique_tags() {
        assert_eq!(collect_tags(&scenario()), vec!["lupta", "multumire", "pace"]);
    }

    #[test]
    fn filters_prayers_by_status() {
        let prayer = |title: &str, status| PrayerRequest {
            id: PrayerId::new(),
            title: title.to_string(),
            description: None,
            status,
            labels: Vec::new(),
            is_shared: false,
            created_at: Utc::now(),
            answered_at: None,
            user_id: UserId::new("user-1"),
        };
        let prayers = vec![
            prayer("a", PrayerStatus::InProgress),
            prayer("b", PrayerStatus::Answered),
            prayer("c", PrayerStatus::InProgress),
        ];
        let names = |list: Vec<PrayerRequest>| -> Vec<String> {
            list.into_iter().map(|prayer| prayer.title).collect()
        };
        assert_eq!(names(filter_prayers(&prayers, StatusFilter::All)), vec!["a", "b", "c"]);
        assert_eq!(names(filter_prayers(&prayers, StatusFilter::InProgress)), vec!["a", "c"]);
        assert_eq!(names(filter_prayers(&prayers, StatusFilter::Answered)), vec!["b"]);
    }
}
