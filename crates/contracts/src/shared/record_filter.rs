//! List filtering and sorting shared by every record list.
//!
//! A list request carries [`FilterCriteria`]; the caller's branch context
//! arrives separately as [`SelectedBranches`]. [`filter_records`] applies,
//! in order: text search, category, status, date range and branch scope.
//! All predicates are ANDed.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::branch_scope::{deserialize_optional_branch, in_scope, BranchRef, SelectedBranches};

/// Record types that can go through [`filter_records`]
pub trait ListRecord {
    /// Fields matched by the free-text search
    fn search_fields(&self) -> Vec<&str>;

    fn category(&self) -> Option<&str> {
        None
    }

    fn status(&self) -> Option<&str> {
        None
    }

    /// Date the range filter applies to
    fn record_date(&self) -> Option<NaiveDate> {
        None
    }

    /// `None` when the record type is not branch scoped at all
    fn branch_refs(&self) -> Option<&[BranchRef]> {
        None
    }
}

/// Record types that can be sorted by a named field
pub trait Sortable {
    /// `None` when the field is unknown for this record type
    fn compare_by_field(&self, other: &Self, field: &str) -> Option<Ordering>;
}

/// Per-request list criteria
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
    /// Narrows the list to one branch, replacing the caller's context.
    /// A blank value means no override.
    #[serde(default, deserialize_with = "deserialize_optional_branch")]
    pub branch: Option<BranchRef>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_desc: bool,
}

impl FilterCriteria {
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search: text.into(),
            ..Self::default()
        }
    }

    /// Requested sort field; blank counts as none
    pub fn sort_field(&self) -> Option<&str> {
        self.sort_by
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
    }

    /// Branch set the list is scoped to
    pub fn effective_scope(&self, selected: &SelectedBranches) -> SelectedBranches {
        match &self.branch {
            Some(branch) => SelectedBranches::only(branch.clone()),
            None => selected.clone(),
        }
    }
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

/// Case-insensitive substring match; a blank query matches everything
pub fn matches_search<T: ListRecord>(record: &T, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    record
        .search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

fn matches_exact(value: Option<&str>, wanted: Option<&str>) -> bool {
    match wanted.map(str::trim).filter(|w| !w.is_empty()) {
        None => true,
        Some(w) => value.map_or(false, |v| v.eq_ignore_ascii_case(w)),
    }
}

fn matches_dates(date: Option<NaiveDate>, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    if from.is_none() && to.is_none() {
        return true;
    }
    match date {
        None => false,
        Some(d) => from.map_or(true, |f| d >= f) && to.map_or(true, |t| d <= t),
    }
}

/// Whether one record passes every predicate of `criteria`
pub fn matches_criteria<T: ListRecord>(
    record: &T,
    criteria: &FilterCriteria,
    scope: &SelectedBranches,
) -> bool {
    matches_search(record, &criteria.search)
        && matches_exact(record.category(), criteria.category.as_deref())
        && matches_exact(record.status(), criteria.status.as_deref())
        && matches_dates(record.record_date(), criteria.date_from, criteria.date_to)
        && record.branch_refs().map_or(true, |refs| in_scope(refs, scope))
}

/// Filters `records` keeping their order
pub fn filter_records<T: ListRecord + Clone>(
    records: &[T],
    criteria: &FilterCriteria,
    selected: &SelectedBranches,
) -> Vec<T> {
    let scope = criteria.effective_scope(selected);
    records
        .iter()
        .filter(|r| matches_criteria(*r, criteria, &scope))
        .cloned()
        .collect()
}

/// Stable sort by `field`; unknown fields leave the order unchanged
pub fn sort_list<T: Sortable>(items: &mut [T], field: &str, ascending: bool) {
    items.sort_by(|a, b| {
        let cmp = a.compare_by_field(b, field).unwrap_or(Ordering::Equal);
        if ascending {
            cmp
        } else {
            cmp.reverse()
        }
    });
}

/// Filters, then sorts when the criteria ask for it
pub fn apply_criteria<T: ListRecord + Sortable + Clone>(
    records: &[T],
    criteria: &FilterCriteria,
    selected: &SelectedBranches,
) -> Vec<T> {
    let mut items = filter_records(records, criteria, selected);
    if let Some(field) = criteria.sort_field() {
        sort_list(&mut items, field, !criteria.sort_desc);
    }
    items
}

/// Orders two floats treating NaN as equal
pub fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Case-insensitive string ordering used by `Sortable` impls
pub fn cmp_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: &'static str,
        supplier: &'static str,
        category: &'static str,
        status: &'static str,
        date: NaiveDate,
        branches: Vec<BranchRef>,
        amount: f64,
    }

    impl ListRecord for Row {
        fn search_fields(&self) -> Vec<&str> {
            vec![self.name, self.supplier]
        }
        fn category(&self) -> Option<&str> {
            Some(self.category)
        }
        fn status(&self) -> Option<&str> {
            Some(self.status)
        }
        fn record_date(&self) -> Option<NaiveDate> {
            Some(self.date)
        }
        fn branch_refs(&self) -> Option<&[BranchRef]> {
            Some(self.branches.as_slice())
        }
    }

    impl Sortable for Row {
        fn compare_by_field(&self, other: &Self, field: &str) -> Option<Ordering> {
            match field {
                "name" => Some(cmp_text(self.name, other.name)),
                "amount" => Some(cmp_f64(self.amount, other.amount)),
                _ => None,
            }
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn branches(ids: &[u64]) -> Vec<BranchRef> {
        ids.iter().map(|n| BranchRef::from_number(*n)).collect()
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                name: "Engine Oil 5W-30",
                supplier: "PTT Lubricants",
                category: "oil",
                status: "active",
                date: day(3),
                branches: branches(&[1]),
                amount: 300.0,
            },
            Row {
                name: "Brake Pads",
                supplier: "Bendix",
                category: "brakes",
                status: "active",
                date: day(10),
                branches: branches(&[2]),
                amount: 120.0,
            },
            Row {
                name: "Air Filter",
                supplier: "Sakura",
                category: "filters",
                status: "archived",
                date: day(20),
                branches: branches(&[1, 2]),
                amount: 80.0,
            },
            Row {
                name: "Coolant",
                supplier: "PTT Lubricants",
                category: "oil",
                status: "active",
                date: day(25),
                branches: vec![],
                amount: 50.0,
            },
        ]
    }

    fn names(items: &[Row]) -> Vec<&'static str> {
        items.iter().map(|r| r.name).collect()
    }

    #[test]
    fn test_blank_search_is_noop() {
        let all = rows();
        assert_eq!(filter_records(&all, &FilterCriteria::search(""), &SelectedBranches::all()), all);
        assert_eq!(filter_records(&all, &FilterCriteria::search("   "), &SelectedBranches::all()), all);
    }

    #[test]
    fn test_search_is_case_insensitive_over_all_fields() {
        let found = filter_records(&rows(), &FilterCriteria::search("ptt"), &SelectedBranches::all());
        assert_eq!(names(&found), vec!["Engine Oil 5W-30", "Coolant"]);

        let found = filter_records(&rows(), &FilterCriteria::search("FILTER"), &SelectedBranches::all());
        assert_eq!(names(&found), vec!["Air Filter"]);
    }

    #[test]
    fn test_predicates_are_anded() {
        let criteria = FilterCriteria {
            search: "ptt".into(),
            category: Some("OIL".into()),
            date_from: Some(day(20)),
            ..FilterCriteria::default()
        };
        let found = filter_records(&rows(), &criteria, &SelectedBranches::all());
        assert_eq!(names(&found), vec!["Coolant"]);
    }

    #[test]
    fn test_status_and_blank_category() {
        let criteria = FilterCriteria {
            status: Some("archived".into()),
            category: Some(" ".into()),
            ..FilterCriteria::default()
        };
        let found = filter_records(&rows(), &criteria, &SelectedBranches::all());
        assert_eq!(names(&found), vec!["Air Filter"]);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let criteria = FilterCriteria {
            date_from: Some(day(3)),
            date_to: Some(day(10)),
            ..FilterCriteria::default()
        };
        let found = filter_records(&rows(), &criteria, &SelectedBranches::all());
        assert_eq!(names(&found), vec!["Engine Oil 5W-30", "Brake Pads"]);
    }

    #[test]
    fn test_branch_context_scopes_records() {
        let selected = SelectedBranches::parse_list("2");
        let found = filter_records(&rows(), &FilterCriteria::default(), &selected);
        assert_eq!(names(&found), vec!["Brake Pads", "Air Filter"]);
    }

    #[test]
    fn test_branch_override_replaces_context() {
        let selected = SelectedBranches::parse_list("2");
        let criteria = FilterCriteria {
            branch: BranchRef::parse("1"),
            ..FilterCriteria::default()
        };
        let found = filter_records(&rows(), &criteria, &selected);
        assert_eq!(names(&found), vec!["Engine Oil 5W-30", "Air Filter"]);
    }

    #[test]
    fn test_sorting() {
        let criteria = FilterCriteria {
            sort_by: Some("amount".into()),
            sort_desc: true,
            ..FilterCriteria::default()
        };
        let found = apply_criteria(&rows(), &criteria, &SelectedBranches::all());
        assert_eq!(names(&found), vec!["Engine Oil 5W-30", "Brake Pads", "Air Filter", "Coolant"]);

        let mut by_name = rows();
        sort_list(&mut by_name, "name", true);
        assert_eq!(names(&by_name), vec!["Air Filter", "Brake Pads", "Coolant", "Engine Oil 5W-30"]);
    }

    #[test]
    fn test_blank_sort_field_counts_as_none() {
        let criteria = FilterCriteria {
            sort_by: Some("  ".into()),
            sort_desc: true,
            ..FilterCriteria::default()
        };
        assert_eq!(criteria.sort_field(), None);
        assert_eq!(apply_criteria(&rows(), &criteria, &SelectedBranches::all()), rows());
    }

    #[test]
    fn test_criteria_from_json_treats_blanks_as_absent() {
        let criteria: FilterCriteria =
            serde_json::from_str(r#"{"branch": "", "sort_by": "", "category": "oil"}"#).unwrap();
        assert_eq!(criteria.branch, None);
        assert_eq!(criteria.sort_by, None);

        let criteria: FilterCriteria = serde_json::from_str(r#"{"branch": 2}"#).unwrap();
        assert_eq!(criteria.branch, BranchRef::parse("02"));
        let found = filter_records(&rows(), &criteria, &SelectedBranches::parse_list("1"));
        assert_eq!(names(&found), vec!["Brake Pads", "Air Filter"]);
    }

    #[test]
    fn test_unknown_sort_field_keeps_order() {
        let mut items = rows();
        sort_list(&mut items, "colour", true);
        assert_eq!(items, rows());
    }

    #[test]
    fn test_unscoped_record_type_ignores_branches() {
        #[derive(Clone)]
        struct Note(&'static str);
        impl ListRecord for Note {
            fn search_fields(&self) -> Vec<&str> {
                vec![self.0]
            }
        }
        let notes = vec![Note("a"), Note("b")];
        let found = filter_records(&notes, &FilterCriteria::default(), &SelectedBranches::parse_list("1"));
        assert_eq!(found.len(), 2);
    }
}
