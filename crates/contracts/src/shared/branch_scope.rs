//! Branch identifiers, the branch registry and the branch scope check.
//!
//! Branch ids reach the system both as JSON numbers and as strings. All of
//! them are normalized into one canonical key on construction, so `1`,
//! `"1"` and `"01"` name the same branch everywhere.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier of one physical branch
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BranchRef(String);

impl BranchRef {
    /// Normalizes `raw`. Returns `None` for blank input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.chars().all(|c| c.is_ascii_digit()) {
            let digits = trimmed.trim_start_matches('0');
            let canonical = if digits.is_empty() { "0" } else { digits };
            return Some(Self(canonical.to_string()));
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn from_number(n: u64) -> Self {
        Self(n.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BranchRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for BranchRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBranchRef {
    Number(u64),
    Text(String),
}

impl<'de> Deserialize<'de> for BranchRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawBranchRef::deserialize(deserializer)? {
            RawBranchRef::Number(n) => Ok(BranchRef::from_number(n)),
            RawBranchRef::Text(s) => BranchRef::parse(&s)
                .ok_or_else(|| serde::de::Error::custom("branch id must not be blank")),
        }
    }
}

/// Reads an optional branch id where a blank string means "no branch".
/// Used for query parameters that forms send empty.
pub fn deserialize_optional_branch<'de, D>(deserializer: D) -> Result<Option<BranchRef>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawBranchRef>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawBranchRef::Number(n)) => Ok(Some(BranchRef::from_number(n))),
        Some(RawBranchRef::Text(s)) => Ok(BranchRef::parse(&s)),
    }
}

/// Set of branches chosen in the caller's context; empty means "all branches"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectedBranches(BTreeSet<BranchRef>);

impl SelectedBranches {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn only(branch: BranchRef) -> Self {
        Self(BTreeSet::from([branch]))
    }

    /// Parses a comma-separated list, skipping blank entries
    pub fn parse_list(raw: &str) -> Self {
        Self(raw.split(',').filter_map(BranchRef::parse).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, branch: &BranchRef) -> bool {
        self.0.contains(branch)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BranchRef> {
        self.0.iter()
    }
}

impl FromIterator<BranchRef> for SelectedBranches {
    fn from_iter<I: IntoIterator<Item = BranchRef>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSelection {
    List(Vec<BranchRef>),
    Csv(String),
}

impl<'de> Deserialize<'de> for SelectedBranches {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawSelection::deserialize(deserializer)? {
            RawSelection::List(items) => items.into_iter().collect(),
            RawSelection::Csv(raw) => SelectedBranches::parse_list(&raw),
        })
    }
}

/// Whether a record tagged with `record_branches` is visible under `selected`.
///
/// An empty selection shows everything. A record without branches is never
/// visible under a non-empty selection.
pub fn in_scope(record_branches: &[BranchRef], selected: &SelectedBranches) -> bool {
    if selected.is_empty() {
        return true;
    }
    record_branches.iter().any(|b| selected.contains(b))
}

/// Entry of the static branch registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchInfo {
    pub id: BranchRef,
    pub name: String,
    #[serde(default)]
    pub province: Option<String>,
}

/// The fixed set of branches known to the back office
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BranchRegistry {
    branches: Vec<BranchInfo>,
}

impl BranchRegistry {
    /// Builds the registry, rejecting duplicate ids
    pub fn new(branches: Vec<BranchInfo>) -> Result<Self, String> {
        let mut seen = BTreeSet::new();
        for b in &branches {
            if !seen.insert(b.id.clone()) {
                return Err(format!("Duplicate branch id: {}", b.id));
            }
            if b.name.trim().is_empty() {
                return Err(format!("Branch {} has no name", b.id));
            }
        }
        Ok(Self { branches })
    }

    pub fn branches(&self) -> &[BranchInfo] {
        &self.branches
    }

    pub fn get(&self, id: &BranchRef) -> Option<&BranchInfo> {
        self.branches.iter().find(|b| &b.id == id)
    }

    pub fn contains(&self, id: &BranchRef) -> bool {
        self.get(id).is_some()
    }

    pub fn name_of(&self, id: &BranchRef) -> Option<&str> {
        self.get(id).map(|b| b.name.as_str())
    }

    /// Display names for `ids`; unregistered ids fall back to the raw key
    pub fn names_of(&self, ids: &[BranchRef]) -> Vec<String> {
        ids.iter()
            .map(|id| {
                self.name_of(id)
                    .map(str::to_string)
                    .unwrap_or_else(|| id.to_string())
            })
            .collect()
    }

    /// Fails on the first id that is not registered
    pub fn ensure_known(&self, ids: &[BranchRef]) -> Result<(), String> {
        match ids.iter().find(|id| !self.contains(id)) {
            Some(unknown) => Err(format!("Unknown branch: {}", unknown)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(raw: &str) -> BranchRef {
        BranchRef::parse(raw).unwrap()
    }

    #[test]
    fn test_numeric_ids_normalize() {
        assert_eq!(b("1"), BranchRef::from_number(1));
        assert_eq!(b("01"), BranchRef::from_number(1));
        assert_eq!(b(" 7 "), BranchRef::from_number(7));
        assert_eq!(b("000"), BranchRef::from_number(0));
        assert_eq!(b("BKK-01").as_str(), "BKK-01");
        assert!(BranchRef::parse("   ").is_none());
    }

    #[test]
    fn test_deserialize_number_or_string() {
        let from_num: BranchRef = serde_json::from_str("3").unwrap();
        let from_str: BranchRef = serde_json::from_str("\"03\"").unwrap();
        assert_eq!(from_num, from_str);
        assert!(serde_json::from_str::<BranchRef>("\"\"").is_err());
        assert_eq!(serde_json::to_string(&from_num).unwrap(), "\"3\"");
    }

    #[test]
    fn test_selection_accepts_list_or_csv() {
        let list: SelectedBranches = serde_json::from_str("[1, \"2\"]").unwrap();
        let csv: SelectedBranches = serde_json::from_str("\"1, 2,,\"").unwrap();
        assert_eq!(list, csv);
        assert!(list.contains(&b("2")));
    }

    #[test]
    fn test_empty_selection_means_all() {
        assert!(in_scope(&[b("1")], &SelectedBranches::all()));
        assert!(in_scope(&[], &SelectedBranches::all()));
    }

    #[test]
    fn test_record_without_branches_never_matches_filter() {
        assert!(!in_scope(&[], &SelectedBranches::only(b("1"))));
    }

    #[test]
    fn test_any_branch_matches() {
        let selected = SelectedBranches::parse_list("2,5");
        assert!(in_scope(&[b("1"), b("5")], &selected));
        assert!(!in_scope(&[b("1"), b("3")], &selected));
    }

    #[test]
    fn test_number_and_string_ids_match_each_other() {
        let record: Vec<BranchRef> = serde_json::from_str("[4]").unwrap();
        let selected = SelectedBranches::parse_list("04");
        assert!(in_scope(&record, &selected));
    }

    #[test]
    fn test_registry_lookup_and_validation() {
        let registry = BranchRegistry::new(vec![
            BranchInfo { id: b("1"), name: "Bang Na".into(), province: None },
            BranchInfo { id: b("2"), name: "Rangsit".into(), province: Some("Pathum Thani".into()) },
        ])
        .unwrap();
        assert_eq!(registry.name_of(&b("01")), Some("Bang Na"));
        assert!(registry.ensure_known(&[b("1"), b("2")]).is_ok());
        assert!(registry.ensure_known(&[b("9")]).is_err());
        assert_eq!(registry.names_of(&[b("2"), b("9")]), vec!["Rangsit", "9"]);
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let dup = BranchRegistry::new(vec![
            BranchInfo { id: b("1"), name: "A".into(), province: None },
            BranchInfo { id: b("01"), name: "B".into(), province: None },
        ]);
        assert!(dup.is_err());
    }
}
