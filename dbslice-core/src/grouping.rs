//! Classification of discovered compressed artifacts into singles and
//! multi-part groups.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

static PART_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.*)\.part\d+\.gz$").expect("part name pattern is valid")
});

static BARE_PART_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.*\.part\d+$").expect("bare part name pattern is valid"));

/// Partition of candidate filenames into standalone artifacts and ordered
/// part groups.
#[derive(Debug, Default, PartialEq)]
pub struct PartGroups {
    /// Compressed artifacts that are whole dumps on their own, sorted.
    pub singles: Vec<String>,
    /// Split dumps keyed by base name; parts in ascending index order.
    pub groups: BTreeMap<String, Vec<String>>,
}

impl PartGroups {
    pub fn is_empty(&self) -> bool {
        self.singles.is_empty() && self.groups.is_empty()
    }

    /// Total number of compressed artifacts across singles and groups.
    pub fn artifact_count(&self) -> usize {
        self.singles.len() + self.groups.values().map(Vec::len).sum::<usize>()
    }
}

/// Base name captured from a part filename `<base>.partNNN.gz`, if it is one.
pub fn part_base(name: &str) -> Option<String> {
    PART_NAME.captures(name).map(|caps| caps[1].to_string())
}

/// True for an uncompressed part file (`<base>.partNNN`), as left behind by
/// an interrupted run.
pub fn is_bare_part_name(name: &str) -> bool {
    BARE_PART_NAME.is_match(name)
}

/// Classify filenames by the part pattern `<base>.partNNN.gz`.
///
/// Membership is determined purely by the filename pattern. Group members
/// are sorted lexically, which equals ascending numeric part order for the
/// splitter's fixed-width zero padding.
pub fn group_artifacts<I, S>(names: I) -> PartGroups
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut out = PartGroups::default();
    for name in names {
        let name = name.into();
        match part_base(&name) {
            Some(base) => out.groups.entry(base).or_default().push(name),
            None => out.singles.push(name),
        }
    }
    out.singles.sort();
    for parts in out.groups.values_mut() {
        parts.sort();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singles_and_groups_are_separated() {
        let grouped = group_artifacts([
            "users.sql.gz",
            "orders.sql.part000.gz",
            "orders.sql.part001.gz",
            "events.sql.gz",
        ]);

        assert_eq!(grouped.singles, vec!["events.sql.gz", "users.sql.gz"]);
        assert_eq!(grouped.groups.len(), 1);
        assert_eq!(
            grouped.groups["orders.sql"],
            vec!["orders.sql.part000.gz", "orders.sql.part001.gz"]
        );
        assert_eq!(grouped.artifact_count(), 4);
    }

    #[test]
    fn test_out_of_order_parts_are_sorted() {
        let grouped = group_artifacts(["db.part000.gz", "db.part002.gz", "db.part001.gz"]);

        assert_eq!(
            grouped.groups["db"],
            vec!["db.part000.gz", "db.part001.gz", "db.part002.gz"]
        );
    }

    #[test]
    fn test_grouping_is_idempotent() {
        let names = [
            "a.sql.gz",
            "b.sql.part001.gz",
            "b.sql.part000.gz",
            "c.sql.part000.gz",
        ];
        let first = group_artifacts(names);
        let second = group_artifacts(names);
        assert_eq!(first, second);
    }

    #[test]
    fn test_non_matching_names_are_singles() {
        let grouped = group_artifacts(["db.sql.gz", "db.sql.partial.gz", "notes.txt.gz"]);
        assert!(grouped.groups.is_empty());
        assert_eq!(grouped.singles.len(), 3);
    }

    #[test]
    fn test_bare_part_detection() {
        assert!(is_bare_part_name("db.sql.part000"));
        assert!(is_bare_part_name("db.sql.part42"));
        assert!(!is_bare_part_name("db.sql.part000.gz"));
        assert!(!is_bare_part_name("db.sql"));
    }

    #[test]
    fn test_ordering_breaks_past_padding_width() {
        // Documented boundary: four-digit indices sort before part999
        // lexically. The splitter refuses to produce them; the grouper does
        // not attempt a numeric repair.
        let grouped = group_artifacts(["db.part999.gz", "db.part1000.gz"]);
        assert_eq!(grouped.groups["db"], vec!["db.part1000.gz", "db.part999.gz"]);
    }
}
