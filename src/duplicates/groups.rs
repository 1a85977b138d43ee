//! Fingerprint grouping and survivor selection.
//!
//! # Overview
//!
//! Files are partitioned into equivalence classes keyed by their content
//! fingerprint. A class with more than one member is a duplicate group; the
//! survivor of a duplicate group is the member whose file name sorts first
//! byte-wise, so repeated runs over the same files always keep the same copy.
//!
//! # Example
//!
//! ```
//! use pdfdedupe::duplicates::{group_by_fingerprint, select_survivor};
//! use pdfdedupe::scanner::{FileRecord, Fingerprint};
//! use std::path::PathBuf;
//! use std::time::SystemTime;
//!
//! let files = vec![
//!     FileRecord::new(PathBuf::from("/in/b.pdf"), 3, SystemTime::now()),
//!     FileRecord::new(PathBuf::from("/in/a.pdf"), 3, SystemTime::now()),
//!     FileRecord::new(PathBuf::from("/in/c.pdf"), 5, SystemTime::now()),
//! ];
//!
//! // Fake fingerprints keyed on size for the example
//! let outcome = group_by_fingerprint(files, |f| {
//!     Ok(Fingerprint::of_bytes(&f.size.to_le_bytes()))
//! });
//!
//! assert_eq!(outcome.groups.len(), 2);
//! let dup = outcome.groups.iter().find(|g| g.is_duplicate()).unwrap();
//! let selection = select_survivor(dup).unwrap();
//! assert_eq!(selection.survivor.display_name(), "a.pdf");
//! ```

use std::collections::HashMap;

use serde::Serialize;

use crate::scanner::{FileRecord, Fingerprint, HashError};

/// Files sharing one content fingerprint.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup {
    /// SHA-256 of the shared content
    pub fingerprint: Fingerprint,
    /// Members, in insertion order until sorted
    pub members: Vec<FileRecord>,
}

impl DuplicateGroup {
    /// Create a group with a single member.
    #[must_use]
    pub fn new(fingerprint: Fingerprint, first: FileRecord) -> Self {
        Self {
            fingerprint,
            members: vec![first],
        }
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// A group is a duplicate group only with two or more members.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        self.members.len() > 1
    }

    /// Number of redundant copies (all members minus one).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.members.len().saturating_sub(1)
    }

    /// Bytes reclaimed by removing every copy but one.
    #[must_use]
    pub fn wasted_bytes(&self) -> u64 {
        self.members.iter().skip(1).map(|m| m.size).sum()
    }

    /// Sort members by file name bytes (full path as tie-breaker).
    pub fn sort_members(&mut self) {
        self.members.sort_by(FileRecord::cmp_by_name);
    }
}

/// Result of grouping a set of files by fingerprint.
#[derive(Debug, Default)]
pub struct GroupingOutcome {
    /// Every equivalence class, sorted by its first member's name
    pub groups: Vec<DuplicateGroup>,
    /// Files whose fingerprint could not be computed
    pub failures: Vec<(FileRecord, HashError)>,
}

impl GroupingOutcome {
    /// Distinct contents seen, one per group: the number of files kept.
    #[must_use]
    pub fn unique_count(&self) -> usize {
        self.groups.len()
    }

    /// Sum over duplicate groups of `members - 1`.
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.groups.iter().map(DuplicateGroup::duplicate_count).sum()
    }

    /// Iterator over duplicate groups only.
    pub fn duplicate_groups(&self) -> impl Iterator<Item = &DuplicateGroup> {
        self.groups.iter().filter(|g| g.is_duplicate())
    }
}

/// Partition `files` into groups keyed by the fingerprint `hash_of` returns.
///
/// Files whose hashing fails land in [`GroupingOutcome::failures`] and in no
/// group. Members keep input order inside a group; groups are returned with
/// sorted members, ordered by their first member's name.
pub fn group_by_fingerprint<I, F>(files: I, mut hash_of: F) -> GroupingOutcome
where
    I: IntoIterator<Item = FileRecord>,
    F: FnMut(&FileRecord) -> Result<Fingerprint, HashError>,
{
    let results = files.into_iter().map(|file| {
        let hash = hash_of(&file);
        (file, hash)
    });
    group_hashed(results)
}

/// Group files whose fingerprints were already computed.
///
/// The input order decides insertion order, so callers hashing in parallel
/// must collect results in scan order first.
pub fn group_hashed<I>(results: I) -> GroupingOutcome
where
    I: IntoIterator<Item = (FileRecord, Result<Fingerprint, HashError>)>,
{
    let mut index: HashMap<Fingerprint, usize> = HashMap::new();
    let mut outcome = GroupingOutcome::default();

    for (file, hash) in results {
        match hash {
            Ok(fingerprint) => match index.get(&fingerprint) {
                Some(&slot) => outcome.groups[slot].members.push(file),
                None => {
                    index.insert(fingerprint, outcome.groups.len());
                    outcome.groups.push(DuplicateGroup::new(fingerprint, file));
                }
            },
            Err(err) => outcome.failures.push((file, err)),
        }
    }

    for group in &mut outcome.groups {
        group.sort_members();
    }
    outcome
        .groups
        .sort_by(|a, b| a.members[0].cmp_by_name(&b.members[0]));

    log::debug!(
        "Grouped into {} fingerprints ({} duplicate groups, {} failures)",
        outcome.groups.len(),
        outcome.duplicate_groups().count(),
        outcome.failures.len()
    );
    outcome
}

/// Decision for one duplicate group.
#[derive(Debug, Clone)]
pub struct Selection {
    /// The retained file
    pub survivor: FileRecord,
    /// Files to remove, in name order
    pub to_remove: Vec<FileRecord>,
}

/// Pick the survivor of a group: the member whose name sorts first.
///
/// The choice depends only on file names, never on input order or
/// modification time. Returns `None` for a group with no members.
#[must_use]
pub fn select_survivor(group: &DuplicateGroup) -> Option<Selection> {
    let mut members = group.members.clone();
    members.sort_by(FileRecord::cmp_by_name);
    let mut members = members.into_iter();
    let survivor = members.next()?;
    Some(Selection {
        survivor,
        to_remove: members.collect(),
    })
}
