//! Request-scoped changeset attribution.
//!
//! The cache maps changeset ids to their owner's public identity. It is
//! filled by a bulk prefetch before extraction starts and is then consulted
//! once per extracted row.
//!
//! A changeset that was never prefetched is not silently treated as private:
//! the lookup takes an explicit [`Attribution::Unresolved`] branch, logs the
//! miss once and remembers the id so callers can report it. Attribution is
//! suppressed in that branch, exactly as for private changesets.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use log::warn;

/// Owner details for a changeset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangesetOwner {
    /// Whether the owner agreed to attribute their edits publicly.
    pub data_public: bool,
    /// The owner's display name.
    pub display_name: String,
    /// The owner's user id.
    pub user_id: u64,
}

impl ChangesetOwner {
    /// Owner whose edits may be attributed.
    pub fn public(user_id: u64, display_name: impl Into<String>) -> Self {
        Self {
            data_public: true,
            display_name: display_name.into(),
            user_id,
        }
    }

    /// Owner whose edits must stay anonymous.
    pub fn private(user_id: u64, display_name: impl Into<String>) -> Self {
        Self {
            data_public: false,
            ..Self::public(user_id, display_name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CacheEntry {
    Owner(ChangesetOwner),
    Unresolved,
}

/// Outcome of an attribution lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribution<'a> {
    /// The owner is public; the record carries their identity.
    Public {
        /// The owner's user id.
        user_id: u64,
        /// The owner's display name.
        display_name: &'a str,
    },
    /// The owner is known but private.
    Private,
    /// The changeset was never prefetched.
    Unresolved,
}

impl<'a> Attribution<'a> {
    /// User id to expose, if any.
    pub const fn user_id(&self) -> Option<u64> {
        match self {
            Self::Public { user_id, .. } => Some(*user_id),
            Self::Private | Self::Unresolved => None,
        }
    }

    /// Display name to expose, if any.
    pub const fn display_name(&self) -> Option<&'a str> {
        match self {
            Self::Public { display_name, .. } => Some(*display_name),
            Self::Private | Self::Unresolved => None,
        }
    }
}

/// Changeset id to owner mapping, owned by a single extraction call.
///
/// # Examples
/// ```
/// use mapfeed_core::{Attribution, ChangesetCache, ChangesetOwner};
///
/// let mut cache: ChangesetCache = [
///     (1, ChangesetOwner::public(10, "alice")),
///     (2, ChangesetOwner::private(20, "bob")),
/// ]
/// .into_iter()
/// .collect();
///
/// assert_eq!(cache.attribution(1).user_id(), Some(10));
/// assert_eq!(cache.attribution(2), Attribution::Private);
/// assert_eq!(cache.attribution(3), Attribution::Unresolved);
/// assert_eq!(cache.unresolved().collect::<Vec<_>>(), vec![3]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ChangesetCache {
    entries: HashMap<i64, CacheEntry>,
}

impl ChangesetCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the owner of a changeset, replacing any previous entry.
    pub fn insert(&mut self, changeset: i64, owner: ChangesetOwner) {
        self.entries.insert(changeset, CacheEntry::Owner(owner));
    }

    /// Whether the changeset has a prefetched owner.
    pub fn contains(&self, changeset: i64) -> bool {
        matches!(self.entries.get(&changeset), Some(CacheEntry::Owner(_)))
    }

    /// Number of prefetched owners.
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| matches!(entry, CacheEntry::Owner(_)))
            .count()
    }

    /// Whether no owner has been prefetched.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve the attribution for a changeset.
    ///
    /// Misses are recorded and logged on first sight; repeated misses for
    /// the same id stay quiet.
    pub fn attribution(&mut self, changeset: i64) -> Attribution<'_> {
        match self.entries.entry(changeset) {
            Entry::Occupied(entry) => match entry.into_mut() {
                CacheEntry::Owner(owner) if owner.data_public => Attribution::Public {
                    user_id: owner.user_id,
                    display_name: &owner.display_name,
                },
                CacheEntry::Owner(_) => Attribution::Private,
                CacheEntry::Unresolved => Attribution::Unresolved,
            },
            Entry::Vacant(entry) => {
                warn!(
                    "Unresolved changeset: id={changeset} (not prefetched, attribution suppressed)"
                );
                entry.insert(CacheEntry::Unresolved);
                Attribution::Unresolved
            }
        }
    }

    /// Changeset ids that were looked up without a prefetched owner.
    pub fn unresolved(&self) -> impl Iterator<Item = i64> + '_ {
        let mut ids: Vec<i64> = self
            .entries
            .iter()
            .filter(|(_, entry)| matches!(entry, CacheEntry::Unresolved))
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids.into_iter()
    }
}

impl FromIterator<(i64, ChangesetOwner)> for ChangesetCache {
    fn from_iter<I: IntoIterator<Item = (i64, ChangesetOwner)>>(iter: I) -> Self {
        let mut cache = Self::new();
        cache.extend(iter);
        cache
    }
}

impl Extend<(i64, ChangesetOwner)> for ChangesetCache {
    fn extend<I: IntoIterator<Item = (i64, ChangesetOwner)>>(&mut self, iter: I) {
        for (changeset, owner) in iter {
            self.insert(changeset, owner);
        }
    }
}
