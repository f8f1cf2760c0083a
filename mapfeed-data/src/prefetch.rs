//! Bulk prefetch of changeset owners from SQLite.
//!
//! Attribution lookups during extraction never touch the database; the
//! owners of every changeset a result set references are loaded up front
//! into a [`ChangesetCache`].

use mapfeed_core::{ChangesetCache, ChangesetOwner};
use rusqlite::{Connection, params_from_iter};
use thiserror::Error;

/// SQLite limits bound parameters per statement to 999 by default. The
/// prefetch chunks `IN` queries to remain below that ceiling.
const SQLITE_MAX_VARIABLE_NUMBER: usize = 999;

/// Errors raised while prefetching changeset owners.
#[derive(Debug, Error)]
pub enum PrefetchError {
    /// Querying the owner table failed.
    #[error("failed to load changeset owners: {source}")]
    Query {
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A stored user id was negative.
    #[error("changeset {changeset} has invalid owner id {user_id}")]
    InvalidUserId {
        /// The changeset whose owner was rejected.
        changeset: i64,
        /// The stored user id.
        user_id: i64,
    },
}

impl From<rusqlite::Error> for PrefetchError {
    fn from(source: rusqlite::Error) -> Self {
        Self::Query { source }
    }
}

/// Load owners for `changesets` from the `changeset_owners` table.
///
/// The table is expected to have the columns `changeset_id`, `user_id`,
/// `display_name` and `data_public`. Ids without a row stay absent from the
/// returned cache, so extraction reports them as unresolved.
///
/// # Errors
///
/// Returns [`PrefetchError`] when a query fails or a stored user id is
/// negative.
///
/// # Examples
///
/// ```
/// use mapfeed_data::prefetch::load_changeset_owners;
/// use rusqlite::Connection;
///
/// let connection = Connection::open_in_memory()?;
/// connection.execute_batch(
///     "CREATE TABLE changeset_owners (
///          changeset_id INTEGER PRIMARY KEY,
///          user_id INTEGER NOT NULL,
///          display_name TEXT NOT NULL,
///          data_public INTEGER NOT NULL
///      );
///      INSERT INTO changeset_owners VALUES (1, 10, 'alice', 1);",
/// )?;
/// let mut cache = load_changeset_owners(&connection, &[1, 2])?;
/// assert_eq!(cache.attribution(1).user_id(), Some(10));
/// assert!(!cache.contains(2));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn load_changeset_owners(
    connection: &Connection,
    changesets: &[i64],
) -> Result<ChangesetCache, PrefetchError> {
    let mut ids = changesets.to_vec();
    ids.sort_unstable();
    ids.dedup();

    let mut cache = ChangesetCache::new();
    for chunk in ids.chunks(SQLITE_MAX_VARIABLE_NUMBER) {
        load_owners_chunk(connection, chunk, &mut cache)?;
    }
    Ok(cache)
}

fn load_owners_chunk(
    connection: &Connection,
    ids: &[i64],
    cache: &mut ChangesetCache,
) -> Result<(), PrefetchError> {
    let placeholders = vec!["?"; ids.len()].join(", ");
    let query = format!(
        "SELECT changeset_id, user_id, display_name, data_public \
         FROM changeset_owners WHERE changeset_id IN ({placeholders})"
    );
    let mut statement = connection.prepare(&query)?;
    let mut rows = statement.query(params_from_iter(ids.iter()))?;

    while let Some(row) = rows.next()? {
        let changeset: i64 = row.get(0)?;
        let user_id: i64 = row.get(1)?;
        let display_name: String = row.get(2)?;
        let data_public: bool = row.get(3)?;
        let user_id = u64::try_from(user_id)
            .map_err(|_| PrefetchError::InvalidUserId { changeset, user_id })?;
        cache.insert(
            changeset,
            ChangesetOwner {
                data_public,
                display_name,
                user_id,
            },
        );
    }
    Ok(())
}
