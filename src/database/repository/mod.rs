//! Explicit SQL per domain table. Join tables are queried and written
//! directly; there is no lazy loading, so every relation fetch is a visible
//! query.

pub mod exercises;
pub mod http_refs;
pub mod mentals;
pub mod nutritions;
pub mod taxonomies;
pub mod users;
pub mod workouts;

use std::collections::HashMap;

use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};
use uuid::Uuid;

/// A related row joined through a link table, tagged with the id of the
/// parent it belongs to. Queries select the link column as `parent_id`:
/// `SELECT link.exercise_id AS parent_id, child.* ...`
#[derive(Debug)]
pub struct Linked<T> {
    pub parent_id: Uuid,
    pub item: T,
}

impl<'r, T> FromRow<'r, PgRow> for Linked<T>
where
    T: FromRow<'r, PgRow>,
{
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            parent_id: row.try_get("parent_id")?,
            item: T::from_row(row)?,
        })
    }
}

/// Group linked rows per parent. Rows are expected in ascending child id
/// order (the query's ORDER BY), which is preserved within each group.
pub fn group_by_parent<T>(rows: Vec<Linked<T>>) -> HashMap<Uuid, Vec<T>> {
    let mut grouped: HashMap<Uuid, Vec<T>> = HashMap::new();
    for row in rows {
        grouped.entry(row.parent_id).or_default().push(row.item);
    }
    grouped
}
