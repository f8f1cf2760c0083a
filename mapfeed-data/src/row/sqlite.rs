//! `Row` and `RowSource` implementations for `rusqlite` result sets.

use rusqlite::types::ValueRef;

use super::{Row, RowError, RowSource, Value};

impl Row for rusqlite::Row<'_> {
    fn value(&self, column: &'static str) -> Result<Value<'_>, RowError> {
        let value = self.get_ref(column).map_err(|source| match source {
            rusqlite::Error::InvalidColumnName(_) => RowError::MissingColumn { column },
            other => RowError::Sqlite {
                column,
                source: other,
            },
        })?;
        match value {
            ValueRef::Null => Ok(Value::Null),
            ValueRef::Integer(integer) => Ok(Value::Integer(integer)),
            ValueRef::Text(bytes) => std::str::from_utf8(bytes)
                .map(Value::Text)
                .map_err(|_| RowError::InvalidUtf8 { column }),
            ValueRef::Real(_) => Err(RowError::TypeMismatch {
                column,
                expected: "integer or text",
                found: "real",
            }),
            ValueRef::Blob(_) => Err(RowError::TypeMismatch {
                column,
                expected: "integer or text",
                found: "blob",
            }),
        }
    }
}

impl<'stmt> RowSource for rusqlite::Rows<'stmt> {
    type Row<'r>
        = &'r rusqlite::Row<'stmt>
    where
        Self: 'r;

    fn next_row(&mut self) -> Result<Option<Self::Row<'_>>, RowError> {
        self.next().map_err(|source| RowError::Fetch {
            source: Box::new(source),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use rusqlite::Connection;

    #[fixture]
    fn connection() -> Connection {
        let connection = Connection::open_in_memory().expect("open in-memory database");
        connection
            .execute_batch(
                "CREATE TABLE sample (id INTEGER, name TEXT, score REAL, data BLOB);
                 INSERT INTO sample VALUES (1, 'first', 0.5, x'00');
                 INSERT INTO sample VALUES (2, NULL, NULL, NULL);",
            )
            .expect("seed sample table");
        connection
    }

    fn collect_names(connection: &Connection) -> Result<Vec<Option<String>>, RowError> {
        let mut statement = connection
            .prepare("SELECT id, name, score, data FROM sample ORDER BY id")
            .expect("prepare select");
        let mut rows = statement.query([]).expect("run select");
        let mut names = Vec::new();
        while let Some(row) = rows.next_row()? {
            names.push(row.text("name")?.map(str::to_owned));
        }
        Ok(names)
    }

    #[rstest]
    fn reads_columns_by_name(connection: Connection) {
        let names = collect_names(&connection).expect("rows decode");
        assert_eq!(names, vec![Some("first".to_owned()), None]);
    }

    #[rstest]
    #[case("score", "real")]
    #[case("data", "blob")]
    fn rejects_unsupported_storage_classes(
        connection: Connection,
        #[case] column: &'static str,
        #[case] storage: &str,
    ) {
        let mut statement = connection
            .prepare("SELECT id, name, score, data FROM sample WHERE id = 1")
            .expect("prepare select");
        let mut rows = statement.query([]).expect("run select");
        let row = rows.next_row().expect("fetch").expect("one row");
        match row.value(column) {
            Err(RowError::TypeMismatch { found, .. }) => assert_eq!(found, storage),
            other => panic!("expected a type mismatch, got {other:?}"),
        }
    }

    #[rstest]
    fn unknown_column_is_missing(connection: Connection) {
        let mut statement = connection
            .prepare("SELECT id FROM sample WHERE id = 1")
            .expect("prepare select");
        let mut rows = statement.query([]).expect("run select");
        let row = rows.next_row().expect("fetch").expect("one row");
        assert!(matches!(
            row.integer("latitude"),
            Err(RowError::MissingColumn {
                column: "latitude"
            })
        ));
    }
}
