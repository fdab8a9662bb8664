//! SQL mapping for the `notes` table.

use crate::db::DbResult;
use crate::model::note::NoteId;
use crate::model::values::{ColumnValue, ContentRow, ContentValues};
use rusqlite::{params_from_iter, Connection};

/// Physical table name.
pub const NOTES_TABLE: &str = "notes";

/// SQL boolean expression plus positional `?` arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    clause: Option<String>,
    args: Vec<ColumnValue>,
}

impl Selection {
    /// Matches every row.
    pub fn all() -> Self {
        Self::default()
    }

    /// Creates a selection from an expression and its `?` arguments.
    ///
    /// A blank clause matches every row.
    pub fn new<I, V>(clause: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ColumnValue>,
    {
        let clause = clause.into();
        let clause = if clause.trim().is_empty() {
            None
        } else {
            Some(clause)
        };
        Self {
            clause,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `self AND other`, keeping argument order.
    pub fn and(self, other: Selection) -> Selection {
        let clause = match (self.clause, other.clause) {
            (Some(left), Some(right)) => Some(format!("({left}) AND ({right})")),
            (Some(left), None) => Some(left),
            (None, right) => right,
        };
        let mut args = self.args;
        args.extend(other.args);
        Selection { clause, args }
    }

    pub fn clause(&self) -> Option<&str> {
        self.clause.as_deref()
    }

    pub fn args(&self) -> &[ColumnValue] {
        &self.args
    }

    fn where_sql(&self) -> String {
        match self.clause.as_deref() {
            Some(clause) => format!(" WHERE ({clause})"),
            None => String::new(),
        }
    }
}

/// One output column: storage expression and the public alias it is
/// returned under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectedColumn {
    pub storage: String,
    pub alias: String,
}

/// Fully resolved select request.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectPlan {
    pub columns: Vec<ProjectedColumn>,
    pub selection: Selection,
    pub order_by: Option<String>,
}

impl SelectPlan {
    fn to_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(|column| {
                format!(
                    "{} AS {}",
                    quote_ident(&column.storage),
                    quote_ident(&column.alias)
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!(
            "SELECT {columns} FROM {}{}",
            quote_ident(NOTES_TABLE),
            self.selection.where_sql()
        );
        if let Some(order_by) = self
            .order_by
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
        {
            sql.push_str(" ORDER BY ");
            sql.push_str(order_by);
        }
        sql
    }
}

/// Table gateway over a borrowed connection.
pub struct NotesTable<'conn> {
    conn: &'conn Connection,
}

impl<'conn> NotesTable<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Inserts one row and returns the assigned id.
    ///
    /// `values` must name at least one column; the provider guarantees the
    /// `text` key before calling.
    pub fn insert(&self, values: &ContentValues) -> DbResult<NoteId> {
        let table = quote_ident(NOTES_TABLE);
        let columns = values
            .iter()
            .map(|(column, _)| quote_ident(column))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; values.len()].join(", ");
        self.conn.execute(
            &format!("INSERT INTO {table} ({columns}) VALUES ({placeholders});"),
            params_from_iter(values.iter().map(|(_, value)| value)),
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Runs a select and materializes every row.
    pub fn select(&self, plan: &SelectPlan) -> DbResult<Vec<ContentRow>> {
        let mut stmt = self.conn.prepare(&plan.to_sql())?;
        let mut rows = stmt.query(params_from_iter(plan.selection.args()))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut entries = Vec::with_capacity(plan.columns.len());
            for (idx, column) in plan.columns.iter().enumerate() {
                entries.push((column.alias.clone(), row.get::<_, ColumnValue>(idx)?));
            }
            out.push(ContentRow::from_entries(entries));
        }
        Ok(out)
    }

    /// Applies `values` to every matching row; returns the affected count.
    pub fn update(&self, values: &ContentValues, selection: &Selection) -> DbResult<usize> {
        let assignments = values
            .iter()
            .map(|(column, _)| format!("{} = ?", quote_ident(column)))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {assignments}{};",
            quote_ident(NOTES_TABLE),
            selection.where_sql()
        );
        let params = values
            .iter()
            .map(|(_, value)| value)
            .chain(selection.args().iter());
        let changed = self.conn.execute(&sql, params_from_iter(params))?;
        Ok(changed)
    }

    /// Removes every matching row; returns the removed count.
    pub fn delete(&self, selection: &Selection) -> DbResult<usize> {
        let sql = format!(
            "DELETE FROM {}{};",
            quote_ident(NOTES_TABLE),
            selection.where_sql()
        );
        let changed = self
            .conn
            .execute(&sql, params_from_iter(selection.args()))?;
        Ok(changed)
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::{NotesTable, ProjectedColumn, SelectPlan, Selection};
    use crate::db::open_db_in_memory;
    use crate::model::values::{ColumnValue, ContentValues};

    fn plan(selection: Selection) -> SelectPlan {
        SelectPlan {
            columns: ["id", "text"]
                .into_iter()
                .map(|name| ProjectedColumn {
                    storage: name.to_string(),
                    alias: name.to_string(),
                })
                .collect(),
            selection,
            order_by: Some("id ASC".to_string()),
        }
    }

    #[test]
    fn selection_and_parenthesizes_both_sides() {
        let combined = Selection::new("id = ?", [1_i64]).and(Selection::new(
            "text = ? OR text = ?",
            ["a", "b"],
        ));
        assert_eq!(
            combined.clause(),
            Some("(id = ?) AND (text = ? OR text = ?)")
        );
        assert_eq!(combined.args().len(), 3);
    }

    #[test]
    fn blank_clause_matches_everything() {
        assert_eq!(Selection::new("  ", Vec::<String>::new()), Selection::all());
    }

    #[test]
    fn null_text_insert_is_stored_as_null() {
        let conn = open_db_in_memory().unwrap();
        let table = NotesTable::new(&conn);
        let id = table
            .insert(&ContentValues::new().with("text", ColumnValue::Null))
            .unwrap();

        let rows = table.select(&plan(Selection::new("id = ?", [id]))).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("text"), Some(&ColumnValue::Null));
    }

    #[test]
    fn update_binds_values_before_selection_args() {
        let conn = open_db_in_memory().unwrap();
        let table = NotesTable::new(&conn);
        table.insert(&ContentValues::new().with("text", "a")).unwrap();
        let target = table.insert(&ContentValues::new().with("text", "b")).unwrap();

        let changed = table
            .update(
                &ContentValues::new().with("text", "B"),
                &Selection::new("id = ?", [target]),
            )
            .unwrap();
        assert_eq!(changed, 1);

        let texts = table
            .select(&plan(Selection::all()))
            .unwrap()
            .into_iter()
            .map(|row| row.get("text").and_then(|v| v.as_text()).map(str::to_string))
            .collect::<Vec<_>>();
        assert_eq!(texts, vec![Some("a".to_string()), Some("B".to_string())]);
    }

    #[test]
    fn delete_without_selection_clears_table() {
        let conn = open_db_in_memory().unwrap();
        let table = NotesTable::new(&conn);
        for text in ["x", "y", "z"] {
            table.insert(&ContentValues::new().with("text", text)).unwrap();
        }
        assert_eq!(table.delete(&Selection::all()).unwrap(), 3);
        assert!(table.select(&plan(Selection::all())).unwrap().is_empty());
    }
}
