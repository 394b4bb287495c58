use rusqlite::OptionalExtension;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::database::Database;
use crate::error::StoreError;

/// A persisted to-do item.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub completed: bool,
}

/// Fields for inserting a task. The id is assigned by the store.
#[derive(Clone, Debug, Deserialize)]
pub struct NewTask {
    pub name: String,
    pub description: Option<String>,
    pub completed: bool,
}

pub struct TaskRepo {
    db: Database,
}

const TASK_COLUMNS: &str = "id, name, description, completed";

fn task_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        completed: row.get(3)?,
    })
}

impl TaskRepo {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// List every task in storage order.
    #[instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<Task>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks"))?;
            let rows = stmt
                .query_map([], task_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Point lookup by id. Absence is `None`, never an error.
    #[instrument(skip(self))]
    pub fn get(&self, id: i64) -> Result<Option<Task>, StoreError> {
        self.db.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                [id],
                task_from_row,
            )
            .optional()
            .map_err(StoreError::from)
        })
    }

    /// Insert a new task and return its assigned id.
    #[instrument(skip(self, new), fields(name = %new.name))]
    pub fn add(&self, new: &NewTask) -> Result<i64, StoreError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tasks (name, description, completed) VALUES (?1, ?2, ?3)",
                rusqlite::params![new.name, new.description, new.completed],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Overwrite name/description of an existing task.
    ///
    /// The existence check and the write are one conditional UPDATE, so a
    /// concurrent delete cannot slip between them. Returns `None` when no
    /// row matched the id.
    #[instrument(skip(self, name, description))]
    pub fn update(
        &self,
        id: i64,
        name: &str,
        description: Option<&str>,
    ) -> Result<Option<Task>, StoreError> {
        self.db.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE tasks SET name = ?1, description = ?2 WHERE id = ?3",
                rusqlite::params![name, description, id],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            conn.query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                [id],
                task_from_row,
            )
            .optional()
            .map_err(StoreError::from)
        })
    }

    /// Flip the completed flag of an existing task.
    ///
    /// Single atomic `completed = NOT completed` statement; no read-modify-
    /// write gap. Returns `None` when no row matched the id.
    #[instrument(skip(self))]
    pub fn toggle_completed(&self, id: i64) -> Result<Option<Task>, StoreError> {
        self.db.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE tasks SET completed = NOT completed WHERE id = ?1",
                [id],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            conn.query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                [id],
                task_from_row,
            )
            .optional()
            .map_err(StoreError::from)
        })
    }

    /// Delete a task by id. Returns whether a row was removed; deleting an
    /// absent id is not an error.
    #[instrument(skip(self))]
    pub fn delete(&self, id: i64) -> Result<bool, StoreError> {
        self.db.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM tasks WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }

    /// Delete every task whose id is in `ids`, in one statement.
    /// Absent ids are silently skipped; returns the number of rows removed.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub fn delete_many(&self, ids: &[i64]) -> Result<usize, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }
        self.db.with_conn(|conn| {
            let placeholders = std::iter::repeat("?")
                .take(ids.len())
                .collect::<Vec<_>>()
                .join(", ");
            let changed = conn.execute(
                &format!("DELETE FROM tasks WHERE id IN ({placeholders})"),
                rusqlite::params_from_iter(ids.iter()),
            )?;
            Ok(changed)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> TaskRepo {
        TaskRepo::new(Database::in_memory().unwrap())
    }

    fn new_task(name: &str) -> NewTask {
        NewTask {
            name: name.to_string(),
            description: None,
            completed: false,
        }
    }

    #[test]
    fn add_then_get_round_trip() {
        let repo = repo();
        let id = repo
            .add(&NewTask {
                name: "Buy milk".into(),
                description: Some("2 litres".into()),
                completed: false,
            })
            .unwrap();

        let task = repo.get(id).unwrap().unwrap();
        assert_eq!(task.id, id);
        assert_eq!(task.name, "Buy milk");
        assert_eq!(task.description.as_deref(), Some("2 litres"));
        assert!(!task.completed);
    }

    #[test]
    fn ids_are_unique() {
        let repo = repo();
        let a = repo.add(&new_task("a")).unwrap();
        let b = repo.add(&new_task("b")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn get_missing_is_none() {
        let repo = repo();
        assert!(repo.get(999).unwrap().is_none());
    }

    #[test]
    fn list_empty() {
        let repo = repo();
        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn list_reflects_mutations() {
        let repo = repo();
        let a = repo.add(&new_task("a")).unwrap();
        let b = repo.add(&new_task("b")).unwrap();
        repo.delete(a).unwrap();

        let all = repo.list().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, b);
        assert_eq!(all[0].name, "b");
    }

    #[test]
    fn update_existing() {
        let repo = repo();
        let id = repo.add(&new_task("old")).unwrap();

        let task = repo
            .update(id, "new", Some("details"))
            .unwrap()
            .unwrap();
        assert_eq!(task.name, "new");
        assert_eq!(task.description.as_deref(), Some("details"));
    }

    #[test]
    fn update_missing_is_none_and_leaves_table_unchanged() {
        let repo = repo();
        let id = repo.add(&new_task("keep")).unwrap();

        assert!(repo.update(id + 1, "x", None).unwrap().is_none());
        assert_eq!(repo.get(id).unwrap().unwrap().name, "keep");
    }

    #[test]
    fn update_does_not_touch_completed() {
        let repo = repo();
        let id = repo.add(&new_task("t")).unwrap();
        repo.toggle_completed(id).unwrap();

        let task = repo.update(id, "t2", None).unwrap().unwrap();
        assert!(task.completed);
    }

    #[test]
    fn toggle_flips_and_flips_back() {
        let repo = repo();
        let id = repo.add(&new_task("t")).unwrap();

        let once = repo.toggle_completed(id).unwrap().unwrap();
        assert!(once.completed);

        let twice = repo.toggle_completed(id).unwrap().unwrap();
        assert!(!twice.completed);
    }

    #[test]
    fn toggle_missing_is_none() {
        let repo = repo();
        assert!(repo.toggle_completed(42).unwrap().is_none());
    }

    #[test]
    fn delete_is_idempotent() {
        let repo = repo();
        let id = repo.add(&new_task("t")).unwrap();

        assert!(repo.delete(id).unwrap());
        assert!(!repo.delete(id).unwrap());
    }

    #[test]
    fn delete_many_skips_missing_ids() {
        let repo = repo();
        let a = repo.add(&new_task("a")).unwrap();
        let b = repo.add(&new_task("b")).unwrap();

        let removed = repo.delete_many(&[a, b, 999]).unwrap();
        assert_eq!(removed, 2);
        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn delete_many_empty_set() {
        let repo = repo();
        assert_eq!(repo.delete_many(&[]).unwrap(), 0);
    }

    #[test]
    fn task_json_shape() {
        let task = Task {
            id: 1,
            name: "Buy milk".into(),
            description: None,
            completed: false,
        };
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 1,
                "name": "Buy milk",
                "description": null,
                "completed": false
            })
        );
    }
}
