use super::{fetch_owned, non_empty, patch, query_owned};
use crate::backend::{Collection, DocumentStore};
use crate::error::ServiceResult;
use crate::models::{NewTask, Record, Task};
use chrono::Utc;
use log::info;
use serde_json::json;
use std::sync::Arc;

const EMPTY_TITLE: &str = "Task title cannot be empty.";

#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn DocumentStore>,
    owner: String,
}

impl TaskService {
    pub fn new(store: Arc<dyn DocumentStore>, owner: &str) -> Self {
        TaskService {
            store,
            owner: owner.to_string(),
        }
    }

    pub async fn create(&self, input: NewTask) -> ServiceResult<Task> {
        let mut task = Task {
            id: String::new(),
            owner: self.owner.clone(),
            title: non_empty(&input.title, EMPTY_TITLE)?,
            description: input.description.trim().to_string(),
            completed: false,
            date: input.date,
            time: input.time,
            duration_minutes: input.duration_minutes,
            archived: false,
            created_at: Utc::now(),
        };
        task.id = self
            .store
            .create(Collection::Tasks, task.to_fields()?)
            .await?;
        info!("event=task_create id={}", task.id);
        Ok(task)
    }

    /// All tasks of the user, oldest first.
    pub async fn all(&self) -> ServiceResult<Vec<Task>> {
        let mut tasks: Vec<Task> = query_owned(self.store.as_ref(), &self.owner, &[]).await?;
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(tasks)
    }

    pub async fn get(&self, id: &str) -> ServiceResult<Task> {
        fetch_owned(self.store.as_ref(), &self.owner, id).await
    }

    /// Writes every editable field of `task`.
    pub async fn update(&self, task: &Task) -> ServiceResult<Task> {
        let current = self.get(&task.id).await?;
        let updated = Task {
            title: non_empty(&task.title, EMPTY_TITLE)?,
            description: task.description.trim().to_string(),
            owner: current.owner,
            created_at: current.created_at,
            ..task.clone()
        };
        self.store
            .update(Collection::Tasks, &updated.id, updated.to_fields()?)
            .await?;
        Ok(updated)
    }

    pub async fn toggle_complete(&self, id: &str) -> ServiceResult<Task> {
        let mut task = self.get(id).await?;
        task.completed = !task.completed;
        self.store
            .update(
                Collection::Tasks,
                id,
                patch([("completed", json!(task.completed))]),
            )
            .await?;
        Ok(task)
    }

    pub async fn set_archived(&self, id: &str, archived: bool) -> ServiceResult<Task> {
        let mut task = self.get(id).await?;
        task.archived = archived;
        self.store
            .update(Collection::Tasks, id, patch([("archived", json!(archived))]))
            .await?;
        Ok(task)
    }

    pub async fn delete(&self, id: &str) -> ServiceResult<()> {
        self.get(id).await?;
        self.store.delete(Collection::Tasks, id).await?;
        info!("event=task_delete id={}", id);
        Ok(())
    }
}
