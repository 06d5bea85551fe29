use super::{fetch_owned, non_empty, patch, query_owned};
use crate::backend::{Collection, DocumentStore, Filter};
use crate::error::ServiceResult;
use crate::models::{List, ListItem, Record, LIST_FIELD};
use chrono::Utc;
use futures::future::try_join_all;
use log::info;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

const EMPTY_NAME: &str = "List name cannot be empty.";
const EMPTY_TEXT: &str = "Item text cannot be empty.";

#[derive(Clone)]
pub struct ListService {
    store: Arc<dyn DocumentStore>,
    owner: String,
}

impl ListService {
    pub fn new(store: Arc<dyn DocumentStore>, owner: &str) -> Self {
        ListService {
            store,
            owner: owner.to_string(),
        }
    }

    pub async fn create_list(&self, name: &str) -> ServiceResult<List> {
        let mut list = List {
            id: String::new(),
            name: non_empty(name, EMPTY_NAME)?,
            owner: self.owner.clone(),
            created_at: Utc::now(),
            item_order: Vec::new(),
        };
        list.id = self
            .store
            .create(Collection::Lists, list.to_fields()?)
            .await?;
        info!("event=list_create id={}", list.id);
        Ok(list)
    }

    /// All lists of the user, oldest first.
    pub async fn lists(&self) -> ServiceResult<Vec<List>> {
        let mut lists: Vec<List> = query_owned(self.store.as_ref(), &self.owner, &[]).await?;
        lists.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(lists)
    }

    pub async fn get_list(&self, id: &str) -> ServiceResult<List> {
        fetch_owned(self.store.as_ref(), &self.owner, id).await
    }

    pub async fn rename_list(&self, id: &str, name: &str) -> ServiceResult<List> {
        let mut list = self.get_list(id).await?;
        list.name = non_empty(name, EMPTY_NAME)?;
        self.store
            .update(Collection::Lists, id, patch([("name", json!(list.name))]))
            .await?;
        Ok(list)
    }

    /// Deletes the list together with every item in it.
    pub async fn delete_list(&self, id: &str) -> ServiceResult<()> {
        self.get_list(id).await?;
        let items = self.raw_items(id).await?;
        try_join_all(
            items
                .iter()
                .map(|item| self.store.delete(Collection::ListItems, &item.id)),
        )
        .await?;
        self.store.delete(Collection::Lists, id).await?;
        info!("event=list_delete id={} items={}", id, items.len());
        Ok(())
    }

    pub async fn add_item(&self, list_id: &str, text: &str) -> ServiceResult<ListItem> {
        let text = non_empty(text, EMPTY_TEXT)?;
        let list = self.get_list(list_id).await?;
        let mut item = ListItem {
            id: String::new(),
            list_id: list.id.clone(),
            owner: self.owner.clone(),
            text,
            completed: false,
            created_at: Utc::now(),
        };
        item.id = self
            .store
            .create(Collection::ListItems, item.to_fields()?)
            .await?;

        let mut order = list.item_order;
        order.push(item.id.clone());
        self.store
            .update(Collection::Lists, list_id, patch([("itemOrder", json!(order))]))
            .await?;
        Ok(item)
    }

    /// Items of a list in display order.
    pub async fn items(&self, list_id: &str) -> ServiceResult<Vec<ListItem>> {
        let list = self.get_list(list_id).await?;
        let items = self.raw_items(list_id).await?;
        Ok(order_items(&list.item_order, items))
    }

    async fn raw_items(&self, list_id: &str) -> ServiceResult<Vec<ListItem>> {
        query_owned(
            self.store.as_ref(),
            &self.owner,
            &[Filter::eq(LIST_FIELD, list_id)],
        )
        .await
    }

    pub async fn get_item(&self, id: &str) -> ServiceResult<ListItem> {
        fetch_owned(self.store.as_ref(), &self.owner, id).await
    }

    pub async fn toggle_item(&self, id: &str) -> ServiceResult<ListItem> {
        let mut item = self.get_item(id).await?;
        item.completed = !item.completed;
        self.store
            .update(
                Collection::ListItems,
                id,
                patch([("completed", json!(item.completed))]),
            )
            .await?;
        Ok(item)
    }

    pub async fn edit_item(&self, id: &str, text: &str) -> ServiceResult<ListItem> {
        let mut item = self.get_item(id).await?;
        item.text = non_empty(text, EMPTY_TEXT)?;
        self.store
            .update(Collection::ListItems, id, patch([("text", json!(item.text))]))
            .await?;
        Ok(item)
    }

    pub async fn delete_item(&self, id: &str) -> ServiceResult<()> {
        let item = self.get_item(id).await?;
        self.store.delete(Collection::ListItems, id).await?;

        // The list may already be gone when items are cleaned up late.
        if let Ok(list) = self.get_list(&item.list_id).await {
            let order: Vec<String> = list.item_order.into_iter().filter(|i| i != id).collect();
            self.store
                .update(
                    Collection::Lists,
                    &item.list_id,
                    patch([("itemOrder", json!(order))]),
                )
                .await?;
        }
        Ok(())
    }

    /// Persists a complete new display order in a single write.
    pub async fn reorder_items(&self, list_id: &str, ids: &[String]) -> ServiceResult<()> {
        self.get_list(list_id).await?;
        self.store
            .update(Collection::Lists, list_id, patch([("itemOrder", json!(ids))]))
            .await?;
        info!("event=list_reorder id={} items={}", list_id, ids.len());
        Ok(())
    }
}

/// Orders items by `order`; items missing from it follow by creation time.
pub fn order_items(order: &[String], mut items: Vec<ListItem>) -> Vec<ListItem> {
    let rank: HashMap<&str, usize> = order
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();
    items.sort_by(|a, b| {
        let ra = rank.get(a.id.as_str()).copied().unwrap_or(usize::MAX);
        let rb = rank.get(b.id.as_str()).copied().unwrap_or(usize::MAX);
        ra.cmp(&rb)
            .then_with(|| a.created_at.cmp(&b.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::memory::MemoryBackend;
    use crate::backend::SessionHandle;
    use crate::error::ServiceError;
    use chrono::{Duration, TimeZone};

    fn service() -> (ListService, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new(Arc::new(SessionHandle::default())));
        (ListService::new(backend.clone(), "alice"), backend)
    }

    fn item(id: &str, minute: i64) -> ListItem {
        ListItem {
            id: id.to_string(),
            list_id: "l".to_string(),
            owner: "alice".to_string(),
            text: id.to_string(),
            completed: false,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minute),
        }
    }

    #[test]
    fn test_order_items_puts_unknown_last() {
        let order = vec!["c".to_string(), "a".to_string()];
        let items = vec![item("a", 0), item("b", 2), item("c", 1), item("d", 1)];
        let ids: Vec<String> = order_items(&order, items).into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["c", "a", "d", "b"]);
    }

    #[tokio::test]
    async fn test_add_item_reads_back() {
        let (lists, _) = service();
        let list = lists.create_list("Groceries").await.unwrap();
        let added = lists.add_item(&list.id, " Oat milk ").await.unwrap();

        let items = lists.items(&list.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, added.id);
        assert_eq!(items[0].text, "Oat milk");
        assert!(!items[0].completed);
    }

    #[tokio::test]
    async fn test_blank_item_is_rejected() {
        let (lists, _) = service();
        let list = lists.create_list("Groceries").await.unwrap();
        assert!(matches!(
            lists.add_item(&list.id, "  ").await,
            Err(ServiceError::Validation(EMPTY_TEXT))
        ));
        assert!(matches!(
            lists.create_list("").await,
            Err(ServiceError::Validation(EMPTY_NAME))
        ));
    }

    #[tokio::test]
    async fn test_toggle_item_twice() {
        let (lists, _) = service();
        let list = lists.create_list("Chores").await.unwrap();
        let item = lists.add_item(&list.id, "Dishes").await.unwrap();
        assert!(lists.toggle_item(&item.id).await.unwrap().completed);
        assert!(!lists.toggle_item(&item.id).await.unwrap().completed);
        assert!(!lists.get_item(&item.id).await.unwrap().completed);
    }

    #[tokio::test]
    async fn test_reorder_is_persisted() {
        let (lists, _) = service();
        let list = lists.create_list("Packing").await.unwrap();
        let mut ids = Vec::new();
        for text in ["tent", "stove", "map"] {
            ids.push(lists.add_item(&list.id, text).await.unwrap().id);
        }
        ids.rotate_left(1);
        lists.reorder_items(&list.id, &ids).await.unwrap();

        let texts: Vec<String> = lists
            .items(&list.id)
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.text)
            .collect();
        assert_eq!(texts, vec!["stove", "map", "tent"]);
    }

    #[tokio::test]
    async fn test_delete_item_updates_order() {
        let (lists, _) = service();
        let list = lists.create_list("Packing").await.unwrap();
        let first = lists.add_item(&list.id, "tent").await.unwrap();
        lists.add_item(&list.id, "map").await.unwrap();
        lists.delete_item(&first.id).await.unwrap();

        let list = lists.get_list(&list.id).await.unwrap();
        assert_eq!(list.item_order.len(), 1);
        assert!(!list.item_order.contains(&first.id));
    }

    #[tokio::test]
    async fn test_delete_list_cascades() {
        let (lists, backend) = service();
        let doomed = lists.create_list("Old").await.unwrap();
        let kept = lists.create_list("Keep").await.unwrap();
        for text in ["a", "b", "c"] {
            lists.add_item(&doomed.id, text).await.unwrap();
        }
        lists.add_item(&kept.id, "stays").await.unwrap();

        lists.delete_list(&doomed.id).await.unwrap();

        assert!(lists.raw_items(&doomed.id).await.unwrap().is_empty());
        assert_eq!(backend.document_count(Collection::ListItems), 1);
        assert!(matches!(
            lists.items(&doomed.id).await,
            Err(ServiceError::NotFound { .. })
        ));
        assert_eq!(lists.lists().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rename_list() {
        let (lists, _) = service();
        let list = lists.create_list("Todo").await.unwrap();
        lists.rename_list(&list.id, "Errands").await.unwrap();
        assert_eq!(lists.get_list(&list.id).await.unwrap().name, "Errands");
    }
}
