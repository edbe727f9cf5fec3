use crate::models::{
    BuyListItem, ReadingListItem, ReadingType, TalkNote, Todo, UpdateBuyListItemRequest,
    UpdateTodoRequest,
};
use crate::store::Collection;
use anyhow::Result;
use uuid::Uuid;

impl Collection<Todo> {
    pub async fn by_completed(&self, completed: bool) -> Result<Vec<Todo>> {
        self.filter(|t| t.completed == completed).await
    }

    pub async fn mark_complete(&self, id: Uuid, completed: bool) -> Result<Option<Todo>> {
        let patch = UpdateTodoRequest {
            completed: Some(completed),
            ..Default::default()
        };
        self.update(id, &patch).await
    }
}

impl Collection<BuyListItem> {
    pub async fn by_completed(&self, completed: bool) -> Result<Vec<BuyListItem>> {
        self.filter(|t| t.completed == completed).await
    }

    pub async fn mark_complete(&self, id: Uuid, completed: bool) -> Result<Option<BuyListItem>> {
        let patch = UpdateBuyListItemRequest {
            completed: Some(completed),
            ..Default::default()
        };
        self.update(id, &patch).await
    }
}

impl Collection<TalkNote> {
    pub async fn by_date(&self, date: &str) -> Result<Vec<TalkNote>> {
        self.filter(|t| t.date == date).await
    }
}

impl Collection<ReadingListItem> {
    pub async fn by_type(&self, item_type: ReadingType) -> Result<Vec<ReadingListItem>> {
        self.filter(|r| r.item_type == item_type).await
    }
}
