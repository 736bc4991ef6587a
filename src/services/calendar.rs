use crate::{db::DbPool, entities::calendar_event, errors::ServiceError};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CalendarEventInput {
    #[validate(length(min = 1, max = 255, message = "title is required"))]
    pub title: String,
    pub description: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
    pub client_id: Option<i32>,
}

impl CalendarEventInput {
    fn check(&self) -> Result<(), ServiceError> {
        self.validate()?;
        match self.end_at {
            Some(end) if end < self.start_at => Err(ServiceError::ValidationError(
                "end_at cannot precede start_at".into(),
            )),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CalendarEventResponse {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
    pub client_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<calendar_event::Model> for CalendarEventResponse {
    fn from(model: calendar_event::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            description: model.description,
            start_at: model.start_at,
            end_at: model.end_at,
            client_id: model.client_id,
            created_at: model.created_at,
        }
    }
}

/// Events overlapping `[from, to]`; both bounds optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct CalendarService {
    db_pool: Arc<DbPool>,
}

impl CalendarService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, input), fields(title = %input.title))]
    pub async fn create(&self, input: CalendarEventInput) -> Result<CalendarEventResponse, ServiceError> {
        input.check()?;
        Ok(calendar_event::ActiveModel {
            title: Set(input.title.trim().to_string()),
            description: Set(input.description),
            start_at: Set(input.start_at),
            end_at: Set(input.end_at),
            client_id: Set(input.client_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?
        .into())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<CalendarEventResponse, ServiceError> {
        self.find(id).await.map(Into::into)
    }

    async fn find(&self, id: i32) -> Result<calendar_event::Model, ServiceError> {
        calendar_event::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Event", id))
    }

    #[instrument(skip(self))]
    pub async fn list(&self, range: &CalendarRange) -> Result<Vec<CalendarEventResponse>, ServiceError> {
        let mut query = calendar_event::Entity::find().order_by_asc(calendar_event::Column::StartAt);
        if let Some(to) = range.to {
            query = query.filter(calendar_event::Column::StartAt.lte(to));
        }
        let events = query.all(&*self.db_pool).await?;
        // Events without an end are treated as instantaneous.
        Ok(events
            .into_iter()
            .filter(|e| range.from.map_or(true, |from| e.end_at.unwrap_or(e.start_at) >= from))
            .map(Into::into)
            .collect())
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: i32,
        input: CalendarEventInput,
    ) -> Result<CalendarEventResponse, ServiceError> {
        input.check()?;
        let existing = self.find(id).await?;
        let mut active: calendar_event::ActiveModel = existing.into();
        active.title = Set(input.title.trim().to_string());
        active.description = Set(input.description);
        active.start_at = Set(input.start_at);
        active.end_at = Set(input.end_at);
        active.client_id = Set(input.client_id);
        Ok(active.update(&*self.db_pool).await?.into())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let result = calendar_event::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Event", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn end_before_start_is_rejected() {
        let start = Utc::now();
        let input = CalendarEventInput {
            title: "Essayage".into(),
            description: None,
            start_at: start,
            end_at: Some(start - Duration::hours(1)),
            client_id: None,
        };
        assert!(matches!(input.check(), Err(ServiceError::ValidationError(_))));
    }
}
