use crate::{
    db::DbPool,
    entities::{
        client::{self, ActiveModel as ClientActiveModel, Entity as ClientEntity, Model as ClientModel},
        client_model,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ClientInput {
    #[validate(length(min = 1, max = 255, message = "Client name is required"))]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub contact_person: Option<String>,
    pub submission_start: Option<NaiveDate>,
    pub submission_end: Option<NaiveDate>,
}

impl ClientInput {
    /// Trims every text field and drops blank optional ones.
    fn normalized(self) -> Self {
        fn opt(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }
        Self {
            name: self.name.trim().to_string(),
            email: opt(self.email),
            phone: opt(self.phone),
            address: opt(self.address),
            contact_person: opt(self.contact_person),
            ..self
        }
    }

    fn check(&self) -> Result<(), ServiceError> {
        self.validate()?;
        if let (Some(start), Some(end)) = (self.submission_start, self.submission_end) {
            if start > end {
                return Err(ServiceError::ValidationError(format!(
                    "submission_start {start} is after submission_end {end}"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClientResponse {
    pub id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub contact_person: Option<String>,
    pub submission_start: Option<NaiveDate>,
    pub submission_end: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ClientModel> for ClientResponse {
    fn from(model: ClientModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            phone: model.phone,
            address: model.address,
            contact_person: model.contact_person,
            submission_start: model.submission_start,
            submission_end: model.submission_end,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Client whose submission window closes soon or has already closed
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExpiringClient {
    pub client: ClientResponse,
    pub submission_end: NaiveDate,
    /// Negative once the window has closed
    pub days_remaining: i64,
}

/// Clients with a submission end at most `within_days` after `today`, soonest first.
pub fn expiring_from(
    clients: Vec<ClientModel>,
    today: NaiveDate,
    within_days: i64,
) -> Vec<ExpiringClient> {
    let mut expiring: Vec<ExpiringClient> = clients
        .into_iter()
        .filter_map(|client| {
            let end = client.submission_end?;
            let days_remaining = (end - today).num_days();
            (days_remaining <= within_days).then(|| ExpiringClient {
                submission_end: end,
                days_remaining,
                client: client.into(),
            })
        })
        .collect();
    expiring.sort_by_key(|c| c.days_remaining);
    expiring
}

#[derive(Clone)]
pub struct ClientService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl ClientService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: ClientInput) -> Result<ClientResponse, ServiceError> {
        let input = input.normalized();
        input.check()?;

        let now = Utc::now();
        let model = ClientActiveModel {
            name: Set(input.name),
            email: Set(input.email),
            phone: Set(input.phone),
            address: Set(input.address),
            contact_person: Set(input.contact_person),
            submission_start: Set(input.submission_start),
            submission_end: Set(input.submission_end),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create client");
            ServiceError::DatabaseError(e)
        })?;

        info!(client_id = model.id, "Client created");
        self.event_sender
            .send_or_log(Event::ClientCreated(model.id))
            .await;
        Ok(model.into())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<ClientResponse, ServiceError> {
        ClientEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .map(ClientResponse::from)
            .ok_or_else(|| ServiceError::not_found("Client", id))
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        page: u64,
        limit: u64,
        search: Option<&str>,
    ) -> Result<(Vec<ClientResponse>, u64), ServiceError> {
        let mut query = ClientEntity::find().order_by_asc(client::Column::Name);
        if let Some(term) = search.map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(client::Column::Name.contains(term));
        }

        let paginator = query.paginate(&*self.db_pool, limit);
        let total = paginator.num_items().await?;
        let items = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(|e| {
                error!(error = %e, page, limit, "Failed to fetch clients page");
                ServiceError::DatabaseError(e)
            })?;

        Ok((items.into_iter().map(ClientResponse::from).collect(), total))
    }

    #[instrument(skip(self, input))]
    pub async fn update(&self, id: i32, input: ClientInput) -> Result<ClientResponse, ServiceError> {
        let input = input.normalized();
        input.check()?;

        let existing = ClientEntity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Client", id))?;

        let mut active: ClientActiveModel = existing.into();
        active.name = Set(input.name);
        active.email = Set(input.email);
        active.phone = Set(input.phone);
        active.address = Set(input.address);
        active.contact_person = Set(input.contact_person);
        active.submission_start = Set(input.submission_start);
        active.submission_end = Set(input.submission_end);
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db_pool).await.map_err(|e| {
            error!(error = %e, client_id = id, "Failed to update client");
            ServiceError::DatabaseError(e)
        })?;

        self.event_sender.send_or_log(Event::ClientUpdated(id)).await;
        Ok(updated.into())
    }

    /// Deletes the client together with its models.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        if !self.delete_if_exists(id).await? {
            return Err(ServiceError::not_found("Client", id));
        }
        Ok(())
    }

    pub(crate) async fn delete_if_exists(&self, id: i32) -> Result<bool, ServiceError> {
        let txn = self.db_pool.begin().await?;
        client_model::Entity::delete_many()
            .filter(client_model::Column::ClientId.eq(id))
            .exec(&txn)
            .await?;
        let result = ClientEntity::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        if result.rows_affected == 0 {
            return Ok(false);
        }
        info!(client_id = id, "Client deleted");
        self.event_sender.send_or_log(Event::ClientDeleted(id)).await;
        Ok(true)
    }

    /// Update when `id` names an existing client, create otherwise.
    pub(crate) async fn upsert(
        &self,
        id: Option<i32>,
        input: ClientInput,
    ) -> Result<ClientResponse, ServiceError> {
        if let Some(id) = id {
            if ClientEntity::find_by_id(id).one(&*self.db_pool).await?.is_some() {
                return self.update(id, input).await;
            }
        }
        self.create(input).await
    }

    #[instrument(skip(self))]
    pub async fn expiring(
        &self,
        today: NaiveDate,
        within_days: i64,
    ) -> Result<Vec<ExpiringClient>, ServiceError> {
        let clients = ClientEntity::find()
            .filter(client::Column::SubmissionEnd.is_not_null())
            .all(&*self.db_pool)
            .await?;
        Ok(expiring_from(clients, today, within_days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(id: i32, end: Option<NaiveDate>) -> ClientModel {
        ClientModel {
            id,
            name: format!("Client {id}"),
            email: None,
            phone: None,
            address: None,
            contact_person: None,
            submission_start: None,
            submission_end: end,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn expiring_includes_closed_windows_and_sorts_by_urgency() {
        let clients = vec![
            client(1, Some(day(30))),
            client(2, Some(day(12))),
            client(3, None),
            client(4, Some(day(5))),
        ];
        let expiring = expiring_from(clients, day(10), 15);
        let ids: Vec<i32> = expiring.iter().map(|c| c.client.id).collect();
        assert_eq!(ids, vec![4, 2]);
        assert_eq!(expiring[0].days_remaining, -5);
        assert_eq!(expiring[1].days_remaining, 2);
    }

    #[test]
    fn input_is_trimmed_and_window_checked() {
        let input = ClientInput {
            name: "  Maison Durand ".into(),
            email: Some("  ".into()),
            phone: None,
            address: None,
            contact_person: None,
            submission_start: Some(day(20)),
            submission_end: Some(day(10)),
        }
        .normalized();
        assert_eq!(input.name, "Maison Durand");
        assert_eq!(input.email, None);
        assert!(matches!(input.check(), Err(ServiceError::ValidationError(_))));
    }

    #[test]
    fn blank_name_fails_validation() {
        let input = ClientInput {
            name: "   ".into(),
            email: None,
            phone: None,
            address: None,
            contact_person: None,
            submission_start: None,
            submission_end: None,
        }
        .normalized();
        assert!(input.check().is_err());
    }
}
