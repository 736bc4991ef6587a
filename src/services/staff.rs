use crate::{
    db::DbPool,
    entities::{employee, fiche_production, production_time},
    errors::ServiceError,
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct EmployeeInput {
    #[validate(length(min = 1, max = 255, message = "Employee name is required"))]
    pub name: String,
    pub position: Option<String>,
    pub phone: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmployeeResponse {
    pub id: i32,
    pub name: String,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<employee::Model> for EmployeeResponse {
    fn from(model: employee::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            position: model.position,
            phone: model.phone,
            active: model.active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ProductionTimeInput {
    pub employee_id: i32,
    pub fiche_production_id: Option<i32>,
    pub date: NaiveDate,
    #[validate(range(min = 0, max = 1440, message = "minutes must be between 0 and 1440"))]
    pub minutes: i32,
    #[serde(default)]
    pub pieces: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductionTimeResponse {
    pub id: i32,
    pub employee_id: i32,
    pub employee_name: Option<String>,
    pub fiche_production_id: Option<i32>,
    pub date: NaiveDate,
    pub minutes: i32,
    pub pieces: i32,
    /// None when no time was recorded
    pub pieces_per_hour: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl ProductionTimeResponse {
    fn build(entry: production_time::Model, employee: Option<employee::Model>) -> Self {
        let pieces_per_hour = (entry.minutes > 0)
            .then(|| f64::from(entry.pieces) * 60.0 / f64::from(entry.minutes));
        Self {
            id: entry.id,
            employee_id: entry.employee_id,
            employee_name: employee.map(|e| e.name),
            fiche_production_id: entry.fiche_production_id,
            date: entry.date,
            minutes: entry.minutes,
            pieces: entry.pieces,
            pieces_per_hour,
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductionTimeFilter {
    pub employee_id: Option<i32>,
    pub fiche_production_id: Option<i32>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Employees and the production time they log against sewing sheets.
#[derive(Clone)]
pub struct StaffService {
    db_pool: Arc<DbPool>,
}

impl StaffService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_employee(&self, input: EmployeeInput) -> Result<EmployeeResponse, ServiceError> {
        input.validate()?;
        let now = Utc::now();
        let model = employee::ActiveModel {
            name: Set(input.name.trim().to_string()),
            position: Set(input.position),
            phone: Set(input.phone),
            active: Set(input.active),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;
        info!(employee_id = model.id, "Employee created");
        Ok(model.into())
    }

    #[instrument(skip(self))]
    pub async fn get_employee(&self, id: i32) -> Result<EmployeeResponse, ServiceError> {
        employee::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .map(EmployeeResponse::from)
            .ok_or_else(|| ServiceError::not_found("Employee", id))
    }

    #[instrument(skip(self))]
    pub async fn list_employees(
        &self,
        page: u64,
        limit: u64,
        active_only: bool,
    ) -> Result<(Vec<EmployeeResponse>, u64), ServiceError> {
        let mut query = employee::Entity::find().order_by_asc(employee::Column::Name);
        if active_only {
            query = query.filter(employee::Column::Active.eq(true));
        }
        let paginator = query.paginate(&*self.db_pool, limit);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items.into_iter().map(Into::into).collect(), total))
    }

    #[instrument(skip(self, input))]
    pub async fn update_employee(
        &self,
        id: i32,
        input: EmployeeInput,
    ) -> Result<EmployeeResponse, ServiceError> {
        input.validate()?;
        let existing = employee::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Employee", id))?;

        let mut active: employee::ActiveModel = existing.into();
        active.name = Set(input.name.trim().to_string());
        active.position = Set(input.position);
        active.phone = Set(input.phone);
        active.active = Set(input.active);
        active.updated_at = Set(Utc::now());
        Ok(active.update(&*self.db_pool).await?.into())
    }

    /// Deletes the employee and every time entry they logged.
    #[instrument(skip(self))]
    pub async fn delete_employee(&self, id: i32) -> Result<(), ServiceError> {
        production_time::Entity::delete_many()
            .filter(production_time::Column::EmployeeId.eq(id))
            .exec(&*self.db_pool)
            .await?;
        let result = employee::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Employee", id));
        }
        Ok(())
    }

    async fn check_time_refs(&self, input: &ProductionTimeInput) -> Result<employee::Model, ServiceError> {
        input.validate()?;
        let employee = employee::Entity::find_by_id(input.employee_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::InvalidInput(format!("employee {} does not exist", input.employee_id))
            })?;
        if let Some(sheet_id) = input.fiche_production_id {
            if fiche_production::Entity::find_by_id(sheet_id)
                .one(&*self.db_pool)
                .await?
                .is_none()
            {
                return Err(ServiceError::InvalidInput(format!(
                    "sewing sheet {sheet_id} does not exist"
                )));
            }
        }
        Ok(employee)
    }

    #[instrument(skip(self, input), fields(employee_id = input.employee_id))]
    pub async fn create_time(
        &self,
        input: ProductionTimeInput,
    ) -> Result<ProductionTimeResponse, ServiceError> {
        let employee = self.check_time_refs(&input).await?;
        let entry = production_time::ActiveModel {
            employee_id: Set(input.employee_id),
            fiche_production_id: Set(input.fiche_production_id),
            date: Set(input.date),
            minutes: Set(input.minutes),
            pieces: Set(input.pieces),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;
        Ok(ProductionTimeResponse::build(entry, Some(employee)))
    }

    #[instrument(skip(self))]
    pub async fn get_time(&self, id: i32) -> Result<ProductionTimeResponse, ServiceError> {
        let (entry, employee) = production_time::Entity::find_by_id(id)
            .find_also_related(employee::Entity)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Production time", id))?;
        Ok(ProductionTimeResponse::build(entry, employee))
    }

    #[instrument(skip(self))]
    pub async fn list_times(
        &self,
        page: u64,
        limit: u64,
        filter: &ProductionTimeFilter,
    ) -> Result<(Vec<ProductionTimeResponse>, u64), ServiceError> {
        let mut query = production_time::Entity::find()
            .order_by_desc(production_time::Column::Date)
            .order_by_desc(production_time::Column::Id);
        if let Some(employee_id) = filter.employee_id {
            query = query.filter(production_time::Column::EmployeeId.eq(employee_id));
        }
        if let Some(sheet_id) = filter.fiche_production_id {
            query = query.filter(production_time::Column::FicheProductionId.eq(sheet_id));
        }
        if let Some(from) = filter.from {
            query = query.filter(production_time::Column::Date.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(production_time::Column::Date.lte(to));
        }

        let paginator = query
            .find_also_related(employee::Entity)
            .paginate(&*self.db_pool, limit);
        let total = paginator.num_items().await?;
        let items = paginator
            .fetch_page(page.saturating_sub(1))
            .await?
            .into_iter()
            .map(|(entry, employee)| ProductionTimeResponse::build(entry, employee))
            .collect();
        Ok((items, total))
    }

    #[instrument(skip(self, input))]
    pub async fn update_time(
        &self,
        id: i32,
        input: ProductionTimeInput,
    ) -> Result<ProductionTimeResponse, ServiceError> {
        let existing = production_time::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Production time", id))?;
        let employee = self.check_time_refs(&input).await?;

        let mut active: production_time::ActiveModel = existing.into();
        active.employee_id = Set(input.employee_id);
        active.fiche_production_id = Set(input.fiche_production_id);
        active.date = Set(input.date);
        active.minutes = Set(input.minutes);
        active.pieces = Set(input.pieces);
        let updated = active.update(&*self.db_pool).await?;
        Ok(ProductionTimeResponse::build(updated, Some(employee)))
    }

    #[instrument(skip(self))]
    pub async fn delete_time(&self, id: i32) -> Result<(), ServiceError> {
        let result = production_time::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Production time", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(minutes: i32, pieces: i32) -> production_time::Model {
        production_time::Model {
            id: 1,
            employee_id: 1,
            fiche_production_id: None,
            date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            minutes,
            pieces,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn pieces_per_hour_scales_minutes() {
        let response = ProductionTimeResponse::build(entry(90, 45), None);
        assert_eq!(response.pieces_per_hour, Some(30.0));
    }

    #[test]
    fn no_rate_without_time() {
        assert_eq!(ProductionTimeResponse::build(entry(0, 10), None).pieces_per_hour, None);
    }

    #[test]
    fn minutes_above_a_day_fail_validation() {
        let input = ProductionTimeInput {
            employee_id: 1,
            fiche_production_id: None,
            date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            minutes: 1500,
            pieces: 0,
        };
        assert!(input.validate().is_err());
    }
}
