use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Lifecycle of invoices and export declarations.
///
/// Stored and serialized as its numeric code. The only automatic transition is
/// Pending → Unpaid once the due date has passed; everything else is set by hand and no
/// state is terminal.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(try_from = "i32", into = "i32")]
pub enum DocumentStatus {
    #[sea_orm(num_value = 1)]
    Draft,
    #[sea_orm(num_value = 2)]
    Pending,
    #[sea_orm(num_value = 3)]
    Paid,
    #[sea_orm(num_value = 4)]
    Cancelled,
    #[sea_orm(num_value = 5)]
    Unpaid,
}

impl DocumentStatus {
    pub fn code(self) -> i32 {
        match self {
            DocumentStatus::Draft => 1,
            DocumentStatus::Pending => 2,
            DocumentStatus::Paid => 3,
            DocumentStatus::Cancelled => 4,
            DocumentStatus::Unpaid => 5,
        }
    }

    /// Status as it must be reported on `today`.
    pub fn effective(self, due_date: Option<NaiveDate>, today: NaiveDate) -> Self {
        match (self, due_date) {
            (DocumentStatus::Pending, Some(due)) if due < today => DocumentStatus::Unpaid,
            (status, _) => status,
        }
    }
}

impl TryFrom<i32> for DocumentStatus {
    type Error = String;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(DocumentStatus::Draft),
            2 => Ok(DocumentStatus::Pending),
            3 => Ok(DocumentStatus::Paid),
            4 => Ok(DocumentStatus::Cancelled),
            5 => Ok(DocumentStatus::Unpaid),
            other => Err(format!("unknown status code {other}, expected 1..=5")),
        }
    }
}

impl From<DocumentStatus> for i32 {
    fn from(status: DocumentStatus) -> Self {
        status.code()
    }
}

impl Default for DocumentStatus {
    fn default() -> Self {
        DocumentStatus::Draft
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn pending_past_due_is_unpaid() {
        let today = day(2024, 6, 10);
        assert_eq!(
            DocumentStatus::Pending.effective(Some(day(2024, 6, 9)), today),
            DocumentStatus::Unpaid
        );
    }

    #[test]
    fn pending_due_today_or_later_stays_pending() {
        let today = day(2024, 6, 10);
        assert_eq!(
            DocumentStatus::Pending.effective(Some(today), today),
            DocumentStatus::Pending
        );
        assert_eq!(
            DocumentStatus::Pending.effective(None, today),
            DocumentStatus::Pending
        );
    }

    #[rstest]
    #[case::draft(DocumentStatus::Draft)]
    #[case::paid(DocumentStatus::Paid)]
    #[case::cancelled(DocumentStatus::Cancelled)]
    #[case::unpaid(DocumentStatus::Unpaid)]
    fn other_statuses_never_transition(#[case] status: DocumentStatus) {
        let today = day(2024, 6, 10);
        assert_eq!(status.effective(Some(day(2020, 1, 1)), today), status);
    }

    #[test]
    fn serializes_as_numeric_code() {
        assert_eq!(serde_json::to_string(&DocumentStatus::Paid).unwrap(), "3");
        let parsed: DocumentStatus = serde_json::from_str("5").unwrap();
        assert_eq!(parsed, DocumentStatus::Unpaid);
        assert!(serde_json::from_str::<DocumentStatus>("9").is_err());
    }
}
