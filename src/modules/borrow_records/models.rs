use senselib_kernel::{Entity, Id};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BorrowStatus {
    Borrowed,
    Returned,
    Overdue,
    Lost,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRecord {
    pub id: Id,
    pub user_id: Id,
    pub book_id: Id,
    #[serde(with = "time::serde::rfc3339")]
    pub borrowed_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub due_date: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub returned_at: Option<OffsetDateTime>,
    pub status: BorrowStatus,
}

impl BorrowRecord {
    /// Overdue as reported, or still out past its due date.
    pub fn is_overdue(&self, now: OffsetDateTime) -> bool {
        match self.status {
            BorrowStatus::Overdue => true,
            BorrowStatus::Returned | BorrowStatus::Lost => false,
            BorrowStatus::Borrowed | BorrowStatus::Unknown => {
                self.returned_at.is_none() && self.due_date < now
            }
        }
    }
}

impl Entity for BorrowRecord {
    const NAME: &'static str = "borrow_records";

    fn id(&self) -> Id {
        self.id
    }
}
