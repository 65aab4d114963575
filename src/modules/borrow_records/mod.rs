pub mod models;

use senselib_kernel::{Entity, EntityDescriptor, SortDirection};

pub use models::{BorrowRecord, BorrowStatus};

pub fn descriptor() -> EntityDescriptor {
    EntityDescriptor::builder(BorrowRecord::NAME)
        .label("Borrow record")
        .resource("borrow-records")
        .sortable(["borrowedAt", "dueDate", "status"])
        .default_sort("borrowedAt", SortDirection::Desc)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use senselib_kernel::Id;
    use serde_json::json;
    use time::{Duration, OffsetDateTime};

    fn record(status: BorrowStatus, due_in_days: i64, returned: bool) -> BorrowRecord {
        let now = OffsetDateTime::now_utc();
        BorrowRecord {
            id: Id(1),
            user_id: Id(2),
            book_id: Id(3),
            borrowed_at: now - Duration::days(14),
            due_date: now + Duration::days(due_in_days),
            returned_at: returned.then_some(now),
            status,
        }
    }

    #[test]
    fn overdue_follows_status_then_due_date() {
        let now = OffsetDateTime::now_utc();
        assert!(record(BorrowStatus::Borrowed, -1, false).is_overdue(now));
        assert!(!record(BorrowStatus::Borrowed, 3, false).is_overdue(now));
        assert!(record(BorrowStatus::Overdue, 3, false).is_overdue(now));
        assert!(!record(BorrowStatus::Returned, -5, true).is_overdue(now));
    }

    #[test]
    fn unknown_status_and_missing_return_date_decode() {
        let record: BorrowRecord = serde_json::from_value(json!({
            "id": 8,
            "userId": 1,
            "bookId": 4,
            "borrowedAt": "2024-03-01T09:00:00Z",
            "dueDate": "2024-03-15T09:00:00Z",
            "status": "RESERVED"
        }))
        .unwrap();
        assert_eq!(record.status, BorrowStatus::Unknown);
        assert_eq!(record.returned_at, None);
    }

    #[test]
    fn resource_uses_the_hyphenated_path() {
        assert_eq!(descriptor().resource(), "borrow-records");
    }
}
