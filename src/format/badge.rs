use time::OffsetDateTime;

use crate::modules::borrow_records::{BorrowRecord, BorrowStatus};
use crate::modules::transactions::TransactionStatus;
use crate::modules::users::Role;

/// Label, icon name and CSS color classes for a status chip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub label: String,
    pub icon: &'static str,
    pub color_classes: &'static str,
}

const GREEN: &str = "bg-green-100 text-green-800";
const RED: &str = "bg-red-100 text-red-800";
const YELLOW: &str = "bg-yellow-100 text-yellow-800";
const BLUE: &str = "bg-blue-100 text-blue-800";
const PURPLE: &str = "bg-purple-100 text-purple-800";
const GRAY: &str = "bg-gray-100 text-gray-800";

impl Badge {
    fn new(label: impl Into<String>, icon: &'static str, color_classes: &'static str) -> Self {
        Self {
            label: label.into(),
            icon,
            color_classes,
        }
    }

    fn unknown(code: &str) -> Self {
        let label = if code.trim().is_empty() { "Unknown" } else { code };
        Self::new(label, "help-circle", GRAY)
    }
}

pub trait StatusBadge {
    fn badge(&self) -> Badge;
}

impl StatusBadge for TransactionStatus {
    fn badge(&self) -> Badge {
        match self {
            TransactionStatus::Pending => Badge::new("Pending", "clock", YELLOW),
            TransactionStatus::Completed => Badge::new("Completed", "check-circle", GREEN),
            TransactionStatus::Failed => Badge::new("Failed", "x-circle", RED),
            TransactionStatus::Cancelled => Badge::new("Cancelled", "slash", GRAY),
            TransactionStatus::Refunded => Badge::new("Refunded", "rotate-ccw", BLUE),
            TransactionStatus::Unknown(code) => Badge::unknown(code),
        }
    }
}

impl StatusBadge for BorrowStatus {
    fn badge(&self) -> Badge {
        match self {
            BorrowStatus::Borrowed => Badge::new("Borrowed", "book-open", BLUE),
            BorrowStatus::Returned => Badge::new("Returned", "check-circle", GREEN),
            BorrowStatus::Overdue => Badge::new("Overdue", "alert-triangle", RED),
            BorrowStatus::Lost => Badge::new("Lost", "x-octagon", GRAY),
            BorrowStatus::Unknown => Badge::unknown(""),
        }
    }
}

impl StatusBadge for Role {
    fn badge(&self) -> Badge {
        match self {
            Role::Admin => Badge::new("Admin", "shield", PURPLE),
            Role::Librarian => Badge::new("Librarian", "book", BLUE),
            Role::Reader => Badge::new("Reader", "user", GREEN),
            Role::Unknown => Badge::unknown(""),
        }
    }
}

pub fn active_badge(is_active: bool) -> Badge {
    if is_active {
        Badge::new("Active", "check-circle", GREEN)
    } else {
        Badge::new("Inactive", "minus-circle", GRAY)
    }
}

/// Borrow badge that shows an unreturned record past its due date as overdue.
pub fn borrow_badge(record: &BorrowRecord, now: OffsetDateTime) -> Badge {
    if record.is_overdue(now) {
        BorrowStatus::Overdue.badge()
    } else {
        record.status.badge()
    }
}
