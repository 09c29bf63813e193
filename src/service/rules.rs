//! Registration checks. Stores call these inside their transaction, after the workshop
//! row is locked, so the counts they see cannot change before the insert.

use crate::error::AppError;
use crate::models::Workshop;

/// Fails with `CapacityExceeded` when no seat is left.
pub fn ensure_seat_available(workshop: &Workshop) -> Result<(), AppError> {
    if workshop.is_full() {
        tracing::warn!(
            workshop_id = workshop.id,
            capacity = workshop.capacity,
            enrolled = workshop.enrolled,
            "registration rejected: workshop full"
        );
        return Err(AppError::CapacityExceeded);
    }
    Ok(())
}

/// Unwraps the outcome of a conflict-ignoring insert: nothing inserted means the
/// (workshop, student) pair was already registered.
pub fn require_new_registration<T>(workshop_id: i64, student_id: i64, inserted: Option<T>) -> Result<T, AppError> {
    match inserted {
        Some(row) => Ok(row),
        None => {
            tracing::warn!(workshop_id, student_id, "registration rejected: duplicate");
            Err(AppError::DuplicateRegistration)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_STATUS;

    fn workshop(capacity: i32, enrolled: i64) -> Workshop {
        Workshop {
            id: 1,
            title: "t".into(),
            description: "d".into(),
            date: "2025-01-20".into(),
            time: "14:00".into(),
            location: "Room 3".into(),
            category: "Design".into(),
            capacity,
            status: DEFAULT_STATUS.into(),
            enrolled,
        }
    }

    #[test]
    fn seat_available_until_capacity() {
        assert!(ensure_seat_available(&workshop(1, 0)).is_ok());
        assert!(matches!(ensure_seat_available(&workshop(1, 1)), Err(AppError::CapacityExceeded)));
        assert!(matches!(ensure_seat_available(&workshop(0, 0)), Err(AppError::CapacityExceeded)));
    }

    #[test]
    fn duplicate_pair_rejected() {
        assert_eq!(require_new_registration(1, 2, Some(9)).unwrap(), 9);
        assert!(matches!(
            require_new_registration::<i64>(1, 2, None),
            Err(AppError::DuplicateRegistration)
        ));
    }
}
