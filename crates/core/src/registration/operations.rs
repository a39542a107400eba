//! Pure rules for the registration set: duplicate detection, capacity
//! eviction, ordering, and size estimation. All functions here are free of
//! I/O so they can be exercised directly in unit tests.

use super::types::Registration;

/// Returns true when the candidate's (parent phone, child name, child
/// surname) tuple already exists in the set.
///
/// The comparison is exact and case-sensitive: over-aggressive matching
/// would reject legitimate siblings or re-typed names, so nothing is
/// trimmed or lowercased here.
pub fn is_duplicate(existing: &[Registration], candidate: &Registration) -> bool {
    existing
        .iter()
        .any(|r| r.duplicate_key() == candidate.duplicate_key())
}

/// Drops the oldest entries until the set fits within `capacity`, returning
/// how many were removed.
///
/// The set is kept in insertion order (newest last), so this is a strict
/// FIFO eviction from the front. No access times are tracked.
pub fn evict_oldest(registrations: &mut Vec<Registration>, capacity: usize) -> usize {
    if registrations.len() <= capacity {
        return 0;
    }
    let excess = registrations.len() - capacity;
    registrations.drain(..excess);
    excess
}

/// Sorts the set newest-first by creation timestamp.
///
/// Callers must never assume storage insertion order is the delivery order,
/// so every read path re-sorts before handing data out.
pub fn sort_newest_first(registrations: &mut [Registration]) {
    registrations.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

/// Estimates the serialized size of the set in megabytes, rounded to two
/// decimals.
pub fn serialized_size_mb(registrations: &[Registration]) -> f64 {
    let bytes = serde_json::to_vec(registrations)
        .map(|v| v.len())
        .unwrap_or(0);
    round_two_decimals(bytes as f64 / (1024.0 * 1024.0))
}

fn round_two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::NewRegistration;
    use chrono::{TimeZone, Utc};

    fn registration(child: &str, surname: &str, phone: &str) -> Registration {
        Registration::from_submission(NewRegistration {
            child_name: child.to_string(),
            child_surname: surname.to_string(),
            child_age: "10".to_string(),
            parent_name: "Nino".to_string(),
            parent_surname: surname.to_string(),
            parent_phone: phone.to_string(),
        })
    }

    #[test]
    fn test_duplicate_requires_all_three_fields_to_match() {
        let existing = vec![registration("Mariam", "Giorgadze", "+995599123456")];

        let same = registration("Mariam", "Giorgadze", "+995599123456");
        assert!(is_duplicate(&existing, &same));

        let other_phone = registration("Mariam", "Giorgadze", "+995599000000");
        assert!(!is_duplicate(&existing, &other_phone));

        let sibling = registration("Giorgi", "Giorgadze", "+995599123456");
        assert!(!is_duplicate(&existing, &sibling));
    }

    #[test]
    fn test_duplicate_check_is_case_sensitive() {
        let existing = vec![registration("Mariam", "Giorgadze", "+995599123456")];
        let lowercased = registration("mariam", "Giorgadze", "+995599123456");

        assert!(!is_duplicate(&existing, &lowercased));
    }

    #[test]
    fn test_evict_oldest_is_noop_under_capacity() {
        let mut set = vec![
            registration("A", "One", "1"),
            registration("B", "Two", "2"),
        ];

        assert_eq!(evict_oldest(&mut set, 5), 0);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_evict_oldest_drops_from_the_front() {
        let mut set: Vec<Registration> = (0..5)
            .map(|i| registration(&format!("Child{i}"), "Name", &format!("{i}")))
            .collect();

        let removed = evict_oldest(&mut set, 3);

        assert_eq!(removed, 2);
        assert_eq!(set.len(), 3);
        assert_eq!(set[0].child_name, "Child2");
        assert_eq!(set[2].child_name, "Child4");
    }

    #[test]
    fn test_sort_newest_first_ignores_insertion_order() {
        let mut oldest = registration("A", "One", "1");
        let mut middle = registration("B", "Two", "2");
        let mut newest = registration("C", "Three", "3");
        oldest.timestamp = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        middle.timestamp = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        newest.timestamp = Utc.with_ymd_and_hms(2024, 12, 1, 10, 0, 0).unwrap();

        let mut set = vec![middle.clone(), newest.clone(), oldest.clone()];
        sort_newest_first(&mut set);

        assert_eq!(set[0].id, newest.id);
        assert_eq!(set[1].id, middle.id);
        assert_eq!(set[2].id, oldest.id);
    }

    #[test]
    fn test_serialized_size_of_empty_set_is_zero() {
        assert_eq!(serialized_size_mb(&[]), 0.0);
    }

    #[test]
    fn test_round_two_decimals() {
        assert_eq!(round_two_decimals(1.2345), 1.23);
        assert_eq!(round_two_decimals(1.235), 1.24);
    }
}
