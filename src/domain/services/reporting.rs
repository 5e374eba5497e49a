use serde::Serialize;

use crate::domain::models::attendee::Attendee;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct EmailStats {
    pub total: usize,
    pub checked_in: usize,
    pub with_codes: usize,
    pub eligible: usize,
    pub emails_sent: usize,
}

/// Aggregate counts over one consistent attendee snapshot. The caller passes
/// the result of a single `list_all` query, so the counts can never tear
/// against each other.
pub fn compute_stats(attendees: &[Attendee]) -> EmailStats {
    EmailStats {
        total: attendees.len(),
        checked_in: attendees.iter().filter(|a| a.is_checked_in()).count(),
        with_codes: attendees.iter().filter(|a| a.has_code()).count(),
        eligible: attendees.iter().filter(|a| a.is_eligible()).count(),
        emails_sent: attendees.iter().filter(|a| a.email_sent).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn attendee(checked_in_at: &str, code: Option<&str>, sent: bool) -> Attendee {
        Attendee {
            id: 0,
            email: "a@example.com".to_string(),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            checked_in_at: checked_in_at.to_string(),
            assigned_code: code.map(String::from),
            email_sent: sent,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn counts_each_bucket_independently() {
        let attendees = vec![
            attendee("", None, false),                     // uploaded, never checked in
            attendee("2024-06-01", None, false),           // checked in, no code
            attendee("2024-06-01", Some("c1"), false),     // eligible
            attendee("2024-06-01", Some("c2"), true),      // already sent
        ];

        let stats = compute_stats(&attendees);

        assert_eq!(
            stats,
            EmailStats {
                total: 4,
                checked_in: 3,
                with_codes: 2,
                eligible: 1,
                emails_sent: 1,
            }
        );
    }

    #[test]
    fn eligible_count_matches_the_shared_predicate() {
        let attendees = vec![
            attendee("2024-06-01", Some("c1"), false),
            attendee("2024-06-01", Some("c2"), true),
            attendee("", Some("c3"), false),
        ];

        let by_predicate = attendees.iter().filter(|a| a.is_eligible()).count();
        assert_eq!(compute_stats(&attendees).eligible, by_predicate);
    }

    #[test]
    fn empty_store_is_all_zeroes() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.eligible, 0);
    }
}
