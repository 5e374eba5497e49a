use crate::domain::models::attendee::Attendee;

/// Positional code assignment: `codes[i]` goes to `attendees[i]` for as many
/// pairs as both sides provide. Surplus attendees keep whatever assignment
/// they already had; surplus codes are dropped. Length mismatch is not an
/// error, the caller only ever sees the pair count.
pub fn plan_assignments<'a>(attendees: &'a [Attendee], codes: &'a [String]) -> Vec<(i64, &'a str)> {
    attendees
        .iter()
        .zip(codes.iter())
        .map(|(attendee, code)| (attendee.id, code.as_str()))
        .collect()
}
