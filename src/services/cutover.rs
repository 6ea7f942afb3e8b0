//! Cutover resolution for sequence newspapers.
//!
//! The persisted id may already reflect today's advancement (the job runs
//! shortly after midnight) while the publisher only releases the issue later
//! in the morning. Before the newspaper's cutover hour the previous id is
//! shown.

use chrono::{DateTime, Timelike};
use chrono_tz::Tz;

use super::error::NewspaperError;
use crate::models::Newspaper;

/// Effective sequence id to display at civil time `now`.
pub fn effective_sequence_id(
    newspaper: &Newspaper,
    now: &DateTime<Tz>,
) -> Result<i64, NewspaperError> {
    if !newspaper.is_sequence() {
        return Err(NewspaperError::InvalidState {
            slug: newspaper.slug.clone(),
            reason: "cutover applies to sequence newspapers only",
        });
    }

    let id = newspaper
        .local_latest_id
        .ok_or_else(|| NewspaperError::InvalidState {
            slug: newspaper.slug.clone(),
            reason: "missing local latest id",
        })?;

    if now.hour() < u32::from(newspaper.cutover_hour) {
        Ok((id - 1).max(0))
    } else {
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::DEFAULT_TIMEZONE;
    use crate::models::NewspaperKind;
    use chrono::TimeZone;

    fn paper(kind: NewspaperKind, id: Option<i64>, cutover_hour: u8) -> Newspaper {
        Newspaper {
            local_latest_id: id,
            cutover_hour,
            ..Newspaper::fixture("arabnews", kind)
        }
    }

    fn at_hour(hour: u32) -> DateTime<Tz> {
        DEFAULT_TIMEZONE
            .with_ymd_and_hms(2025, 1, 2, hour, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_before_cutover_shows_previous_issue() {
        let p = paper(NewspaperKind::Sequence, Some(5), 23);
        assert_eq!(effective_sequence_id(&p, &at_hour(10)).unwrap(), 4);
    }

    #[test]
    fn test_at_or_after_cutover_shows_current_issue() {
        let p = paper(NewspaperKind::Sequence, Some(5), 23);
        assert_eq!(effective_sequence_id(&p, &at_hour(23)).unwrap(), 5);

        let p = paper(NewspaperKind::Sequence, Some(100), 8);
        assert_eq!(effective_sequence_id(&p, &at_hour(6)).unwrap(), 99);
        assert_eq!(effective_sequence_id(&p, &at_hour(10)).unwrap(), 100);
    }

    #[test]
    fn test_never_goes_below_zero() {
        let p = paper(NewspaperKind::Sequence, Some(0), 23);
        assert_eq!(effective_sequence_id(&p, &at_hour(1)).unwrap(), 0);
    }

    #[test]
    fn test_zero_cutover_hour_never_shifts() {
        let p = paper(NewspaperKind::Sequence, Some(7), 0);
        assert_eq!(effective_sequence_id(&p, &at_hour(0)).unwrap(), 7);
    }

    #[test]
    fn test_invalid_state() {
        let p = paper(NewspaperKind::Date, Some(5), 8);
        assert!(matches!(
            effective_sequence_id(&p, &at_hour(10)),
            Err(NewspaperError::InvalidState { .. })
        ));

        let p = paper(NewspaperKind::Sequence, None, 8);
        assert!(matches!(
            effective_sequence_id(&p, &at_hour(10)),
            Err(NewspaperError::InvalidState { .. })
        ));
    }
}
