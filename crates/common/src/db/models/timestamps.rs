//! Save-time bookkeeping shared by every entity

use chrono::Utc;
use sea_orm::entity::prelude::DateTimeWithTimeZone;
use sea_orm::ActiveValue::{self, NotSet, Set};

/// Stamp `created_at` on insert and `updated_at` on every save.
///
/// On update `created_at` is dropped from the statement so it can never be
/// rewritten after the row exists.
pub(crate) fn touch(
    created_at: &mut ActiveValue<DateTimeWithTimeZone>,
    updated_at: &mut ActiveValue<DateTimeWithTimeZone>,
    insert: bool,
) {
    let now: DateTimeWithTimeZone = Utc::now().into();

    if insert {
        if matches!(created_at, NotSet) {
            *created_at = Set(now);
        }
    } else {
        *created_at = NotSet;
    }

    *updated_at = Set(now);
}

/// First-publication rule: the timestamp is filled once and then kept.
pub fn publication_timestamp(
    is_published: bool,
    published_at: Option<DateTimeWithTimeZone>,
    now: DateTimeWithTimeZone,
) -> Option<DateTimeWithTimeZone> {
    match published_at {
        Some(ts) => Some(ts),
        None if is_published => Some(now),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32) -> DateTimeWithTimeZone {
        Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0).unwrap().into()
    }

    #[test]
    fn test_insert_sets_both_timestamps() {
        let mut created = NotSet;
        let mut updated = NotSet;
        touch(&mut created, &mut updated, true);
        assert!(matches!(created, Set(_)));
        assert!(matches!(updated, Set(_)));
    }

    #[test]
    fn test_insert_keeps_explicit_created_at() {
        let mut created = Set(at(8));
        let mut updated = NotSet;
        touch(&mut created, &mut updated, true);
        assert_eq!(created, Set(at(8)));
    }

    #[test]
    fn test_update_never_writes_created_at() {
        let mut created = Set(at(8));
        let mut updated = ActiveValue::Unchanged(at(8));
        touch(&mut created, &mut updated, false);
        assert_eq!(created, NotSet);
        match updated {
            Set(ts) => assert!(ts > at(8)),
            other => panic!("updated_at not refreshed: {other:?}"),
        }
    }

    #[test]
    fn test_publication_sets_once() {
        let first = publication_timestamp(true, None, at(9));
        assert_eq!(first, Some(at(9)));

        // Saving again later leaves the original value in place
        let again = publication_timestamp(true, first, at(9) + Duration::hours(5));
        assert_eq!(again, Some(at(9)));
    }

    #[test]
    fn test_unpublished_post_has_no_timestamp() {
        assert_eq!(publication_timestamp(false, None, at(9)), None);
    }

    #[test]
    fn test_unpublish_keeps_first_publication() {
        let kept = publication_timestamp(false, Some(at(9)), at(12));
        assert_eq!(kept, Some(at(9)));
    }
}
