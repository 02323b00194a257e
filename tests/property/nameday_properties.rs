// Property-based tests for cleaning and date-key derivation
// Checks invariants over random text and every instant in a range of years

use chrono::{Datelike, Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;

use nameday_bar::models::nameday::NamedayEntry;
use nameday_bar::services::nameday::format::clean;
use nameday_bar::utils::date::{DateKey, ZonedCalendar};

proptest! {
    /// Property: cleaning an already clean string changes nothing
    #[test]
    fn prop_clean_is_idempotent(text in "[ \\t\\r\\na-zA-ZáčďéěíňóřšťúůýžÁČŘŠŽ,]{0,40}") {
        let once = clean(&text);
        prop_assert_eq!(clean(&once), once.clone());
        prop_assert!(!once.contains('\n'));
        prop_assert_eq!(once.trim(), once.as_str());
    }

    /// Property: array entries keep their order when joined
    #[test]
    fn prop_array_entries_join_in_order(names in proptest::collection::vec("[A-Za-z]{1,8}", 1..5)) {
        let entry = NamedayEntry::Multiple(names.clone());
        prop_assert_eq!(entry.display_text(), names.join(", "));
    }

    /// Property: keys render and parse back to the same key
    #[test]
    fn prop_key_round_trips(day_of_year in 0usize..366) {
        let key = DateKey::all().nth(day_of_year).unwrap();
        let parsed: DateKey = key.to_string().parse().unwrap();
        prop_assert_eq!(parsed, key);
    }

    /// Property: the next midnight is strictly ahead and at most a day away
    #[test]
    fn prop_next_midnight_is_within_a_day(seconds in 0i64..(10 * 366 * 86_400)) {
        let calendar = ZonedCalendar::default();
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let now = start + Duration::seconds(seconds);
        let midnight = calendar.next_midnight(&now);

        prop_assert!(midnight > now);
        prop_assert!(midnight.with_timezone(&Utc) - now <= Duration::hours(25));
        prop_assert_ne!(calendar.key_for(&midnight), calendar.key_for(&now));
    }

    /// Property: tomorrow's key is the key of the following calendar date
    #[test]
    fn prop_tomorrow_key_is_next_date(seconds in 0i64..(10 * 366 * 86_400)) {
        let calendar = ZonedCalendar::default();
        let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let now = start + Duration::seconds(seconds);

        let today: NaiveDate = now.with_timezone(&calendar.time_zone()).date_naive();
        let next = today.succ_opt().unwrap();
        let expected = DateKey::new(next.month(), next.day()).unwrap();
        prop_assert_eq!(calendar.tomorrow_key(&now), expected);
    }
}
