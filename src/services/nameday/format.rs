// Display formatting for table entries

use chrono::{DateTime, TimeZone};

use crate::models::display::DisplayState;
use crate::models::nameday::NamedayTable;
use crate::utils::date::{DateKey, ZonedCalendar};

/// Trims surrounding whitespace and folds every run of line breaks into a
/// single space so the text fits on one menu-bar line.
pub fn clean(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    let mut in_break = false;

    for ch in text.trim().chars() {
        if ch == '\n' || ch == '\r' {
            if !in_break {
                cleaned.push(' ');
                in_break = true;
            }
        } else {
            cleaned.push(ch);
            in_break = false;
        }
    }

    cleaned
}

/// Cleaned text for `key`, or `placeholder` when the key is absent or its
/// entry is blank.
pub fn resolve(table: &NamedayTable, key: &DateKey, placeholder: &str) -> String {
    table
        .get(key)
        .map(|entry| clean(&entry.display_text()))
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| placeholder.to_string())
}

/// Today's and tomorrow's texts for `now`, as seen in the calendar's zone.
pub fn display_for<T: TimeZone>(
    table: &NamedayTable,
    calendar: &ZonedCalendar,
    now: &DateTime<T>,
    placeholder: &str,
) -> DisplayState {
    let today_key = calendar.key_for(now);
    let tomorrow_key = calendar.tomorrow_key(now);

    DisplayState::shown(
        resolve(table, &today_key, placeholder),
        resolve(table, &tomorrow_key, placeholder),
        today_key,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use test_case::test_case;

    #[test_case("  Karina  ", "Karina" ; "surrounding spaces")]
    #[test_case("Rút\na Matylda", "Rút a Matylda" ; "single newline")]
    #[test_case("Rút\r\n\na Matylda\n", "Rút a Matylda" ; "newline run")]
    #[test_case("\n\t", "" ; "only whitespace")]
    #[test_case("Adam, Eva", "Adam, Eva" ; "already clean")]
    fn test_clean(input: &str, expected: &str) {
        assert_eq!(clean(input), expected);
    }

    #[test]
    fn test_resolve_uses_placeholder_for_blank_and_missing() {
        let mut table = NamedayTable::new();
        table.insert("01-02", "   ");
        table.insert("01-03", vec!["Radmila"]);

        assert_eq!(resolve(&table, &"01-02".parse().unwrap(), "–"), "–");
        assert_eq!(resolve(&table, &"01-03".parse().unwrap(), "–"), "Radmila");
        assert_eq!(resolve(&table, &"01-04".parse().unwrap(), "–"), "–");
    }

    #[test]
    fn test_display_for_new_year() {
        let mut table = NamedayTable::new();
        table.insert("01-01", "Nový rok");
        table.insert("12-24", vec!["Adam", "Eva"]);

        let now = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        let state = display_for(&table, &ZonedCalendar::default(), &now, "–");

        assert_eq!(state.today, "Nový rok");
        assert_eq!(state.tomorrow, "–");
        assert_eq!(state.last_shown_key, Some("01-01".parse().unwrap()));
    }
}
