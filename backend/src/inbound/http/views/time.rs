//! Relative timestamps such as "5 minutes ago".

use chrono::{DateTime, Utc};

const MINUTES_PER_HOUR: i64 = 60;
const MINUTES_PER_DAY: i64 = 1_440;
const MINUTES_PER_MONTH: i64 = 43_200;
const MONTHS_PER_YEAR: i64 = 12;

fn rounded(value: i64, unit: i64) -> i64 {
    (value + unit / 2) / unit
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

fn distance(minutes: i64) -> String {
    match minutes {
        0 => "less than a minute".to_owned(),
        1..45 => plural(minutes, "minute"),
        45..90 => "about 1 hour".to_owned(),
        90..MINUTES_PER_DAY => format!("about {}", plural(rounded(minutes, MINUTES_PER_HOUR), "hour")),
        MINUTES_PER_DAY..2_520 => "1 day".to_owned(),
        2_520..MINUTES_PER_MONTH => plural(rounded(minutes, MINUTES_PER_DAY), "day"),
        MINUTES_PER_MONTH..64_800 => "about 1 month".to_owned(),
        64_800..86_400 => "about 2 months".to_owned(),
        _ => {
            let months = rounded(minutes, MINUTES_PER_MONTH);
            if months < MONTHS_PER_YEAR {
                return plural(months, "month");
            }
            let years = months / MONTHS_PER_YEAR;
            match months % MONTHS_PER_YEAR {
                0..3 => format!("about {}", plural(years, "year")),
                3..9 => format!("over {}", plural(years, "year")),
                _ => format!("almost {}", plural(years + 1, "year")),
            }
        }
    }
}

/// Age of `then` as seen at `now`. Timestamps in the future read as just now.
#[must_use]
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds().max(0);
    format!("{} ago", distance(rounded(seconds, 60)))
}
