//! Weekday labels used by provider rosters.

use jiff::civil::Weekday;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// One of the seven fixed weekday labels (`Sun` through `Sat`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumIter, EnumString, IntoStaticStr)]
pub enum WorkDay {
    Sun,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl From<Weekday> for WorkDay {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sunday => Self::Sun,
            Weekday::Monday => Self::Mon,
            Weekday::Tuesday => Self::Tue,
            Weekday::Wednesday => Self::Wed,
            Weekday::Thursday => Self::Thu,
            Weekday::Friday => Self::Fri,
            Weekday::Saturday => Self::Sat,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_exactly_seven_labels() {
        let labels: Vec<String> = WorkDay::iter().map(|d| d.to_string()).collect();
        assert_eq!(labels, ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]);
    }

    #[test]
    fn test_from_weekday() {
        assert_eq!(WorkDay::from(Weekday::Sunday), WorkDay::Sun);
        assert_eq!(WorkDay::from(Weekday::Wednesday), WorkDay::Wed);
        assert_eq!(WorkDay::from(Weekday::Saturday), WorkDay::Sat);
    }

    #[test]
    fn test_unknown_label() {
        assert!(WorkDay::from_str("Monday").is_err());
    }
}
