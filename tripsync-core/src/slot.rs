//! Normalised `HH:mm` time slots.
//!
//! A [`Slot`] buckets itinerary entries for capacity enforcement and display
//! grouping. Slots compare chronologically and render back to the same
//! zero-padded `HH:mm` form they were parsed from, so the string form is
//! suitable for exact equality checks.

use std::fmt;
use std::str::FromStr;

use jiff::civil::{Date, DateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// First hour shown by [`Slot::day_slots`].
const FIRST_DAY_HOUR: i8 = 9;
/// Last hour shown by [`Slot::day_slots`].
const LAST_DAY_HOUR: i8 = 18;

/// Errors returned when parsing a [`Slot`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotError {
    /// The input was not in `HH:mm` form.
    #[error("time slot {input:?} is not in HH:mm form")]
    Malformed {
        /// Rejected input.
        input: String,
    },
    /// Hour or minute were outside the valid range.
    #[error("time slot {input:?} is outside 00:00..=23:59")]
    OutOfRange {
        /// Rejected input.
        input: String,
    },
}

/// A time-of-day bucket such as `"14:00"`.
///
/// # Examples
///
/// ```
/// use tripsync_core::Slot;
///
/// let slot: Slot = "09:30".parse()?;
/// assert_eq!(slot.to_string(), "09:30");
/// assert!(slot < "10:00".parse()?);
/// # Ok::<(), tripsync_core::SlotError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slot {
    hour: i8,
    minute: i8,
}

impl Slot {
    /// Construct a slot from its components.
    pub fn new(hour: i8, minute: i8) -> Result<Self, SlotError> {
        if !(0..24).contains(&hour) || !(0..60).contains(&minute) {
            return Err(SlotError::OutOfRange {
                input: format!("{hour:02}:{minute:02}"),
            });
        }
        Ok(Self { hour, minute })
    }

    /// Hour component.
    #[must_use]
    pub const fn hour(&self) -> i8 {
        self.hour
    }

    /// Minute component.
    #[must_use]
    pub const fn minute(&self) -> i8 {
        self.minute
    }

    /// Normalise a backend `visitTime` into a slot.
    ///
    /// Empty input means the destination is unscheduled and yields `None`.
    /// Anything else is truncated to the `HH:mm` that follows the date
    /// separator (`T` or a space); a bare `HH:mm[:ss]` is accepted as is.
    ///
    /// # Examples
    ///
    /// ```
    /// use tripsync_core::Slot;
    ///
    /// let slot = Slot::from_visit_time("2024-05-01T10:00:00")?;
    /// assert_eq!(slot.map(|s| s.to_string()), Some("10:00".to_owned()));
    /// assert_eq!(Slot::from_visit_time("")?, None);
    /// # Ok::<(), tripsync_core::SlotError>(())
    /// ```
    pub fn from_visit_time(visit_time: &str) -> Result<Option<Self>, SlotError> {
        let trimmed = visit_time.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let time_part = trimmed
            .split_once(['T', ' '])
            .map_or(trimmed, |(_, time)| time);
        let hh_mm = time_part.get(..5).ok_or_else(|| SlotError::Malformed {
            input: visit_time.to_owned(),
        })?;
        hh_mm.parse().map(Some).map_err(|err| match err {
            SlotError::Malformed { .. } => SlotError::Malformed {
                input: visit_time.to_owned(),
            },
            other @ SlotError::OutOfRange { .. } => other,
        })
    }

    /// The standard display slots, `09:00` through `18:00` on the hour.
    #[must_use]
    pub fn day_slots() -> Vec<Self> {
        (FIRST_DAY_HOUR..=LAST_DAY_HOUR)
            .map(|hour| Self { hour, minute: 0 })
            .collect()
    }

    /// Combine the slot with a calendar date into a civil timestamp.
    #[must_use]
    pub fn on(&self, date: Date) -> DateTime {
        // Components are range-checked on construction.
        date.at(self.hour, self.minute, 0, 0)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for Slot {
    type Err = SlotError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let malformed = || SlotError::Malformed {
            input: input.to_owned(),
        };
        let (hour, rest) = input.split_once(':').ok_or_else(malformed)?;
        // Seconds, when present, are dropped.
        let minute = rest.split_once(':').map_or(rest, |(minute, _)| minute);
        let digits = hour.chars().chain(minute.chars()).all(|c| c.is_ascii_digit());
        if hour.len() != 2 || minute.len() != 2 || !digits {
            return Err(malformed());
        }
        let hour: i8 = hour.parse().map_err(|_| malformed())?;
        let minute: i8 = minute.parse().map_err(|_| malformed())?;
        Self::new(hour, minute).map_err(|_| SlotError::OutOfRange {
            input: input.to_owned(),
        })
    }
}

impl TryFrom<String> for Slot {
    type Error = SlotError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Slot> for String {
    fn from(slot: Slot) -> Self {
        slot.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("00:00", 0, 0)]
    #[case("09:05", 9, 5)]
    #[case("23:59", 23, 59)]
    #[case("14:00:30", 14, 0)]
    fn parses_valid_slots(#[case] input: &str, #[case] hour: i8, #[case] minute: i8) {
        let slot: Slot = input.parse().expect("valid slot");
        assert_eq!((slot.hour(), slot.minute()), (hour, minute));
    }

    #[rstest]
    #[case("9:00")]
    #[case("0900")]
    #[case("ab:cd")]
    #[case("10:0")]
    #[case("")]
    fn rejects_malformed_slots(#[case] input: &str) {
        let err = input.parse::<Slot>().expect_err("malformed slot");
        assert!(matches!(err, SlotError::Malformed { .. }), "got {err:?}");
    }

    #[rstest]
    #[case("24:00")]
    #[case("12:60")]
    fn rejects_out_of_range_slots(#[case] input: &str) {
        let err = input.parse::<Slot>().expect_err("out of range");
        assert!(matches!(err, SlotError::OutOfRange { .. }), "got {err:?}");
    }

    #[rstest]
    #[case("2024-05-01T10:00:00", Some("10:00"))]
    #[case("2024-05-01T10:45", Some("10:45"))]
    #[case("2024-05-01 08:15:00", Some("08:15"))]
    #[case("2024-05-01T21:30:00Z", Some("21:30"))]
    #[case("13:00", Some("13:00"))]
    #[case("", None)]
    #[case("   ", None)]
    fn normalises_visit_times(#[case] input: &str, #[case] expected: Option<&str>) {
        let slot = Slot::from_visit_time(input).expect("valid visit time");
        assert_eq!(slot.map(|s| s.to_string()).as_deref(), expected);
    }

    #[rstest]
    fn malformed_visit_time_reports_full_input() {
        let err = Slot::from_visit_time("2024-05-01T1").expect_err("truncated");
        assert_eq!(
            err,
            SlotError::Malformed {
                input: "2024-05-01T1".to_owned()
            }
        );
    }

    #[rstest]
    fn day_slots_cover_nine_to_six() {
        let slots: Vec<String> = Slot::day_slots().iter().map(Slot::to_string).collect();
        assert_eq!(slots.len(), 10);
        assert_eq!(slots.first().map(String::as_str), Some("09:00"));
        assert_eq!(slots.last().map(String::as_str), Some("18:00"));
    }

    #[rstest]
    fn combines_with_date() {
        let slot: Slot = "14:30".parse().expect("valid slot");
        let date = jiff::civil::date(2024, 5, 1);
        assert_eq!(slot.on(date).to_string(), "2024-05-01T14:30:00");
    }

    #[rstest]
    fn serialises_as_string() {
        let slot: Slot = "07:00".parse().expect("valid slot");
        let json = serde_json::to_string(&slot).expect("serialise");
        assert_eq!(json, "\"07:00\"");
        let back: Slot = serde_json::from_str(&json).expect("deserialise");
        assert_eq!(back, slot);
    }
}
