use linkhub_protocol::visitor::VisitorContext;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Conditional predicate evaluated against the visitor context.
///
/// Wire names mirror the stored rule payloads: `type` carries the variant
/// tag and the remaining fields are camelCase. Unknown extra fields are
/// ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum RuleCondition {
    /// Current server-local time falls within `[startTime, endTime]`,
    /// inclusive on both bounds. A missing or malformed bound makes the
    /// condition always pass.
    TimeRange {
        #[serde(default)]
        start_time: Option<String>,
        #[serde(default)]
        end_time: Option<String>,
    },
    /// Today's weekday (0 = Sunday .. 6 = Saturday, server-local) is in the
    /// set. A missing set always passes.
    DaysOfWeek {
        #[serde(default)]
        days: Option<Vec<u8>>,
    },
    /// The requester's detected device class is in the set. Token comparison
    /// is case-insensitive. A missing set always passes.
    DeviceType {
        #[serde(default)]
        devices: Option<Vec<String>>,
    },
    /// The requester's resolved country is in the set. Codes compare
    /// exactly (stored upper-case). An unresolved country fails the
    /// condition; a missing set always passes.
    Location {
        #[serde(default)]
        countries: Option<Vec<String>>,
    },
    /// Unrecognized condition type. Always passes, so a condition type
    /// added to stored data before the code knows it degrades to a no-op
    /// gate instead of breaking public pages.
    #[serde(other)]
    Unknown,
}

impl RuleCondition {
    /// Evaluates the condition against the context. Pure and total: never
    /// fails, malformed payloads degrade per variant.
    pub fn evaluate(&self, ctx: &VisitorContext) -> bool {
        match self {
            RuleCondition::TimeRange {
                start_time,
                end_time,
            } => {
                let (Some(start), Some(end)) = (start_time, end_time) else {
                    return true;
                };
                match (parse_minute_of_day(start), parse_minute_of_day(end)) {
                    (Some(start), Some(end)) => {
                        let now = ctx.minute_of_day();
                        now >= start && now <= end
                    }
                    _ => true,
                }
            }
            RuleCondition::DaysOfWeek { days } => match days {
                Some(days) => days.contains(&ctx.weekday_index()),
                None => true,
            },
            RuleCondition::DeviceType { devices } => match devices {
                Some(devices) => devices
                    .iter()
                    .any(|device| device.eq_ignore_ascii_case(ctx.device.as_str())),
                None => true,
            },
            RuleCondition::Location { countries } => match countries {
                Some(countries) => match &ctx.country {
                    Some(country) => countries.iter().any(|code| code == country),
                    // Unresolvable IP fails closed.
                    None => false,
                },
                None => true,
            },
            RuleCondition::Unknown => {
                warn!("unrecognized condition type evaluated as always-pass");
                true
            }
        }
    }
}

/// Parses an `HH:MM` 24h clock string into minutes since midnight.
fn parse_minute_of_day(value: &str) -> Option<u32> {
    let (hours, minutes) = value.split_once(':')?;
    let hours: u32 = hours.parse().ok()?;
    let minutes: u32 = minutes.parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use serde_json::json;

    fn ctx_at(h: u32, m: u32) -> VisitorContext {
        ctx_on(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(), h, m)
    }

    fn ctx_on(date: NaiveDate, h: u32, m: u32) -> VisitorContext {
        let now: NaiveDateTime = date.and_hms_opt(h, m, 0).unwrap();
        VisitorContext::new(now, "198.51.100.7", "Mozilla/5.0 (X11; Linux)", None)
    }

    fn time_range(start: &str, end: &str) -> RuleCondition {
        RuleCondition::TimeRange {
            start_time: Some(start.into()),
            end_time: Some(end.into()),
        }
    }

    #[test]
    fn time_range_bounds_are_inclusive() {
        let condition = time_range("09:00", "17:00");
        assert!(condition.evaluate(&ctx_at(9, 0)));
        assert!(condition.evaluate(&ctx_at(17, 0)));
        assert!(condition.evaluate(&ctx_at(12, 30)));
        assert!(!condition.evaluate(&ctx_at(8, 59)));
        assert!(!condition.evaluate(&ctx_at(17, 1)));
    }

    #[test]
    fn time_range_missing_or_malformed_bound_passes() {
        let missing = RuleCondition::TimeRange {
            start_time: None,
            end_time: Some("17:00".into()),
        };
        assert!(missing.evaluate(&ctx_at(23, 59)));

        let malformed = time_range("9am", "17:00");
        assert!(malformed.evaluate(&ctx_at(3, 0)));

        let out_of_range = time_range("25:00", "26:00");
        assert!(out_of_range.evaluate(&ctx_at(3, 0)));
    }

    #[test]
    fn days_of_week_uses_sunday_zero_numbering() {
        // 2024-06-02 is a Sunday, 2024-06-03 a Monday.
        let sunday = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        let monday = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let weekend = RuleCondition::DaysOfWeek {
            days: Some(vec![0, 6]),
        };
        assert!(weekend.evaluate(&ctx_on(sunday, 12, 0)));
        assert!(!weekend.evaluate(&ctx_on(monday, 12, 0)));

        let absent = RuleCondition::DaysOfWeek { days: None };
        assert!(absent.evaluate(&ctx_on(monday, 12, 0)));
    }

    #[test]
    fn device_type_comparison_ignores_case() {
        let mobile_only = RuleCondition::DeviceType {
            devices: Some(vec!["Mobile".into()]),
        };
        let now = NaiveDate::from_ymd_opt(2024, 6, 3)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let mobile = VisitorContext::new(now, "198.51.100.7", "iPhone Safari", None);
        let desktop = VisitorContext::new(now, "198.51.100.7", "X11; Linux", None);
        assert!(mobile_only.evaluate(&mobile));
        assert!(!mobile_only.evaluate(&desktop));
    }

    #[test]
    fn location_fails_closed_without_a_resolved_country() {
        let us_only = RuleCondition::Location {
            countries: Some(vec!["US".into()]),
        };
        let mut ctx = ctx_at(10, 0);
        assert!(!us_only.evaluate(&ctx));

        ctx.country = Some("US".into());
        assert!(us_only.evaluate(&ctx));

        // Country codes compare exactly; lower-case stored codes do not match.
        ctx.country = Some("us".into());
        assert!(!us_only.evaluate(&ctx));

        let absent = RuleCondition::Location { countries: None };
        assert!(absent.evaluate(&ctx));
    }

    #[test]
    fn unknown_condition_type_passes() {
        let condition: RuleCondition =
            serde_json::from_value(json!({ "type": "AUDIENCE_SEGMENT", "segment": "vip" }))
                .expect("unknown types deserialize to the Unknown variant");
        assert_eq!(condition, RuleCondition::Unknown);
        assert!(condition.evaluate(&ctx_at(10, 0)));
    }

    #[test]
    fn parses_stored_wire_shape() {
        let condition: RuleCondition = serde_json::from_value(json!({
            "type": "TIME_RANGE",
            "startTime": "09:00",
            "endTime": "17:00",
            "label": "business hours"
        }))
        .expect("extra fields are ignored");
        assert_eq!(condition, time_range("09:00", "17:00"));
    }
}
