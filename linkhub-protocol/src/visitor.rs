use std::fmt;
use std::sync::OnceLock;

use chrono::{Datelike, NaiveDateTime, Timelike};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Device classification derived from the user-agent string.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Mobile,
    Desktop,
}

fn mobile_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)mobile|android|iphone|ipad|ipod").expect("pattern is valid")
    })
}

impl DeviceClass {
    /// Classifies a raw user-agent string. The same heuristic is shared by
    /// condition evaluation and visit recording so both agree for a given
    /// request.
    pub fn from_user_agent(user_agent: &str) -> Self {
        if mobile_pattern().is_match(user_agent) {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::Mobile => "mobile",
            DeviceClass::Desktop => "desktop",
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-request facts a public visit is evaluated against.
///
/// `local_now` is the server-local wall clock; time and day-of-week
/// conditions deliberately ignore the visitor's timezone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitorContext {
    pub local_now: NaiveDateTime,
    pub ip: String,
    pub user_agent: String,
    pub device: DeviceClass,
    /// Upper-case ISO country code, or `None` when the IP could not be
    /// resolved against the offline dataset.
    pub country: Option<String>,
}

impl VisitorContext {
    pub fn new(
        local_now: NaiveDateTime,
        ip: impl Into<String>,
        user_agent: impl Into<String>,
        country: Option<String>,
    ) -> Self {
        let user_agent = user_agent.into();
        let device = DeviceClass::from_user_agent(&user_agent);
        Self {
            local_now,
            ip: ip.into(),
            user_agent,
            device,
            country,
        }
    }

    /// Minutes elapsed since local midnight.
    pub fn minute_of_day(&self) -> u32 {
        self.local_now.hour() * 60 + self.local_now.minute()
    }

    /// Weekday index, 0 = Sunday through 6 = Saturday.
    pub fn weekday_index(&self) -> u8 {
        self.local_now.date().weekday().num_days_from_sunday() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 2)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn classifies_mobile_agents() {
        for ua in [
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)",
            "Mozilla/5.0 (Linux; Android 14; Pixel 8)",
            "Mozilla/5.0 (iPad; CPU OS 16_6 like Mac OS X)",
            "MOBILE test agent",
        ] {
            assert_eq!(DeviceClass::from_user_agent(ua), DeviceClass::Mobile, "{ua}");
        }
    }

    #[test]
    fn defaults_to_desktop() {
        let ua = "Mozilla/5.0 (X11; Linux x86_64) Firefox/126.0";
        assert_eq!(DeviceClass::from_user_agent(ua), DeviceClass::Desktop);
        assert_eq!(DeviceClass::from_user_agent(""), DeviceClass::Desktop);
    }

    #[test]
    fn derives_minute_and_weekday() {
        // 2024-06-02 is a Sunday.
        let ctx = VisitorContext::new(at(9, 30), "203.0.113.9", "curl/8.0", None);
        assert_eq!(ctx.minute_of_day(), 570);
        assert_eq!(ctx.weekday_index(), 0);
        assert_eq!(ctx.device, DeviceClass::Desktop);
    }
}
