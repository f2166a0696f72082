//! User-agent capture via `woothee`.

use woothee::parser::Parser;

/// Sentinel woothee returns for fields it cannot classify.
const WOOTHEE_UNKNOWN: &str = "UNKNOWN";

/// Device/browser/OS fields captured for a click log. Every field is filled:
/// unparsed values become "Unknown", except the device which defaults to
/// "Desktop" — most undetected agents are desktop browsers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAgentInfo {
    pub device: String,
    pub browser: String,
    pub operating_system: String,
}

impl Default for UserAgentInfo {
    fn default() -> Self {
        Self {
            device: "Desktop".to_string(),
            browser: "Unknown".to_string(),
            operating_system: "Unknown".to_string(),
        }
    }
}

/// Parse a `User-Agent` header value. Total: an empty or unclassifiable
/// string yields the defaulted [`UserAgentInfo`].
pub fn parse_user_agent(user_agent: &str) -> UserAgentInfo {
    let Some(result) = Parser::new().parse(user_agent) else {
        return UserAgentInfo::default();
    };

    // woothee categories: pc, smartphone, mobilephone, appliance, crawler,
    // misc, UNKNOWN. Tablets land in the smartphone bucket, so they are
    // split back out from the raw agent string.
    let device = match result.category {
        "smartphone" | "mobilephone" => {
            if is_tablet(user_agent) {
                "Tablet"
            } else {
                "Mobile"
            }
        }
        "pc" => "Desktop",
        WOOTHEE_UNKNOWN => "Desktop",
        _ => "Other",
    }
    .to_string();

    UserAgentInfo {
        device,
        browser: known_or_unknown(result.name),
        operating_system: known_or_unknown(result.os),
    }
}

fn is_tablet(user_agent: &str) -> bool {
    user_agent.contains("iPad")
        || user_agent.contains("Tablet")
        || (user_agent.contains("Android") && !user_agent.contains("Mobile"))
}

fn known_or_unknown(value: &str) -> String {
    if value.is_empty() || value == WOOTHEE_UNKNOWN {
        "Unknown".to_string()
    } else {
        value.to_string()
    }
}
