use chrono::{DateTime, Utc};
use chrono_tz::{Europe::Berlin, Tz};
use tracing::debug;

use crate::error::{NotifierError, NotifierResult};
use crate::freshness::{age_minutes, is_fresh, max_age};

/// Timezone used for the time shown in published messages
pub const DISPLAY_TIMEZONE: Tz = Berlin;

const TIME_FORMAT: &str = "%H:%M %d.%m.%Y";

/// Configurable parts of the published status message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    pub lake_name: String,
    pub hashtags: String,
}

impl Default for MessageTemplate {
    fn default() -> Self {
        Self {
            lake_name: "Der Woog".to_string(),
            hashtags: "#woog #wooglife #darmstadt".to_string(),
        }
    }
}

impl MessageTemplate {
    pub fn render(&self, temperature: &str, time: &str) -> String {
        let message = format!(
            "{} hat eine Temperatur von {}°C ({})",
            self.lake_name, temperature, time
        );
        if self.hashtags.is_empty() {
            message
        } else {
            format!("{} {}", message, self.hashtags)
        }
    }
}

/// Renders a temperature with exactly two decimals (`23.0` becomes `23.00`).
///
/// Values that round to zero are never shown with a sign.
pub fn format_temperature(temperature: f64) -> String {
    let rendered = format!("{temperature:.2}");
    match rendered.strip_prefix('-') {
        Some(magnitude) if magnitude == "0.00" => magnitude.to_string(),
        _ => rendered,
    }
}

/// Renders a UTC instant in the display timezone as `HH:MM DD.MM.YYYY`.
pub fn format_local_time(time: DateTime<Utc>) -> String {
    time.with_timezone(&DISPLAY_TIMEZONE)
        .format(TIME_FORMAT)
        .to_string()
}

/// Builds the status message, refusing measurements that are no longer fresh.
pub fn format_message(
    temperature: f64,
    measurement_time: DateTime<Utc>,
    now: DateTime<Utc>,
    template: &MessageTemplate,
) -> NotifierResult<String> {
    debug!(
        "time: {} | now: {} | diff (min): {:.2}",
        measurement_time,
        now,
        age_minutes(measurement_time, now)
    );

    if !is_fresh(measurement_time, now, max_age()) {
        return Err(NotifierError::Stale);
    }

    Ok(template.render(
        &format_temperature(temperature),
        &format_local_time(measurement_time),
    ))
}
