use crate::error::{GeoTrackerError, TrackerResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Activity hint passed to the background provider; fixed in this app
pub const ACTIVITY_TYPE: &str = "AutomotiveNavigation";

/// Which tracking mechanism a session uses; chosen once at start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// Foreground polling via the watch-position API
    JsPolling,
    /// Background continuous tracking via the native singleton service
    NativeBackground,
}

impl Strategy {
    /// Short name used in "Started/Stopped tracking in <mode> mode" entries
    pub fn mode_name(&self) -> &'static str {
        match self {
            Strategy::JsPolling => "js",
            Strategy::NativeBackground => "native",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mode_name())
    }
}

/// Discrete accuracy selector for the background provider, radio-button
/// semantics: exactly one value is active, `Best` when nothing is picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DesiredAccuracy {
    #[default]
    Best,
    Ten,
    Hundred,
    Thousand,
}

impl DesiredAccuracy {
    pub fn meters(&self) -> u32 {
        match self {
            DesiredAccuracy::Best => 0,
            DesiredAccuracy::Ten => 10,
            DesiredAccuracy::Hundred => 100,
            DesiredAccuracy::Thousand => 1000,
        }
    }
}

/// Raw option fields as the UI supplies them: numeric fields arrive as free
/// text, absent input is the empty string.
#[derive(Debug, Clone, Default)]
pub struct RawOptions {
    /// JS mode: maximum acceptable fix age in milliseconds, free text
    pub maximum_age: String,
    /// JS mode: high-accuracy checkbox
    pub high_accuracy: bool,
    /// Native mode: accuracy radio selection
    pub desired_accuracy: DesiredAccuracy,
    /// Native mode: minimum distance between fixes in meters, free text
    pub distance_filter: String,
}

/// Normalized options for the foreground polling provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsPollingOptions {
    /// Omitted entirely when the field was left blank; the provider then
    /// applies its own default.
    #[serde(rename = "maximumAgeMs", skip_serializing_if = "Option::is_none")]
    pub maximum_age_ms: Option<u32>,
    #[serde(rename = "highAccuracy", skip_serializing_if = "is_false")]
    pub high_accuracy: bool,
}

/// Normalized options for the background continuous provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NativeBackgroundOptions {
    #[serde(rename = "desiredAccuracyMeters")]
    pub desired_accuracy_meters: u32,
    #[serde(rename = "distanceFilterMeters")]
    pub distance_filter_meters: u32,
    #[serde(rename = "activityType")]
    pub activity_type: String,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Validated, provider-specific option record; exactly one variant per
/// session, keyed by the chosen strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TrackingOptions {
    JsPolling(JsPollingOptions),
    NativeBackground(NativeBackgroundOptions),
}

impl TrackingOptions {
    /// Validate raw UI fields into the option record for `strategy`.
    /// Pure transform: no provider contact, no side effects.
    pub fn normalize(strategy: Strategy, raw: &RawOptions) -> TrackerResult<Self> {
        match strategy {
            Strategy::JsPolling => Ok(TrackingOptions::JsPolling(JsPollingOptions {
                maximum_age_ms: parse_non_negative("maximumAge", &raw.maximum_age)?,
                high_accuracy: raw.high_accuracy,
            })),
            Strategy::NativeBackground => {
                Ok(TrackingOptions::NativeBackground(NativeBackgroundOptions {
                    desired_accuracy_meters: raw.desired_accuracy.meters(),
                    distance_filter_meters: parse_non_negative(
                        "distanceFilter",
                        &raw.distance_filter,
                    )?
                    .unwrap_or(0),
                    activity_type: ACTIVITY_TYPE.to_string(),
                }))
            }
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            TrackingOptions::JsPolling(_) => Strategy::JsPolling,
            TrackingOptions::NativeBackground(_) => Strategy::NativeBackground,
        }
    }

    /// Compact JSON rendering used in the "Started tracking" log entry
    pub fn to_json(&self) -> TrackerResult<String> {
        serde_json::to_string(self)
            .map_err(|e| GeoTrackerError::Internal(format!("Failed to serialize options: {e}")))
    }
}

/// Parse a free-text non-negative integer field; blank input means the
/// field is omitted, anything else must be a valid non-negative integer.
fn parse_non_negative(name: &str, raw: &str) -> TrackerResult<Option<u32>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    trimmed.parse::<u32>().map(Some).map_err(|_| {
        GeoTrackerError::InvalidOption(format!(
            "{name} must be a non-negative integer, got {trimmed:?}"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_blank_age_is_omitted() {
        let raw = RawOptions {
            maximum_age: "".to_string(),
            high_accuracy: true,
            ..Default::default()
        };

        let options = TrackingOptions::normalize(Strategy::JsPolling, &raw).unwrap();
        match &options {
            TrackingOptions::JsPolling(js) => {
                assert_eq!(js.maximum_age_ms, None);
                assert!(js.high_accuracy);
            }
            other => panic!("wrong variant: {other:?}"),
        }

        // Omitted means no key in the serialized record, not null or zero
        assert_eq!(options.to_json().unwrap(), r#"{"highAccuracy":true}"#);
    }

    #[test]
    fn test_js_defaults_serialize_empty() {
        let options =
            TrackingOptions::normalize(Strategy::JsPolling, &RawOptions::default()).unwrap();
        assert_eq!(options.to_json().unwrap(), "{}");
    }

    #[test]
    fn test_js_age_parsed() {
        let raw = RawOptions {
            maximum_age: " 5000 ".to_string(),
            ..Default::default()
        };

        let options = TrackingOptions::normalize(Strategy::JsPolling, &raw).unwrap();
        match options {
            TrackingOptions::JsPolling(js) => assert_eq!(js.maximum_age_ms, Some(5000)),
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_js_non_numeric_age_rejected() {
        for bad in ["abc", "1.5", "-10"] {
            let raw = RawOptions {
                maximum_age: bad.to_string(),
                ..Default::default()
            };
            let err = TrackingOptions::normalize(Strategy::JsPolling, &raw).unwrap_err();
            assert!(matches!(err, GeoTrackerError::InvalidOption(_)), "{bad}");
        }
    }

    #[test]
    fn test_native_radio_and_filter() {
        let raw = RawOptions {
            desired_accuracy: DesiredAccuracy::Hundred,
            distance_filter: "50".to_string(),
            ..Default::default()
        };

        let options = TrackingOptions::normalize(Strategy::NativeBackground, &raw).unwrap();
        match &options {
            TrackingOptions::NativeBackground(native) => {
                assert_eq!(native.desired_accuracy_meters, 100);
                assert_eq!(native.distance_filter_meters, 50);
                assert_eq!(native.activity_type, "AutomotiveNavigation");
            }
            other => panic!("wrong variant: {other:?}"),
        }

        assert_eq!(
            options.to_json().unwrap(),
            r#"{"desiredAccuracyMeters":100,"distanceFilterMeters":50,"activityType":"AutomotiveNavigation"}"#
        );
    }

    #[test]
    fn test_native_defaults() {
        let options =
            TrackingOptions::normalize(Strategy::NativeBackground, &RawOptions::default())
                .unwrap();
        match options {
            TrackingOptions::NativeBackground(native) => {
                assert_eq!(native.desired_accuracy_meters, 0);
                assert_eq!(native.distance_filter_meters, 0);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn test_native_bad_filter_rejected() {
        let raw = RawOptions {
            distance_filter: "-1".to_string(),
            ..Default::default()
        };
        let err = TrackingOptions::normalize(Strategy::NativeBackground, &raw).unwrap_err();
        assert!(matches!(err, GeoTrackerError::InvalidOption(_)));
    }

    #[test]
    fn test_accuracy_meters() {
        assert_eq!(DesiredAccuracy::Best.meters(), 0);
        assert_eq!(DesiredAccuracy::Ten.meters(), 10);
        assert_eq!(DesiredAccuracy::Hundred.meters(), 100);
        assert_eq!(DesiredAccuracy::Thousand.meters(), 1000);
    }
}
