//! Sensor readings and their map markers.

use serde::{Deserialize, Serialize};

/// Batteries below this level make a reading untrustworthy.
pub const LOW_BATTERY: f64 = 10.0;

/// Colour for a reading that is missing or out of range.
pub const NO_READING_COLOR: &str = "#aaaaaa";
pub const LOW_BATTERY_COLOR: &str = "#000000";

/// Upper band edges (exclusive, except the first which is inclusive) and
/// their colours, from green to red.
const BANDS: [(f64, &str); 8] = [
    (32.0, "#00ff00"),
    (64.0, "#40ff00"),
    (96.0, "#80ff00"),
    (128.0, "#c0ff00"),
    (160.0, "#ffc000"),
    (192.0, "#ff8000"),
    (224.0, "#ff4000"),
    (256.0, "#ff0000"),
];

/// What a sensor at a waypoint reports when the drone is in range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading: Option<f64>,
    /// Percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery: Option<f64>,
}

/// GeoJSON marker styling for one point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub color: &'static str,
    pub symbol: Option<&'static str>,
}

impl SensorReading {
    pub fn is_empty(&self) -> bool {
        self.reading.is_none() && self.battery.is_none()
    }

    pub fn low_battery(&self) -> bool {
        self.battery.is_some_and(|level| level < LOW_BATTERY)
    }

    /// Colour band of the reading. Low batteries win over any reading.
    pub fn color(&self) -> &'static str {
        if self.low_battery() {
            return LOW_BATTERY_COLOR;
        }
        let Some(value) = self.reading.filter(|value| value.is_finite()) else {
            return NO_READING_COLOR;
        };
        if value <= BANDS[0].0 {
            return BANDS[0].1;
        }
        BANDS[1..]
            .iter()
            .find(|(edge, _)| value < *edge)
            .map_or(NO_READING_COLOR, |&(_, color)| color)
    }

    pub fn symbol(&self) -> Option<&'static str> {
        if self.low_battery() {
            return Some("cross");
        }
        match self.reading.filter(|value| value.is_finite()) {
            Some(value) if value < 128.0 => Some("lighthouse"),
            Some(value) if value < 256.0 => Some("danger"),
            _ => None,
        }
    }

    pub fn marker(&self) -> Marker {
        Marker {
            color: self.color(),
            symbol: self.symbol(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(value: f64) -> SensorReading {
        SensorReading {
            reading: Some(value),
            battery: Some(80.0),
        }
    }

    #[test]
    fn band_edges() {
        let cases = [
            (0.0, "#00ff00"),
            (32.0, "#00ff00"),
            (32.01, "#40ff00"),
            (63.99, "#40ff00"),
            (64.0, "#80ff00"),
            (96.0, "#c0ff00"),
            (127.99, "#c0ff00"),
            (128.0, "#ffc000"),
            (160.0, "#ff8000"),
            (192.0, "#ff4000"),
            (224.0, "#ff0000"),
            (255.99, "#ff0000"),
            (256.0, NO_READING_COLOR),
        ];
        for (value, color) in cases {
            assert_eq!(reading(value).color(), color, "reading {value}");
        }
    }

    #[test]
    fn symbols_split_at_128_and_256() {
        assert_eq!(reading(127.9).symbol(), Some("lighthouse"));
        assert_eq!(reading(128.0).symbol(), Some("danger"));
        assert_eq!(reading(255.9).symbol(), Some("danger"));
        assert_eq!(reading(256.0).symbol(), None);
    }

    #[test]
    fn low_battery_overrides_reading() {
        let flat = SensorReading {
            reading: Some(40.0),
            battery: Some(9.99),
        };
        assert_eq!(
            flat.marker(),
            Marker {
                color: LOW_BATTERY_COLOR,
                symbol: Some("cross")
            }
        );

        let just_enough = SensorReading {
            battery: Some(10.0),
            ..flat
        };
        assert_eq!(just_enough.color(), "#40ff00");
        assert_eq!(just_enough.symbol(), Some("lighthouse"));
    }

    #[test]
    fn missing_reading_is_grey_without_symbol() {
        let none = SensorReading {
            reading: None,
            battery: Some(50.0),
        };
        assert_eq!(none.color(), NO_READING_COLOR);
        assert_eq!(none.symbol(), None);
        assert!(SensorReading::default().is_empty());
        assert!(!none.is_empty());
    }
}
