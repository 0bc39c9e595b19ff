// ABOUTME: The get_weather capability: current conditions plus a multi-day forecast for a location.
// ABOUTME: Data is a deterministic synthetic forecast seeded from the location name.

use async_trait::async_trait;
use serde_json::{Value, json};
use switchboard_core::{Capability, CapabilityError};

const DEFAULT_DAYS: u64 = 3;
const MAX_DAYS: u64 = 14;
const CONDITIONS: [&str; 4] = ["Sunny", "Partly Cloudy", "Rainy", "Cloudy"];

/// Weather lookup. Same location and day count always yield the same forecast.
#[derive(Debug, Clone, Default)]
pub struct WeatherCapability;

impl WeatherCapability {
    pub fn new() -> Self {
        Self
    }
}

/// FNV-1a over the lowercased location, so "Paris" and "paris" agree.
fn seed_for(location: &str) -> u64 {
    location
        .trim()
        .to_lowercase()
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
        })
}

/// Pick a value in `0..range` from the seed, varied by `salt`.
fn spread(seed: u64, salt: u64, range: u64) -> u64 {
    let mixed = seed.rotate_left((salt % 64) as u32) ^ salt.wrapping_mul(0x9e37_79b9_7f4a_7c15);
    mixed % range
}

fn forecast(location: &str, days: u64) -> Value {
    let seed = seed_for(location);

    let days: Vec<Value> = (1..=days)
        .map(|day| {
            let low = 55 + spread(seed, day * 3, 10);
            let high = low + 8 + spread(seed, day * 3 + 1, 10);
            json!({
                "day": day,
                "high_temp": high,
                "low_temp": low,
                "conditions": CONDITIONS[spread(seed, day * 3 + 2, 4) as usize]
            })
        })
        .collect();

    json!({
        "location": location,
        "current": {
            "temperature": 60 + spread(seed, 0, 20),
            "conditions": CONDITIONS[spread(seed, 1, 4) as usize],
            "humidity": 40 + spread(seed, 2, 50),
            "wind_speed": 2 + spread(seed, 3, 18)
        },
        "forecast": days
    })
}

#[async_trait]
impl Capability for WeatherCapability {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Get current weather and forecast details for a location"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "City name and optionally country"
                },
                "days": {
                    "type": "number",
                    "description": "Number of days for forecast (default is 3, at most 14)"
                }
            },
            "required": ["location"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value, CapabilityError> {
        let location = args
            .get("location")
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| CapabilityError::InvalidArguments("missing 'location'".to_string()))?;

        let days = match args.get("days") {
            None | Some(Value::Null) => DEFAULT_DAYS,
            Some(value) => {
                let days = value.as_f64().ok_or_else(|| {
                    CapabilityError::InvalidArguments("'days' must be a number".to_string())
                })?;
                (days.round().max(1.0) as u64).min(MAX_DAYS)
            }
        };

        tracing::debug!(location, days, "fetching weather");
        Ok(forecast(location, days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_requested_number_of_days() {
        let weather = WeatherCapability::new();
        let out = weather
            .execute(json!({"location": "Paris", "days": 5}))
            .await
            .unwrap();

        assert_eq!(out["location"], "Paris");
        assert_eq!(out["forecast"].as_array().unwrap().len(), 5);
        assert!(out["current"]["temperature"].as_u64().is_some());
    }

    #[tokio::test]
    async fn days_default_and_clamp() {
        let weather = WeatherCapability::new();

        let default = weather.execute(json!({"location": "Oslo"})).await.unwrap();
        assert_eq!(default["forecast"].as_array().unwrap().len(), 3);

        let many = weather
            .execute(json!({"location": "Oslo", "days": 90}))
            .await
            .unwrap();
        assert_eq!(many["forecast"].as_array().unwrap().len(), 14);

        let few = weather
            .execute(json!({"location": "Oslo", "days": 0}))
            .await
            .unwrap();
        assert_eq!(few["forecast"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn forecast_is_deterministic_per_location() {
        let weather = WeatherCapability::new();
        let a = weather.execute(json!({"location": "Tokyo"})).await.unwrap();
        let b = weather.execute(json!({"location": "tokyo "})).await.unwrap();
        assert_eq!(a["current"], b["current"]);
        assert_eq!(a["forecast"], b["forecast"]);
    }

    #[tokio::test]
    async fn highs_are_above_lows() {
        let out = WeatherCapability::new()
            .execute(json!({"location": "Lima", "days": 14}))
            .await
            .unwrap();
        for day in out["forecast"].as_array().unwrap() {
            assert!(day["high_temp"].as_u64().unwrap() > day["low_temp"].as_u64().unwrap());
        }
    }

    #[tokio::test]
    async fn missing_location_is_invalid() {
        let err = WeatherCapability::new()
            .execute(json!({"days": 2}))
            .await
            .unwrap_err();
        assert!(matches!(err, CapabilityError::InvalidArguments(_)));
    }
}
