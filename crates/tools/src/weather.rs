//! Current weather by city name via the public Open-Meteo APIs.
//!
//! Two requests: the geocoding endpoint resolves the city to coordinates, then
//! the forecast endpoint returns current conditions. No API key is needed.

use async_trait::async_trait;
use datadesk_config::EndpointsConfig;
use datadesk_core::HandlerError;
use datadesk_core::tool::{Arguments, ToolHandler, ToolSpec};
use serde_json::{Value, json};
use tracing::debug;

use crate::args::required_str;
use crate::http::HttpBackend;

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,wind_speed_10m,weather_code";

pub struct WeatherTool {
    http: HttpBackend,
    geocoding_url: String,
    forecast_url: String,
}

impl WeatherTool {
    pub fn new(http: HttpBackend, endpoints: &EndpointsConfig) -> Self {
        Self {
            http,
            geocoding_url: endpoints.geocoding_url.clone(),
            forecast_url: endpoints.forecast_url.clone(),
        }
    }

    pub fn spec() -> ToolSpec {
        ToolSpec::new(
            "get_weather",
            "Get the current weather for a city using the public Open-Meteo API. \
             Returns temperature, humidity, and wind speed.",
            json!({
                "type": "object",
                "properties": {
                    "city": {
                        "type": "string",
                        "description": "Name of the city to get weather for (e.g. 'Tokyo', 'New York', 'London')."
                    }
                },
                "required": ["city"]
            }),
        )
    }
}

#[async_trait]
impl ToolHandler for WeatherTool {
    async fn invoke(&self, arguments: &Arguments) -> Result<Value, HandlerError> {
        let city = required_str(arguments, "city")?;

        let geo = self
            .http
            .get_json(
                &self.geocoding_url,
                &[
                    ("name", city),
                    ("count", "1"),
                    ("language", "en"),
                    ("format", "json"),
                ],
            )
            .await?;

        let Some(place) = geo
            .get("results")
            .and_then(Value::as_array)
            .and_then(|results| results.first())
        else {
            return Err(HandlerError::NotFound(format!(
                "Could not find coordinates for city: {city}"
            )));
        };

        let (Some(latitude), Some(longitude)) = (
            place.get("latitude").and_then(Value::as_f64),
            place.get("longitude").and_then(Value::as_f64),
        ) else {
            return Err(HandlerError::Failed(format!(
                "Geocoding result for '{city}' has no coordinates"
            )));
        };
        let resolved = place.get("name").and_then(Value::as_str).unwrap_or(city);

        debug!(city, resolved, latitude, longitude, "Geocoded city");

        let lat = latitude.to_string();
        let lon = longitude.to_string();
        let forecast = self
            .http
            .get_json(
                &self.forecast_url,
                &[
                    ("latitude", lat.as_str()),
                    ("longitude", lon.as_str()),
                    ("current", CURRENT_FIELDS),
                    ("timezone", "auto"),
                ],
            )
            .await?;

        let current = forecast.get("current").cloned().unwrap_or_else(|| json!({}));
        Ok(json!({
            "city": resolved,
            "latitude": latitude,
            "longitude": longitude,
            "temperature_celsius": current.get("temperature_2m"),
            "humidity_percent": current.get("relative_humidity_2m"),
            "wind_speed_kmh": current.get("wind_speed_10m"),
            "weather_code": current.get("weather_code"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Json, Router, extract::Query, routing::get};
    use std::collections::HashMap;
    use std::time::Duration;

    async fn open_meteo_stub() -> EndpointsConfig {
        let app = Router::new()
            .route(
                "/v1/search",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    assert_eq!(q.get("count").map(String::as_str), Some("1"));
                    assert_eq!(q.get("format").map(String::as_str), Some("json"));
                    match q.get("name").map(String::as_str) {
                        Some("tokyo") => Json(json!({
                            "results": [{"name": "Tokyo", "latitude": 35.6895, "longitude": 139.69171}]
                        })),
                        _ => Json(json!({"generationtime_ms": 0.5})),
                    }
                }),
            )
            .route(
                "/v1/forecast",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    assert_eq!(q.get("current").map(String::as_str), Some(CURRENT_FIELDS));
                    assert_eq!(q.get("timezone").map(String::as_str), Some("auto"));
                    assert_eq!(q.get("latitude").map(String::as_str), Some("35.6895"));
                    Json(json!({
                        "current": {
                            "temperature_2m": 18.4,
                            "relative_humidity_2m": 62,
                            "wind_speed_10m": 11.2,
                            "weather_code": 3
                        }
                    }))
                }),
            );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        EndpointsConfig {
            geocoding_url: format!("http://{addr}/v1/search"),
            forecast_url: format!("http://{addr}/v1/forecast"),
            ..EndpointsConfig::default()
        }
    }

    fn tool(endpoints: &EndpointsConfig) -> WeatherTool {
        WeatherTool::new(HttpBackend::new(Duration::from_secs(5)), endpoints)
    }

    fn city(name: &str) -> Arguments {
        json!({ "city": name }).as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn resolves_city_then_reads_current_conditions() {
        let endpoints = open_meteo_stub().await;
        let out = tool(&endpoints).invoke(&city("tokyo")).await.unwrap();
        assert_eq!(out["city"], "Tokyo");
        assert_eq!(out["latitude"], 35.6895);
        assert_eq!(out["temperature_celsius"], 18.4);
        assert_eq!(out["humidity_percent"], 62);
        assert_eq!(out["wind_speed_kmh"], 11.2);
        assert_eq!(out["weather_code"], 3);
    }

    #[tokio::test]
    async fn unknown_city_is_not_found() {
        let endpoints = open_meteo_stub().await;
        let err = tool(&endpoints)
            .invoke(&city("Nowhereland"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_payload(),
            json!({"error": "Could not find coordinates for city: Nowhereland"})
        );
    }

    #[tokio::test]
    async fn missing_city_argument_fails() {
        let endpoints = EndpointsConfig::default();
        let err = tool(&endpoints).invoke(&Arguments::new()).await.unwrap_err();
        assert!(matches!(err, HandlerError::Failed(_)));
    }

    #[test]
    fn spec_requires_city() {
        assert_eq!(WeatherTool::spec().input_schema["required"], json!(["city"]));
    }
}
