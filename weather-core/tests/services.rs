//! Contract tests for the remote service clients using wiremock.

use weather_core::{
    FetchError, GeoClient, HttpSettings, OpenMeteoProvider, ServiceEndpoints, TemperatureUnit,
    WeatherProvider, http::build_client,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn weather_body(lat: f64, lon: f64, temp: f64, code: i32) -> serde_json::Value {
    serde_json::json!({
        "latitude": lat,
        "longitude": lon,
        "generationtime_ms": 0.05,
        "current_weather": {
            "temperature": temp,
            "windspeed": 12.3,
            "winddirection": 250.0,
            "weathercode": code,
            "time": "2024-05-17T14:30"
        }
    })
}

fn provider(server: &MockServer) -> OpenMeteoProvider {
    let http = build_client(&HttpSettings::default()).unwrap();
    OpenMeteoProvider::new(http, ServiceEndpoints::with_base(&server.uri()).weather_url)
}

fn geo(base: &str) -> GeoClient {
    let http = build_client(&HttpSettings::default()).unwrap();
    GeoClient::new(http, ServiceEndpoints::with_base(base))
}

#[tokio::test]
async fn test_weather_update_sends_expected_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "52.52"))
        .and(query_param("longitude", "13.41"))
        .and(query_param("current_weather", "true"))
        .and(query_param("temperature_unit", "celsius"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body(52.52, 13.41, 18.4, 61)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let p = provider(&mock_server);
    p.update(52.52, 13.41).await.unwrap();

    assert!(p.is_concise());
    assert_eq!(p.temperature(TemperatureUnit::Celsius), 18.4);
    assert_eq!(p.weather_description(), "Rain: Slight, moderate and heavy intensity");
    assert_eq!(p.latitude(), 52.52);
    assert_eq!(p.longitude(), 13.41);

    let snapshot = p.snapshot().unwrap();
    assert_eq!(snapshot.wind_speed, 12.3);
    assert_eq!(snapshot.wind_direction, 250.0);
}

#[tokio::test]
async fn test_fahrenheit_is_rounded_half_even() {
    let mock_server = MockServer::start().await;

    // (latitude, °C served, °F expected)
    let readings = [
        (1.0, -7.35, 18.77),
        (2.0, 0.125, 32.22),
        (3.0, 36.6, 97.88),
        (4.0, 41.1, 105.98),
    ];
    for (lat, temp, _) in readings {
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", lat.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(weather_body(lat, 0.0, temp, 0)))
            .mount(&mock_server)
            .await;
    }

    let p = provider(&mock_server);
    for (lat, celsius, fahrenheit) in readings {
        p.update(lat, 0.0).await.unwrap();
        assert_eq!(p.temperature(TemperatureUnit::Celsius), celsius);
        assert_eq!(p.temperature(TemperatureUnit::Fahrenheit), fahrenheit, "{celsius} °C");
    }
}

#[tokio::test]
async fn test_failed_update_clears_previous_reading() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(weather_body(10.0, 0.0, 25.0, 0)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "20"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&mock_server)
        .await;

    let p = provider(&mock_server);
    p.update(10.0, 0.0).await.unwrap();
    assert!(p.is_concise());

    let err = p.update(20.0, 0.0).await.unwrap_err();
    assert!(matches!(err, FetchError::Status { .. }));
    let msg = err.to_string();
    assert!(msg.contains("Could not retrieve weather"), "unexpected message: {msg}");
    assert!(msg.contains("500"), "Error should mention 500 status: {msg}");
    assert!(!p.is_concise());
    assert_eq!(p.temperature(TemperatureUnit::Celsius), 0.0);
    assert_eq!(p.weather_description(), "");

    // Failing again from the empty state leaves it empty.
    assert!(p.update(20.0, 0.0).await.is_err());
    assert!(!p.is_concise());
}

#[tokio::test]
async fn test_malformed_weather_payload_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "latitude": 1.0,
            "longitude": 2.0
        })))
        .mount(&mock_server)
        .await;

    let p = provider(&mock_server);
    let err = p.update(1.0, 2.0).await.unwrap_err();

    assert!(matches!(err, FetchError::Decode { .. }));
    assert!(!p.is_concise());
}

#[tokio::test]
async fn test_unreachable_service_is_transport_error() {
    // Nothing listens on the discard port.
    let client = geo("http://127.0.0.1:9");
    let err = client.current_time(0.0, 0.0).await.unwrap_err();

    assert!(matches!(err, FetchError::Transport { .. }));
    assert_eq!(err.message(), "Could not determine time");
}

#[tokio::test]
async fn test_reverse_geocode_sends_language_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .and(query_param("lat", "48.8566"))
        .and(query_param("lon", "2.3522"))
        .and(query_param("format", "json"))
        .and(|req: &Request| {
            req.headers.get("accept-language").and_then(|v| v.to_str().ok())
                == Some("en-US,en;q=0.5")
        })
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "place_id": 88066702,
            "lat": "48.8566",
            "lon": "2.3522",
            "display_name": "Paris, Ile-de-France, Metropolitan France, France",
            "address": {
                "city": "Paris",
                "state": "Ile-de-France",
                "country": "France",
                "country_code": "fr"
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let address = geo(&mock_server.uri()).reverse_geocode(48.8566, 2.3522).await.unwrap();

    assert_eq!(address.latitude, 48.8566);
    assert_eq!(address.parts.state, "Ile-de-France");
    assert_eq!(address.parts.country_code, "fr");
    assert_eq!(weather_core::build_address(&address), "Paris, Ile-de-France, France");
}

#[tokio::test]
async fn test_reverse_geocode_over_sea_uses_display_name() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "lat": "0.0",
            "lon": "0.0",
            "display_name": "Gulf of Guinea",
            "address": {"country": "", "country_code": ""}
        })))
        .mount(&mock_server)
        .await;

    let address = geo(&mock_server.uri()).reverse_geocode(0.0, 0.0).await.unwrap();

    assert_eq!(address.parts.city, "");
    assert_eq!(weather_core::build_address(&address), "Gulf of Guinea");
}

#[tokio::test]
async fn test_current_time_accepts_any_values() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/Time/current/coordinate"))
        .and(query_param("latitude", "35.68"))
        .and(query_param("longitude", "139.69"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "year": 2024,
            "month": 13,
            "day": 40,
            "hour": 9,
            "minute": 15,
            "seconds": 0,
            "milliSeconds": 7,
            "dateTime": "2024-13-40T09:15:00",
            "timeZone": "Asia/Tokyo",
            "dstActive": false
        })))
        .mount(&mock_server)
        .await;

    let time = geo(&mock_server.uri()).current_time(35.68, 139.69).await.unwrap();

    assert_eq!(time.month, 13);
    assert_eq!(time.millisecond, 7);
    assert!(time.to_naive_datetime().is_err());
}

#[tokio::test]
async fn test_country_flag_returns_raw_bytes() {
    let mock_server = MockServer::start().await;
    let png = b"\x89PNG\r\n\x1a\nflag-bytes".to_vec();

    Mock::given(method("GET"))
        .and(path("/JP/flat/64.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png.clone()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let bytes = geo(&mock_server.uri()).country_flag("JP", 64).await.unwrap();
    assert_eq!(bytes, png);
}

#[tokio::test]
async fn test_country_flag_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ZZ/flat/64.png"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&mock_server)
        .await;

    let err = geo(&mock_server.uri()).country_flag("ZZ", 64).await.unwrap_err();

    assert_eq!(err.status().map(|s| s.as_u16()), Some(404));
    assert!(err.to_string().contains("Could not get country flag image"));
}
