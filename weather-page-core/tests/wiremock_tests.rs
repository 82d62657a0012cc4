//! Provider client, credential probe, page handler and settings form
//! exercised against a mock OpenWeatherMap server.

use weather_page_core::{
    Credentials, DateFormat, FormField, LocationQuery, OpenWeatherClient, PageError,
    ProviderFailure, Settings, SettingsStore, Units, WeatherError, WeatherPage, WeatherProvider,
    WeatherResult,
    config::{ApiSettings, LocationSettings, OtherSettings},
    validate_settings,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param, query_param_is_missing},
};

const WEATHER_PATH: &str = "/data/2.5/weather";

fn current_weather(city: &str) -> serde_json::Value {
    serde_json::json!({
        "coord": { "lon": 2.3488, "lat": 48.8534 },
        "weather": [
            { "id": 800, "main": "Clear", "description": "clear sky", "icon": "01d" },
            { "id": 701, "main": "Mist", "description": "mist", "icon": "50d" }
        ],
        "base": "stations",
        "main": {
            "temp": 18.2, "feels_like": 17.6, "temp_min": 16.9, "temp_max": 19.4,
            "pressure": 1018, "humidity": 62
        },
        "visibility": 10000,
        "wind": { "speed": 3.09, "deg": 240 },
        "clouds": { "all": 0 },
        "dt": 1_700_000_000,
        "sys": { "type": 2, "id": 2_041_230, "country": "FR", "sunrise": 1_699_945_000, "sunset": 1_699_979_000 },
        "timezone": 3600,
        "id": 2_988_507,
        "name": city,
        "cod": 200
    })
}

fn endpoint(server: &MockServer) -> String {
    format!("{}{WEATHER_PATH}", server.uri())
}

fn settings(server: &MockServer) -> Settings {
    Settings {
        api: ApiSettings { key: "GOOD".into(), endpoint: endpoint(server) },
        location: LocationSettings { city: "Paris".into(), country_code: "FR".into() },
        other: OtherSettings { units: Units::Metric, date_format: DateFormat::Iso },
    }
}

async fn mount_weather(server: &MockServer, q: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .and(query_param("q", q))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mount_probe(server: &MockServer, key: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .and(query_param("q", "London"))
        .and(query_param("appid", key))
        .and(query_param_is_missing("units"))
        .respond_with(response)
        .mount(server)
        .await;
}

// ============================================================================
// Client
// ============================================================================

#[tokio::test]
async fn fetch_weather_success_sends_q_appid_units() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .and(query_param("q", "Paris,FR"))
        .and(query_param("appid", "KEY"))
        .and(query_param("units", "imperial"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_weather("Paris")))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenWeatherClient::new();
    let location = LocationQuery::city("Paris").with_country("FR").with_units(Some(Units::Imperial));
    let result = client
        .fetch_weather(&location, &Credentials::new("KEY", endpoint(&server)))
        .await
        .unwrap();

    match result {
        WeatherResult::Success(report) => {
            assert_eq!(report.name, "Paris");
            assert_eq!(report.weather.len(), 2);
            assert_eq!(report.weather[0].main, "Clear");
            assert_eq!(report.timezone, 3600);
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_weather_without_units_omits_parameter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .and(query_param("q", "Paris,"))
        .and(query_param_is_missing("units"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_weather("Paris")))
        .expect(1)
        .mount(&server)
        .await;

    let result = OpenWeatherClient::new()
        .fetch_weather(&LocationQuery::city("Paris"), &Credentials::new("KEY", endpoint(&server)))
        .await
        .unwrap();

    assert!(result.is_success());
}

#[tokio::test]
async fn fetch_weather_maps_http_404_to_failure() {
    let server = MockServer::start().await;
    mount_weather(
        &server,
        "Atlantis,",
        ResponseTemplate::new(404)
            .set_body_json(serde_json::json!({ "cod": "404", "message": "city not found" })),
    )
    .await;

    let result = OpenWeatherClient::new()
        .fetch_weather(&LocationQuery::city("Atlantis"), &Credentials::new("KEY", endpoint(&server)))
        .await
        .unwrap();

    assert_eq!(
        result,
        WeatherResult::Failure(ProviderFailure { status_code: 404, message: "city not found".into() })
    );
}

#[tokio::test]
async fn fetch_weather_maps_error_cod_in_ok_response_to_failure() {
    let server = MockServer::start().await;
    mount_weather(
        &server,
        "Paris,",
        ResponseTemplate::new(200)
            .set_body_json(serde_json::json!({ "cod": 401, "message": "Invalid API key." })),
    )
    .await;

    let result = OpenWeatherClient::new()
        .fetch_weather(&LocationQuery::city("Paris"), &Credentials::new("KEY", endpoint(&server)))
        .await
        .unwrap();

    assert_eq!(result.status_code(), 401);
    assert!(!result.is_success());
}

#[tokio::test]
async fn fetch_weather_propagates_non_json_error_body() {
    let server = MockServer::start().await;
    mount_weather(&server, "Paris,", ResponseTemplate::new(502).set_body_string("Bad Gateway")).await;

    let err = OpenWeatherClient::new()
        .fetch_weather(&LocationQuery::city("Paris"), &Credentials::new("KEY", endpoint(&server)))
        .await
        .unwrap_err();

    assert!(matches!(err, WeatherError::MalformedBody { .. }), "got {err:?}");
}

#[tokio::test]
async fn fetch_weather_propagates_connection_failure() {
    // Grab a free port and release it so nothing is listening there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let unreachable = format!("http://{}{WEATHER_PATH}", listener.local_addr().unwrap());
    drop(listener);

    let err = OpenWeatherClient::new()
        .fetch_weather(&LocationQuery::city("Paris"), &Credentials::new("KEY", unreachable))
        .await
        .unwrap_err();

    assert!(matches!(err, WeatherError::Transport(_)), "got {err:?}");
}

// ============================================================================
// Credential probe
// ============================================================================

#[tokio::test]
async fn validate_reports_transport_status_on_success() {
    let server = MockServer::start().await;
    // The body is not consulted on a successful probe.
    mount_probe(
        &server,
        "GOOD",
        ResponseTemplate::new(200).set_body_json(serde_json::json!({ "cod": "500" })),
    )
    .await;

    let result = OpenWeatherClient::new().validate("GOOD", &endpoint(&server)).await.unwrap();

    assert_eq!(result.status_code, 200);
    assert_eq!(result.message, None);
    assert!(result.is_accepted());
}

#[tokio::test]
async fn validate_reports_provider_error_on_401() {
    let server = MockServer::start().await;
    mount_probe(
        &server,
        "badkey",
        ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "cod": 401,
            "message": "Invalid API key. Please see https://openweathermap.org/faq#error401 for more info."
        })),
    )
    .await;

    let result = OpenWeatherClient::new().validate("badkey", &endpoint(&server)).await.unwrap();

    assert_eq!(result.status_code, 401);
    assert!(!result.is_accepted());
    assert!(result.message.unwrap().starts_with("Invalid API key"));
}

#[tokio::test]
async fn validate_propagates_non_json_error_body() {
    let server = MockServer::start().await;
    mount_probe(&server, "KEY", ResponseTemplate::new(500).set_body_string("oops")).await;

    let err = OpenWeatherClient::new().validate("KEY", &endpoint(&server)).await.unwrap_err();
    assert!(matches!(err, WeatherError::MalformedBody { .. }), "got {err:?}");
}

// ============================================================================
// Pages
// ============================================================================

#[derive(Debug)]
struct UntaggedSettings(Settings);

impl SettingsStore for UntaggedSettings {
    fn settings(&self) -> &Settings {
        &self.0
    }

    fn cache_tags(&self) -> Vec<String> {
        Vec::new()
    }
}

#[tokio::test]
async fn default_page_uses_configured_location_and_attaches_cache_tags() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .and(query_param("q", "Paris,FR"))
        .and(query_param("appid", "GOOD"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_weather("Paris")))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenWeatherClient::new();
    let settings = settings(&server);
    let model = WeatherPage::new(&client, &settings).render_default().await.unwrap();

    assert_eq!(model.city, "Paris");
    assert_eq!(model.weather.main, "Clear");
    assert_eq!(model.units, Units::Metric);
    assert_eq!(model.date_format, DateFormat::Iso);
    assert_eq!(model.cache_tags, Some(vec!["config:weather.settings".to_string()]));
    assert_eq!(model.formatted_date().as_deref(), Some("2023-11-14 23:13"));
}

#[tokio::test]
async fn default_page_without_store_tags_has_no_cache_tags() {
    let server = MockServer::start().await;
    mount_weather(
        &server,
        "Paris,FR",
        ResponseTemplate::new(200).set_body_json(current_weather("Paris")),
    )
    .await;

    let client = OpenWeatherClient::new();
    let store = UntaggedSettings(settings(&server));
    let model = WeatherPage::new(&client, &store).render_default().await.unwrap();

    assert_eq!(model.cache_tags, None);
}

#[tokio::test]
async fn city_page_never_attaches_cache_tags() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .and(query_param("q", "Lyon,"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_weather("Lyon")))
        .expect(1)
        .mount(&server)
        .await;

    let client = OpenWeatherClient::new();
    let settings = settings(&server);
    let model = WeatherPage::new(&client, &settings).render_for_city("Lyon").await.unwrap();

    assert_eq!(model.city, "Lyon");
    assert_eq!(model.cache_tags, None);
}

#[tokio::test]
async fn city_page_failure_is_not_found_with_capitalized_message() {
    let server = MockServer::start().await;
    mount_weather(
        &server,
        "Atlantis,",
        ResponseTemplate::new(404)
            .set_body_json(serde_json::json!({ "cod": "404", "message": "city not found" })),
    )
    .await;

    let client = OpenWeatherClient::new();
    let settings = settings(&server);
    let err = WeatherPage::new(&client, &settings).render_for_city("Atlantis").await.unwrap_err();

    match err {
        PageError::NotFound(message) => assert_eq!(message, "City not found"),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[tokio::test]
async fn page_with_empty_conditions_is_an_error() {
    let server = MockServer::start().await;
    let mut body = current_weather("Paris");
    body["weather"] = serde_json::json!([]);
    mount_weather(&server, "Paris,FR", ResponseTemplate::new(200).set_body_json(body)).await;

    let client = OpenWeatherClient::new();
    let settings = settings(&server);
    let err = WeatherPage::new(&client, &settings).render_default().await.unwrap_err();

    assert!(matches!(err, PageError::Present(_)), "got {err:?}");
}

#[tokio::test]
async fn incomplete_settings_deny_access_without_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_weather("Paris")))
        .expect(0)
        .mount(&server)
        .await;

    let client = OpenWeatherClient::new();

    let mut no_location = settings(&server);
    no_location.location = LocationSettings::default();
    let err = WeatherPage::new(&client, &no_location).render_default().await.unwrap_err();
    assert!(matches!(err, PageError::AccessDenied(_)), "got {err:?}");

    let mut no_key = settings(&server);
    no_key.api.key.clear();
    let err = WeatherPage::new(&client, &no_key).render_for_city("Lyon").await.unwrap_err();
    assert!(matches!(err, PageError::AccessDenied(_)), "got {err:?}");
}

// ============================================================================
// Settings form
// ============================================================================

#[tokio::test]
async fn valid_form_has_no_errors() {
    let server = MockServer::start().await;
    mount_probe(&server, "GOOD", ResponseTemplate::new(200)).await;
    mount_weather(
        &server,
        "Paris,FR",
        ResponseTemplate::new(200).set_body_json(current_weather("Paris")),
    )
    .await;

    let errors = validate_settings(&OpenWeatherClient::new(), &settings(&server)).await.unwrap();
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
}

#[tokio::test]
async fn form_reports_rejected_key_and_location() {
    let server = MockServer::start().await;
    let invalid_key = serde_json::json!({ "cod": 401, "message": "Invalid API key." });
    mount_probe(&server, "BAD", ResponseTemplate::new(401).set_body_json(invalid_key.clone()))
        .await;
    mount_weather(&server, "Paris,FR", ResponseTemplate::new(401).set_body_json(invalid_key)).await;

    let mut form = settings(&server);
    form.api.key = "BAD".into();

    let errors = validate_settings(&OpenWeatherClient::new(), &form).await.unwrap();
    let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
    assert_eq!(fields, vec![FormField::Api, FormField::Location]);
    assert_eq!(errors[0].message, "Invalid API key.");
}

#[tokio::test]
async fn form_reports_unknown_city_on_location() {
    let server = MockServer::start().await;
    mount_probe(&server, "GOOD", ResponseTemplate::new(200)).await;
    mount_weather(
        &server,
        "Nowhere,FR",
        ResponseTemplate::new(404)
            .set_body_json(serde_json::json!({ "cod": "404", "message": "city not found" })),
    )
    .await;

    let mut form = settings(&server);
    form.location.city = "Nowhere".into();

    let errors = validate_settings(&OpenWeatherClient::new(), &form).await.unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, FormField::Location);
    assert_eq!(errors[0].message, "City not found");
}

#[tokio::test]
async fn form_with_missing_fields_does_not_contact_provider() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut form = settings(&server);
    form.location.country_code = "  ".into();
    form.other.units = Units::from("kelvin");

    let errors = validate_settings(&OpenWeatherClient::new(), &form).await.unwrap();
    let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
    assert_eq!(fields, vec![FormField::CountryCode, FormField::Units]);
}

#[tokio::test]
async fn form_accepted_settings_render_the_same_way() {
    let server = MockServer::start().await;
    mount_probe(&server, "GOOD", ResponseTemplate::new(200)).await;
    Mock::given(method("GET"))
        .and(path(WEATHER_PATH))
        .and(query_param("q", "Paris,FR"))
        .and(query_param("appid", "GOOD"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_weather("Paris")))
        .expect(2)
        .mount(&server)
        .await;

    let mut form = settings(&server);
    form.api.key = " GOOD ".into();
    form.api.endpoint = format!(" {} ", endpoint(&server));
    form.location.city = "Paris ".into();
    form.location.country_code = " FR".into();

    let client = OpenWeatherClient::new();
    let errors = validate_settings(&client, &form).await.unwrap();
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");

    let saved = form.normalized();
    assert_eq!(saved.api.key, "GOOD");
    assert_eq!(saved.location.city, "Paris");

    let model = WeatherPage::new(&client, &form).render_default().await.unwrap();
    assert_eq!(model.city, "Paris");
}

#[tokio::test]
async fn form_reports_endpoint_without_scheme_on_api() {
    let mut form = Settings {
        api: ApiSettings {
            key: "GOOD".into(),
            endpoint: "api.openweathermap.org/data/2.5/weather".into(),
        },
        location: LocationSettings { city: "Paris".into(), country_code: "FR".into() },
        other: OtherSettings::default(),
    };

    let errors = validate_settings(&OpenWeatherClient::new(), &form).await.unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, FormField::Api);
    assert!(errors[0].message.contains("Invalid API endpoint"));

    form.api.endpoint = "not a url at all".into();
    let errors = validate_settings(&OpenWeatherClient::new(), &form).await.unwrap();
    assert_eq!(errors[0].field, FormField::Api);
}
