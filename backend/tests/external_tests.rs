//! Outbound client tests against a local server that accepts connections
//! but never answers. Every client must give up with a timeout error.

use std::time::Duration;

use rust_decimal::Decimal;
use shared::GpsCoordinates;
use tokio::net::TcpListener;
use treematch_backend::external::{IpApiClient, NominatimClient, OpenWeatherMapClient};
use treematch_backend::services::{IpGeolocator, ReverseGeocoder, WeatherGateway};
use treematch_backend::{AppError, ErrorKind};

const CLIENT_TIMEOUT: Duration = Duration::from_millis(300);
const TEST_DEADLINE: Duration = Duration::from_secs(5);

/// Base URL of a server that holds every connection open without replying
async fn silent_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{}", addr)
}

fn nyeri() -> GpsCoordinates {
    GpsCoordinates::new(Decimal::new(-42, 2), Decimal::new(3695, 2))
}

fn assert_timed_out(err: AppError) {
    assert!(matches!(err, AppError::Timeout(_)), "expected timeout, got {:?}", err);
    assert_eq!(err.kind(), ErrorKind::Transient);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn ip_geolocation_times_out_on_silent_server() {
    let client = IpApiClient::new(silent_server().await, CLIENT_TIMEOUT).unwrap();

    let result = tokio::time::timeout(TEST_DEADLINE, client.locate())
        .await
        .expect("client ignored its request timeout");

    assert_timed_out(result.unwrap_err());
}

#[tokio::test]
async fn reverse_geocoding_times_out_on_silent_server() {
    let client = NominatimClient::new(silent_server().await, "treematch-test", CLIENT_TIMEOUT).unwrap();

    let result = tokio::time::timeout(TEST_DEADLINE, client.resolve(nyeri()))
        .await
        .expect("client ignored its request timeout");

    assert_timed_out(result.unwrap_err());
}

#[tokio::test]
async fn weather_times_out_on_silent_server() {
    let client = OpenWeatherMapClient::with_base_url(
        "test-key".to_string(),
        silent_server().await,
        CLIENT_TIMEOUT,
    )
    .unwrap();

    let result = tokio::time::timeout(TEST_DEADLINE, client.current_conditions(nyeri()))
        .await
        .expect("client ignored its request timeout");

    assert_timed_out(result.unwrap_err());
}
