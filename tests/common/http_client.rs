//! HTTP client utilities for testing.
//!
//! Thin `reqwest` wrappers for talking to a tile server started by the tests.

use once_cell::sync::Lazy;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::error::Error;
use std::net::SocketAddr;
use std::time::Duration;

pub type TestResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// Tiles at the deepest zoom render on demand; leave room for that
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

static CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|_| Client::new())
});

pub fn url(addr: &SocketAddr, path: &str) -> String {
    format!("http://{}{}", addr, path)
}

/// Path of a layer tile, e.g. `/tiles/ndvi/3/4/2.png`
pub fn tile_path(layer: &str, z: u8, x: u32, y: u32) -> String {
    format!("/tiles/{}/{}/{}/{}.png", layer, z, x, y)
}

pub async fn get(addr: &SocketAddr, path: &str) -> TestResult<Response> {
    Ok(CLIENT.get(url(addr, path)).send().await?)
}

async fn get_ok(addr: &SocketAddr, path: &str) -> TestResult<Response> {
    let response = get(addr, path).await?;
    let status = response.status();
    if status != StatusCode::OK {
        let body = response.text().await.unwrap_or_default();
        return Err(format!("GET {} returned {}: {}", path, status, body).into());
    }
    Ok(response)
}

/// GET a JSON document, failing on any non-200 status
pub async fn get_json<T: DeserializeOwned>(addr: &SocketAddr, path: &str) -> TestResult<T> {
    Ok(get_ok(addr, path).await?.json::<T>().await?)
}

/// GET an image body, failing on any non-200 status
pub async fn get_image(addr: &SocketAddr, path: &str) -> TestResult<Vec<u8>> {
    Ok(get_ok(addr, path).await?.bytes().await?.to_vec())
}

/// GET returning the status together with the JSON body; used for error responses
pub async fn get_status_json(
    addr: &SocketAddr,
    path: &str,
) -> TestResult<(StatusCode, serde_json::Value)> {
    let response = get(addr, path).await?;
    let status = response.status();
    Ok((status, response.json().await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url() {
        let addr: SocketAddr = ([127, 0, 0, 1], 8000).into();
        assert_eq!(url(&addr, "/layers"), "http://127.0.0.1:8000/layers");
    }

    #[test]
    fn test_tile_path() {
        assert_eq!(tile_path("ndvi", 3, 4, 2), "/tiles/ndvi/3/4/2.png");
    }
}
