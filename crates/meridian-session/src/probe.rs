//! Reachability check for a grid's login endpoint.

use std::time::Duration;

use reqwest::StatusCode;

/// `GET login_uri` and report whether it answered `200 OK` within
/// `timeout`.
///
/// Never fails: an unparseable URI, a refused connection, a timeout and a
/// non-200 status all read as "not reachable". Used by the login screen to
/// grey out dead grids before the user types a password.
pub async fn probe_login_uri(login_uri: &str, timeout: Duration) -> bool {
    let client = match reqwest::Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(error = %e, "could not build HTTP client for grid probe");
            return false;
        }
    };

    match client.get(login_uri).send().await {
        Ok(response) => {
            let status = response.status();
            tracing::debug!(login_uri, %status, "grid probe answered");
            status == StatusCode::OK
        }
        Err(e) => {
            tracing::debug!(login_uri, error = %e, "grid probe failed");
            false
        }
    }
}
