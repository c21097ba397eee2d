// src/core/net.rs
// Blocking HTTP GET. Non-2xx statuses come back as data, not errors;
// only transport failures are `Err`.

use std::time::Duration;

use crate::error::Result;

pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub fn client(timeout: Duration) -> Result<reqwest::blocking::Client> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("flyontime/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

pub fn http_get(client: &reqwest::blocking::Client, url: &str) -> Result<HttpResponse> {
    let resp = client.get(url).send()?;
    let status = resp.status().as_u16();
    let body = resp.text()?;
    Ok(HttpResponse { status, body })
}
