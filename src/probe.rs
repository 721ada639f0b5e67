//! Blocking HTTP probe used by the search engine.
//!
//! All network failures are absorbed: `is_valid_url` is a boolean probe and
//! `fetch` yields `None` on any error, so search degrades to fewer results
//! instead of failing. Calls are synchronous and sequential; a `timeout`
//! bounds each request when the caller asks for one.

use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use std::time::Duration;

const USER_AGENT: &str = concat!("terminus-plugins/", env!("CARGO_PKG_VERSION"));

pub struct ProbeClient {
    /// Status probe reports the first response, so redirects are not followed.
    status: Client,
    /// Page fetches follow redirects like a browser would.
    page: Client,
}

impl ProbeClient {
    pub fn new(timeout: Option<Duration>) -> Self {
        let status = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(Policy::none())
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        let page = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { status, page }
    }

    /// True only when the URL answers with a 200 status.
    pub fn is_valid_url(&self, url: &str) -> bool {
        if url.trim().is_empty() {
            return false;
        }
        match self.status.get(url).send() {
            Ok(response) => response.status() == StatusCode::OK,
            Err(_) => false,
        }
    }

    /// Fetch a page body, or `None` on any failure or an empty body.
    pub fn fetch(&self, url: &str) -> Option<String> {
        let response = self.page.get(url).send().ok()?;
        if !response.status().is_success() {
            return None;
        }
        let body = response.text().ok()?;
        if body.is_empty() {
            None
        } else {
            Some(body)
        }
    }
}

impl Default for ProbeClient {
    fn default() -> Self {
        Self::new(None)
    }
}
