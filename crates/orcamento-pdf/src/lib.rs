// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use orcamento_app::{DocumentService, GenerateRequest, PDF_MIME_TYPE};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

pub const DEFAULT_SERVICE_URL: &str = "https://api-planilhadeorcamento.onrender.com/gerar-pdf";

/// Blocking client for the PDF rendering endpoint.
#[derive(Debug, Clone)]
pub struct Client {
    url: Url,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let url = parse_service_url(url)?;
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self { url, timeout, http })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn generate_pdf(&self, request: &GenerateRequest) -> Result<Vec<u8>> {
        let response = self
            .http
            .post(self.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, PDF_MIME_TYPE)
            .json(request)
            .send()
            .map_err(|error| connection_error(self.url.as_str(), error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                body = %body,
                "document service rejected request"
            );
            return Err(clean_error_response(status, &body));
        }

        let bytes = response.bytes().context("read PDF response body")?;
        tracing::debug!(bytes = bytes.len(), "document service responded");
        Ok(bytes.to_vec())
    }
}

impl DocumentService for Client {
    fn generate(&self, request: &GenerateRequest) -> Result<Vec<u8>> {
        self.generate_pdf(request)
    }
}

/// Accepts absolute http(s) URLs only.
pub fn parse_service_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("service.url must not be empty");
    }
    let url = Url::parse(trimmed).with_context(|| format!("parse service.url {trimmed:?}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!(
            "service.url must use http or https, got {:?} -- for example {DEFAULT_SERVICE_URL}",
            url.scheme()
        );
    }
    Ok(url)
}

fn connection_error(url: &str, error: reqwest::Error) -> anyhow::Error {
    if error.is_timeout() {
        return anyhow!("request to {url} timed out -- raise [service] timeout or try again");
    }
    anyhow!("cannot reach {url} -- check your connection or [service] url ({error})")
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(message) = parsed.into_message()
    {
        return anyhow!("server error ({}): {}", status.as_u16(), message);
    }

    let body = body.trim();
    if !body.is_empty() && body.len() < 100 && !body.contains('{') && !body.contains('<') {
        return anyhow!("server error ({}): {}", status.as_u16(), body);
    }

    anyhow!("server returned {}", status.as_u16())
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
    message: Option<String>,
    detail: Option<String>,
}

impl ErrorEnvelope {
    fn into_message(self) -> Option<String> {
        [self.error, self.message, self.detail]
            .into_iter()
            .flatten()
            .find(|message| !message.trim().is_empty())
    }
}
