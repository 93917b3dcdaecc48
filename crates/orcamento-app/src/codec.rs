// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::GeneralPurpose;
use base64::engine::general_purpose::STANDARD;

/// Base64 text codec shared by the workflow and the document store. Built
/// once at startup and passed to whoever needs it.
#[derive(Debug, Clone)]
pub struct Base64Codec {
    engine: GeneralPurpose,
}

impl Default for Base64Codec {
    fn default() -> Self {
        Self::standard()
    }
}

impl Base64Codec {
    pub const fn standard() -> Self {
        Self { engine: STANDARD }
    }

    pub fn encode(&self, bytes: &[u8]) -> String {
        self.engine.encode(bytes)
    }

    pub fn decode(&self, encoded: &str) -> Result<Vec<u8>> {
        self.engine
            .decode(encoded.trim())
            .context("decode base64 document content")
    }
}
