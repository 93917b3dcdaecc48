// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use time::OffsetDateTime;

use crate::codec::Base64Codec;
use crate::model::{Category, DocumentVariant, PDF_MIME_TYPE, Quote};

pub const NOT_PROVIDED: &str = "não informado";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Info,
}

impl Severity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub title: String,
    pub detail: Option<String>,
}

impl Notice {
    pub fn new(severity: Severity, title: &str, detail: Option<&str>) -> Self {
        Self {
            severity,
            title: title.to_owned(),
            detail: detail.map(str::to_owned),
        }
    }

    pub fn missing_variant() -> Self {
        Self::new(Severity::Info, "Selecione Cliente ou Construtor", None)
    }

    pub fn missing_client_name() -> Self {
        Self::new(
            Severity::Info,
            "Nome do cliente obrigatório",
            Some("Por favor, preencha o nome antes de gerar o PDF."),
        )
    }

    pub fn empty_quote() -> Self {
        Self::new(
            Severity::Info,
            "Orçamento vazio",
            Some("Adicione valores antes de gerar."),
        )
    }

    pub fn generated() -> Self {
        Self::new(Severity::Success, "PDF gerado com sucesso!", None)
    }

    pub fn generation_failed(message: &str) -> Self {
        Self::new(Severity::Error, "Erro ao gerar PDF", Some(message))
    }

    pub fn text(&self) -> String {
        match &self.detail {
            Some(detail) if !detail.is_empty() => format!("{}: {}", self.title, detail),
            _ => self.title.clone(),
        }
    }
}

/// Renders the remote PDF for a request.
pub trait DocumentService {
    fn generate(&self, request: &GenerateRequest) -> Result<Vec<u8>>;
}

/// Writes base64 document content to app-scoped storage and returns the
/// resulting path.
pub trait DocumentStore {
    fn write_base64(&self, file_name: &str, encoded: &str) -> Result<PathBuf>;
}

/// Hands a finished file to the platform share/open affordance.
pub trait ShareSheet {
    fn share(&self, path: &Path, mime_type: &str) -> Result<()>;
}

pub trait Notifier {
    fn notify(&self, notice: Notice);
}

impl<F> Notifier for F
where
    F: Fn(Notice),
{
    fn notify(&self, notice: Notice) {
        self(notice)
    }
}

/// JSON body sent to the document-generation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "telefone")]
    pub phone: String,
    #[serde(rename = "endereco")]
    pub address: String,
    #[serde(rename = "categorias")]
    pub categories: Vec<Category>,
    #[serde(rename = "tipo")]
    pub variant: DocumentVariant,
}

impl GenerateRequest {
    pub fn from_quote(quote: &Quote, variant: DocumentVariant) -> Self {
        Self {
            name: quote.client.name.clone(),
            phone: or_not_provided(&quote.client.phone),
            address: or_not_provided(&quote.client.address),
            categories: quote.categories.clone(),
            variant,
        }
    }
}

fn or_not_provided(value: &str) -> String {
    if value.is_empty() {
        NOT_PROVIDED.to_owned()
    } else {
        value.to_owned()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedDocument {
    pub path: PathBuf,
    pub variant: DocumentVariant,
    pub generated_at: OffsetDateTime,
}

/// In-flight marker shared between the screen and a running workflow.
#[derive(Debug, Clone, Default)]
pub struct LoadingFlag(Arc<AtomicBool>);

impl LoadingFlag {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Sets the flag until the returned guard is dropped.
    pub fn begin(&self) -> LoadingGuard<'_> {
        self.0.store(true, Ordering::SeqCst);
        LoadingGuard { flag: self }
    }
}

pub struct LoadingGuard<'a> {
    flag: &'a LoadingFlag,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.flag.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Idle,
    Validating,
    Requesting(GenerateRequest),
    Decoding(Vec<u8>),
    Persisting(String),
    Sharing(PathBuf),
    Succeeded(GeneratedDocument),
    Rejected(Notice),
    Failed(String),
}

impl Stage {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Requesting(_) => "requesting",
            Self::Decoding(_) => "decoding",
            Self::Persisting(_) => "persisting",
            Self::Sharing(_) => "sharing",
            Self::Succeeded(_) => "succeeded",
            Self::Rejected(_) => "rejected",
            Self::Failed(_) => "failed",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Succeeded(_) | Self::Rejected(_) | Self::Failed(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowOutcome {
    MissingVariant,
    Rejected(Notice),
    Succeeded(GeneratedDocument),
    Failed(String),
}

/// Returns the notice that blocks generation, if any.
pub fn validate(quote: &Quote) -> Option<Notice> {
    if quote.client.name.trim().is_empty() {
        return Some(Notice::missing_client_name());
    }
    if quote.total() == 0.0 {
        return Some(Notice::empty_quote());
    }
    None
}

pub struct Workflow<'a> {
    service: &'a dyn DocumentService,
    store: &'a dyn DocumentStore,
    share: &'a dyn ShareSheet,
    notifier: &'a dyn Notifier,
    codec: &'a Base64Codec,
}

impl<'a> Workflow<'a> {
    pub fn new(
        service: &'a dyn DocumentService,
        store: &'a dyn DocumentStore,
        share: &'a dyn ShareSheet,
        notifier: &'a dyn Notifier,
        codec: &'a Base64Codec,
    ) -> Self {
        Self {
            service,
            store,
            share,
            notifier,
            codec,
        }
    }

    /// Runs validate → request → decode → persist → share and reports the
    /// result through the notifier. `loading` is set for the duration of the
    /// run and cleared on every exit path.
    pub fn run(
        &self,
        quote: &Quote,
        variant: Option<DocumentVariant>,
        loading: &LoadingFlag,
    ) -> WorkflowOutcome {
        let Some(variant) = variant else {
            self.notifier.notify(Notice::missing_variant());
            return WorkflowOutcome::MissingVariant;
        };

        let _loading = loading.begin();
        let mut stage = Stage::Idle;
        while !stage.is_terminal() {
            let current = stage.name();
            stage = match self.step(stage, quote, variant) {
                Ok(next) => next,
                Err(error) => {
                    tracing::error!(
                        stage = current,
                        variant = variant.as_str(),
                        error = %format!("{error:#}"),
                        "document generation failed"
                    );
                    Stage::Failed(format!("{error:#}"))
                }
            };
        }

        match stage {
            Stage::Succeeded(document) => {
                tracing::info!(
                    path = %document.path.display(),
                    variant = variant.as_str(),
                    "document generated"
                );
                self.notifier.notify(Notice::generated());
                WorkflowOutcome::Succeeded(document)
            }
            Stage::Rejected(notice) => {
                tracing::info!(reason = %notice.title, "document generation rejected");
                self.notifier.notify(notice.clone());
                WorkflowOutcome::Rejected(notice)
            }
            Stage::Failed(message) => {
                self.notifier.notify(Notice::generation_failed(&message));
                WorkflowOutcome::Failed(message)
            }
            other => WorkflowOutcome::Failed(format!(
                "workflow stopped in non-terminal stage {}",
                other.name()
            )),
        }
    }

    /// Performs the work of `stage` and returns the stage that follows it.
    pub fn step(&self, stage: Stage, quote: &Quote, variant: DocumentVariant) -> Result<Stage> {
        match stage {
            Stage::Idle => Ok(Stage::Validating),
            Stage::Validating => Ok(match validate(quote) {
                Some(notice) => Stage::Rejected(notice),
                None => Stage::Requesting(GenerateRequest::from_quote(quote, variant)),
            }),
            Stage::Requesting(request) => {
                tracing::info!(
                    variant = request.variant.as_str(),
                    categories = request.categories.len(),
                    total = quote.total(),
                    "requesting document"
                );
                let bytes = self.service.generate(&request)?;
                Ok(Stage::Decoding(bytes))
            }
            Stage::Decoding(bytes) => Ok(Stage::Persisting(self.codec.encode(&bytes))),
            Stage::Persisting(encoded) => {
                let file_name = variant.file_name(&quote.client.name);
                let path = self
                    .store
                    .write_base64(&file_name, &encoded)
                    .with_context(|| format!("save {file_name}"))?;
                Ok(Stage::Sharing(path))
            }
            Stage::Sharing(path) => {
                self.share
                    .share(&path, PDF_MIME_TYPE)
                    .with_context(|| format!("share {}", path.display()))?;
                Ok(Stage::Succeeded(GeneratedDocument {
                    path,
                    variant,
                    generated_at: OffsetDateTime::now_utc(),
                }))
            }
            terminal => Ok(terminal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DocumentService, DocumentStore, GenerateRequest, LoadingFlag, NOT_PROVIDED, Notice,
        Severity, ShareSheet, Stage, Workflow, validate,
    };
    use crate::codec::Base64Codec;
    use crate::model::{Category, DocumentVariant, Item, Quote};
    use anyhow::{Result, bail};
    use std::path::{Path, PathBuf};

    fn priced_quote(name: &str) -> Quote {
        let mut item = Item::new("Reboco", "m²", 25.0, 45.0);
        item.value = 100.0;
        item.quantity = 2.0;
        let mut quote = Quote::new(vec![Category::new("Alvenaria", vec![item])]);
        quote.client.name = name.to_owned();
        quote
    }

    #[test]
    fn validate_requires_client_name() {
        assert_eq!(
            validate(&priced_quote("   ")),
            Some(Notice::missing_client_name())
        );
    }

    #[test]
    fn validate_requires_non_zero_total() {
        let mut quote = priced_quote("Maria");
        quote.categories[0].items[0].quantity = 0.0;
        assert_eq!(validate(&quote), Some(Notice::empty_quote()));
    }

    #[test]
    fn validate_accepts_named_priced_quote() {
        assert_eq!(validate(&priced_quote("Maria")), None);
    }

    #[test]
    fn validation_notices_are_informational() {
        for notice in [
            Notice::missing_variant(),
            Notice::missing_client_name(),
            Notice::empty_quote(),
        ] {
            assert_eq!(notice.severity, Severity::Info);
        }
    }

    #[test]
    fn request_defaults_missing_contact_fields() -> Result<()> {
        let request = GenerateRequest::from_quote(&priced_quote("Maria"), DocumentVariant::Cliente);
        assert_eq!(request.phone, NOT_PROVIDED);
        assert_eq!(request.address, NOT_PROVIDED);

        let encoded = serde_json::to_value(&request)?;
        assert_eq!(encoded["nome"], "Maria");
        assert_eq!(encoded["telefone"], "não informado");
        assert_eq!(encoded["tipo"], "cliente");
        assert_eq!(encoded["categorias"][0]["nome"], "Alvenaria");
        assert_eq!(encoded["categorias"][0]["itens"][0]["valor"], 100.0);
        Ok(())
    }

    #[test]
    fn request_keeps_provided_contact_fields() {
        let mut quote = priced_quote("Maria");
        quote.client.phone = "(11) 98765-4321".to_owned();
        quote.client.address = "Rua A, 10".to_owned();
        let request = GenerateRequest::from_quote(&quote, DocumentVariant::Construtor);
        assert_eq!(request.phone, "(11) 98765-4321");
        assert_eq!(request.address, "Rua A, 10");
        assert_eq!(request.variant, DocumentVariant::Construtor);
    }

    #[test]
    fn loading_guard_clears_flag_on_drop() {
        let flag = LoadingFlag::default();
        {
            let _guard = flag.begin();
            assert!(flag.is_set());
        }
        assert!(!flag.is_set());
    }

    #[test]
    fn loading_guard_clears_flag_while_unwinding() {
        let flag = LoadingFlag::default();
        let shared = flag.clone();
        let result = std::panic::catch_unwind(move || {
            let _guard = shared.begin();
            panic!("boom");
        });
        assert!(result.is_err());
        assert!(!flag.is_set());
    }

    #[test]
    fn terminal_stages_are_flagged() {
        assert!(Stage::Failed("x".to_owned()).is_terminal());
        assert!(Stage::Rejected(Notice::empty_quote()).is_terminal());
        assert!(!Stage::Validating.is_terminal());
        assert!(!Stage::Decoding(Vec::new()).is_terminal());
        assert_eq!(Stage::Persisting(String::new()).name(), "persisting");
    }

    struct Unused;

    impl DocumentService for Unused {
        fn generate(&self, _request: &GenerateRequest) -> Result<Vec<u8>> {
            bail!("service should not be called")
        }
    }

    impl DocumentStore for Unused {
        fn write_base64(&self, _file_name: &str, _encoded: &str) -> Result<PathBuf> {
            bail!("store should not be called")
        }
    }

    impl ShareSheet for Unused {
        fn share(&self, _path: &Path, _mime_type: &str) -> Result<()> {
            bail!("share should not be called")
        }
    }

    #[test]
    fn idle_moves_to_validating_then_requesting() -> Result<()> {
        let codec = Base64Codec::standard();
        let notify = |_: Notice| {};
        let workflow = Workflow::new(&Unused, &Unused, &Unused, &notify, &codec);
        let quote = priced_quote("Maria");

        let next = workflow.step(Stage::Idle, &quote, DocumentVariant::Cliente)?;
        assert_eq!(next, Stage::Validating);
        let next = workflow.step(next, &quote, DocumentVariant::Cliente)?;
        assert_eq!(next.name(), "requesting");
        Ok(())
    }

    #[test]
    fn empty_body_is_still_encoded_for_storage() -> Result<()> {
        let codec = Base64Codec::standard();
        let notify = |_: Notice| {};
        let workflow = Workflow::new(&Unused, &Unused, &Unused, &notify, &codec);

        let next = workflow.step(
            Stage::Decoding(Vec::new()),
            &priced_quote("Maria"),
            DocumentVariant::Cliente,
        )?;
        assert_eq!(next, Stage::Persisting(String::new()));
        Ok(())
    }

    #[test]
    fn notice_text_joins_title_and_detail() {
        assert_eq!(
            Notice::generation_failed("server error (500)").text(),
            "Erro ao gerar PDF: server error (500)"
        );
        assert_eq!(Notice::generated().text(), "PDF gerado com sucesso!");
    }
}
