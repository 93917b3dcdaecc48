// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use orcamento_app::{
    Base64Codec, DocumentStore, DocumentVariant, LoadingFlag, Notice, Notifier, Quote, ShareSheet,
    Workflow, WorkflowOutcome,
};
use orcamento_tui::{InternalEvent, SheetRuntime};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

/// Saves generated documents under one directory.
#[derive(Debug, Clone)]
pub struct DocumentsDir {
    root: PathBuf,
    codec: Base64Codec,
}

impl DocumentsDir {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            codec: Base64Codec::standard(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DocumentStore for DocumentsDir {
    fn write_base64(&self, file_name: &str, encoded: &str) -> Result<PathBuf> {
        let file_name = sanitize_file_name(file_name)?;
        fs::create_dir_all(&self.root)
            .with_context(|| format!("create documents directory {}", self.root.display()))?;
        let bytes = self.codec.decode(encoded)?;
        let path = self.root.join(file_name);
        fs::write(&path, bytes).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }
}

/// Path separators in the client name would escape the documents directory.
fn sanitize_file_name(file_name: &str) -> Result<String> {
    let cleaned: String = file_name
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | '\0' => '_',
            other => other,
        })
        .collect();
    if cleaned.trim_matches('.').is_empty() {
        bail!("refusing to write document with empty file name");
    }
    Ok(cleaned)
}

/// Hands the saved file to an opener program, or only logs when none is
/// configured.
#[derive(Debug, Clone, Default)]
pub struct CommandShare {
    command: Option<String>,
}

impl CommandShare {
    pub fn new(command: Option<&str>) -> Self {
        Self {
            command: command.map(str::to_owned),
        }
    }
}

impl ShareSheet for CommandShare {
    fn share(&self, path: &Path, mime_type: &str) -> Result<()> {
        let Some(command) = &self.command else {
            tracing::info!(path = %path.display(), "document saved; no [share] command configured");
            return Ok(());
        };

        let mut parts = command.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| anyhow!("share.command is empty"))?;
        let child = Command::new(program)
            .args(parts)
            .arg(path)
            .env("ORCAMENTO_MIME_TYPE", mime_type)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("run share command {program:?}; check [share] command"))?;
        reap_in_background(child)?;
        tracing::info!(path = %path.display(), program, "document handed to share command");
        Ok(())
    }
}

/// Waits on the opener off the UI thread so it never lingers as a zombie.
fn reap_in_background(mut child: Child) -> Result<JoinHandle<Option<ExitStatus>>> {
    thread::Builder::new()
        .name("share-reaper".to_owned())
        .spawn(move || match child.wait() {
            Ok(status) => {
                if !status.success() {
                    tracing::warn!(%status, "share command exited with failure");
                }
                Some(status)
            }
            Err(error) => {
                tracing::warn!(%error, "wait for share command");
                None
            }
        })
        .context("spawn share command reaper")
}

/// Prints notices for headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, notice: Notice) {
        eprintln!("[{}] {}", notice.severity.as_str(), notice.text());
    }
}

/// Everything the workflow needs, owned so it can be moved to a worker
/// thread.
#[derive(Debug, Clone)]
pub struct SheetHost {
    service: orcamento_pdf::Client,
    store: DocumentsDir,
    share: CommandShare,
    codec: Base64Codec,
}

impl SheetHost {
    pub fn new(service: orcamento_pdf::Client, store: DocumentsDir, share: CommandShare) -> Self {
        Self {
            service,
            store,
            share,
            codec: Base64Codec::standard(),
        }
    }

    pub fn generate(
        &self,
        quote: &Quote,
        variant: Option<DocumentVariant>,
        loading: &LoadingFlag,
        notifier: &dyn Notifier,
    ) -> WorkflowOutcome {
        Workflow::new(
            &self.service,
            &self.store,
            &self.share,
            notifier,
            &self.codec,
        )
        .run(quote, variant, loading)
    }
}

impl SheetRuntime for SheetHost {
    fn run_generation(
        &mut self,
        quote: &Quote,
        variant: Option<DocumentVariant>,
        loading: &LoadingFlag,
        notifier: &dyn Notifier,
    ) -> WorkflowOutcome {
        self.generate(quote, variant, loading, notifier)
    }

    fn spawn_generation(
        &mut self,
        quote: Quote,
        variant: Option<DocumentVariant>,
        loading: LoadingFlag,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let host = self.clone();
        thread::Builder::new()
            .name("pdf-generation".to_owned())
            .spawn(move || {
                let notices = tx.clone();
                let notify = move |notice: Notice| {
                    let _ = notices.send(InternalEvent::Notice(notice));
                };
                let outcome = host.generate(&quote, variant, &loading, &notify);
                let _ = tx.send(InternalEvent::GenerationFinished(outcome));
            })
            .context("spawn document generation worker")?;
        Ok(())
    }
}
