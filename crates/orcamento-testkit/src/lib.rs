// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use orcamento_app::{
    Base64Codec, Category, Client, DocumentService, DocumentStore, GenerateRequest, Item, Notice,
    Notifier, Quote, ShareSheet,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const FIRST_NAMES: [&str; 14] = [
    "maria", "joão", "ana", "josé", "francisca", "antônio", "adriana", "carlos", "juliana",
    "paulo", "márcia", "lucas", "fernanda", "rafael",
];
const LAST_NAMES: [&str; 12] = [
    "silva", "santos", "oliveira", "souza", "rodrigues", "ferreira", "alves", "pereira", "lima",
    "gomes", "ribeiro", "carvalho",
];
const STREETS: [&str; 8] = [
    "Rua das Flores",
    "Avenida Brasil",
    "Rua XV de Novembro",
    "Rua São João",
    "Avenida Paulista",
    "Rua da Paz",
    "Travessa do Comércio",
    "Rua Sete de Setembro",
];
const CITIES: [&str; 6] = [
    "São Paulo",
    "Campinas",
    "Belo Horizonte",
    "Curitiba",
    "Salvador",
    "Recife",
];
const AREA_CODES: [&str; 6] = ["11", "19", "31", "41", "71", "81"];
const CATEGORY_NAMES: [&str; 8] = [
    "Alvenaria",
    "Elétrica",
    "Hidráulica",
    "Pintura",
    "Revestimento",
    "Telhado",
    "Gesso",
    "Esquadrias",
];
const UNITS: [&str; 4] = ["m²", "m³", "un", "m"];

/// Minimal valid PDF body used as the fake service response.
pub const SAMPLE_PDF: &[u8] = b"%PDF-1.4\n1 0 obj<<>>endobj\ntrailer<<>>\n%%EOF\n";

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator for clients and priced category lists.
#[derive(Debug, Clone)]
pub struct QuoteFaker {
    rng: DeterministicRng,
}

impl QuoteFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    /// Raw client name as typed, lower case.
    pub fn typed_name(&mut self) -> String {
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        format!("{first} {last}")
    }

    pub fn phone_digits(&mut self) -> String {
        let mobile = self.rng.int_n(2) == 0;
        let mut digits = self.pick(&AREA_CODES).to_owned();
        if mobile {
            digits.push('9');
        }
        for _ in 0..8 {
            digits.push(char::from(b'0' + self.rng.int_n(10) as u8));
        }
        digits
    }

    pub fn client(&mut self) -> Client {
        let mut client = Client::default();
        client.set_name(&self.typed_name());
        client.set_phone(&self.phone_digits());
        let street = self.pick(&STREETS);
        let number = self.rng.int_n(2000) + 1;
        let city = self.pick(&CITIES);
        client.set_address(&format!("{street}, {number} - {city}"));
        client
    }

    /// Categories with unique names, each holding priced items. Prices are
    /// whole cents so sums are exact.
    pub fn categories(&mut self, count: usize, items_per_category: usize) -> Vec<Category> {
        CATEGORY_NAMES
            .iter()
            .take(count)
            .map(|name| {
                let items = (0..items_per_category)
                    .map(|index| {
                        let min = (self.rng.int_n(200) + 5) as f64;
                        let unit = self.pick(&UNITS);
                        let mut item = Item::new(
                            &format!("{name} serviço {}", index + 1),
                            unit,
                            min,
                            min * 2.0,
                        );
                        item.value = (self.rng.int_n(50_000) as f64) / 100.0;
                        item.quantity = self.rng.int_n(20) as f64;
                        item
                    })
                    .collect();
                Category::new(name, items)
            })
            .collect()
    }

    pub fn quote(&mut self, count: usize, items_per_category: usize) -> Quote {
        Quote {
            client: self.client(),
            categories: self.categories(count, items_per_category),
        }
    }

    fn pick<'a>(&mut self, values: &'a [&'a str]) -> &'a str {
        values[self.rng.int_n(values.len())]
    }
}

/// A quote with one category holding one priced item.
pub fn single_item_quote(client_name: &str, value: f64, quantity: f64) -> Quote {
    let mut item = Item::new("Reboco", "m²", 25.0, 45.0);
    item.value = value;
    item.quantity = quantity;
    let mut quote = Quote::new(vec![Category::new("Alvenaria", vec![item])]);
    quote.client.name = client_name.to_owned();
    quote
}

/// Document service double that records requests and replays a canned
/// response.
#[derive(Debug)]
pub struct StubDocumentService {
    response: std::result::Result<Vec<u8>, String>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl StubDocumentService {
    pub fn returning(bytes: &[u8]) -> Self {
        Self {
            response: Ok(bytes.to_vec()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_owned()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<GenerateRequest> {
        lock(&self.requests).clone()
    }
}

impl DocumentService for StubDocumentService {
    fn generate(&self, request: &GenerateRequest) -> Result<Vec<u8>> {
        lock(&self.requests).push(request.clone());
        self.response.clone().map_err(|message| anyhow!(message))
    }
}

/// Store that decodes into a scratch directory removed on drop.
#[derive(Debug)]
pub struct TempDocumentStore {
    dir: tempfile::TempDir,
    codec: Base64Codec,
    fail_with: Option<String>,
}

impl TempDocumentStore {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir().context("create temp documents dir")?,
            codec: Base64Codec::standard(),
            fail_with: None,
        })
    }

    pub fn failing(message: &str) -> Result<Self> {
        Ok(Self {
            fail_with: Some(message.to_owned()),
            ..Self::new()?
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn files(&self) -> Result<Vec<String>> {
        let mut names = fs::read_dir(self.dir.path())
            .context("list temp documents dir")?
            .map(|entry| Ok(entry?.file_name().to_string_lossy().into_owned()))
            .collect::<Result<Vec<String>>>()?;
        names.sort();
        Ok(names)
    }
}

impl DocumentStore for TempDocumentStore {
    fn write_base64(&self, file_name: &str, encoded: &str) -> Result<PathBuf> {
        if let Some(message) = &self.fail_with {
            return Err(anyhow!(message.clone()));
        }
        let path = self.dir.path().join(file_name);
        fs::write(&path, self.codec.decode(encoded)?)
            .with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }
}

#[derive(Debug, Default)]
pub struct RecordingShare {
    shared: Mutex<Vec<(PathBuf, String)>>,
    fail_with: Option<String>,
}

impl RecordingShare {
    pub fn failing(message: &str) -> Self {
        Self {
            shared: Mutex::new(Vec::new()),
            fail_with: Some(message.to_owned()),
        }
    }

    pub fn shared(&self) -> Vec<(PathBuf, String)> {
        lock(&self.shared).clone()
    }
}

impl ShareSheet for RecordingShare {
    fn share(&self, path: &Path, mime_type: &str) -> Result<()> {
        if let Some(message) = &self.fail_with {
            return Err(anyhow!(message.clone()));
        }
        lock(&self.shared).push((path.to_path_buf(), mime_type.to_owned()));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        lock(&self.notices).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        lock(&self.notices).push(notice);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::{QuoteFaker, single_item_quote};
    use std::collections::BTreeSet;

    #[test]
    fn faker_is_deterministic_per_seed() {
        let first = QuoteFaker::new(7).quote(3, 2);
        let second = QuoteFaker::new(7).quote(3, 2);
        assert_eq!(first, second);
    }

    #[test]
    fn faker_categories_have_unique_names() {
        let categories = QuoteFaker::new(11).categories(8, 1);
        let names = categories
            .iter()
            .map(|category| category.name.as_str())
            .collect::<BTreeSet<_>>();
        assert_eq!(names.len(), categories.len());
    }

    #[test]
    fn faker_client_is_formatted_like_typed_input() {
        let client = QuoteFaker::new(3).client();
        assert!(client.phone.starts_with('('));
        assert!(
            client
                .name
                .split(' ')
                .all(|word| word.chars().next().is_some_and(char::is_uppercase))
        );
    }

    #[test]
    fn single_item_quote_totals_value_times_quantity() {
        assert_eq!(single_item_quote("Maria", 100.0, 2.0).total(), 200.0);
    }
}
