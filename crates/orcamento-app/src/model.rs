// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::format::{format_phone, title_case};

pub const PDF_MIME_TYPE: &str = "application/pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentVariant {
    Cliente,
    Construtor,
}

impl DocumentVariant {
    pub const ALL: [Self; 2] = [Self::Cliente, Self::Construtor];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cliente => "cliente",
            Self::Construtor => "construtor",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cliente" => Some(Self::Cliente),
            "construtor" => Some(Self::Construtor),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Cliente => "Cliente",
            Self::Construtor => "Construtor",
        }
    }

    pub const fn file_suffix(self) -> &'static str {
        match self {
            Self::Cliente => "_Orcamento_Cliente.pdf",
            Self::Construtor => "_Orcamento_Construtor.pdf",
        }
    }

    /// Output file name for a generated document: `<client name><suffix>`.
    pub fn file_name(self, client_name: &str) -> String {
        format!("{client_name}{}", self.file_suffix())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemField {
    Value,
    Quantity,
}

impl ItemField {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Value => "valor",
            Self::Quantity => "quantidade",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Value => "Valor (R$)",
            Self::Quantity => "Quantidade",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "unid", default)]
    pub unit: String,
    #[serde(rename = "valorMin", default)]
    pub min_value: f64,
    #[serde(rename = "valorMax", default)]
    pub max_value: f64,
    #[serde(rename = "observacoes", default)]
    pub notes: String,
    #[serde(rename = "valor", default)]
    pub value: f64,
    #[serde(rename = "quantidade", default)]
    pub quantity: f64,
}

impl Item {
    pub fn new(description: &str, unit: &str, min_value: f64, max_value: f64) -> Self {
        Self {
            description: description.to_owned(),
            unit: unit.to_owned(),
            min_value,
            max_value,
            notes: String::new(),
            value: 0.0,
            quantity: 0.0,
        }
    }

    pub fn field(&self, field: ItemField) -> f64 {
        match field {
            ItemField::Value => self.value,
            ItemField::Quantity => self.quantity,
        }
    }

    pub fn with_field(&self, field: ItemField, amount: f64) -> Self {
        let mut next = self.clone();
        match field {
            ItemField::Value => next.value = amount,
            ItemField::Quantity => next.quantity = amount,
        }
        next
    }

    pub fn subtotal(&self) -> f64 {
        self.value * self.quantity
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "itens", default)]
    pub items: Vec<Item>,
}

impl Category {
    pub fn new(name: &str, items: Vec<Item>) -> Self {
        Self {
            name: name.to_owned(),
            items,
        }
    }

    pub fn subtotal(&self) -> f64 {
        self.items.iter().map(Item::subtotal).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    #[serde(rename = "nome", default)]
    pub name: String,
    #[serde(rename = "telefone", default)]
    pub phone: String,
    #[serde(rename = "endereco", default)]
    pub address: String,
}

impl Client {
    pub fn set_name(&mut self, raw: &str) {
        self.name = title_case(raw);
    }

    pub fn set_phone(&mut self, raw: &str) {
        self.phone = format_phone(raw);
    }

    pub fn set_address(&mut self, raw: &str) {
        self.address = raw.to_owned();
    }

    pub fn field(&self, field: ClientField) -> &str {
        match field {
            ClientField::Name => &self.name,
            ClientField::Phone => &self.phone,
            ClientField::Address => &self.address,
        }
    }

    pub fn set_field(&mut self, field: ClientField, raw: &str) {
        match field {
            ClientField::Name => self.set_name(raw),
            ClientField::Phone => self.set_phone(raw),
            ClientField::Address => self.set_address(raw),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientField {
    Name,
    Phone,
    Address,
}

impl ClientField {
    pub const ALL: [Self; 3] = [Self::Name, Self::Phone, Self::Address];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Nome",
            Self::Phone => "Telefone",
            Self::Address => "Endereço",
        }
    }

    pub const fn placeholder(self) -> &'static str {
        match self {
            Self::Name => "Digite o nome do cliente",
            Self::Phone => "(00) 00000-0000",
            Self::Address => "Rua, número, bairro, cidade",
        }
    }
}

/// The whole editable sheet for one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    #[serde(rename = "cliente", default)]
    pub client: Client,
    #[serde(rename = "categorias", default)]
    pub categories: Vec<Category>,
}

impl Quote {
    pub fn new(categories: Vec<Category>) -> Self {
        Self {
            client: Client::default(),
            categories,
        }
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.name == name)
    }

    pub fn apply_item_edit(&mut self, category: &str, index: usize, field: ItemField, raw: &str) {
        self.categories = crate::quote::update_item(&self.categories, category, index, field, raw);
    }

    pub fn total(&self) -> f64 {
        crate::quote::grand_total(&self.categories)
    }
}
