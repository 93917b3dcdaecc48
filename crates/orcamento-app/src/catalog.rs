// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::model::Category;

const DEFAULT_CATALOG: &str = include_str!("catalog.json");

/// The service catalog bundled with the binary.
pub fn default_catalog() -> Result<Vec<Category>> {
    parse_catalog(DEFAULT_CATALOG).context("parse bundled service catalog")
}

pub fn load_catalog(path: &Path) -> Result<Vec<Category>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read catalog file {}", path.display()))?;
    parse_catalog(&raw).with_context(|| format!("parse catalog file {}", path.display()))
}

pub fn parse_catalog(raw: &str) -> Result<Vec<Category>> {
    let categories: Vec<Category> =
        serde_json::from_str(raw).context("decode catalog JSON (expected a list of categories)")?;

    let mut seen = BTreeSet::new();
    for category in &categories {
        if category.name.trim().is_empty() {
            bail!("catalog category name must not be empty");
        }
        if !seen.insert(category.name.as_str()) {
            bail!(
                "catalog category {:?} appears more than once -- category names must be unique",
                category.name
            );
        }
    }
    Ok(categories)
}

#[cfg(test)]
mod tests {
    use super::{default_catalog, load_catalog, parse_catalog};
    use crate::quote::grand_total;
    use anyhow::Result;

    #[test]
    fn bundled_catalog_parses_with_zeroed_inputs() -> Result<()> {
        let categories = default_catalog()?;
        assert!(!categories.is_empty());
        assert!(categories.iter().all(|category| !category.items.is_empty()));
        assert_eq!(grand_total(&categories), 0.0);
        Ok(())
    }

    #[test]
    fn duplicate_category_names_are_rejected() {
        let error = parse_catalog(r#"[{"nome":"Pintura","itens":[]},{"nome":"Pintura","itens":[]}]"#)
            .expect_err("duplicate names should fail");
        assert!(error.to_string().contains("more than once"));
    }

    #[test]
    fn blank_category_names_are_rejected() {
        let error = parse_catalog(r#"[{"nome":"  ","itens":[]}]"#)
            .expect_err("blank name should fail");
        assert!(error.to_string().contains("must not be empty"));
    }

    #[test]
    fn malformed_catalog_reports_decode_error() {
        let error = parse_catalog("{not json").expect_err("malformed catalog should fail");
        assert!(error.to_string().contains("decode catalog JSON"));
    }

    #[test]
    fn load_catalog_reads_file_from_disk() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"[{"nome":"Telhado","itens":[{"descricao":"Troca de telha","unid":"m²","valorMin":30,"valorMax":60}]}]"#,
        )?;
        let categories = load_catalog(&path)?;
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].items[0].unit, "m²");
        Ok(())
    }

    #[test]
    fn load_catalog_names_missing_file() {
        let error = load_catalog(std::path::Path::new("/nonexistent/catalog.json"))
            .expect_err("missing file should fail");
        assert!(error.to_string().contains("read catalog file"));
    }
}
