// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::model::{Category, ItemField};

/// Parses the longest leading float literal in `raw`, ignoring leading
/// whitespace. Anything unparsable, NaN, or infinite yields `0.0`.
pub fn parse_number(raw: &str) -> f64 {
    let trimmed = raw.trim_start();
    let literal = &trimmed[..float_prefix_len(trimmed)];
    match literal.parse::<f64>() {
        Ok(value) if value.is_finite() && value != 0.0 => value,
        _ => 0.0,
    }
}

fn float_prefix_len(input: &str) -> usize {
    let bytes = input.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return 0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    end
}

/// Returns a new category list where only the addressed item's field holds
/// `parse_number(raw)`. Unknown categories and out-of-range indices leave the
/// list as it was.
pub fn update_item(
    categories: &[Category],
    category_name: &str,
    index: usize,
    field: ItemField,
    raw: &str,
) -> Vec<Category> {
    let amount = parse_number(raw);
    categories
        .iter()
        .map(|category| {
            if category.name != category_name {
                return category.clone();
            }
            Category {
                name: category.name.clone(),
                items: category
                    .items
                    .iter()
                    .enumerate()
                    .map(|(position, item)| {
                        if position == index {
                            item.with_field(field, amount)
                        } else {
                            item.clone()
                        }
                    })
                    .collect(),
            }
        })
        .collect()
}

pub fn grand_total(categories: &[Category]) -> f64 {
    categories.iter().map(Category::subtotal).sum()
}
