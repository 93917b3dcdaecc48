// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::{Date, OffsetDateTime};

/// Lower-cases the input, then upper-cases the first character of every
/// space-separated token. Runs of spaces are kept as empty tokens.
pub fn title_case(input: &str) -> String {
    input
        .to_lowercase()
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Formats a Brazilian phone number while the user types.
///
/// Up to ten digits use the landline layout `(DD) DDDD-DDDD`; eleven or more
/// use the mobile layout `(DD) DDDDD-DDDD`. The trailing group may be partial
/// or empty. When there are not yet enough digits to fill the area code and
/// the middle group, the bare digits are returned. Digits past the last group
/// are kept verbatim at the end.
pub fn format_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let middle = if digits.len() <= 10 { 4 } else { 5 };
    if digits.len() < 2 + middle {
        return digits;
    }

    let (area, rest) = digits.split_at(2);
    let (prefix, rest) = rest.split_at(middle);
    let line_len = rest.len().min(4);
    let (line, overflow) = rest.split_at(line_len);
    format!("({area}) {prefix}-{line}{overflow}")
}

/// Rearranges `YYYY-MM-DD` into `DD/MM/YYYY`. This is textual only; no
/// calendar validation happens. Returns `None` unless there are exactly two
/// hyphens.
pub fn format_date(iso: &str) -> Option<String> {
    let mut parts = iso.split('-');
    let (Some(year), Some(month), Some(day), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };
    Some(format!("{day}/{month}/{year}"))
}

pub fn iso_date(date: Date) -> String {
    date.format(&time::macros::format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string())
}

pub fn today_iso() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    iso_date(now.date())
}

/// Renders an amount the pt-BR way: `R$ 1.234,56`.
pub fn format_brl(amount: f64) -> String {
    let cents = if amount.is_finite() {
        (amount * 100.0).round() as i64
    } else {
        0
    };
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    format!("{sign}R$ {grouped},{fraction:02}")
}
