//! Input normalization shared by the catalog and user services.

use std::collections::BTreeSet;

use domains::{DomainError, DomainResult};

/// Lower-cases `name`, collapses every run of characters outside `[a-z0-9]`
/// into one `-`, and trims dashes from both ends.
///
/// `"Night Sky & Stars!"` becomes `"night-sky-stars"`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Tags are matched by equality, so store them in their canonical form.
pub fn normalize_tags<I, S>(raw: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Trims `value`, rejecting it when nothing is left.
pub fn required(field: &str, value: &str) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

/// Blank optional text collapses to `None`.
pub fn optional(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

pub fn email(value: &str) -> DomainResult<String> {
    let email = required("email", value)?.to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    };
    if !valid || email.contains(char::is_whitespace) {
        return Err(DomainError::validation(format!("invalid email: {email}")));
    }
    Ok(email)
}
