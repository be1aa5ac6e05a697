use crate::utils::error::{MigrateError, Result};
use std::collections::HashSet;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: &str, reason: impl Into<String>) -> MigrateError {
    MigrateError::InvalidConfigValue {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Node RPC endpoint: http(s) or ws(s) with a host.
pub fn validate_rpc_url(field_name: &str, url_str: &str) -> Result<()> {
    let url = Url::parse(url_str)
        .map_err(|e| invalid(field_name, url_str, format!("not a URL: {}", e)))?;

    if !matches!(url.scheme(), "http" | "https" | "ws" | "wss") {
        return Err(invalid(
            field_name,
            url_str,
            format!("RPC endpoints use http, https, ws or wss, not {}", url.scheme()),
        ));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid(field_name, url_str, "RPC endpoint has no host"));
    }
    Ok(())
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    match path {
        "" => Err(invalid(field_name, path, "path is empty")),
        p if p.contains('\0') => Err(invalid(field_name, path, "path contains a NUL byte")),
        _ => Ok(()),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field_name, value, "value is empty or whitespace"));
    }
    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| MigrateError::MissingConfig {
        field: field_name.to_string(),
    })
}

/// Fails on the first name that appears twice.
pub fn validate_unique_names<'a, I>(field_name: &str, names: I) -> Result<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(invalid(field_name, name, "declared more than once"));
        }
    }
    Ok(())
}
