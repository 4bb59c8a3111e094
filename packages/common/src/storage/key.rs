use super::error::StorageError;

const MAX_KEY_LEN: usize = 512;

/// Validates an object key (`folder/name.ext`).
pub fn validate_key(key: &str) -> Result<&str, StorageError> {
    let invalid = |reason: &str| Err(StorageError::InvalidKey(format!("{reason}: {key:?}")));

    if key.is_empty() {
        return invalid("key is empty");
    }
    if key.len() > MAX_KEY_LEN {
        return invalid("key exceeds 512 characters");
    }
    if key.starts_with('/') || key.ends_with('/') {
        return invalid("key must not start or end with '/'");
    }

    for segment in key.split('/') {
        if segment.is_empty() {
            return invalid("key contains an empty segment");
        }
        if segment.starts_with('.') {
            return invalid("key segments must not start with '.'");
        }
    }

    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '_' | '.'))
    {
        return invalid("key contains invalid characters");
    }

    Ok(key)
}

/// Maps storage keys to the durable public URLs handed out to clients, and back.
#[derive(Debug, Clone)]
pub struct PublicUrl {
    base: String,
}

impl PublicUrl {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self { base }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.base, key)
    }

    /// Recover the storage key from a URL issued by [`PublicUrl::url_for`].
    pub fn key_for<'a>(&self, url: &'a str) -> Result<&'a str, StorageError> {
        let key = url
            .strip_prefix(self.base.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| StorageError::ForeignUrl(url.to_string()))?;
        validate_key(key)
    }
}
