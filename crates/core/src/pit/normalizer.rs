//! Identifier normalization contract.

use crate::errors::{Error, Result};

/// Prefix of canonical Histograph ids.
pub const HGID_PREFIX: &str = "urn:hgid:";

/// Maps a raw PIT id or URI to its canonical id within a dataset.
///
/// Implementations must be pure: the same input always yields the same id.
pub trait IdNormalizer: Send + Sync {
    fn normalize(&self, raw_id: &str, dataset: &str) -> Result<String>;
}

impl<F> IdNormalizer for F
where
    F: Fn(&str, &str) -> Result<String> + Send + Sync,
{
    fn normalize(&self, raw_id: &str, dataset: &str) -> Result<String> {
        self(raw_id, dataset)
    }
}

/// Default normalizer following the Histograph id convention.
///
/// - `urn:hgid:...` ids and absolute URIs are kept as-is
/// - `dataset/id` becomes `urn:hgid:dataset/id`
/// - a bare id is qualified with the owning dataset
#[derive(Debug, Clone, Copy, Default)]
pub struct HgidNormalizer;

fn is_absolute_uri(value: &str) -> bool {
    let Some((scheme, rest)) = value.split_once("://") else {
        return false;
    };
    !rest.is_empty()
        && scheme
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

impl IdNormalizer for HgidNormalizer {
    fn normalize(&self, raw_id: &str, dataset: &str) -> Result<String> {
        let id = raw_id.trim();
        if id.is_empty() {
            return Err(Error::normalize("identifier is empty"));
        }
        if id.starts_with(HGID_PREFIX) || is_absolute_uri(id) {
            return Ok(id.to_string());
        }
        if id.contains('/') {
            return Ok(format!("{HGID_PREFIX}{id}"));
        }

        let dataset = dataset.trim();
        if dataset.is_empty() {
            return Err(Error::normalize(format!(
                "cannot qualify id '{id}' without a dataset"
            )));
        }
        Ok(format!("{HGID_PREFIX}{dataset}/{id}"))
    }
}
