//! Component identifiers
//!
//! Components are named by `Arc<str>` so the same identifier can sit in the
//! dependency map, the execution order and every outcome record without
//! copying the string.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::CheckError;

/// Opaque, comparable component name (e.g. a cluster operator name)
pub type ComponentId = Arc<str>;

/// DNS-1123 style names, the shape cluster operators are named in
static COMPONENT_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]([-a-z0-9.]*[a-z0-9])?$").unwrap());

/// Maximum identifier length (DNS-1123 subdomain limit)
pub const MAX_ID_LEN: usize = 253;

/// Check that `id` is a well-formed component identifier
pub fn validate_id(id: &str) -> Result<(), CheckError> {
    if id.len() <= MAX_ID_LEN && COMPONENT_ID_PATTERN.is_match(id) {
        Ok(())
    } else {
        Err(CheckError::InvalidComponentId { id: id.to_string() })
    }
}
