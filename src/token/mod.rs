pub(crate) mod authority;

pub(crate) use authority::{classify, mint, Access};

/// Marks metadata fields that share a record with counter fields.
pub(crate) const RESERVED_PREFIX: &str = "__";
pub(crate) const ACCESS_FIELD: &str = "__access";
pub(crate) const DELEGATE_FIELD: &str = "__token";
const MODIFIED_PREFIX: &str = "__t_";

pub(crate) fn is_reserved(field: &str) -> bool {
    field.starts_with(RESERVED_PREFIX)
}

pub(crate) fn modified_field(name: &str) -> String {
    format!("{MODIFIED_PREFIX}{name}")
}
