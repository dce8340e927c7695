use uuid::Uuid;

/// Access level recorded in a record's `__access` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Access {
    ReadWrite,
    ReadOnly,
}

impl Access {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Access::ReadWrite => "rw",
            Access::ReadOnly => "ro",
        }
    }

    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value {
            "rw" => Some(Access::ReadWrite),
            "ro" => Some(Access::ReadOnly),
            _ => None,
        }
    }

    fn suffix(&self) -> &'static str {
        match self {
            Access::ReadWrite => "-rw",
            Access::ReadOnly => "-ro",
        }
    }
}

/// Mints a fresh token tagged with `access`. Nothing is written to the store.
pub(crate) fn mint(access: Access) -> String {
    format!("{}{}", Uuid::new_v4(), access.suffix())
}

/// Reads the tag off a token. Only for diagnostics: authorization is decided
/// by the stored `__access` field, never by the token text.
pub(crate) fn classify(token: &str) -> Option<Access> {
    [Access::ReadWrite, Access::ReadOnly]
        .into_iter()
        .find(|access| token.ends_with(access.suffix()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn minted_tokens_carry_their_tag() {
        let rw = mint(Access::ReadWrite);
        let ro = mint(Access::ReadOnly);

        assert!(rw.ends_with("-rw"));
        assert!(ro.ends_with("-ro"));
        assert_eq!(classify(&rw), Some(Access::ReadWrite));
        assert_eq!(classify(&ro), Some(Access::ReadOnly));
    }

    #[test]
    fn minted_tokens_are_unique() {
        let tokens: HashSet<String> = (0..1000).map(|_| mint(Access::ReadWrite)).collect();

        assert_eq!(tokens.len(), 1000);
    }

    #[test]
    fn untagged_tokens_are_unclassified() {
        assert_eq!(classify("whatever"), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn access_round_trips_through_its_stored_form() {
        assert_eq!(Access::parse(Access::ReadWrite.as_str()), Some(Access::ReadWrite));
        assert_eq!(Access::parse(Access::ReadOnly.as_str()), Some(Access::ReadOnly));
        assert_eq!(Access::parse("admin"), None);
    }
}
