use crate::utils::error::{Result, SweepError};
use regex::Regex;
use std::sync::LazyLock;

/// Git ref-name rules, checked before any name is handed to `git branch -D`.
pub struct GitValidator;

const REF_NAME_RULES: &[(&str, &str)] = &[
    (r"\.\.", "contains '..'"),
    (r"^-", "starts with '-'"),
    (r"/$", "ends with '/'"),
    (r"\.lock$", "ends with '.lock'"),
    (r"[\x00-\x20\x7f]", "contains whitespace or control characters"),
    (r"[~^:\\*?\[]", "contains a character git reserves for revisions"),
    (r"^@$", "is exactly '@'"),
    (r"/\.|^\.", "has a component starting with '.'"),
    (r"//", "contains an empty path component"),
    (r"@\{", "contains '@{'"),
];

static COMPILED_REF_NAME_RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    REF_NAME_RULES
        .iter()
        .map(|(pattern, reason)| (Regex::new(pattern).expect("valid regex"), *reason))
        .collect()
});

impl GitValidator {
    pub fn validate_branch_name(name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(SweepError::invalid_branch_name(name, "name is empty"));
        }

        if name.len() > 250 {
            return Err(SweepError::invalid_branch_name(name, "name is too long"));
        }

        for (regex, reason) in COMPILED_REF_NAME_RULES.iter() {
            if regex.is_match(name) {
                return Err(SweepError::invalid_branch_name(name, *reason));
            }
        }

        if name.starts_with("refs/") {
            return Err(SweepError::invalid_branch_name(
                name,
                "must be a short name, not a full ref",
            ));
        }

        Ok(())
    }
}
