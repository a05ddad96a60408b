use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use time::format_description::well_known::Rfc3339;
use unicode_normalization::UnicodeNormalization;

static NON_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9_+-]+").expect("literal pattern"));

pub fn ensure_dir(p: &Path) -> Result<()> {
    std::fs::create_dir_all(p).with_context(|| format!("create_dir_all {}", p.display()))
}

pub fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

/// Proposed gallery name for a file: normalized slug of the stem plus a
/// `-<ext>` suffix, so files sharing a stem but differing in extension do not
/// collide on the remote side.
pub fn emoji_name(path: &Path, ext: &str) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "emoji".to_string());

    format!("{}-{ext}", slugify(&stem))
}

/// One more `-<ext>` on top of an already-derived name, used by the bounded
/// rename retry when the remote form flags a duplicate.
pub fn renamed(name: &str, ext: &str) -> String {
    format!("{name}-{ext}")
}

fn slugify(raw: &str) -> String {
    let lowered = raw.nfkc().collect::<String>().to_lowercase();
    let slug = NON_NAME_CHARS.replace_all(&lowered, "_");
    let trimmed = slug.trim_matches('_');
    if trimmed.is_empty() {
        "emoji".to_string()
    } else {
        trimmed.to_string()
    }
}
