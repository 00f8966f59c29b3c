//! Reusable scalar constraints.
//!
//! Each check returns `Ok(())` when the value satisfies the rule and a
//! message naming the failed rule otherwise; the validation layer wraps
//! failures into `ConstraintViolation`s with the offending field path.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Permissive VCS URL pattern: `git://`, `ssh://`, `http(s)://`, and
/// `git@host:` forms all pass. Intentionally loose.
static VCS_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^((git|ssh|http(s)?)|(git@[\w\.]+))(:(//)?)([\w\.@:/\\\-~]+)")
        .expect("vcs url pattern compiles")
});

/// Any string of length >= 1. Whitespace-only strings are accepted;
/// only the exact-empty string is rejected.
pub fn non_empty(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err("must be a non-empty string".to_owned());
    }
    Ok(())
}

/// A portable on-disk path: any non-empty string without a backslash.
pub fn path_no_backslash(value: &str) -> Result<(), String> {
    non_empty(value)?;
    if value.contains('\\') {
        return Err("path must not contain a backslash".to_owned());
    }
    Ok(())
}

/// An integer >= 0.
pub fn unsigned_int(value: i64) -> Result<(), String> {
    if value < 0 {
        return Err(format!("must be a non-negative integer, got {value}"));
    }
    Ok(())
}

/// A float > 0.
pub fn positive_float(value: f64) -> Result<(), String> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(format!("must be a positive number, got {value}"))
    }
}

/// An absolute `http://` or `https://` URL.
pub fn http_url(value: &str) -> Result<(), String> {
    let parsed = Url::parse(value).map_err(|e| format!("not a valid URL: {e}"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("URL scheme must be http or https, got '{other}'")),
    }
}

/// A VCS URL in one of the common real-world shapes.
pub fn vcs_url(value: &str) -> Result<(), String> {
    if VCS_URL.is_match(value) {
        Ok(())
    } else {
        Err("not a recognized VCS URL".to_owned())
    }
}
