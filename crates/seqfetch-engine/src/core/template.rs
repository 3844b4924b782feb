use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::data::FragmentIndex;
use crate::error::{FetchError, Result};

// `%d`, `%5d` or `%05d`
static PLACEHOLDER: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"%(0?)([0-9]*)d").ok());

/// A fragment filename with a single integer placeholder, e.g. `chunk-%d.ts`.
///
/// Supports printf-style width and zero padding (`seg-%05d.ts`). Any other use
/// of `%` is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameTemplate {
    raw: String,
    prefix: String,
    suffix: String,
    width: usize,
    zero_pad: bool,
}

impl FilenameTemplate {
    pub fn parse(template: &str) -> Result<Self> {
        let invalid = |reason| FetchError::InvalidTemplate {
            template: template.to_string(),
            reason,
        };

        let pattern = PLACEHOLDER
            .as_ref()
            .ok_or_else(|| invalid("placeholder pattern unavailable"))?;
        let mut matches = pattern.captures_iter(template);
        let caps = matches.next().ok_or_else(|| invalid("no integer placeholder"))?;
        if matches.next().is_some() {
            return Err(invalid("more than one placeholder"));
        }

        let whole = caps.get(0).ok_or_else(|| invalid("no integer placeholder"))?;
        let prefix = &template[..whole.start()];
        let suffix = &template[whole.end()..];
        if prefix.contains('%') || suffix.contains('%') {
            return Err(invalid("unsupported '%' directive"));
        }

        let zero_pad = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let width = match caps.get(2).map(|m| m.as_str()) {
            None | Some("") => 0,
            Some(digits) => digits.parse().map_err(|_| invalid("placeholder width too large"))?,
        };

        Ok(Self {
            raw: template.to_string(),
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
            width,
            zero_pad,
        })
    }

    /// Filename for the fragment at `index`.
    #[must_use]
    pub fn render(&self, index: FragmentIndex) -> String {
        let number = if self.zero_pad {
            format!("{index:0width$}", width = self.width)
        } else {
            format!("{index:width$}", width = self.width)
        };
        format!("{}{}{}", self.prefix, number, self.suffix)
    }
}

impl fmt::Display for FilenameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Check that `base_url` is an absolute http(s) URL.
pub fn validate_base_url(base_url: &str) -> Result<()> {
    let lower = base_url.to_ascii_lowercase();
    let rest = lower
        .strip_prefix("http://")
        .or_else(|| lower.strip_prefix("https://"))
        .ok_or_else(|| FetchError::InvalidUrl(base_url.to_string()))?;

    if rest.trim_start_matches('/').is_empty() || rest.starts_with('/') {
        return Err(FetchError::InvalidUrl(base_url.to_string()));
    }
    Ok(())
}

/// Join a base URL and a rendered fragment filename with exactly one `/`.
///
/// # Examples
///
/// ```
/// use seqfetch_engine::core::fragment_url;
///
/// assert_eq!(fragment_url("http://cdn/v1/", "7.ts"), "http://cdn/v1/7.ts");
/// assert_eq!(fragment_url("http://cdn/v1", "7.ts"), "http://cdn/v1/7.ts");
/// ```
pub fn fragment_url(base_url: &str, filename: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), filename)
}
