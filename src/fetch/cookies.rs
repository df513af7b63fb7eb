// src/fetch/cookies.rs
// =============================================================================
// Netscape cookie file support, for pages behind a login.
//
// File format (one cookie per line, tab separated):
//   domain  include_subdomains  path  secure  expiry  name  value
//
// Lines starting with '#' are comments, except the "#HttpOnly_" prefix that
// curl and browser exporters put in front of the domain of HttpOnly cookies.
// =============================================================================

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use url::Url;

const HTTP_ONLY_PREFIX: &str = "#HttpOnly_";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Cookie {
    domain: String,
    include_subdomains: bool,
    path: String,
    secure: bool,
    // Seconds since the epoch; 0 means a session cookie
    expires: u64,
    name: String,
    value: String,
}

impl Cookie {
    fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let line = match line.strip_prefix(HTTP_ONLY_PREFIX) {
            Some(rest) => rest,
            None if line.starts_with('#') || line.trim().is_empty() => return None,
            None => line,
        };

        let fields: Vec<&str> = line.split('\t').collect();
        let [domain, include_subdomains, path, secure, expires, name, value] = fields[..] else {
            return None;
        };

        Some(Self {
            domain: domain.trim_start_matches('.').to_ascii_lowercase(),
            // A leading dot has always meant "and subdomains"
            include_subdomains: include_subdomains.eq_ignore_ascii_case("TRUE") || domain.starts_with('.'),
            path: path.to_string(),
            secure: secure.eq_ignore_ascii_case("TRUE"),
            expires: expires.parse().unwrap_or(0),
            name: name.to_string(),
            value: value.to_string(),
        })
    }

    fn matches(&self, url: &Url, now: u64) -> bool {
        if self.expires != 0 && self.expires <= now {
            return false;
        }
        if self.secure && url.scheme() != "https" {
            return false;
        }

        let Some(host) = url.host_str().map(str::to_ascii_lowercase) else {
            return false;
        };
        let domain_ok = host == self.domain
            || (self.include_subdomains && host.ends_with(&format!(".{}", self.domain)));

        domain_ok && url.path().starts_with(&self.path)
    }
}

/// Cookies loaded from a file, ready to be attached to requests.
#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: Vec<Cookie>,
}

impl CookieJar {
    pub fn parse(contents: &str) -> Self {
        Self {
            cookies: contents.lines().filter_map(Cookie::parse_line).collect(),
        }
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read cookies file '{}'", path.display()))?;
        Ok(Self::parse(&contents))
    }

    /// Value for the `Cookie` header, or None when nothing applies.
    pub fn header_for(&self, url: &Url) -> Option<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        let pairs: Vec<String> = self
            .cookies
            .iter()
            .filter(|cookie| cookie.matches(url, now))
            .map(|cookie| format!("{}={}", cookie.name, cookie.value))
            .collect();

        (!pairs.is_empty()).then(|| pairs.join("; "))
    }
}
