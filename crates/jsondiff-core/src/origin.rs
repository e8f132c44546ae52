//! Origin policy for the save endpoint
//!
//! Saves are only accepted when the `Referer` header points at a page served
//! by an allowed host. This is an anti-abuse speed bump, not authentication:
//! the header is client-controlled.

use std::fmt;
use std::str::FromStr;

use url::{Host, Url};

use crate::errors::{DiffError, Result};

/// Production host of the diff viewer
pub const PRODUCTION_HOST: &str = "jsondiff.itsagoldenage.com";

/// Decides whether a save request's referer is acceptable
pub trait OriginPolicy: Send + Sync {
    /// `referer` is the raw header value, `None` when absent
    fn allows(&self, referer: Option<&str>) -> bool;
}

/// Run a policy and turn a refusal into `BadReferer`
///
/// # Errors
///
/// Returns `BadReferer` when the policy rejects the referer.
pub fn check_referer(policy: &dyn OriginPolicy, referer: Option<&str>) -> Result<()> {
    if policy.allows(referer) {
        Ok(())
    } else {
        Err(DiffError::BadReferer {
            referer: referer.map(str::to_string),
        })
    }
}

/// Port requirement of an origin rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortRule {
    /// The referer must not name a port
    Absent,
    /// The referer must name some port
    Any,
    /// The referer must name exactly this port
    Exact(u16),
}

/// One allowed origin, written as `host`, `host:*` or `host:PORT`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginRule {
    host: String,
    port: PortRule,
}

impl OriginRule {
    pub fn new(host: impl Into<String>, port: PortRule) -> Self {
        Self {
            host: host.into().to_ascii_lowercase(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> PortRule {
        self.port
    }

    fn matches(&self, origin: &RefererOrigin) -> bool {
        if origin.host != self.host {
            return false;
        }
        match self.port {
            PortRule::Absent => origin.port.is_none(),
            PortRule::Any => origin.port.is_some(),
            PortRule::Exact(p) => origin.port == Some(p),
        }
    }
}

impl FromStr for OriginRule {
    type Err = DiffError;

    fn from_str(text: &str) -> Result<Self> {
        let text = text.trim();
        let invalid = |reason: &str| DiffError::InvalidConfig {
            reason: format!("origin rule {:?}: {}", text, reason),
        };

        let (host, port) = match text.rsplit_once(':') {
            Some((host, "*")) => (host, PortRule::Any),
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| invalid("port must be a number or '*'"))?;
                (host, PortRule::Exact(port))
            }
            None => (text, PortRule::Absent),
        };

        if host.is_empty() {
            return Err(invalid("host is empty"));
        }
        if host.contains(['/', '@', '?', '#']) {
            return Err(invalid("expected a bare host name"));
        }
        Host::parse(host).map_err(|e| invalid(&e.to_string()))?;

        Ok(Self::new(host, port))
    }
}

impl fmt::Display for OriginRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            PortRule::Absent => write!(f, "{}", self.host),
            PortRule::Any => write!(f, "{}:*", self.host),
            PortRule::Exact(p) => write!(f, "{}:{}", self.host, p),
        }
    }
}

/// Host and explicitly written port of a referer URL
#[derive(Debug, PartialEq, Eq)]
struct RefererOrigin {
    host: String,
    port: Option<u16>,
}

impl RefererOrigin {
    /// Accepts `http(s)://authority/...` only; the path slash is required
    fn parse(raw: &str) -> Option<Self> {
        let rest = raw
            .strip_prefix("http://")
            .or_else(|| raw.strip_prefix("https://"))?;
        let authority_end = rest.find(['/', '?', '#'])?;
        if !rest[authority_end..].starts_with('/') {
            return None;
        }
        let authority = &rest[..authority_end];
        if authority.contains('@') {
            return None;
        }

        let url = Url::parse(raw).ok()?;
        let host = url.host_str()?.to_ascii_lowercase();

        // Url drops default ports (":80"), so read the port from the raw text
        let port = match authority.rsplit_once(':') {
            Some((_, p)) if !authority.ends_with(']') => Some(p.parse::<u16>().ok()?),
            _ => None,
        };

        Some(Self { host, port })
    }
}

/// Policy that accepts referers matching any rule in a list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowListPolicy {
    rules: Vec<OriginRule>,
}

impl AllowListPolicy {
    pub fn new(rules: Vec<OriginRule>) -> Self {
        Self { rules }
    }

    /// Parse rules written as `host`, `host:*` or `host:PORT`
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for the first rule that fails to parse.
    pub fn parse<S: AsRef<str>>(rules_text: &[S]) -> Result<Self> {
        let rules = rules_text
            .iter()
            .map(|s| s.as_ref().parse())
            .collect::<Result<Vec<OriginRule>>>()?;
        Ok(Self::new(rules))
    }

    pub fn rules(&self) -> &[OriginRule] {
        &self.rules
    }
}

impl Default for AllowListPolicy {
    /// Local development servers on any port, plus the production host
    fn default() -> Self {
        Self::new(vec![
            OriginRule::new("localhost", PortRule::Any),
            OriginRule::new(PRODUCTION_HOST, PortRule::Absent),
        ])
    }
}

impl OriginPolicy for AllowListPolicy {
    fn allows(&self, referer: Option<&str>) -> bool {
        let Some(origin) = referer.and_then(RefererOrigin::parse) else {
            return false;
        };
        self.rules.iter().any(|rule| rule.matches(&origin))
    }
}
