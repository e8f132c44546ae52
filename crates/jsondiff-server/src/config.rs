//! Server configuration
//!
//! Flags with environment fallbacks. The binary loads `.env` before parsing,
//! so either source works.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use jsondiff_core::errors::Result;
use jsondiff_core::id_gen::DEFAULT_MAX_ATTEMPTS;
use jsondiff_core::logging_facility::Profile;
use jsondiff_core::render::DEFAULT_TITLE;
use jsondiff_core::{AllowListPolicy, PageContext};

/// Database setting that selects the in-memory store
pub const MEMORY_DATABASE: &str = ":memory:";

/// Largest `/_save` body read, 32 MiB
pub const DEFAULT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

#[derive(Debug, Clone, Parser)]
#[command(name = "jsondiff-server")]
#[command(about = "Save and reload JSON diff comparison states", long_about = None)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "JSONDIFF_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// SQLite file, or `:memory:` for a store that dies with the process
    #[arg(long, env = "JSONDIFF_DATABASE", default_value = "jsondiff.db")]
    pub database: String,

    /// Origin allowed to save: `host`, `host:*` or `host:PORT` (repeatable)
    #[arg(
        long = "allowed-origin",
        env = "JSONDIFF_ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_values = ["localhost:*", "jsondiff.itsagoldenage.com"]
    )]
    pub allowed_origins: Vec<String>,

    /// Collision redraws before a save gives up
    #[arg(
        long,
        env = "JSONDIFF_MAX_ID_ATTEMPTS",
        default_value_t = DEFAULT_MAX_ATTEMPTS,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_id_attempts: u32,

    /// Largest `/_save` request body in bytes
    #[arg(long, env = "JSONDIFF_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    /// URL prefix of the static assets referenced by the page
    #[arg(long, env = "JSONDIFF_ASSET_PREFIX", default_value = "/")]
    pub asset_prefix: String,

    /// development, production or test
    #[arg(long, env = "JSONDIFF_LOG_PROFILE", default_value = "development")]
    pub log_profile: Profile,
}

/// Where saved diffs live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    Memory,
    File(PathBuf),
}

impl ServerConfig {
    pub fn database_target(&self) -> DatabaseTarget {
        if self.database.trim() == MEMORY_DATABASE {
            DatabaseTarget::Memory
        } else {
            DatabaseTarget::File(PathBuf::from(&self.database))
        }
    }

    /// # Errors
    ///
    /// Returns `InvalidConfig` for the first origin rule that does not parse.
    pub fn origin_policy(&self) -> Result<AllowListPolicy> {
        let rules: Vec<&str> = self
            .allowed_origins
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        AllowListPolicy::parse(&rules)
    }

    pub fn page_context(&self) -> PageContext {
        PageContext::new(DEFAULT_TITLE, self.asset_prefix.clone())
    }
}
