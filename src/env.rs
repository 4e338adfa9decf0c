//! Defines the ambient environment variables to use.
//!
//! Everything here describes the surrounding workflow invocation, not the
//! user-facing inputs, which live in [`crate::inputs`].

use crate::static_lazy_lock;

use std::{env, path::PathBuf};

/// Parses an environment variable from [`String`] to something else, wrapping any error in [`anyhow::Error`].
#[macro_export]
macro_rules! parse_env {
    ($key:expr => |$var:ident| $expr:expr) => {
        std::env::var($key)
            .map_err(|e| anyhow::anyhow!(e))
            .and_then(|$var| $expr)
    };
    ($key:expr => |$var:ident| $expr:expr; anyhow) => {
        parse_env!($key => |$var| $expr.map_err(|e| anyhow::anyhow!(e)))
    };
}

pub use parse_env;

static_lazy_lock! {
    /// The base URL of the GitHub REST API.
    pub GITHUB_API_URL: String =
        env::var("GITHUB_API_URL").unwrap_or_else(|_| String::from("https://api.github.com"));
}

static_lazy_lock! {
    /// The identifier of the run this invocation itself executes in, if any.
    pub GITHUB_RUN_ID: Option<u64> =
        parse_env!("GITHUB_RUN_ID" => |s| s.parse::<u64>(); anyhow).ok();
}

static_lazy_lock! {
    /// The `owner/name` of the repository this invocation executes in, if any.
    pub GITHUB_REPOSITORY: Option<String> = env::var("GITHUB_REPOSITORY").ok();
}

static_lazy_lock! {
    /// The step-output file of the invoking workflow, if any.
    pub GITHUB_OUTPUT: Option<PathBuf> = env::var_os("GITHUB_OUTPUT").map(PathBuf::from);
}
