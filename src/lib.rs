//! Locates a GitHub Actions workflow run and retrieves its build artifacts.
//!
//! One invocation pins a single run through a set of mutually exclusive
//! selectors, lists the artifacts attached to it, streams each matching
//! archive to disk, and unpacks it entry by entry with traversal protection.

pub mod env;
pub mod error;
pub mod github;
pub mod inputs;
pub mod matching;
pub mod outputs;
pub mod pipeline;
pub mod resolver;
pub mod selectors;
pub mod transactions;
pub mod workflow;

pub use error::{Error, Result};

/// A shorthand to define a statically allocated variable using a [`std::sync::LazyLock`].
///
/// # Examples
///
/// ```rust
/// use download_artifact::static_lazy_lock;
///
/// static_lazy_lock! {
///     pub VAR_1: String = String::from("a static variable");
/// }
/// // ...equals to...
/// pub static VAR_2: std::sync::LazyLock<String> =
///     std::sync::LazyLock::new(|| String::from("a static variable"));
/// ```
#[macro_export]
macro_rules! static_lazy_lock {
    ($(#[$meta:meta])* $vis:vis $name:ident: $type:ty = $expr:expr $(;)?) => {
        $(#[$meta])*
        $vis static $name: $crate::__priv_macro_use::LazyLock<$type> =
            $crate::__priv_macro_use::LazyLock::new(|| $expr);
    };
}

#[doc(hidden)]
pub mod __priv_macro_use {
    pub use std::sync::LazyLock;
}
