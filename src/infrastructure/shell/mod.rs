//! Shell-command transport
//!
//! Implements every transport port by running commands through `sh -c`.
//! Command templates use `{selector}`, `{entity}` and `{scope}` placeholders;
//! substituted values are shell-quoted, so templates leave placeholders bare.

pub mod parse;
pub mod transport;

pub use parse::parse_snapshot;
pub use transport::ShellTransport;
