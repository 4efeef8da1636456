//! # webrelay
//!
//! Long-running local daemon that drives a remote web application
//! through a WebDriver session and exposes a minimal HTTP command
//! interface for activating named automation cards in its UI.
//!
//! On startup the daemon connects to a locally running chromedriver
//! with a durable on-disk profile, probes whether the profile is
//! already authenticated, and drives the multi-step login flow if it
//! is not. It then serves `POST /command` until terminated:
//!
//! ```bash
//! WEBRELAY_EMAIL=user@example.com WEBRELAY_PASSWORD=... webrelay
//! curl -X POST localhost:8602/command \
//!   -d '{"command": "Good Night"}'
//! # => Clicked
//! ```
//!
//! Element interaction is built on two small primitives reused
//! everywhere: a polling waiter ([`waiter::wait_until`]) and a
//! fallback locator ([`locator::locate`]) that tries an ordered chain
//! of strategies because no single selector survives UI revisions.
//! Commands are serialized through a single-worker queue so concurrent
//! requests never race against the one browser session.

/// Login state machine for the hosted credential-entry flow
pub mod auth;

/// Credentials and daemon settings
pub mod config;

/// Command-name to card resolution and activation
pub mod dispatch;

/// Error taxonomy
pub mod errors;

/// Script-based gesture primitives
pub mod interact;

/// Fallback-chain element location
pub mod locator;

/// HTTP endpoint and single-worker command queue
pub mod server;

/// Browser session ownership and startup probing
pub mod session;

/// Polling wait primitive
pub mod waiter;

pub use config::{Credentials, Settings};
pub use errors::RelayError;
pub use session::Session;
