//! # CSMS Test Suite
//!
//! Cross-service flows: the transaction service and the authentication
//! service talking over a real in-memory event bus.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs            # Bus + both services wired together
//!     ├── authorization_flow.rs  # Outcomes, timeouts, stale replies, load
//!     └── http_flow.rs           # The HTTP endpoint end to end
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p csms-tests
//! cargo test -p csms-tests integration::http_flow
//! ```

pub mod integration;
