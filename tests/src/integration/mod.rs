//! Integration tests across the authentication and transaction services.

#[cfg(test)]
mod authorization_flow;
#[cfg(test)]
mod http_flow;

pub mod fixtures;
