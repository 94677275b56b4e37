//! Authentication orchestration module
//!
//! Sequences the credential verifier, session store, rotation engine, and
//! token issuer into the login/refresh/logout flow.

mod service;

#[cfg(test)]
mod tests;

pub use service::AuthService;
