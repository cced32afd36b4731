//! Security Module
//!
//! Response hardening for the Semantix API. Authentication is out of scope;
//! the service is expected to run behind a trusted gateway.

pub mod middleware;

pub use middleware::security_headers_middleware;
