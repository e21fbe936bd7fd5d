//! Driven ports consumed by the domain.
//!
//! The domain owns the request and response shapes so ladder orchestration
//! stays adapter-agnostic; adapters only move bytes.

mod comics_gateway;

pub use self::comics_gateway::{
    AuthHeader, BackendMethod, BackendRequest, BackendResponse, ComicsGateway,
    ComicsGatewayError, FixtureComicsGateway,
};

#[cfg(test)]
pub use self::comics_gateway::MockComicsGateway;
