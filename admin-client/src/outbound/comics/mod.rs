//! Comics backend adapters.

mod http_gateway;

pub use self::http_gateway::{GatewayIdentity, HttpComicsGateway};
