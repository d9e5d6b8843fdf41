//! Relay transport abstractions.
//!
//! - `TransportClient`: RPITIT trait implemented by the relay client in infra
//! - `BoxTransport`: clonable dynamic-dispatch wrapper used everywhere else

pub mod box_transport;
pub mod transport;
