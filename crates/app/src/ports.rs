//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the bridge core and its two external
//! collaborators: the pub/sub client and the device gateway.

pub mod bus;
pub mod gateway;

pub use bus::BusPublisher;
pub use gateway::{DeviceGateway, UpdateReceiver, UpdateSender};
