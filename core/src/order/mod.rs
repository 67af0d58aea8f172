// mercado/src/order/mod.rs

//! Buyer-side order handoff: a cart built from catalog products, an optional
//! delivery zone, and the composed order message sent through a messaging deep
//! link.

pub mod cart;
pub mod delivery;
pub mod message;

pub use cart::{Cart, CartItem};
pub use delivery::{delivery_zones, find_zone, DeliveryBand, DeliveryZone};
pub use message::{CustomerInfo, OrderMessage};
