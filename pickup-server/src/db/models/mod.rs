//! Database models and API payload types

pub mod order;

pub use order::{
    CartItem, CreateOrderRequest, Order, OrderItem, OrderStatus, OrderWithItems, PaymentStatus,
    ProductSnapshot,
};
