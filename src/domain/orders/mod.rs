mod browse_orders;
mod cancel_order;
mod checkout;
mod model;
mod order_id;
mod pricing;
mod update_status;

pub use browse_orders::{
    OrderSummary, TrackingInfo, TrackingLocation, UserOrdersQuery, get_order_endpoint,
    track_order, track_order_endpoint, user_orders, user_orders_endpoint,
};
pub use cancel_order::{CancelOrderPayload, cancel_order, cancel_order_endpoint};
pub use checkout::{CheckoutItem, CheckoutPayload, CheckoutReceipt, checkout, checkout_endpoint};
pub use model::{
    Address, NewOrder, Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus,
};
pub use order_id::generate_order_id;
pub use pricing::{Quote, shipping_for, tax_rate};
pub use update_status::{OrderStatusPatch, update_order_status, update_order_status_endpoint};
