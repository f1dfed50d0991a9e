// Order placement (intent only, nothing is routed to the broker)
pub mod order;

pub use order::OrderPlacer;
