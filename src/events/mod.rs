pub mod bus;
pub mod sink;

pub use bus::{EventBus, EventSubscription};
pub use sink::{ChaincodeEvent, EventSink, StationCommand};
