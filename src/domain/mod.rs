pub mod confirmation;
pub mod error;
pub mod event;
pub mod id;
pub mod money;
pub mod notifier;
pub mod order;
pub mod store;
