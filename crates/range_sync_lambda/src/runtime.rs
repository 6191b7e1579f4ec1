pub use range_sync_core::contract;
pub use range_sync_core::feed;
pub use range_sync_core::rules;
