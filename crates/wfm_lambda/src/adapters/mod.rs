pub mod aws;
pub mod invoke;
pub mod memory;
pub mod record_store;
pub mod stack;
pub mod teardown;
