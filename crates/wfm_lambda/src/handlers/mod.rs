pub mod cleanup;
pub mod customer;
pub mod instance;
pub mod library_trigger;
pub mod workflow;
pub mod workflow_invoke;
