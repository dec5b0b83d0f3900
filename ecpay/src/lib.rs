pub mod client;
pub mod form;
pub mod mac;
pub mod order;
