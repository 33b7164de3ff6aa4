pub mod event;
pub mod http;
