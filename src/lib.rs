pub mod domain;
pub mod frameworks;
pub mod interface_adapters;
pub mod use_cases;

pub use frameworks::config::server_url;
pub use frameworks::runtime::run_with_config;
