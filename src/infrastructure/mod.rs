// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod http_gateway;
pub mod snapshot_decoder;
pub mod ws_channel;
