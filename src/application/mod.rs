// Application layer - Synchronization core between push channel, controls and renderer
pub mod channel;
pub mod command_gateway;
pub mod events;
pub mod session;
pub mod toggle_controller;
pub mod watchdog;
