// Domain layer - Device state as the dashboard sees it
pub mod connection;
pub mod control;
pub mod settings;
pub mod snapshot;
