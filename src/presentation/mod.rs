// Presentation layer - Console stand-in for the dashboard page
pub mod console;
pub mod view;
