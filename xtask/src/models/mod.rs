pub mod args;
pub mod gates;
