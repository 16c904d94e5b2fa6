pub mod gates;
pub mod testing;
