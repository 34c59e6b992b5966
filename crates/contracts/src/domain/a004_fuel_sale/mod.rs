pub mod aggregate;

pub use aggregate::{FuelSale, FuelSaleDto, FuelSaleId, FuelSaleListResponse, FuelTotals};
