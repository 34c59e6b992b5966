pub mod fuel_type;
pub mod shop_kind;

pub use fuel_type::FuelType;
pub use shop_kind::ShopKind;
