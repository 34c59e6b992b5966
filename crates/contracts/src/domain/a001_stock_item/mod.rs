pub mod aggregate;

pub use aggregate::{
    StockItem, StockItemDto, StockItemId, StockItemView, StockListResponse,
};
