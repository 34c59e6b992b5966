use super::EntityMetadata;

/// Root of an aggregate
///
/// Instance accessors describe one record; the associated functions describe
/// the aggregate class (index, table name, UI names).
pub trait AggregateRoot {
    type Id;

    fn id(&self) -> Self::Id;

    /// Business code of the record (e.g. "STK-0001")
    fn code(&self) -> &str;

    fn description(&self) -> &str;

    fn metadata(&self) -> &EntityMetadata;

    fn metadata_mut(&mut self) -> &mut EntityMetadata;

    /// Aggregate index in the system (e.g. "a001")
    fn aggregate_index() -> &'static str;

    /// Collection name used for tables and routes (e.g. "stock_item")
    fn collection_name() -> &'static str;

    /// Singular UI name
    fn element_name() -> &'static str;

    /// Plural UI name
    fn list_name() -> &'static str;

    /// Full system name (e.g. "a001_stock_item")
    fn full_name() -> String {
        format!("{}_{}", Self::aggregate_index(), Self::collection_name())
    }
}
