use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::common::{AggregateRoot, BaseAggregate, EntityMetadata};
use crate::enums::ShopKind;
use crate::shared::branch_scope::BranchRef;
use crate::shared::record_filter::{cmp_f64, cmp_text, ListRecord, Sortable};
use crate::shared::stock_status::{StockAssessment, StockTier, TierCounts};

crate::uuid_aggregate_id!(
    /// Id of a stock item
    StockItemId
);

// ============================================================================
// Aggregate Root
// ============================================================================

/// Item on a shop's shelf, tracked against a low-stock threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockItem {
    #[serde(flatten)]
    pub base: BaseAggregate<StockItemId>,

    pub quantity: f64,
    pub unit: String,
    pub cost: f64,
    pub price: f64,

    #[serde(rename = "lowStockThreshold")]
    pub low_stock_threshold: f64,

    pub category: String,
    pub supplier: String,
    pub expiry: Option<NaiveDate>,

    #[serde(rename = "shopKind")]
    pub shop_kind: ShopKind,

    pub branches: Vec<BranchRef>,
}

impl StockItem {
    pub fn new_for_insert(code: String, dto: &StockItemDto) -> Self {
        let mut item = Self {
            base: BaseAggregate::new(StockItemId::new_v4(), code, String::new()),
            quantity: 0.0,
            unit: String::new(),
            cost: 0.0,
            price: 0.0,
            low_stock_threshold: 0.0,
            category: String::new(),
            supplier: String::new(),
            expiry: None,
            shop_kind: dto.shop_kind,
            branches: Vec::new(),
        };
        item.update(dto);
        item
    }

    pub fn name(&self) -> &str {
        &self.base.description
    }

    pub fn update(&mut self, dto: &StockItemDto) {
        if let Some(code) = dto.code.as_ref().filter(|c| !c.trim().is_empty()) {
            self.base.code = code.clone();
        }
        self.base.description = dto.name.trim().to_string();
        self.base.set_comment(dto.comment.clone());
        self.quantity = dto.quantity;
        self.unit = dto.unit.clone();
        self.cost = dto.cost;
        self.price = dto.price;
        self.low_stock_threshold = dto.low_stock_threshold;
        self.category = dto.category.clone();
        self.supplier = dto.supplier.clone();
        self.expiry = dto.expiry;
        self.shop_kind = dto.shop_kind;
        self.branches = dto.branches.clone();
    }

    /// Adds `delta` (negative to consume) to the on-hand quantity
    pub fn adjust_quantity(&mut self, delta: f64) -> Result<(), String> {
        let next = self.quantity + delta;
        if !next.is_finite() || next < 0.0 {
            return Err(format!(
                "Quantity of {} cannot drop below zero ({} {})",
                self.name(),
                self.quantity,
                delta
            ));
        }
        self.quantity = next;
        Ok(())
    }

    pub fn stock_value(&self) -> f64 {
        self.quantity * self.cost
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base.description.trim().is_empty() {
            return Err("Name must not be empty".into());
        }
        if self.base.code.trim().is_empty() {
            return Err("Code must not be empty".into());
        }
        if !self.quantity.is_finite() || self.quantity < 0.0 {
            return Err("Quantity must be zero or more".into());
        }
        if !self.low_stock_threshold.is_finite() || self.low_stock_threshold <= 0.0 {
            return Err("Low-stock threshold must be greater than zero".into());
        }
        if self.cost < 0.0 || self.price < 0.0 {
            return Err("Cost and price must not be negative".into());
        }
        if self.unit.trim().is_empty() {
            return Err("Unit must not be empty".into());
        }
        if self.branches.is_empty() {
            return Err("Item must belong to at least one branch".into());
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
        self.base.metadata.increment_version();
    }
}

impl AggregateRoot for StockItem {
    type Id = StockItemId;

    fn id(&self) -> Self::Id {
        self.base.id
    }

    fn code(&self) -> &str {
        &self.base.code
    }

    fn description(&self) -> &str {
        &self.base.description
    }

    fn metadata(&self) -> &EntityMetadata {
        &self.base.metadata
    }

    fn metadata_mut(&mut self) -> &mut EntityMetadata {
        &mut self.base.metadata
    }

    fn aggregate_index() -> &'static str {
        "a001"
    }

    fn collection_name() -> &'static str {
        "stock_item"
    }

    fn element_name() -> &'static str {
        "Stock item"
    }

    fn list_name() -> &'static str {
        "Stock"
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockItemDto {
    pub id: Option<String>,
    pub code: Option<String>,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub price: f64,
    #[serde(rename = "lowStockThreshold")]
    pub low_stock_threshold: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub supplier: String,
    #[serde(default)]
    pub expiry: Option<NaiveDate>,
    #[serde(rename = "shopKind")]
    pub shop_kind: ShopKind,
    pub branches: Vec<BranchRef>,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Stock item as a list row: the record plus its computed tier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockItemView {
    /// Same value the DTO accepts as `name`
    pub name: String,
    pub item: StockItem,
    /// `None` if the stored threshold cannot be classified
    pub assessment: Option<StockAssessment>,
    #[serde(rename = "branchNames")]
    pub branch_names: Vec<String>,
}

impl StockItemView {
    pub fn new(
        item: StockItem,
        assessment: Option<StockAssessment>,
        branch_names: Vec<String>,
    ) -> Self {
        Self {
            name: item.name().to_string(),
            item,
            assessment,
            branch_names,
        }
    }

    pub fn tier(&self) -> Option<StockTier> {
        self.assessment.as_ref().map(|a| a.tier)
    }
}

impl ListRecord for StockItemView {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.item.name(),
            self.item.base.code.as_str(),
            self.item.category.as_str(),
            self.item.supplier.as_str(),
        ]
    }

    fn category(&self) -> Option<&str> {
        Some(self.item.category.as_str())
    }

    /// The stock tier acts as the status of a stock row
    fn status(&self) -> Option<&str> {
        self.tier().map(|t| t.code())
    }

    fn record_date(&self) -> Option<NaiveDate> {
        self.item.expiry
    }

    fn branch_refs(&self) -> Option<&[BranchRef]> {
        Some(self.item.branches.as_slice())
    }
}

impl Sortable for StockItemView {
    fn compare_by_field(&self, other: &Self, field: &str) -> Option<Ordering> {
        let pct = |v: &StockItemView| v.assessment.as_ref().map_or(f64::MAX, |a| a.percentage);
        match field {
            "name" => Some(cmp_text(self.item.name(), other.item.name())),
            "code" => Some(cmp_text(&self.item.base.code, &other.item.base.code)),
            "category" => Some(cmp_text(&self.item.category, &other.item.category)),
            "quantity" => Some(cmp_f64(self.item.quantity, other.item.quantity)),
            "percentage" => Some(cmp_f64(pct(self), pct(other))),
            "tier" => Some(self.tier().cmp(&other.tier())),
            "expiry" => Some(self.item.expiry.cmp(&other.item.expiry)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockListResponse {
    pub items: Vec<StockItemView>,
    pub counts: TierCounts,
    #[serde(rename = "totalCount")]
    pub total_count: usize,
    /// Sum of quantity * cost over the listed items
    #[serde(rename = "stockValue")]
    pub stock_value: f64,
}

impl StockListResponse {
    pub fn from_views(items: Vec<StockItemView>) -> Self {
        let counts = items.iter().filter_map(StockItemView::tier).collect();
        let stock_value = items.iter().map(|v| v.item.stock_value()).sum();
        Self {
            total_count: items.len(),
            counts,
            stock_value,
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto() -> StockItemDto {
        StockItemDto {
            id: None,
            code: None,
            name: "Engine oil 10W-40".into(),
            quantity: 30.0,
            unit: "bottle".into(),
            cost: 180.0,
            price: 250.0,
            low_stock_threshold: 50.0,
            category: "oil".into(),
            supplier: "PTT Lubricants".into(),
            expiry: None,
            shop_kind: ShopKind::QuickService,
            branches: vec![BranchRef::from_number(1)],
            comment: None,
        }
    }

    #[test]
    fn test_new_item_validates() {
        let item = StockItem::new_for_insert("STK-0001".into(), &dto());
        assert!(item.validate().is_ok());
        assert_eq!(item.name(), "Engine oil 10W-40");
        assert_eq!(item.stock_value(), 5400.0);
    }

    #[test]
    fn test_view_exposes_name_under_the_dto_key() {
        let item = StockItem::new_for_insert("STK-0001".into(), &dto());
        let view = StockItemView::new(item, None, vec!["Bang Na".into()]);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["name"], "Engine oil 10W-40");
        assert_eq!(json["branchNames"][0], "Bang Na");
    }

    #[test]
    fn test_zero_threshold_is_rejected() {
        let mut d = dto();
        d.low_stock_threshold = 0.0;
        let item = StockItem::new_for_insert("STK-0001".into(), &d);
        assert!(item.validate().is_err());
    }

    #[test]
    fn test_item_needs_a_branch() {
        let mut d = dto();
        d.branches.clear();
        let item = StockItem::new_for_insert("STK-0001".into(), &d);
        assert!(item.validate().is_err());
    }

    #[test]
    fn test_adjust_quantity_never_goes_negative() {
        let mut item = StockItem::new_for_insert("STK-0001".into(), &dto());
        item.adjust_quantity(-10.0).unwrap();
        assert_eq!(item.quantity, 20.0);
        assert!(item.adjust_quantity(-25.0).is_err());
        assert_eq!(item.quantity, 20.0);
    }

    #[test]
    fn test_dto_accepts_numeric_branch_ids() {
        let json = r#"{
            "id": null, "code": null, "name": "Tyre", "quantity": 2, "unit": "pcs",
            "lowStockThreshold": 250, "shopKind": "quick_service", "branches": [1, "02"]
        }"#;
        let d: StockItemDto = serde_json::from_str(json).unwrap();
        assert_eq!(d.branches, vec![BranchRef::from_number(1), BranchRef::from_number(2)]);
        assert_eq!(d.cost, 0.0);
    }
}
