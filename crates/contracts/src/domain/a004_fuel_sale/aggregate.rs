use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::common::{AggregateRoot, BaseAggregate, EntityMetadata};
use crate::enums::FuelType;
use crate::shared::branch_scope::BranchRef;
use crate::shared::record_filter::{cmp_f64, ListRecord, Sortable};

crate::uuid_aggregate_id!(
    /// Id of a fuel sale entry
    FuelSaleId
);

// ============================================================================
// Aggregate Root
// ============================================================================

/// Daily pump sales of one fuel grade at one branch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuelSale {
    #[serde(flatten)]
    pub base: BaseAggregate<FuelSaleId>,

    #[serde(rename = "saleDate")]
    pub sale_date: NaiveDate,

    pub branch: BranchRef,

    #[serde(rename = "fuelType")]
    pub fuel_type: FuelType,

    pub liters: f64,
    pub amount: f64,
}

impl FuelSale {
    pub fn new_for_insert(code: String, dto: &FuelSaleDto) -> Self {
        let mut sale = Self {
            base: BaseAggregate::new(FuelSaleId::new_v4(), code, String::new()),
            sale_date: dto.sale_date,
            branch: dto.branch.clone(),
            fuel_type: dto.fuel_type,
            liters: 0.0,
            amount: 0.0,
        };
        sale.update(dto);
        sale
    }

    pub fn update(&mut self, dto: &FuelSaleDto) {
        if let Some(code) = dto.code.as_ref().filter(|c| !c.trim().is_empty()) {
            self.base.code = code.clone();
        }
        self.sale_date = dto.sale_date;
        self.branch = dto.branch.clone();
        self.fuel_type = dto.fuel_type;
        self.liters = dto.liters;
        self.amount = dto.amount;
        self.base.set_comment(dto.comment.clone());
        self.base.description = format!(
            "{} {} {}",
            self.fuel_type.display_name(),
            self.branch,
            self.sale_date
        );
    }

    /// Average price per liter
    pub fn unit_price(&self) -> f64 {
        if self.liters > 0.0 {
            self.amount / self.liters
        } else {
            0.0
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.liters.is_finite() || self.liters <= 0.0 {
            return Err("Liters must be greater than zero".into());
        }
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err("Amount must not be negative".into());
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
        self.base.metadata.increment_version();
    }
}

impl AggregateRoot for FuelSale {
    type Id = FuelSaleId;

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
        "a004"
    }

    fn collection_name() -> &'static str {
        "fuel_sale"
    }

    fn element_name() -> &'static str {
        "Fuel sale"
    }

    fn list_name() -> &'static str {
        "Fuel sales"
    }
}

impl ListRecord for FuelSale {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.base.code.as_str(),
            self.base.description.as_str(),
            self.fuel_type.display_name(),
        ]
    }

    fn category(&self) -> Option<&str> {
        Some(self.fuel_type.code())
    }

    fn record_date(&self) -> Option<NaiveDate> {
        Some(self.sale_date)
    }

    fn branch_refs(&self) -> Option<&[BranchRef]> {
        Some(std::slice::from_ref(&self.branch))
    }
}

impl Sortable for FuelSale {
    fn compare_by_field(&self, other: &Self, field: &str) -> Option<Ordering> {
        match field {
            "sale_date" => Some(self.sale_date.cmp(&other.sale_date)),
            "liters" => Some(cmp_f64(self.liters, other.liters)),
            "amount" => Some(cmp_f64(self.amount, other.amount)),
            "fuel_type" => Some(self.fuel_type.code().cmp(other.fuel_type.code())),
            _ => None,
        }
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuelSaleDto {
    pub id: Option<String>,
    pub code: Option<String>,
    #[serde(rename = "saleDate")]
    pub sale_date: NaiveDate,
    pub branch: BranchRef,
    #[serde(rename = "fuelType")]
    pub fuel_type: FuelType,
    pub liters: f64,
    pub amount: f64,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Liters and amount summed over a set of sales
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FuelTotals {
    pub liters: f64,
    pub amount: f64,
}

impl FuelTotals {
    pub fn add(&mut self, sale: &FuelSale) {
        self.liters += sale.liters;
        self.amount += sale.amount;
    }
}

impl<'a> FromIterator<&'a FuelSale> for FuelTotals {
    fn from_iter<I: IntoIterator<Item = &'a FuelSale>>(iter: I) -> Self {
        let mut totals = FuelTotals::default();
        for sale in iter {
            totals.add(sale);
        }
        totals
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuelSaleListResponse {
    pub items: Vec<FuelSale>,
    #[serde(rename = "totalCount")]
    pub total_count: usize,
    pub totals: FuelTotals,
    /// Totals per fuel type code
    #[serde(rename = "byFuelType")]
    pub by_fuel_type: BTreeMap<String, FuelTotals>,
}

impl FuelSaleListResponse {
    pub fn from_items(items: Vec<FuelSale>) -> Self {
        let mut by_fuel_type: BTreeMap<String, FuelTotals> = BTreeMap::new();
        for sale in &items {
            by_fuel_type
                .entry(sale.fuel_type.code().to_string())
                .or_default()
                .add(sale);
        }
        Self {
            total_count: items.len(),
            totals: items.iter().collect(),
            by_fuel_type,
            items,
        }
    }
}
