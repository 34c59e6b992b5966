use std::cmp::Ordering;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::common::{AggregateRoot, BaseAggregate, EntityMetadata};
use crate::enums::ShopKind;
use crate::shared::branch_scope::BranchRef;
use crate::shared::record_filter::{cmp_f64, cmp_text, ListRecord, Sortable};

crate::uuid_aggregate_id!(
    /// Id of a rental contract
    RentalContractId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Draft,
    Active,
    Terminated,
}

impl ContractStatus {
    pub fn code(&self) -> &'static str {
        match self {
            ContractStatus::Draft => "draft",
            ContractStatus::Active => "active",
            ContractStatus::Terminated => "terminated",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "draft" => Some(ContractStatus::Draft),
            "active" => Some(ContractStatus::Active),
            "terminated" => Some(ContractStatus::Terminated),
            _ => None,
        }
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Lease of branch space to a tenant shop.
/// `base.description` holds the tenant's name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalContract {
    #[serde(flatten)]
    pub base: BaseAggregate<RentalContractId>,

    #[serde(rename = "shopKind")]
    pub shop_kind: ShopKind,

    pub branch: BranchRef,

    #[serde(rename = "monthlyRent")]
    pub monthly_rent: f64,

    pub deposit: f64,

    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,

    #[serde(rename = "endDate")]
    pub end_date: NaiveDate,

    pub status: ContractStatus,
}

impl RentalContract {
    pub fn new_for_insert(code: String, dto: &RentalContractDto) -> Self {
        let mut contract = Self {
            base: BaseAggregate::new(RentalContractId::new_v4(), code, String::new()),
            shop_kind: dto.shop_kind,
            branch: dto.branch.clone(),
            monthly_rent: 0.0,
            deposit: 0.0,
            start_date: dto.start_date,
            end_date: dto.end_date,
            status: ContractStatus::Draft,
        };
        contract.update(dto);
        contract
    }

    pub fn tenant_name(&self) -> &str {
        &self.base.description
    }

    pub fn update(&mut self, dto: &RentalContractDto) {
        if let Some(code) = dto.code.as_ref().filter(|c| !c.trim().is_empty()) {
            self.base.code = code.clone();
        }
        self.base.description = dto.tenant_name.trim().to_string();
        self.base.set_comment(dto.comment.clone());
        self.shop_kind = dto.shop_kind;
        self.branch = dto.branch.clone();
        self.monthly_rent = dto.monthly_rent;
        self.deposit = dto.deposit;
        self.start_date = dto.start_date;
        self.end_date = dto.end_date;
        self.status = dto.status.unwrap_or(ContractStatus::Draft);
    }

    /// Active and `today` falls inside the term
    pub fn is_in_force(&self, today: NaiveDate) -> bool {
        self.status == ContractStatus::Active && self.start_date <= today && today <= self.end_date
    }

    /// In force and ending within `days` days of `today`
    pub fn is_expiring_within(&self, days: i64, today: NaiveDate) -> bool {
        self.is_in_force(today) && (self.end_date - today).num_days() <= days
    }

    pub fn term_months(&self) -> i64 {
        let months = (self.end_date.year() - self.start_date.year()) as i64 * 12
            + self.end_date.month0() as i64
            - self.start_date.month0() as i64;
        months.max(0)
    }

    pub fn terminate(&mut self) -> Result<(), String> {
        if self.status == ContractStatus::Terminated {
            return Err("Contract is already terminated".into());
        }
        self.status = ContractStatus::Terminated;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base.description.trim().is_empty() {
            return Err("Tenant name must not be empty".into());
        }
        if !self.monthly_rent.is_finite() || self.monthly_rent < 0.0 {
            return Err("Monthly rent must not be negative".into());
        }
        if !self.deposit.is_finite() || self.deposit < 0.0 {
            return Err("Deposit must not be negative".into());
        }
        if self.end_date < self.start_date {
            return Err("End date must not be before start date".into());
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
        self.base.metadata.increment_version();
    }
}

impl AggregateRoot for RentalContract {
    type Id = RentalContractId;

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
        "a003"
    }

    fn collection_name() -> &'static str {
        "rental_contract"
    }

    fn element_name() -> &'static str {
        "Rental contract"
    }

    fn list_name() -> &'static str {
        "Rental contracts"
    }
}

impl ListRecord for RentalContract {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.tenant_name(), self.base.code.as_str()]
    }

    fn category(&self) -> Option<&str> {
        Some(self.shop_kind.code())
    }

    fn status(&self) -> Option<&str> {
        Some(self.status.code())
    }

    fn record_date(&self) -> Option<NaiveDate> {
        Some(self.start_date)
    }

    fn branch_refs(&self) -> Option<&[BranchRef]> {
        Some(std::slice::from_ref(&self.branch))
    }
}

impl Sortable for RentalContract {
    fn compare_by_field(&self, other: &Self, field: &str) -> Option<Ordering> {
        match field {
            "tenant" => Some(cmp_text(self.tenant_name(), other.tenant_name())),
            "monthly_rent" => Some(cmp_f64(self.monthly_rent, other.monthly_rent)),
            "start_date" => Some(self.start_date.cmp(&other.start_date)),
            "end_date" => Some(self.end_date.cmp(&other.end_date)),
            _ => None,
        }
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalContractDto {
    pub id: Option<String>,
    pub code: Option<String>,
    #[serde(rename = "tenantName")]
    pub tenant_name: String,
    #[serde(rename = "shopKind")]
    pub shop_kind: ShopKind,
    pub branch: BranchRef,
    #[serde(rename = "monthlyRent")]
    pub monthly_rent: f64,
    #[serde(default)]
    pub deposit: f64,
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,
    #[serde(rename = "endDate")]
    pub end_date: NaiveDate,
    #[serde(default)]
    pub status: Option<ContractStatus>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractListResponse {
    pub items: Vec<RentalContract>,
    #[serde(rename = "totalCount")]
    pub total_count: usize,
    /// Monthly rent of the listed contracts that are in force today
    #[serde(rename = "monthlyRentInForce")]
    pub monthly_rent_in_force: f64,
    #[serde(rename = "expiringSoon")]
    pub expiring_soon: usize,
}

impl ContractListResponse {
    pub fn from_items(items: Vec<RentalContract>, today: NaiveDate, notice_days: i64) -> Self {
        Self {
            total_count: items.len(),
            monthly_rent_in_force: items
                .iter()
                .filter(|c| c.is_in_force(today))
                .map(|c| c.monthly_rent)
                .sum(),
            expiring_soon: items
                .iter()
                .filter(|c| c.is_expiring_within(notice_days, today))
                .count(),
            items,
        }
    }
}
