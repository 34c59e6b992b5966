use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::common::{AggregateRoot, BaseAggregate, EntityMetadata};
use crate::shared::branch_scope::BranchRef;
use crate::shared::record_filter::{cmp_f64, cmp_text, ListRecord, Sortable};

crate::uuid_aggregate_id!(
    /// Id of an employee loan
    EmployeeLoanId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    Active,
    Overdue,
    Closed,
}

impl LoanStatus {
    pub fn code(&self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::Overdue => "overdue",
            LoanStatus::Closed => "closed",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "active" => Some(LoanStatus::Active),
            "overdue" => Some(LoanStatus::Overdue),
            "closed" => Some(LoanStatus::Closed),
            _ => None,
        }
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Loan from the staff welfare fund to one employee.
/// `base.description` holds the employee's name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeLoan {
    #[serde(flatten)]
    pub base: BaseAggregate<EmployeeLoanId>,

    #[serde(rename = "employeeCode")]
    pub employee_code: String,

    pub principal: f64,
    pub outstanding: f64,

    #[serde(rename = "monthlyInstallment")]
    pub monthly_installment: f64,

    pub status: LoanStatus,

    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,

    pub branch: BranchRef,
}

impl EmployeeLoan {
    pub fn new_for_insert(code: String, dto: &EmployeeLoanDto) -> Self {
        let mut loan = Self {
            base: BaseAggregate::new(EmployeeLoanId::new_v4(), code, String::new()),
            employee_code: String::new(),
            principal: 0.0,
            outstanding: 0.0,
            monthly_installment: 0.0,
            status: LoanStatus::Active,
            start_date: dto.start_date,
            branch: dto.branch.clone(),
        };
        loan.update(dto);
        loan
    }

    pub fn employee_name(&self) -> &str {
        &self.base.description
    }

    pub fn update(&mut self, dto: &EmployeeLoanDto) {
        if let Some(code) = dto.code.as_ref().filter(|c| !c.trim().is_empty()) {
            self.base.code = code.clone();
        }
        self.base.description = dto.employee_name.trim().to_string();
        self.base.set_comment(dto.comment.clone());
        self.employee_code = dto.employee_code.trim().to_string();
        self.principal = dto.principal;
        self.outstanding = dto.outstanding.unwrap_or(dto.principal);
        self.monthly_installment = dto.monthly_installment;
        self.status = dto.status.unwrap_or(LoanStatus::Active);
        self.start_date = dto.start_date;
        self.branch = dto.branch.clone();
    }

    /// Applies a repayment; the loan closes once nothing is outstanding
    pub fn record_payment(&mut self, amount: f64) -> Result<(), String> {
        if !amount.is_finite() || amount <= 0.0 {
            return Err("Payment must be a positive amount".into());
        }
        if self.status == LoanStatus::Closed {
            return Err("Loan is already closed".into());
        }
        if amount > self.outstanding {
            return Err(format!(
                "Payment {} exceeds outstanding balance {}",
                amount, self.outstanding
            ));
        }
        self.outstanding -= amount;
        if self.outstanding <= f64::EPSILON {
            self.outstanding = 0.0;
            self.status = LoanStatus::Closed;
        }
        Ok(())
    }

    /// Share of the principal already repaid, 0..=100
    pub fn repaid_percent(&self) -> f64 {
        if self.principal <= 0.0 {
            return 0.0;
        }
        (self.principal - self.outstanding) / self.principal * 100.0
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.base.description.trim().is_empty() {
            return Err("Employee name must not be empty".into());
        }
        if self.employee_code.is_empty() {
            return Err("Employee code must not be empty".into());
        }
        if !self.principal.is_finite() || self.principal <= 0.0 {
            return Err("Principal must be greater than zero".into());
        }
        if !self.outstanding.is_finite() || self.outstanding < 0.0 || self.outstanding > self.principal {
            return Err("Outstanding balance must be between zero and the principal".into());
        }
        if self.monthly_installment < 0.0 {
            return Err("Monthly installment must not be negative".into());
        }
        if self.status == LoanStatus::Closed && self.outstanding > 0.0 {
            return Err("A closed loan cannot have an outstanding balance".into());
        }
        Ok(())
    }

    pub fn before_write(&mut self) {
        self.base.touch();
        self.base.metadata.increment_version();
    }
}

impl AggregateRoot for EmployeeLoan {
    type Id = EmployeeLoanId;

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
        "a002"
    }

    fn collection_name() -> &'static str {
        "employee_loan"
    }

    fn element_name() -> &'static str {
        "Employee loan"
    }

    fn list_name() -> &'static str {
        "Employee loans"
    }
}

impl ListRecord for EmployeeLoan {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.employee_name(),
            self.employee_code.as_str(),
            self.base.code.as_str(),
        ]
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

impl Sortable for EmployeeLoan {
    fn compare_by_field(&self, other: &Self, field: &str) -> Option<Ordering> {
        match field {
            "employee" => Some(cmp_text(self.employee_name(), other.employee_name())),
            "principal" => Some(cmp_f64(self.principal, other.principal)),
            "outstanding" => Some(cmp_f64(self.outstanding, other.outstanding)),
            "start_date" => Some(self.start_date.cmp(&other.start_date)),
            _ => None,
        }
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeLoanDto {
    pub id: Option<String>,
    pub code: Option<String>,
    #[serde(rename = "employeeName")]
    pub employee_name: String,
    #[serde(rename = "employeeCode")]
    pub employee_code: String,
    pub principal: f64,
    /// Defaults to the principal for a new loan
    #[serde(default)]
    pub outstanding: Option<f64>,
    #[serde(rename = "monthlyInstallment", default)]
    pub monthly_installment: f64,
    #[serde(default)]
    pub status: Option<LoanStatus>,
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,
    pub branch: BranchRef,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanListResponse {
    pub items: Vec<EmployeeLoan>,
    #[serde(rename = "totalCount")]
    pub total_count: usize,
    #[serde(rename = "totalPrincipal")]
    pub total_principal: f64,
    #[serde(rename = "totalOutstanding")]
    pub total_outstanding: f64,
}

impl LoanListResponse {
    pub fn from_items(items: Vec<EmployeeLoan>) -> Self {
        Self {
            total_count: items.len(),
            total_principal: items.iter().map(|l| l.principal).sum(),
            total_outstanding: items.iter().map(|l| l.outstanding).sum(),
            items,
        }
    }
}
