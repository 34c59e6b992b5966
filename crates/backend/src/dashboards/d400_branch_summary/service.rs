use chrono::NaiveDate;
use contracts::dashboards::d400_branch_summary::{
    BranchSummaryRequest, BranchSummaryResponse, BranchSummaryRow,
};
use contracts::domain::a001_stock_item::StockItemView;
use contracts::domain::a002_employee_loan::{EmployeeLoan, LoanStatus};
use contracts::domain::a003_rental_contract::RentalContract;
use contracts::domain::a004_fuel_sale::FuelSale;
use contracts::shared::branch_scope::{in_scope, BranchRegistry, SelectedBranches};

use crate::domain::{a001_stock_item, a002_employee_loan, a003_rental_contract, a004_fuel_sale};
use crate::shared::context::AppContext;
use crate::shared::service_error::{ServiceError, ServiceResult};

/// Records the dashboard is built from
pub struct SummarySources<'a> {
    pub sales: &'a [FuelSale],
    pub stock: &'a [StockItemView],
    pub contracts: &'a [RentalContract],
    pub loans: &'a [EmployeeLoan],
}

/// One row per registered branch in scope, in registry order, plus a totals row.
/// Stock items listed at several branches count once per branch in the rows
/// and once in the totals.
pub fn build_rows(
    registry: &BranchRegistry,
    scope: &SelectedBranches,
    sources: &SummarySources<'_>,
    today: NaiveDate,
) -> (Vec<BranchSummaryRow>, BranchSummaryRow) {
    let mut rows = Vec::new();
    let mut totals = BranchSummaryRow {
        branch_name: "Total".to_string(),
        ..BranchSummaryRow::default()
    };

    for branch in registry.branches() {
        if !scope.is_empty() && !scope.contains(&branch.id) {
            continue;
        }
        let mut row = BranchSummaryRow {
            branch_id: Some(branch.id.clone()),
            branch_name: branch.name.clone(),
            ..BranchSummaryRow::default()
        };

        for sale in sources.sales.iter().filter(|s| s.branch == branch.id) {
            row.fuel.add(sale);
        }
        for view in sources.stock {
            if view.item.branches.contains(&branch.id) {
                if let Some(tier) = view.tier() {
                    row.stock.add(tier);
                }
            }
        }
        row.rent_in_force = sources
            .contracts
            .iter()
            .filter(|c| c.branch == branch.id && c.is_in_force(today))
            .map(|c| c.monthly_rent)
            .sum();
        row.loans_outstanding = sources
            .loans
            .iter()
            .filter(|l| l.branch == branch.id && l.status != LoanStatus::Closed)
            .map(|l| l.outstanding)
            .sum();

        totals.fuel.liters += row.fuel.liters;
        totals.fuel.amount += row.fuel.amount;
        totals.rent_in_force += row.rent_in_force;
        totals.loans_outstanding += row.loans_outstanding;
        rows.push(row);
    }

    let row_scope: SelectedBranches = rows.iter().filter_map(|r| r.branch_id.clone()).collect();
    totals.stock = sources
        .stock
        .iter()
        .filter(|v| !row_scope.is_empty() && in_scope(&v.item.branches, &row_scope))
        .filter_map(StockItemView::tier)
        .collect();

    (rows, totals)
}

pub async fn get_branch_summary(
    ctx: &AppContext,
    request: BranchSummaryRequest,
    selected: &SelectedBranches,
) -> ServiceResult<BranchSummaryResponse> {
    if let (Some(from), Some(to)) = (request.date_from, request.date_to) {
        if from > to {
            return Err(ServiceError::validation("date_from must not be after date_to"));
        }
    }

    let today = ctx.today();
    let sales = a004_fuel_sale::repository::list_by_date_range(
        &ctx.db,
        request.date_from,
        request.date_to,
    )
    .await?;
    let stock = a001_stock_item::service::build_views(
        a001_stock_item::repository::list_all(&ctx.db).await?,
        &ctx.stock_policies,
        &ctx.branches,
        today,
    );
    let contracts = a003_rental_contract::repository::list_all(&ctx.db).await?;
    let loans = a002_employee_loan::repository::list_all(&ctx.db).await?;

    let sources = SummarySources {
        sales: &sales,
        stock: &stock,
        contracts: &contracts,
        loans: &loans,
    };
    let (rows, totals) = build_rows(&ctx.branches, selected, &sources, today);

    Ok(BranchSummaryResponse {
        date_from: request.date_from,
        date_to: request.date_to,
        rows,
        totals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_stock_item::{StockItem, StockItemDto};
    use contracts::domain::a002_employee_loan::EmployeeLoanDto;
    use contracts::domain::a003_rental_contract::{ContractStatus, RentalContractDto};
    use contracts::domain::a004_fuel_sale::FuelSaleDto;
    use contracts::enums::{FuelType, ShopKind};
    use contracts::shared::branch_scope::{BranchInfo, BranchRef};
    use contracts::shared::stock_status::ThresholdPolicy;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
    }

    fn registry() -> BranchRegistry {
        BranchRegistry::new(
            (1..=3)
                .map(|n| BranchInfo {
                    id: BranchRef::from_number(n),
                    name: format!("Branch {}", n),
                    province: None,
                })
                .collect(),
        )
        .unwrap()
    }

    fn sale(branch: u64, liters: f64) -> FuelSale {
        FuelSale::new_for_insert(
            "FS".into(),
            &FuelSaleDto {
                id: None,
                code: None,
                sale_date: day(1),
                branch: BranchRef::from_number(branch),
                fuel_type: FuelType::Diesel,
                liters,
                amount: liters * 32.0,
                comment: None,
            },
        )
    }

    fn stock(branches: &[u64], quantity: f64, threshold: f64) -> StockItemView {
        let item = StockItem::new_for_insert(
            "STK".into(),
            &StockItemDto {
                id: None,
                code: None,
                name: "Item".into(),
                quantity,
                unit: "pcs".into(),
                cost: 0.0,
                price: 0.0,
                low_stock_threshold: threshold,
                category: String::new(),
                supplier: String::new(),
                expiry: None,
                shop_kind: ShopKind::Convenience,
                branches: branches.iter().map(|n| BranchRef::from_number(*n)).collect(),
                comment: None,
            },
        );
        let assessment = ThresholdPolicy::default()
            .assess(quantity, threshold, None, day(1))
            .ok();
        StockItemView::new(item, assessment, Vec::new())
    }

    fn contract(branch: u64, rent: f64, status: ContractStatus) -> RentalContract {
        RentalContract::new_for_insert(
            "RC".into(),
            &RentalContractDto {
                id: None,
                code: None,
                tenant_name: "Tenant".into(),
                shop_kind: ShopKind::Convenience,
                branch: BranchRef::from_number(branch),
                monthly_rent: rent,
                deposit: 0.0,
                start_date: day(1),
                end_date: day(30),
                status: Some(status),
                comment: None,
            },
        )
    }

    fn loan(branch: u64, principal: f64, outstanding: f64, status: LoanStatus) -> EmployeeLoan {
        EmployeeLoan::new_for_insert(
            "LOAN".into(),
            &EmployeeLoanDto {
                id: None,
                code: None,
                employee_name: "Employee".into(),
                employee_code: "EMP".into(),
                principal,
                outstanding: Some(outstanding),
                monthly_installment: 0.0,
                status: Some(status),
                start_date: day(1),
                branch: BranchRef::from_number(branch),
                comment: None,
            },
        )
    }

    #[test]
    fn test_rows_follow_scope_and_sum_per_branch() {
        let sales = vec![sale(1, 1000.0), sale(1, 500.0), sale(2, 700.0), sale(3, 50.0)];
        let stock = vec![stock(&[1], 10.0, 100.0), stock(&[1, 2], 80.0, 100.0), stock(&[3], 1.0, 100.0)];
        let contracts = vec![
            contract(1, 45000.0, ContractStatus::Active),
            contract(2, 35000.0, ContractStatus::Draft),
        ];
        let loans = vec![
            loan(1, 30000.0, 20000.0, LoanStatus::Active),
            loan(2, 10000.0, 0.0, LoanStatus::Closed),
        ];
        let sources = SummarySources {
            sales: &sales,
            stock: &stock,
            contracts: &contracts,
            loans: &loans,
        };

        let (rows, totals) = build_rows(
            &registry(),
            &SelectedBranches::parse_list("1,2"),
            &sources,
            day(15),
        );

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].branch_name, "Branch 1");
        assert_eq!(rows[0].fuel.liters, 1500.0);
        assert_eq!(rows[0].stock.critical, 1);
        assert_eq!(rows[0].stock.normal, 1);
        assert_eq!(rows[0].rent_in_force, 45000.0);
        assert_eq!(rows[0].loans_outstanding, 20000.0);
        assert_eq!(rows[1].rent_in_force, 0.0);
        assert_eq!(rows[1].stock.total(), 1);

        assert_eq!(totals.fuel.liters, 2200.0);
        assert_eq!(totals.stock.total(), 2);
        assert_eq!(totals.rent_in_force, 45000.0);
    }

    #[test]
    fn test_empty_selection_covers_every_branch() {
        let sources = SummarySources {
            sales: &[],
            stock: &[],
            contracts: &[],
            loans: &[],
        };
        let (rows, totals) = build_rows(&registry(), &SelectedBranches::all(), &sources, day(1));
        assert_eq!(rows.len(), 3);
        assert_eq!(totals, BranchSummaryRow {
            branch_name: "Total".into(),
            ..BranchSummaryRow::default()
        });
    }
}
