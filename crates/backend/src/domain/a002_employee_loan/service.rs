use super::repository;
use crate::shared::context::AppContext;
use crate::shared::format::format_amount;
use crate::shared::service_error::{ServiceError, ServiceResult};
use chrono::NaiveDate;
use contracts::domain::a002_employee_loan::{
    EmployeeLoan, EmployeeLoanDto, EmployeeLoanId, LoanListResponse, LoanStatus,
};
use contracts::shared::branch_scope::{BranchRef, SelectedBranches};
use contracts::shared::record_filter::{apply_criteria, FilterCriteria};
use contracts::domain::common::{AggregateId, AggregateRoot};
use uuid::Uuid;

fn check(ctx: &AppContext, loan: &EmployeeLoan) -> ServiceResult<()> {
    loan.validate().map_err(ServiceError::Validation)?;
    ctx.branches
        .ensure_known(std::slice::from_ref(&loan.branch))
        .map_err(ServiceError::Validation)
}

pub async fn create(ctx: &AppContext, dto: EmployeeLoanDto) -> ServiceResult<Uuid> {
    let code = dto
        .code
        .clone()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| format!("LOAN-{}", &Uuid::new_v4().simple().to_string()[..8]));
    let mut aggregate = EmployeeLoan::new_for_insert(code, &dto);

    check(ctx, &aggregate)?;
    aggregate.before_write();

    Ok(repository::insert(&ctx.db, &aggregate).await?)
}

pub async fn update(ctx: &AppContext, dto: EmployeeLoanDto) -> ServiceResult<()> {
    let raw = dto
        .id
        .as_deref()
        .ok_or_else(|| ServiceError::validation("Missing ID"))?;
    let id = EmployeeLoanId::from_string(raw)
        .map(|id| id.value())
        .map_err(ServiceError::Validation)?;

    let mut aggregate = repository::get_by_id(&ctx.db, id)
        .await?
        .ok_or(ServiceError::NotFound)?;

    aggregate.update(&dto);
    check(ctx, &aggregate)?;
    aggregate.before_write();

    Ok(repository::update(&ctx.db, &aggregate).await?)
}

pub async fn delete(ctx: &AppContext, id: Uuid) -> ServiceResult<()> {
    if repository::soft_delete(&ctx.db, id).await? {
        Ok(())
    } else {
        Err(ServiceError::NotFound)
    }
}

pub async fn get_by_id(ctx: &AppContext, id: Uuid) -> ServiceResult<EmployeeLoan> {
    repository::get_by_id(&ctx.db, id)
        .await?
        .ok_or(ServiceError::NotFound)
}

pub async fn list_all(ctx: &AppContext) -> ServiceResult<Vec<EmployeeLoan>> {
    Ok(repository::list_all(&ctx.db).await?)
}

/// Filtered loans with principal and outstanding totals
pub async fn list_view(
    ctx: &AppContext,
    criteria: &FilterCriteria,
    selected: &SelectedBranches,
) -> ServiceResult<LoanListResponse> {
    let loans = repository::list_all(&ctx.db).await?;
    Ok(LoanListResponse::from_items(apply_criteria(
        &loans, criteria, selected,
    )))
}

pub async fn record_payment(ctx: &AppContext, id: Uuid, amount: f64) -> ServiceResult<EmployeeLoan> {
    let mut aggregate = get_by_id(ctx, id).await?;
    aggregate
        .record_payment(amount)
        .map_err(ServiceError::Validation)?;
    aggregate.before_write();
    repository::update(&ctx.db, &aggregate).await?;
    tracing::info!(
        "Loan {} repaid {}, outstanding {} ({:.0}% of principal repaid)",
        aggregate.base.code,
        format_amount(amount),
        format_amount(aggregate.outstanding),
        aggregate.repaid_percent()
    );
    Ok(aggregate)
}

pub async fn insert_test_data(ctx: &AppContext) -> ServiceResult<()> {
    let loan = |code: &str, name: &str, emp: &str, principal: f64, outstanding: f64, status, start, branch| {
        EmployeeLoanDto {
            id: None,
            code: Some(code.to_string()),
            employee_name: name.to_string(),
            employee_code: emp.to_string(),
            principal,
            outstanding: Some(outstanding),
            monthly_installment: (principal / 12.0).round(),
            status: Some(status),
            start_date: start,
            branch: BranchRef::from_number(branch),
            comment: None,
        }
    };
    let day = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN);

    let data = vec![
        loan("LOAN-001", "Somchai Jaidee", "EMP-014", 30000.0, 20000.0, LoanStatus::Active, day(2025, 1, 15), 1),
        loan("LOAN-002", "Malee Srisuk", "EMP-021", 12000.0, 9000.0, LoanStatus::Overdue, day(2024, 11, 1), 2),
        loan("LOAN-003", "Anan Boonmee", "EMP-030", 18000.0, 0.0, LoanStatus::Closed, day(2024, 3, 1), 3),
        loan("LOAN-004", "Pranee Kaewta", "EMP-042", 24000.0, 24000.0, LoanStatus::Active, day(2025, 5, 1), 1),
    ];

    let count = data.len();
    for dto in data {
        create(ctx, dto).await?;
    }
    tracing::info!("Inserted {} test records into {}", count, EmployeeLoan::full_name());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config::parse_config;
    use crate::shared::data::db::connect_in_memory;

    async fn context() -> AppContext {
        let config = parse_config(
            "[database]\npath = \"unused.db\"\n\n[[branches]]\nid = 1\nname = \"Bang Na\"\n\n[[branches]]\nid = 2\nname = \"Rangsit\"\n\n[[branches]]\nid = 3\nname = \"Korat\"\n",
        )
        .unwrap();
        let db = connect_in_memory().await.unwrap();
        AppContext::from_config(&config, db).unwrap()
    }

    #[tokio::test]
    async fn test_list_is_scoped_and_totalled() {
        let ctx = context().await;
        insert_test_data(&ctx).await.unwrap();

        let resp = list_view(&ctx, &FilterCriteria::default(), &SelectedBranches::parse_list("1"))
            .await
            .unwrap();
        assert_eq!(resp.total_count, 2);
        assert_eq!(resp.total_principal, 54000.0);
        assert_eq!(resp.total_outstanding, 44000.0);

        let criteria = FilterCriteria {
            status: Some("Overdue".into()),
            ..FilterCriteria::default()
        };
        let resp = list_view(&ctx, &criteria, &SelectedBranches::all()).await.unwrap();
        assert_eq!(resp.total_count, 1);
        assert_eq!(resp.items[0].employee_name(), "Malee Srisuk");
    }

    #[tokio::test]
    async fn test_payment_is_persisted_and_closes_loan() {
        let ctx = context().await;
        insert_test_data(&ctx).await.unwrap();
        let loans = list_all(&ctx).await.unwrap();
        let id = loans
            .iter()
            .find(|l| l.base.code == "LOAN-002")
            .map(|l| l.base.id.value())
            .unwrap();

        assert!(matches!(
            record_payment(&ctx, id, 10000.0).await,
            Err(ServiceError::Validation(_))
        ));
        let loan = record_payment(&ctx, id, 9000.0).await.unwrap();
        assert_eq!(loan.status, LoanStatus::Closed);
        let stored = get_by_id(&ctx, id).await.unwrap();
        assert_eq!(stored.outstanding, 0.0);
        assert_eq!(stored.status, LoanStatus::Closed);
    }
}
