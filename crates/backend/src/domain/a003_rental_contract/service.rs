use super::repository;
use crate::shared::context::AppContext;
use crate::shared::service_error::{ServiceError, ServiceResult};
use chrono::{Duration, Months, NaiveDate};
use contracts::domain::a003_rental_contract::{
    ContractListResponse, ContractStatus, RentalContract, RentalContractDto, RentalContractId,
};
use contracts::enums::ShopKind;
use contracts::shared::branch_scope::{BranchRef, SelectedBranches};
use contracts::shared::record_filter::{apply_criteria, FilterCriteria};
use contracts::domain::common::{AggregateId, AggregateRoot};
use uuid::Uuid;

fn check(ctx: &AppContext, contract: &RentalContract) -> ServiceResult<()> {
    contract.validate().map_err(ServiceError::Validation)?;
    ctx.branches
        .ensure_known(std::slice::from_ref(&contract.branch))
        .map_err(ServiceError::Validation)
}

pub async fn create(ctx: &AppContext, dto: RentalContractDto) -> ServiceResult<Uuid> {
    let code = dto
        .code
        .clone()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| format!("RC-{}", &Uuid::new_v4().simple().to_string()[..8]));
    let mut aggregate = RentalContract::new_for_insert(code, &dto);

    check(ctx, &aggregate)?;
    aggregate.before_write();

    Ok(repository::insert(&ctx.db, &aggregate).await?)
}

pub async fn update(ctx: &AppContext, dto: RentalContractDto) -> ServiceResult<()> {
    let raw = dto
        .id
        .as_deref()
        .ok_or_else(|| ServiceError::validation("Missing ID"))?;
    let id = RentalContractId::from_string(raw)
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

pub async fn get_by_id(ctx: &AppContext, id: Uuid) -> ServiceResult<RentalContract> {
    repository::get_by_id(&ctx.db, id)
        .await?
        .ok_or(ServiceError::NotFound)
}

pub async fn list_all(ctx: &AppContext) -> ServiceResult<Vec<RentalContract>> {
    Ok(repository::list_all(&ctx.db).await?)
}

/// Filtered contracts with the rent currently in force
pub async fn list_view(
    ctx: &AppContext,
    criteria: &FilterCriteria,
    selected: &SelectedBranches,
) -> ServiceResult<ContractListResponse> {
    let contracts = repository::list_all(&ctx.db).await?;
    Ok(ContractListResponse::from_items(
        apply_criteria(&contracts, criteria, selected),
        ctx.today(),
        ctx.rental.expiry_notice_days,
    ))
}

pub async fn terminate(ctx: &AppContext, id: Uuid) -> ServiceResult<RentalContract> {
    let mut aggregate = get_by_id(ctx, id).await?;
    aggregate.terminate().map_err(ServiceError::Validation)?;
    aggregate.before_write();
    repository::update(&ctx.db, &aggregate).await?;
    tracing::info!(
        "Contract {} terminated ({} month term)",
        aggregate.base.code,
        aggregate.term_months()
    );
    Ok(aggregate)
}

pub async fn insert_test_data(ctx: &AppContext) -> ServiceResult<()> {
    let today = ctx.today();
    let months_ago = |n: u32| today.checked_sub_months(Months::new(n)).unwrap_or(today);
    let months_ahead = |n: u32| today.checked_add_months(Months::new(n)).unwrap_or(today);

    let data = vec![
        contract(
            "RC-001",
            "FIT Auto",
            ShopKind::QuickService,
            1,
            45000.0,
            months_ago(14),
            months_ahead(22),
            ContractStatus::Active,
        ),
        contract(
            "RC-002",
            "Amazon Cafe",
            ShopKind::Convenience,
            2,
            35000.0,
            months_ago(35),
            today + Duration::days(20),
            ContractStatus::Active,
        ),
        contract(
            "RC-003",
            "OTOP Corner",
            ShopKind::Otop,
            3,
            8000.0,
            months_ahead(1),
            months_ahead(13),
            ContractStatus::Draft,
        ),
    ];

    let count = data.len();
    for dto in data {
        create(ctx, dto).await?;
    }
    tracing::info!("Inserted {} test records into {}", count, RentalContract::full_name());

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn contract(
    code: &str,
    tenant: &str,
    shop_kind: ShopKind,
    branch: u64,
    monthly_rent: f64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    status: ContractStatus,
) -> RentalContractDto {
    RentalContractDto {
        id: None,
        code: Some(code.into()),
        tenant_name: tenant.into(),
        shop_kind,
        branch: BranchRef::from_number(branch),
        monthly_rent,
        deposit: monthly_rent * 3.0,
        start_date,
        end_date,
        status: Some(status),
        comment: None,
    }
}
