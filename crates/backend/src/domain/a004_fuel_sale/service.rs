use super::repository;
use crate::shared::context::AppContext;
use crate::shared::service_error::{ServiceError, ServiceResult};
use chrono::Duration;
use contracts::domain::a004_fuel_sale::{FuelSale, FuelSaleDto, FuelSaleId, FuelSaleListResponse};
use contracts::enums::FuelType;
use contracts::shared::branch_scope::{BranchRef, SelectedBranches};
use contracts::shared::record_filter::{apply_criteria, FilterCriteria};
use contracts::domain::common::{AggregateId, AggregateRoot};
use uuid::Uuid;

fn check(ctx: &AppContext, sale: &FuelSale) -> ServiceResult<()> {
    sale.validate().map_err(ServiceError::Validation)?;
    ctx.branches
        .ensure_known(std::slice::from_ref(&sale.branch))
        .map_err(ServiceError::Validation)
}

pub async fn create(ctx: &AppContext, dto: FuelSaleDto) -> ServiceResult<Uuid> {
    let code = dto
        .code
        .clone()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| format!("FS-{}", &Uuid::new_v4().simple().to_string()[..8]));
    let mut aggregate = FuelSale::new_for_insert(code, &dto);

    check(ctx, &aggregate)?;
    aggregate.before_write();

    Ok(repository::insert(&ctx.db, &aggregate).await?)
}

pub async fn update(ctx: &AppContext, dto: FuelSaleDto) -> ServiceResult<()> {
    let raw = dto
        .id
        .as_deref()
        .ok_or_else(|| ServiceError::validation("Missing ID"))?;
    let id = FuelSaleId::from_string(raw)
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

pub async fn get_by_id(ctx: &AppContext, id: Uuid) -> ServiceResult<FuelSale> {
    repository::get_by_id(&ctx.db, id)
        .await?
        .ok_or(ServiceError::NotFound)
}

pub async fn list_all(ctx: &AppContext) -> ServiceResult<Vec<FuelSale>> {
    Ok(repository::list_all(&ctx.db).await?)
}

/// Filtered sales with liters and amount totals
pub async fn list_view(
    ctx: &AppContext,
    criteria: &FilterCriteria,
    selected: &SelectedBranches,
) -> ServiceResult<FuelSaleListResponse> {
    let sales =
        repository::list_by_date_range(&ctx.db, criteria.date_from, criteria.date_to).await?;
    let mut items = apply_criteria(&sales, criteria, selected);
    if criteria.sort_field().is_none() {
        items.reverse();
    }
    Ok(FuelSaleListResponse::from_items(items))
}

/// Seven days of sales for every registered branch
pub async fn insert_test_data(ctx: &AppContext) -> ServiceResult<()> {
    let today = ctx.today();
    let grades = [
        (FuelType::Diesel, 1800.0, 31.94),
        (FuelType::Gasohol95, 900.0, 37.05),
        (FuelType::E20, 450.0, 34.45),
    ];
    let branches: Vec<BranchRef> = ctx.branches.branches().iter().map(|b| b.id.clone()).collect();

    for (b, branch) in branches.iter().enumerate() {
        for day in 1..=7i64 {
            for (fuel_type, base_liters, price) in grades {
                let liters = base_liters * (1.0 + 0.1 * b as f64) + 25.0 * day as f64;
                let dto = FuelSaleDto {
                    id: None,
                    code: None,
                    sale_date: today - Duration::days(day),
                    branch: branch.clone(),
                    fuel_type,
                    liters,
                    amount: (liters * price * 100.0).round() / 100.0,
                    comment: None,
                };
                create(ctx, dto).await?;
            }
        }
    }
    tracing::info!(
        "Inserted {} test records into {}",
        branches.len() * 7 * grades.len(),
        FuelSale::full_name()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config::parse_config;
    use crate::shared::data::db::connect_in_memory;
    use chrono::NaiveDate;

    async fn context() -> AppContext {
        let config = parse_config(
            "[database]\npath = \"unused.db\"\n\n[[branches]]\nid = 1\nname = \"Bang Na\"\n\n[[branches]]\nid = 2\nname = \"Rangsit\"\n",
        )
        .unwrap();
        let db = connect_in_memory().await.unwrap();
        AppContext::from_config(&config, db).unwrap()
    }

    fn dto(date: NaiveDate, branch: u64, fuel_type: FuelType, liters: f64) -> FuelSaleDto {
        FuelSaleDto {
            id: None,
            code: None,
            sale_date: date,
            branch: BranchRef::from_number(branch),
            fuel_type,
            liters,
            amount: liters * 30.0,
            comment: None,
        }
    }

    #[tokio::test]
    async fn test_date_range_and_scope() {
        let ctx = context().await;
        let d1 = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        let d3 = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        create(&ctx, dto(d1, 1, FuelType::Diesel, 1000.0)).await.unwrap();
        create(&ctx, dto(d2, 1, FuelType::Gasohol95, 400.0)).await.unwrap();
        create(&ctx, dto(d2, 2, FuelType::Diesel, 700.0)).await.unwrap();
        create(&ctx, dto(d3, 1, FuelType::Diesel, 900.0)).await.unwrap();

        let criteria = FilterCriteria {
            date_from: Some(d2),
            date_to: Some(d3),
            ..FilterCriteria::default()
        };
        let resp = list_view(&ctx, &criteria, &SelectedBranches::parse_list("01"))
            .await
            .unwrap();
        assert_eq!(resp.total_count, 2);
        assert_eq!(resp.totals.liters, 1300.0);
        assert_eq!(resp.items[0].sale_date, d3);
        assert_eq!(resp.by_fuel_type["diesel"].liters, 900.0);
    }

    #[tokio::test]
    async fn test_blank_sort_field_lists_newest_first() {
        let ctx = context().await;
        let d1 = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        create(&ctx, dto(d1, 1, FuelType::Diesel, 1000.0)).await.unwrap();
        create(&ctx, dto(d2, 1, FuelType::Diesel, 800.0)).await.unwrap();

        let criteria = FilterCriteria {
            sort_by: Some(" ".into()),
            ..FilterCriteria::default()
        };
        let resp = list_view(&ctx, &criteria, &SelectedBranches::all()).await.unwrap();
        assert_eq!(resp.items[0].sale_date, d2);
        assert_eq!(resp.items[1].sale_date, d1);
    }

    #[tokio::test]
    async fn test_zero_liters_and_unknown_branch_rejected() {
        let ctx = context().await;
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert!(matches!(
            create(&ctx, dto(day, 1, FuelType::Diesel, 0.0)).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            create(&ctx, dto(day, 7, FuelType::Diesel, 10.0)).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_seed_covers_every_branch() {
        let ctx = context().await;
        insert_test_data(&ctx).await.unwrap();
        let resp = list_view(&ctx, &FilterCriteria::default(), &SelectedBranches::all())
            .await
            .unwrap();
        assert_eq!(resp.total_count, 2 * 7 * 3);
        assert_eq!(resp.by_fuel_type.len(), 3);
    }
}
