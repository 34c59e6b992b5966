use super::repository;
use crate::shared::context::AppContext;
use crate::shared::service_error::{ServiceError, ServiceResult};
use chrono::{Duration, NaiveDate};
use contracts::domain::a001_stock_item::{
    StockItem, StockItemDto, StockItemId, StockItemView, StockListResponse,
};
use contracts::domain::common::{AggregateId, AggregateRoot};
use contracts::enums::ShopKind;
use contracts::shared::branch_scope::{BranchRef, BranchRegistry, SelectedBranches};
use contracts::shared::record_filter::{apply_criteria, FilterCriteria};
use contracts::shared::stock_status::{StockPolicies, StockTier};
use uuid::Uuid;

fn parse_id(raw: Option<&String>) -> ServiceResult<Uuid> {
    let raw = raw.ok_or_else(|| ServiceError::validation("Missing ID"))?;
    StockItemId::from_string(raw)
        .map(|id| id.value())
        .map_err(ServiceError::Validation)
}

fn check(ctx: &AppContext, item: &StockItem) -> ServiceResult<()> {
    item.validate().map_err(ServiceError::Validation)?;
    ctx.branches
        .ensure_known(&item.branches)
        .map_err(ServiceError::Validation)
}

/// Creates a stock item, generating a code when none is given
pub async fn create(ctx: &AppContext, dto: StockItemDto) -> ServiceResult<Uuid> {
    let code = dto
        .code
        .clone()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| format!("STK-{}", &Uuid::new_v4().simple().to_string()[..8]));
    let mut aggregate = StockItem::new_for_insert(code, &dto);

    check(ctx, &aggregate)?;
    if repository::get_by_code(&ctx.db, &aggregate.base.code)
        .await?
        .is_some()
    {
        return Err(ServiceError::Validation(format!(
            "Code {} is already in use",
            aggregate.base.code
        )));
    }
    aggregate.before_write();

    Ok(repository::insert(&ctx.db, &aggregate).await?)
}

pub async fn update(ctx: &AppContext, dto: StockItemDto) -> ServiceResult<()> {
    let id = parse_id(dto.id.as_ref())?;
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

pub async fn get_by_id(ctx: &AppContext, id: Uuid) -> ServiceResult<StockItem> {
    repository::get_by_id(&ctx.db, id)
        .await?
        .ok_or(ServiceError::NotFound)
}

pub async fn list_all(ctx: &AppContext) -> ServiceResult<Vec<StockItem>> {
    Ok(repository::list_all(&ctx.db).await?)
}

/// Attaches the tier and branch names to each item.
/// An item whose stored threshold cannot be classified keeps `assessment: None`.
pub fn build_views(
    items: Vec<StockItem>,
    policies: &StockPolicies,
    registry: &BranchRegistry,
    today: NaiveDate,
) -> Vec<StockItemView> {
    items
        .into_iter()
        .map(|item| {
            let assessment = match policies.for_shop(item.shop_kind).assess(
                item.quantity,
                item.low_stock_threshold,
                item.expiry,
                today,
            ) {
                Ok(a) => Some(a),
                Err(e) => {
                    tracing::warn!("Cannot classify stock item {}: {}", item.base.code, e);
                    None
                }
            };
            let branch_names = registry.names_of(&item.branches);
            StockItemView::new(item, assessment, branch_names)
        })
        .collect()
}

async fn filtered_views(
    ctx: &AppContext,
    criteria: &FilterCriteria,
    selected: &SelectedBranches,
) -> ServiceResult<Vec<StockItemView>> {
    if let Some(status) = criteria.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        if StockTier::from_code(status).is_none() {
            return Err(ServiceError::Validation(format!(
                "Unknown stock status '{}', expected critical, warning or normal",
                status
            )));
        }
    }
    let items = repository::list_all(&ctx.db).await?;
    let views = build_views(items, &ctx.stock_policies, &ctx.branches, ctx.today());
    Ok(apply_criteria(&views, criteria, selected))
}

/// Filtered stock list with per-tier counts
pub async fn list_view(
    ctx: &AppContext,
    criteria: &FilterCriteria,
    selected: &SelectedBranches,
) -> ServiceResult<StockListResponse> {
    let views = filtered_views(ctx, criteria, selected).await?;
    Ok(StockListResponse::from_views(views))
}

/// Only the items in the Critical or Warning tier, most urgent first
pub async fn alerts(
    ctx: &AppContext,
    criteria: &FilterCriteria,
    selected: &SelectedBranches,
) -> ServiceResult<StockListResponse> {
    let mut views: Vec<StockItemView> = filtered_views(ctx, criteria, selected)
        .await?
        .into_iter()
        .filter(|v| v.tier().map_or(false, |t| t.needs_attention()))
        .collect();
    if criteria.sort_field().is_none() {
        views.sort_by(|a, b| a.tier().cmp(&b.tier()));
    }
    Ok(StockListResponse::from_views(views))
}

/// Writes the filtered list as CSV
pub fn views_to_csv(views: &[StockItemView]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "code",
        "name",
        "category",
        "shop",
        "quantity",
        "unit",
        "low_stock_threshold",
        "percentage",
        "tier",
        "expiry",
        "branches",
    ])?;
    for view in views {
        let item = &view.item;
        let (percentage, tier) = match &view.assessment {
            Some(a) => (format!("{:.1}", a.percentage), a.tier.code().to_string()),
            None => (String::new(), String::new()),
        };
        writer.write_record([
            item.base.code.clone(),
            item.name().to_string(),
            item.category.clone(),
            item.shop_kind.display_name().to_string(),
            item.quantity.to_string(),
            item.unit.clone(),
            item.low_stock_threshold.to_string(),
            percentage,
            tier,
            item.expiry.map(|d| d.to_string()).unwrap_or_default(),
            view.branch_names.join("; "),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV: {}", e))?;
    Ok(String::from_utf8(bytes)?)
}

pub async fn export_csv(
    ctx: &AppContext,
    criteria: &FilterCriteria,
    selected: &SelectedBranches,
) -> ServiceResult<String> {
    let views = filtered_views(ctx, criteria, selected).await?;
    Ok(views_to_csv(&views)?)
}

/// Receives (positive delta) or consumes (negative delta) stock
pub async fn adjust_quantity(ctx: &AppContext, id: Uuid, delta: f64) -> ServiceResult<StockItem> {
    let mut aggregate = get_by_id(ctx, id).await?;
    aggregate
        .adjust_quantity(delta)
        .map_err(ServiceError::Validation)?;
    aggregate.before_write();
    repository::update(&ctx.db, &aggregate).await?;
    tracing::info!(
        "Stock {} adjusted by {} to {}",
        aggregate.base.code,
        delta,
        aggregate.quantity
    );
    Ok(aggregate)
}

#[allow(clippy::too_many_arguments)]
fn seed(
    code: &str,
    name: &str,
    category: &str,
    unit: &str,
    quantity: f64,
    threshold: f64,
    shop_kind: ShopKind,
    branches: &[u64],
    expiry: Option<NaiveDate>,
) -> StockItemDto {
    StockItemDto {
        id: None,
        code: Some(code.into()),
        name: name.into(),
        quantity,
        unit: unit.into(),
        cost: 0.0,
        price: 0.0,
        low_stock_threshold: threshold,
        category: category.into(),
        supplier: String::new(),
        expiry,
        shop_kind,
        branches: branches.iter().map(|n| BranchRef::from_number(*n)).collect(),
        comment: None,
    }
}

/// Seeds the FIT Auto shelf at branch 1 and two convenience items
pub async fn insert_test_data(ctx: &AppContext) -> ServiceResult<()> {
    let today = ctx.today();
    let fit = ShopKind::QuickService;
    let data = vec![
        seed("FIT-001", "น้ำมันเครื่อง", "oil", "bottle", 30.0, 50.0, fit, &[1], None),
        seed("FIT-002", "ไส้กรองอากาศ", "filters", "pcs", 100.0, 150.0, fit, &[1], None),
        seed("FIT-003", "ยางรถยนต์", "tyres", "pcs", 2.0, 250.0, fit, &[1], None),
        seed("FIT-004", "ผ้าเบรก", "brakes", "set", 150.0, 300.0, fit, &[1], None),
        seed("FIT-005", "แบตเตอรี่", "electrical", "pcs", 50.0, 100.0, fit, &[1], None),
        seed(
            "CVS-001",
            "Drinking water 600ml",
            "drinks",
            "bottle",
            480.0,
            200.0,
            ShopKind::Convenience,
            &[2, 3],
            Some(today + Duration::days(180)),
        ),
        seed(
            "CVS-002",
            "Fresh milk 200ml",
            "dairy",
            "carton",
            90.0,
            60.0,
            ShopKind::Convenience,
            &[2],
            Some(today + Duration::days(3)),
        ),
    ];

    let count = data.len();
    for dto in data {
        create(ctx, dto).await?;
    }
    tracing::info!("Inserted {} test records into {}", count, StockItem::full_name());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config::parse_config;
    use crate::shared::data::db::connect_in_memory;

    const TEST_CONFIG: &str = r#"
[database]
path = "unused.db"

[[branches]]
id = 1
name = "Bang Na"

[[branches]]
id = 2
name = "Rangsit"

[[branches]]
id = 3
name = "Korat"

[stock_status.default]
critical_percent = 20.0
warning_percent = 50.0
expiry_warning_days = 7

[stock_status.shops.quick_service]
critical_percent = 15.0
warning_percent = 50.0
"#;

    async fn context() -> AppContext {
        let config = parse_config(TEST_CONFIG).unwrap();
        let db = connect_in_memory().await.unwrap();
        AppContext::from_config(&config, db).unwrap()
    }

    #[tokio::test]
    async fn test_fit_auto_shelf_has_one_critical_item() {
        let ctx = context().await;
        insert_test_data(&ctx).await.unwrap();

        let selected = SelectedBranches::parse_list("1");
        let resp = list_view(&ctx, &FilterCriteria::default(), &selected)
            .await
            .unwrap();
        assert_eq!(resp.total_count, 5);
        assert_eq!(resp.counts.critical, 1);
        assert_eq!(resp.counts.warning, 2);
        assert_eq!(resp.counts.normal, 2);

        let critical: Vec<_> = resp
            .items
            .iter()
            .filter(|v| v.tier() == Some(StockTier::Critical))
            .collect();
        assert_eq!(critical[0].item.quantity, 2.0);
        assert_eq!(critical[0].item.low_stock_threshold, 250.0);
    }

    #[tokio::test]
    async fn test_empty_selection_lists_every_branch() {
        let ctx = context().await;
        insert_test_data(&ctx).await.unwrap();
        let resp = list_view(&ctx, &FilterCriteria::default(), &SelectedBranches::all())
            .await
            .unwrap();
        assert_eq!(resp.total_count, 7);
    }

    #[tokio::test]
    async fn test_expiring_item_is_raised_to_warning() {
        let ctx = context().await;
        insert_test_data(&ctx).await.unwrap();
        let resp = list_view(&ctx, &FilterCriteria::search("milk"), &SelectedBranches::all())
            .await
            .unwrap();
        assert_eq!(resp.total_count, 1);
        let view = &resp.items[0];
        assert_eq!(view.tier(), Some(StockTier::Warning));
        assert_eq!(view.branch_names, vec!["Rangsit".to_string()]);
    }

    #[tokio::test]
    async fn test_alerts_skip_normal_items() {
        let ctx = context().await;
        insert_test_data(&ctx).await.unwrap();
        let resp = alerts(&ctx, &FilterCriteria::default(), &SelectedBranches::parse_list("1"))
            .await
            .unwrap();
        assert_eq!(resp.total_count, 3);
        assert_eq!(resp.items[0].tier(), Some(StockTier::Critical));
        assert_eq!(resp.counts.normal, 0);
    }

    #[tokio::test]
    async fn test_blank_sort_field_keeps_urgent_alerts_first() {
        let ctx = context().await;
        insert_test_data(&ctx).await.unwrap();
        let criteria = FilterCriteria {
            sort_by: Some(String::new()),
            ..FilterCriteria::default()
        };
        let resp = alerts(&ctx, &criteria, &SelectedBranches::parse_list("1"))
            .await
            .unwrap();
        let tiers: Vec<_> = resp.items.iter().filter_map(StockItemView::tier).collect();
        assert_eq!(
            tiers,
            vec![StockTier::Critical, StockTier::Warning, StockTier::Warning]
        );
    }

    #[tokio::test]
    async fn test_status_filter_uses_tier_codes() {
        let ctx = context().await;
        insert_test_data(&ctx).await.unwrap();
        let criteria = FilterCriteria {
            status: Some("WARNING".into()),
            ..FilterCriteria::default()
        };
        let resp = list_view(&ctx, &criteria, &SelectedBranches::parse_list("1"))
            .await
            .unwrap();
        assert_eq!(resp.total_count, 2);

        let criteria = FilterCriteria {
            status: Some("low".into()),
            ..FilterCriteria::default()
        };
        assert!(matches!(
            list_view(&ctx, &criteria, &SelectedBranches::all()).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_code_is_rejected() {
        let ctx = context().await;
        let dto = seed("X-1", "Wiper", "parts", "pcs", 5.0, 10.0, ShopKind::QuickService, &[1], None);
        create(&ctx, dto.clone()).await.unwrap();
        assert!(matches!(create(&ctx, dto).await, Err(ServiceError::Validation(_))));
        assert_eq!(list_all(&ctx).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_branch_is_rejected() {
        let ctx = context().await;
        let mut dto = seed("X-1", "Wiper", "parts", "pcs", 5.0, 10.0, ShopKind::QuickService, &[9], None);
        dto.code = None;
        let err = create(&ctx, dto).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_adjust_and_delete() {
        let ctx = context().await;
        let dto = seed("X-1", "Wiper", "parts", "pcs", 5.0, 10.0, ShopKind::QuickService, &[1], None);
        let id = create(&ctx, dto).await.unwrap();

        let item = adjust_quantity(&ctx, id, -3.0).await.unwrap();
        assert_eq!(item.quantity, 2.0);
        assert!(matches!(
            adjust_quantity(&ctx, id, -5.0).await,
            Err(ServiceError::Validation(_))
        ));
        assert_eq!(get_by_id(&ctx, id).await.unwrap().quantity, 2.0);

        delete(&ctx, id).await.unwrap();
        assert!(matches!(get_by_id(&ctx, id).await, Err(ServiceError::NotFound)));
        assert!(matches!(delete(&ctx, id).await, Err(ServiceError::NotFound)));
    }

    #[tokio::test]
    async fn test_csv_export_has_header_and_rows() {
        let ctx = context().await;
        insert_test_data(&ctx).await.unwrap();
        let csv = export_csv(&ctx, &FilterCriteria::default(), &SelectedBranches::parse_list("1"))
            .await
            .unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("code,name,category"));
        assert!(csv.contains("FIT-003"));
        assert!(csv.contains("Quick-service auto shop"));
        assert!(!csv.contains("CVS-001"));
    }
}
