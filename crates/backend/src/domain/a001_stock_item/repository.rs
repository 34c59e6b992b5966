use chrono::Utc;
use contracts::domain::a001_stock_item::{StockItem, StockItemId};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use contracts::enums::ShopKind;
use contracts::shared::branch_scope::BranchRef;
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "a001_stock_item")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub quantity: f64,
    pub unit: String,
    pub cost: f64,
    pub price: f64,
    pub low_stock_threshold: f64,
    pub category: String,
    pub supplier: String,
    pub expiry: Option<chrono::NaiveDate>,
    pub shop_kind: String,
    /// JSON array of branch ids
    pub branches: String,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for StockItem {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id)?;
        let shop_kind = ShopKind::from_code(&m.shop_kind)
            .ok_or_else(|| anyhow::anyhow!("Unknown shop kind '{}' on {}", m.shop_kind, m.id))?;
        let branches: Vec<BranchRef> = serde_json::from_str(&m.branches)?;

        Ok(StockItem {
            base: BaseAggregate::with_metadata(
                StockItemId(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            quantity: m.quantity,
            unit: m.unit,
            cost: m.cost,
            price: m.price,
            low_stock_threshold: m.low_stock_threshold,
            category: m.category,
            supplier: m.supplier,
            expiry: m.expiry,
            shop_kind,
            branches,
        })
    }
}

fn to_active(item: &StockItem) -> anyhow::Result<ActiveModel> {
    Ok(ActiveModel {
        id: Set(item.base.id.value().to_string()),
        code: Set(item.base.code.clone()),
        description: Set(item.base.description.clone()),
        comment: Set(item.base.comment.clone()),
        quantity: Set(item.quantity),
        unit: Set(item.unit.clone()),
        cost: Set(item.cost),
        price: Set(item.price),
        low_stock_threshold: Set(item.low_stock_threshold),
        category: Set(item.category.clone()),
        supplier: Set(item.supplier.clone()),
        expiry: Set(item.expiry),
        shop_kind: Set(item.shop_kind.code().to_string()),
        branches: Set(serde_json::to_string(&item.branches)?),
        is_deleted: Set(item.base.metadata.is_deleted),
        created_at: Set(Some(item.base.metadata.created_at)),
        updated_at: Set(Some(item.base.metadata.updated_at)),
        version: Set(item.base.metadata.version),
    })
}

pub async fn list_all(conn: &DatabaseConnection) -> anyhow::Result<Vec<StockItem>> {
    Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .order_by_asc(Column::Description)
        .all(conn)
        .await?
        .into_iter()
        .map(StockItem::try_from)
        .collect()
}

pub async fn get_by_id(conn: &DatabaseConnection, id: Uuid) -> anyhow::Result<Option<StockItem>> {
    let result = Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(conn)
        .await?;
    result.map(StockItem::try_from).transpose()
}

pub async fn insert(conn: &DatabaseConnection, item: &StockItem) -> anyhow::Result<Uuid> {
    to_active(item)?.insert(conn).await?;
    Ok(item.base.id.value())
}

pub async fn update(conn: &DatabaseConnection, item: &StockItem) -> anyhow::Result<()> {
    let mut active = to_active(item)?;
    active.created_at = sea_orm::ActiveValue::NotSet;
    active.update(conn).await?;
    Ok(())
}

pub async fn soft_delete(conn: &DatabaseConnection, id: Uuid) -> anyhow::Result<bool> {
    use sea_orm::sea_query::Expr;
    let result = Entity::update_many()
        .col_expr(Column::IsDeleted, Expr::value(true))
        .col_expr(Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(Column::Id.eq(id.to_string()))
        .filter(Column::IsDeleted.eq(false))
        .exec(conn)
        .await?;
    Ok(result.rows_affected > 0)
}

pub async fn get_by_code(conn: &DatabaseConnection, code: &str) -> anyhow::Result<Option<StockItem>> {
    let result = Entity::find()
        .filter(Column::Code.eq(code))
        .filter(Column::IsDeleted.eq(false))
        .one(conn)
        .await?;
    result.map(StockItem::try_from).transpose()
}
