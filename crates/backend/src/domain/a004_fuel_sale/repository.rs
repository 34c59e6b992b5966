use chrono::Utc;
use contracts::domain::a004_fuel_sale::{FuelSale, FuelSaleId};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use contracts::enums::FuelType;
use contracts::shared::branch_scope::BranchRef;
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "a004_fuel_sale")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub sale_date: chrono::NaiveDate,
    pub branch: String,
    pub fuel_type: String,
    pub liters: f64,
    pub amount: f64,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for FuelSale {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id)?;
        let fuel_type = FuelType::from_code(&m.fuel_type)
            .ok_or_else(|| anyhow::anyhow!("Unknown fuel type '{}' on {}", m.fuel_type, m.id))?;
        let branch = BranchRef::parse(&m.branch)
            .ok_or_else(|| anyhow::anyhow!("Empty branch on fuel sale {}", m.id))?;

        Ok(FuelSale {
            base: BaseAggregate::with_metadata(
                FuelSaleId(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            sale_date: m.sale_date,
            branch,
            fuel_type,
            liters: m.liters,
            amount: m.amount,
        })
    }
}

fn to_active(sale: &FuelSale) -> ActiveModel {
    ActiveModel {
        id: Set(sale.base.id.value().to_string()),
        code: Set(sale.base.code.clone()),
        description: Set(sale.base.description.clone()),
        comment: Set(sale.base.comment.clone()),
        sale_date: Set(sale.sale_date),
        branch: Set(sale.branch.as_str().to_string()),
        fuel_type: Set(sale.fuel_type.code().to_string()),
        liters: Set(sale.liters),
        amount: Set(sale.amount),
        is_deleted: Set(sale.base.metadata.is_deleted),
        created_at: Set(Some(sale.base.metadata.created_at)),
        updated_at: Set(Some(sale.base.metadata.updated_at)),
        version: Set(sale.base.metadata.version),
    }
}

/// Newest first
pub async fn list_all(conn: &DatabaseConnection) -> anyhow::Result<Vec<FuelSale>> {
    Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .order_by_desc(Column::SaleDate)
        .order_by_asc(Column::FuelType)
        .all(conn)
        .await?
        .into_iter()
        .map(FuelSale::try_from)
        .collect()
}

/// Sales with `sale_date` inside the inclusive range; open ends are unbounded
pub async fn list_by_date_range(
    conn: &DatabaseConnection,
    date_from: Option<chrono::NaiveDate>,
    date_to: Option<chrono::NaiveDate>,
) -> anyhow::Result<Vec<FuelSale>> {
    let mut query = Entity::find().filter(Column::IsDeleted.eq(false));
    if let Some(from) = date_from {
        query = query.filter(Column::SaleDate.gte(from));
    }
    if let Some(to) = date_to {
        query = query.filter(Column::SaleDate.lte(to));
    }
    query
        .order_by_asc(Column::SaleDate)
        .all(conn)
        .await?
        .into_iter()
        .map(FuelSale::try_from)
        .collect()
}

pub async fn get_by_id(conn: &DatabaseConnection, id: Uuid) -> anyhow::Result<Option<FuelSale>> {
    let result = Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(conn)
        .await?;
    result.map(FuelSale::try_from).transpose()
}

pub async fn insert(conn: &DatabaseConnection, sale: &FuelSale) -> anyhow::Result<Uuid> {
    to_active(sale).insert(conn).await?;
    Ok(sale.base.id.value())
}

pub async fn update(conn: &DatabaseConnection, sale: &FuelSale) -> anyhow::Result<()> {
    let mut active = to_active(sale);
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
