use chrono::Utc;
use contracts::domain::a003_rental_contract::{ContractStatus, RentalContract, RentalContractId};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use contracts::enums::ShopKind;
use contracts::shared::branch_scope::BranchRef;
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "a003_rental_contract")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub shop_kind: String,
    pub branch: String,
    pub monthly_rent: f64,
    pub deposit: f64,
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
    pub status: String,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for RentalContract {
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
        let status = ContractStatus::from_code(&m.status)
            .ok_or_else(|| anyhow::anyhow!("Unknown contract status '{}' on {}", m.status, m.id))?;
        let branch = BranchRef::parse(&m.branch)
            .ok_or_else(|| anyhow::anyhow!("Empty branch on contract {}", m.id))?;

        Ok(RentalContract {
            base: BaseAggregate::with_metadata(
                RentalContractId(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            shop_kind,
            branch,
            monthly_rent: m.monthly_rent,
            deposit: m.deposit,
            start_date: m.start_date,
            end_date: m.end_date,
            status,
        })
    }
}

fn to_active(contract: &RentalContract) -> ActiveModel {
    ActiveModel {
        id: Set(contract.base.id.value().to_string()),
        code: Set(contract.base.code.clone()),
        description: Set(contract.base.description.clone()),
        comment: Set(contract.base.comment.clone()),
        shop_kind: Set(contract.shop_kind.code().to_string()),
        branch: Set(contract.branch.as_str().to_string()),
        monthly_rent: Set(contract.monthly_rent),
        deposit: Set(contract.deposit),
        start_date: Set(contract.start_date),
        end_date: Set(contract.end_date),
        status: Set(contract.status.code().to_string()),
        is_deleted: Set(contract.base.metadata.is_deleted),
        created_at: Set(Some(contract.base.metadata.created_at)),
        updated_at: Set(Some(contract.base.metadata.updated_at)),
        version: Set(contract.base.metadata.version),
    }
}

pub async fn list_all(conn: &DatabaseConnection) -> anyhow::Result<Vec<RentalContract>> {
    Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .order_by_asc(Column::Description)
        .all(conn)
        .await?
        .into_iter()
        .map(RentalContract::try_from)
        .collect()
}

pub async fn get_by_id(
    conn: &DatabaseConnection,
    id: Uuid,
) -> anyhow::Result<Option<RentalContract>> {
    let result = Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(conn)
        .await?;
    result.map(RentalContract::try_from).transpose()
}

pub async fn insert(conn: &DatabaseConnection, contract: &RentalContract) -> anyhow::Result<Uuid> {
    to_active(contract).insert(conn).await?;
    Ok(contract.base.id.value())
}

pub async fn update(conn: &DatabaseConnection, contract: &RentalContract) -> anyhow::Result<()> {
    let mut active = to_active(contract);
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
