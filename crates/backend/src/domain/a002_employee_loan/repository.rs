use chrono::Utc;
use contracts::domain::a002_employee_loan::{EmployeeLoan, EmployeeLoanId, LoanStatus};
use contracts::domain::common::{BaseAggregate, EntityMetadata};
use contracts::shared::branch_scope::BranchRef;
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "a002_employee_loan")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub code: String,
    pub description: String,
    pub comment: Option<String>,
    pub employee_code: String,
    pub principal: f64,
    pub outstanding: f64,
    pub monthly_installment: f64,
    pub status: String,
    pub start_date: chrono::NaiveDate,
    pub branch: String,
    pub is_deleted: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for EmployeeLoan {
    type Error = anyhow::Error;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        let metadata = EntityMetadata {
            created_at: m.created_at.unwrap_or_else(Utc::now),
            updated_at: m.updated_at.unwrap_or_else(Utc::now),
            is_deleted: m.is_deleted,
            version: m.version,
        };
        let uuid = Uuid::parse_str(&m.id)?;
        let status = LoanStatus::from_code(&m.status)
            .ok_or_else(|| anyhow::anyhow!("Unknown loan status '{}' on {}", m.status, m.id))?;
        let branch = BranchRef::parse(&m.branch)
            .ok_or_else(|| anyhow::anyhow!("Empty branch on loan {}", m.id))?;

        Ok(EmployeeLoan {
            base: BaseAggregate::with_metadata(
                EmployeeLoanId(uuid),
                m.code,
                m.description,
                m.comment,
                metadata,
            ),
            employee_code: m.employee_code,
            principal: m.principal,
            outstanding: m.outstanding,
            monthly_installment: m.monthly_installment,
            status,
            start_date: m.start_date,
            branch,
        })
    }
}

fn to_active(loan: &EmployeeLoan) -> ActiveModel {
    ActiveModel {
        id: Set(loan.base.id.value().to_string()),
        code: Set(loan.base.code.clone()),
        description: Set(loan.base.description.clone()),
        comment: Set(loan.base.comment.clone()),
        employee_code: Set(loan.employee_code.clone()),
        principal: Set(loan.principal),
        outstanding: Set(loan.outstanding),
        monthly_installment: Set(loan.monthly_installment),
        status: Set(loan.status.code().to_string()),
        start_date: Set(loan.start_date),
        branch: Set(loan.branch.as_str().to_string()),
        is_deleted: Set(loan.base.metadata.is_deleted),
        created_at: Set(Some(loan.base.metadata.created_at)),
        updated_at: Set(Some(loan.base.metadata.updated_at)),
        version: Set(loan.base.metadata.version),
    }
}

pub async fn list_all(conn: &DatabaseConnection) -> anyhow::Result<Vec<EmployeeLoan>> {
    Entity::find()
        .filter(Column::IsDeleted.eq(false))
        .order_by_asc(Column::StartDate)
        .all(conn)
        .await?
        .into_iter()
        .map(EmployeeLoan::try_from)
        .collect()
}

pub async fn get_by_id(conn: &DatabaseConnection, id: Uuid) -> anyhow::Result<Option<EmployeeLoan>> {
    let result = Entity::find_by_id(id.to_string())
        .filter(Column::IsDeleted.eq(false))
        .one(conn)
        .await?;
    result.map(EmployeeLoan::try_from).transpose()
}

pub async fn insert(conn: &DatabaseConnection, loan: &EmployeeLoan) -> anyhow::Result<Uuid> {
    to_active(loan).insert(conn).await?;
    Ok(loan.base.id.value())
}

pub async fn update(conn: &DatabaseConnection, loan: &EmployeeLoan) -> anyhow::Result<()> {
    let mut active = to_active(loan);
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
