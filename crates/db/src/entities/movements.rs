//! `SeaORM` Entity for movements table.

use chrono::Utc;
use ledgra_core::ledger::MovementRecord;
use ledgra_shared::types::{AccountId, MovementId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::MovementKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Uuid,
    pub occurred_at: DateTimeWithTimeZone,
    pub sequence: i64,
    pub kind: MovementKind,
    pub signed_amount: Decimal,
    pub resulting_balance: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for MovementRecord {
    fn from(model: Model) -> Self {
        Self {
            id: MovementId::from_uuid(model.id),
            occurred_at: model.occurred_at.with_timezone(&Utc),
            sequence: model.sequence,
            kind: model.kind.into(),
            signed_amount: model.signed_amount,
            resulting_balance: model.resulting_balance,
            account_id: AccountId::from_uuid(model.account_id),
        }
    }
}
