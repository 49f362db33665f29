//! `SeaORM` Entity for accounts table.

use chrono::Utc;
use ledgra_shared::types::{AccountId, ClientId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::AccountType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_number: String,
    pub account_type: AccountType,
    pub opening_balance: Decimal,
    pub is_active: bool,
    pub owner_client_id: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::movements::Entity")]
    Movements,
}

impl Related<super::movements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movements.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ledgra_core::account::Account {
    fn from(model: Model) -> Self {
        Self {
            id: AccountId::from_uuid(model.id),
            account_number: model.account_number,
            account_type: model.account_type.into(),
            opening_balance: model.opening_balance,
            active: model.is_active,
            owner_client_id: ClientId::from(model.owner_client_id),
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
