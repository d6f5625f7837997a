//! Ledger account lookups.

use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use tally_core::ledger::Account;
use tally_shared::types::AccountId;

use crate::entities::accounts;
use crate::error::StoreError;

/// Account repository.
#[derive(Debug, Clone, Copy)]
pub struct AccountRepository;

impl AccountRepository {
    /// Inserts an account. Codes are unique.
    pub async fn insert<C: ConnectionTrait>(db: &C, account: Account) -> Result<(), StoreError> {
        if Self::find_by_id(db, account.id).await?.is_some() {
            return Err(StoreError::Duplicate(format!("account {}", account.id)));
        }
        if Self::find_by_code(db, &account.code).await?.is_some() {
            return Err(StoreError::Duplicate(format!("account code {}", account.code)));
        }
        accounts::ActiveModel {
            id: Set(account.id.into_inner()),
            code: Set(account.code),
            name: Set(account.name),
            is_active: Set(account.is_active),
            is_leaf: Set(account.is_leaf),
            allow_posting: Set(account.allow_posting),
        }
        .insert(db)
        .await?;
        Ok(())
    }

    /// Finds an account by id.
    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: AccountId,
    ) -> Result<Option<Account>, StoreError> {
        let model = accounts::Entity::find_by_id(id.into_inner()).one(db).await?;
        Ok(model.map(into_account))
    }

    /// Finds an account by code.
    pub async fn find_by_code<C: ConnectionTrait>(
        db: &C,
        code: &str,
    ) -> Result<Option<Account>, StoreError> {
        let model = accounts::Entity::find()
            .filter(accounts::Column::Code.eq(code))
            .one(db)
            .await?;
        Ok(model.map(into_account))
    }
}

fn into_account(model: accounts::Model) -> Account {
    Account {
        id: AccountId::from_uuid(model.id),
        code: model.code,
        name: model.name,
        is_active: model.is_active,
        is_leaf: model.is_leaf,
        allow_posting: model.allow_posting,
    }
}
