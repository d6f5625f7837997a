//! Cashbox storage and ledger-derived balances.

use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, EntityTrait, Set};
use tally_core::treasury::Cashbox;
use tally_shared::types::{AccountId, CashboxId};

use super::journal::JournalRepository;
use crate::entities::cashboxes;
use crate::error::StoreError;

/// Cashbox repository.
#[derive(Debug, Clone, Copy)]
pub struct CashboxRepository;

impl CashboxRepository {
    /// Inserts a cashbox.
    pub async fn insert<C: ConnectionTrait>(db: &C, cashbox: Cashbox) -> Result<(), StoreError> {
        if Self::find_by_id(db, cashbox.id).await?.is_some() {
            return Err(StoreError::Duplicate(format!("cashbox {}", cashbox.id)));
        }
        active_model(cashbox).insert(db).await?;
        Ok(())
    }

    /// Saves a changed cashbox.
    pub async fn update<C: ConnectionTrait>(db: &C, cashbox: Cashbox) -> Result<(), StoreError> {
        let id = cashbox.id;
        match active_model(cashbox).update(db).await {
            Ok(_) => Ok(()),
            Err(DbErr::RecordNotUpdated) => {
                Err(StoreError::RecordNotFound(format!("cashbox {id}")))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Finds a cashbox by id.
    pub async fn find_by_id<C: ConnectionTrait>(
        db: &C,
        id: CashboxId,
    ) -> Result<Option<Cashbox>, StoreError> {
        let model = cashboxes::Entity::find_by_id(id.into_inner()).one(db).await?;
        Ok(model.map(|m| Cashbox {
            id: CashboxId::from_uuid(m.id),
            code: m.code,
            name: m.name,
            account_id: m.account_id.map(AccountId::from_uuid),
            is_active: m.is_active,
        }))
    }

    /// Debit-minus-credit total of posted lines on the cashbox's account.
    ///
    /// Zero for a cashbox without an account.
    pub async fn gl_balance<C: ConnectionTrait>(
        db: &C,
        cashbox: &Cashbox,
    ) -> Result<Decimal, StoreError> {
        match cashbox.account_id {
            Some(account_id) => Ok(JournalRepository::account_balance(db, account_id)
                .await?
                .debit_balance()),
            None => Ok(Decimal::ZERO),
        }
    }
}

fn active_model(cashbox: Cashbox) -> cashboxes::ActiveModel {
    cashboxes::ActiveModel {
        id: Set(cashbox.id.into_inner()),
        code: Set(cashbox.code),
        name: Set(cashbox.name),
        account_id: Set(cashbox.account_id.map(AccountId::into_inner)),
        is_active: Set(cashbox.is_active),
    }
}
