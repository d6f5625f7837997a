//! Lifecycle steps shared by the four document services.

use sea_orm::ConnectionTrait;
use tally_core::document::{Document, DocumentHeader};
use tally_core::numbering::prefix_for;
use tally_db::{Database, DatabaseTransaction, DocumentRepository, SequenceRepository, StoredDocument};
use tally_shared::{AppError, AppResult};
use tracing::info;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::context::{ServiceContext, finish};

/// A live document, or `NotFound`.
pub(crate) async fn load<D: StoredDocument, C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<D> {
    DocumentRepository::<D>::find(db, id)
        .await?
        .ok_or_else(|| AppError::from(D::not_found(id)))
}

/// Allocates the next number for `D` in the current month.
pub(crate) async fn allocate_number<D: StoredDocument>(
    txn: &DatabaseTransaction,
    ctx: &ServiceContext,
) -> AppResult<String> {
    Ok(SequenceRepository::next_document_number(
        txn,
        D::KIND,
        prefix_for(D::KIND, &ctx.config.numbering),
        ctx.clock.today(),
    )
    .await?)
}

/// Reason recorded on the reversal entry of a cancelled document.
pub(crate) fn cancel_reason(header: &DocumentHeader) -> String {
    format!("{} {} cancelled", header.kind, header.number)
}

pub(crate) async fn get<D: StoredDocument>(ctx: &ServiceContext, id: Uuid) -> AppResult<D> {
    finish("get", load::<D, _>(ctx.db.connection(), id).await)
}

pub(crate) async fn list<D: StoredDocument>(ctx: &ServiceContext) -> AppResult<Vec<D>> {
    let listed = DocumentRepository::<D>::list(ctx.db.connection()).await;
    finish("list", listed.map_err(AppError::from))
}

pub(crate) async fn peek_next_number<D: StoredDocument>(ctx: &ServiceContext) -> AppResult<String> {
    let today = ctx.clock.today();
    let prefix = prefix_for(D::KIND, &ctx.config.numbering);
    let peeked =
        SequenceRepository::peek_document_number(ctx.db.connection(), D::KIND, prefix, today).await;
    finish("peek_next_number", peeked.map_err(AppError::from))
}

pub(crate) async fn delete_draft<D: StoredDocument>(
    ctx: &ServiceContext,
    user: &CurrentUser,
    id: Uuid,
) -> AppResult<D> {
    let now = ctx.clock.now();
    let result: AppResult<D> = async {
        let txn = ctx.db.begin().await?;
        let mut doc = load::<D, _>(&txn, id).await?;
        doc.header_mut().mark_deleted(&user.username, now)?;
        DocumentRepository::update(&txn, doc.clone()).await?;
        Database::commit(txn).await?;
        Ok(doc)
    }
    .await;
    let deleted = finish("delete_draft", result)?;

    info!(
        kind = %D::KIND,
        number = %deleted.header().number,
        user = %user.username,
        "Draft deleted"
    );
    Ok(deleted)
}
