//! Soft delete, restore and hard delete for any entity with a deleted flag.
//!
//! Each helper reports whether a row with the given id existed; a missing row
//! is `Ok(false)`, never an error.

use model::SoftDelete;
use sea_orm::{ColumnTrait, DatabaseConnection, QueryFilter, sea_query::Expr};
use tracing::{debug, instrument};

use crate::error::Result;

async fn set_deleted<E: SoftDelete>(db: &DatabaseConnection, id: i32, deleted: bool) -> Result<bool> {
    let result = E::update_many()
        .col_expr(E::deleted_column(), Expr::value(deleted))
        .filter(E::id_column().eq(id))
        .exec(db)
        .await?;
    debug!(
        "Set deleted={} on {} row(s) of {}",
        deleted,
        result.rows_affected,
        E::default().table_name()
    );
    Ok(result.rows_affected > 0)
}

/// Moves the row to the recycle bin.
#[instrument(skip(db))]
pub async fn soft_delete<E: SoftDelete>(db: &DatabaseConnection, id: i32) -> Result<bool> {
    set_deleted::<E>(db, id, true).await
}

/// Takes the row out of the recycle bin.
#[instrument(skip(db))]
pub async fn restore<E: SoftDelete>(db: &DatabaseConnection, id: i32) -> Result<bool> {
    set_deleted::<E>(db, id, false).await
}

/// Physically removes the row. Foreign-key violations surface as database
/// errors.
#[instrument(skip(db))]
pub async fn hard_delete<E: SoftDelete>(db: &DatabaseConnection, id: i32) -> Result<bool> {
    let result = E::delete_many()
        .filter(E::id_column().eq(id))
        .exec(db)
        .await?;
    debug!(
        "Removed {} row(s) of {}",
        result.rows_affected,
        E::default().table_name()
    );
    Ok(result.rows_affected > 0)
}
