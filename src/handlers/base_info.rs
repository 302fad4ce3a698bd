use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;

use crate::db::base_info::get_base_info;
use crate::error::ApiError;

/// GET /api/base-info: platform statistics, public.
pub async fn base_info(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, ApiError> {
    let info = get_base_info(db.get_ref()).await?;
    Ok(HttpResponse::Ok().json(info))
}
