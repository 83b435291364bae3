use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use validator::Validate;

use crate::app::{
    db::{self, stores::NewStore},
    domain::{Permission, StoreId},
    error::AppError,
    features::layout::{self, Flash},
    session::AuthenticatedSession,
    tenant::{self, TenantContext},
    views::{self, ViewKey},
    AppState,
};

pub struct StoreRow {
    pub id: String,
    pub name: String,
    pub address: String,
}

/// Stores body fragment.
#[derive(Template)]
#[template(path = "stores.html")]
pub struct StoresTemplate {
    pub stores: Vec<StoreRow>,
    pub can_create: bool,
    pub can_rename: bool,
    pub can_delete: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct StoreForm {
    #[validate(length(min = 1, max = 100, message = "店舗名は1〜100文字で入力してください。"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 200, message = "住所は200文字以内で入力してください。"))]
    pub address: String,
}

impl StoreForm {
    /// Trimmed name and address, or the first validation message.
    fn cleaned(&self) -> Result<(String, String), String> {
        let trimmed = StoreForm {
            name: self.name.trim().to_string(),
            address: self.address.trim().to_string(),
        };
        trimmed.validate().map_err(|errors| layout::first_message(&errors))?;
        Ok((trimmed.name, trimmed.address))
    }
}

async fn render_body(state: &AppState, context: &TenantContext) -> Result<String, AppError> {
    let stores = db::stores::list_for_organization(&state.db, &context.organization_id).await?;
    let template = StoresTemplate {
        stores: stores
            .into_iter()
            .map(|s| StoreRow {
                id: s.id,
                name: s.name,
                address: s.address,
            })
            .collect(),
        can_create: context.can(Permission::CreateStore),
        can_rename: context.can(Permission::ManageStoreSettings),
        can_delete: context.can(Permission::DeleteStore),
    };
    layout::render(&template)
}

/// GET /dashboard/stores
pub async fn list(
    AuthenticatedSession(session): AuthenticatedSession,
    State(state): State<AppState>,
    Query(flash): Query<Flash>,
) -> Response {
    let context = match layout::page_context(&state, &session, Permission::ViewDashboard).await {
        Ok(context) => context,
        Err(response) => return response,
    };

    let key = ViewKey::new(views::STORES, context.organization_id.as_str(), context.role());
    let body = state
        .views
        .get_or_render(key, || render_body(&state, &context))
        .await
        .unwrap_or_else(|err| layout::degraded_body(views::STORES, &err));

    layout::render_page(&context, "店舗", flash, body).into_response()
}

/// POST /dashboard/stores
pub async fn create(
    AuthenticatedSession(session): AuthenticatedSession,
    State(state): State<AppState>,
    Form(form): Form<StoreForm>,
) -> Result<Redirect, AppError> {
    let (name, address) = match form.cleaned() {
        Ok(cleaned) => cleaned,
        Err(msg) => return Ok(layout::redirect_with_error(views::STORES, &msg)),
    };

    let context = tenant::authorize(&state, &session, Permission::CreateStore).await?;

    let store = NewStore {
        id: StoreId::new(),
        organization_id: context.organization_id.clone(),
        name,
        address,
    };
    db::stores::insert(&state.db, &store).await?;

    tracing::info!(organization_id = %context.organization_id, store_id = %store.id, "store created");
    state.views.revalidate_path(views::STORES);
    state.views.revalidate_path(views::DASHBOARD);
    // The shifts page offers a store picker.
    state.views.revalidate_path(views::SHIFTS);

    Ok(layout::redirect_with_success(views::STORES, "店舗を追加しました。"))
}

/// POST /dashboard/stores/{id}/rename
pub async fn rename(
    AuthenticatedSession(session): AuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<StoreForm>,
) -> Result<Redirect, AppError> {
    let (name, address) = match form.cleaned() {
        Ok(cleaned) => cleaned,
        Err(msg) => return Ok(layout::redirect_with_error(views::STORES, &msg)),
    };
    let store_id = StoreId::from_string(&id).map_err(|_| AppError::NotFound)?;

    let context = tenant::authorize(&state, &session, Permission::ManageStoreSettings).await?;

    let renamed =
        db::stores::rename_in_organization(&state.db, &context.organization_id, &store_id, &name, &address)
            .await?;
    if !renamed {
        return Err(AppError::NotFound);
    }

    tracing::info!(organization_id = %context.organization_id, %store_id, "store renamed");
    state.views.revalidate_path(views::STORES);
    state.views.revalidate_path(views::SHIFTS);
    state.views.revalidate_path(views::VISITS);
    Ok(layout::redirect_with_success(views::STORES, "店舗情報を更新しました。"))
}

/// POST /dashboard/stores/{id}/delete
pub async fn delete(
    AuthenticatedSession(session): AuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let store_id = StoreId::from_string(&id).map_err(|_| AppError::NotFound)?;

    let context = tenant::authorize(&state, &session, Permission::DeleteStore).await?;

    let deleted = db::stores::delete_in_organization(&state.db, &context.organization_id, &store_id).await?;
    if !deleted {
        return Err(AppError::NotFound);
    }

    tracing::info!(organization_id = %context.organization_id, %store_id, "store deleted");
    state.views.revalidate_path(views::STORES);
    state.views.revalidate_path(views::DASHBOARD);
    // Shifts of the store went with it; its visits lost their store.
    state.views.revalidate_path(views::SHIFTS);
    state.views.revalidate_path(views::VISITS);

    Ok(layout::redirect_with_success(views::STORES, "店舗を削除しました。"))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(views::STORES, get(list).post(create))
        .route("/dashboard/stores/{id}/rename", post(rename))
        .route("/dashboard/stores/{id}/delete", post(delete))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_form_trims_and_validates() {
        let form = StoreForm {
            name: "  表参道店 ".to_string(),
            address: " 東京都港区 ".to_string(),
        };
        assert_eq!(
            form.cleaned().unwrap(),
            ("表参道店".to_string(), "東京都港区".to_string())
        );

        let blank = StoreForm {
            name: "   ".to_string(),
            address: String::new(),
        };
        assert_eq!(blank.cleaned().unwrap_err(), "店舗名は1〜100文字で入力してください。");
    }
}
