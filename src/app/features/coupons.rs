use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use time::Date;
use validator::Validate;

use crate::app::{
    db::{
        self,
        coupons::{InsertCoupon, NewCoupon},
    },
    domain::{local_time, CouponCode, CouponId, Permission},
    error::AppError,
    features::layout::{self, Flash},
    session::AuthenticatedSession,
    tenant::{self, TenantContext},
    views::{self, ViewKey},
    AppState,
};

pub struct CouponRow {
    pub id: String,
    pub code: String,
    pub discount_percent: i64,
    pub expires_on: String,
    pub active: bool,
    pub expired: bool,
}

/// Coupons body fragment.
#[derive(Template)]
#[template(path = "coupons.html")]
pub struct CouponsTemplate {
    pub coupons: Vec<CouponRow>,
    pub can_manage: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CouponForm {
    #[validate(length(min = 1, max = 64, message = "クーポンコードを入力してください。"))]
    pub code: String,
    pub discount_percent: String,
    #[serde(default)]
    pub expires_on: String,
}

/// A coupon as entered, before ids are assigned.
#[derive(Debug, PartialEq, Eq)]
pub struct CouponInput {
    pub code: CouponCode,
    pub discount_percent: u8,
    pub expires_on: Option<Date>,
}

impl CouponForm {
    pub fn parse(&self) -> Result<CouponInput, String> {
        self.validate().map_err(|errors| layout::first_message(&errors))?;

        let code = CouponCode::new(&self.code)
            .map_err(|_| "クーポンコードは英数字・ハイフン・アンダースコアの3〜32文字で入力してください。".to_string())?;

        let discount_percent = self
            .discount_percent
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|p| (1..=100).contains(p))
            .ok_or_else(|| "割引率は1〜100の整数で入力してください。".to_string())?;

        let expires_on = match layout::non_blank(&self.expires_on) {
            Some(raw) => Some(
                local_time::parse_iso_date(&raw).map_err(|_| "有効期限の日付が正しくありません。".to_string())?,
            ),
            None => None,
        };

        Ok(CouponInput {
            code,
            discount_percent,
            expires_on,
        })
    }
}

async fn render_body(state: &AppState, context: &TenantContext) -> Result<String, AppError> {
    let coupons = db::coupons::list_for_organization(&state.db, &context.organization_id).await?;
    let today = local_time::today();

    let template = CouponsTemplate {
        coupons: coupons
            .into_iter()
            .map(|c| {
                let expired = c
                    .expires_on
                    .as_deref()
                    .and_then(|d| local_time::parse_iso_date(d).ok())
                    .is_some_and(|d| d < today);
                CouponRow {
                    id: c.id,
                    code: c.code,
                    discount_percent: c.discount_percent,
                    expires_on: c.expires_on.unwrap_or_default(),
                    active: c.active,
                    expired,
                }
            })
            .collect(),
        can_manage: context.can(Permission::ManageStoreSettings),
    };
    layout::render(&template)
}

/// GET /dashboard/coupons
pub async fn list(
    AuthenticatedSession(session): AuthenticatedSession,
    State(state): State<AppState>,
    Query(flash): Query<Flash>,
) -> Response {
    let context = match layout::page_context(&state, &session, Permission::ViewDashboard).await {
        Ok(context) => context,
        Err(response) => return response,
    };

    // Expiry marks depend on the date.
    let key = ViewKey::new(views::COUPONS, context.organization_id.as_str(), context.role())
        .with_latest_variant(local_time::today().to_string());
    let body = state
        .views
        .get_or_render(key, || render_body(&state, &context))
        .await
        .unwrap_or_else(|err| layout::degraded_body(views::COUPONS, &err));

    layout::render_page(&context, "クーポン", flash, body).into_response()
}

/// POST /dashboard/coupons
pub async fn create(
    AuthenticatedSession(session): AuthenticatedSession,
    State(state): State<AppState>,
    Form(form): Form<CouponForm>,
) -> Result<Redirect, AppError> {
    let input = match form.parse() {
        Ok(input) => input,
        Err(msg) => return Ok(layout::redirect_with_error(views::COUPONS, &msg)),
    };

    let context = tenant::authorize(&state, &session, Permission::ManageStoreSettings).await?;

    let coupon = NewCoupon {
        id: CouponId::new(),
        organization_id: context.organization_id.clone(),
        code: input.code,
        discount_percent: input.discount_percent,
        expires_on: input.expires_on,
    };

    match db::coupons::insert(&state.db, &coupon).await? {
        InsertCoupon::Inserted => {
            tracing::info!(
                organization_id = %context.organization_id,
                code = coupon.code.as_str(),
                "coupon created"
            );
            state.views.revalidate_path(views::COUPONS);
            Ok(layout::redirect_with_success(views::COUPONS, "クーポンを作成しました。"))
        }
        InsertCoupon::DuplicateCode => Ok(layout::redirect_with_error(
            views::COUPONS,
            "同じコードのクーポンが既にあります。",
        )),
    }
}

/// POST /dashboard/coupons/{id}/toggle
pub async fn toggle(
    AuthenticatedSession(session): AuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let coupon_id = CouponId::from_string(&id).map_err(|_| AppError::NotFound)?;

    let context = tenant::authorize(&state, &session, Permission::ManageStoreSettings).await?;

    let toggled =
        db::coupons::toggle_active_in_organization(&state.db, &context.organization_id, &coupon_id).await?;
    if !toggled {
        return Err(AppError::NotFound);
    }

    state.views.revalidate_path(views::COUPONS);
    Ok(layout::redirect_with_success(views::COUPONS, "クーポンの状態を変更しました。"))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(views::COUPONS, get(list).post(create))
        .route("/dashboard/coupons/{id}/toggle", post(toggle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(code: &str, percent: &str, expires_on: &str) -> CouponForm {
        CouponForm {
            code: code.to_string(),
            discount_percent: percent.to_string(),
            expires_on: expires_on.to_string(),
        }
    }

    #[test]
    fn code_is_upper_cased() {
        let input = form(" spring-10 ", "10", "").parse().unwrap();
        assert_eq!(input.code.as_str(), "SPRING-10");
        assert_eq!(input.discount_percent, 10);
        assert_eq!(input.expires_on, None);
    }

    #[test]
    fn discount_must_be_between_1_and_100() {
        assert!(form("SALE", "0", "").parse().is_err());
        assert!(form("SALE", "101", "").parse().is_err());
        assert!(form("SALE", "abc", "").parse().is_err());
        assert!(form("SALE", "100", "").parse().is_ok());
    }

    #[test]
    fn expiry_date_is_parsed() {
        let input = form("SALE", "5", "2026-12-31").parse().unwrap();
        assert_eq!(input.expires_on.map(|d| d.to_string()).as_deref(), Some("2026-12-31"));
        assert!(form("SALE", "5", "12/31").parse().is_err());
    }
}
