use askama::Template;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use time::OffsetDateTime;
use validator::Validate;

use crate::app::{
    db::{self, visits::NewVisit},
    domain::{local_time, CustomerId, Permission, StoreId, VisitId},
    error::AppError,
    features::layout::{self, Flash},
    session::AuthenticatedSession,
    tenant::{self, TenantContext},
    views::{self, ViewKey},
    AppState,
};

/// Visits shown on the visits page.
const RECENT_VISITS: i64 = 50;

pub struct VisitRow {
    pub visited_at: String,
    pub customer_name: String,
    pub store_name: String,
    pub amount_yen: i64,
    pub notes: String,
}

/// Recent visits list. Cached.
#[derive(Template)]
#[template(path = "visits.html")]
pub struct VisitsTemplate {
    pub visits: Vec<VisitRow>,
}

pub struct SelectOption {
    pub id: String,
    pub name: String,
}

/// Record-visit form. Lists customers and stores, so it is rendered per
/// request rather than cached with the visit list.
#[derive(Template)]
#[template(path = "visit_form.html")]
pub struct VisitFormTemplate {
    pub customers: Vec<SelectOption>,
    pub stores: Vec<SelectOption>,
    pub today: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VisitForm {
    pub customer_id: String,
    #[serde(default)]
    pub store_id: String,
    pub date: String,
    #[serde(default)]
    pub time: String,
    pub amount_yen: String,
    #[serde(default)]
    #[validate(length(max = 1000, message = "メモは1000文字以内で入力してください。"))]
    pub notes: String,
}

/// A visit as entered, before ids are assigned.
#[derive(Debug)]
pub struct VisitInput {
    pub customer_id: CustomerId,
    pub store_id: Option<StoreId>,
    pub visited_at: OffsetDateTime,
    pub amount_yen: i64,
    pub notes: String,
}

impl VisitForm {
    pub fn parse(&self) -> Result<VisitInput, String> {
        self.validate().map_err(|errors| layout::first_message(&errors))?;

        let customer_id =
            CustomerId::from_string(&self.customer_id).map_err(|_| "顧客を選択してください。".to_string())?;
        let store_id = match layout::non_blank_str(&self.store_id) {
            Some(raw) => Some(StoreId::from_string(raw).map_err(|_| "店舗の指定が正しくありません。".to_string())?),
            None => None,
        };
        let date = local_time::parse_iso_date(&self.date).map_err(|_| "来店日が正しくありません。".to_string())?;
        let visited_at =
            local_time::local_instant(date, &self.time).map_err(|_| "来店時刻はHH:MMで入力してください。".to_string())?;
        let amount_yen = self
            .amount_yen
            .trim()
            .replace(',', "")
            .parse::<i64>()
            .ok()
            .filter(|a| *a >= 0)
            .ok_or_else(|| "金額は0以上の整数で入力してください。".to_string())?;

        Ok(VisitInput {
            customer_id,
            store_id,
            visited_at,
            amount_yen,
            notes: self.notes.trim().to_string(),
        })
    }
}

async fn render_list(state: &AppState, context: &TenantContext) -> Result<String, AppError> {
    let visits = db::visits::list_recent(&state.db, &context.organization_id, RECENT_VISITS).await?;
    let template = VisitsTemplate {
        visits: visits
            .into_iter()
            .map(|v| VisitRow {
                visited_at: local_time::format_local(v.visited_at),
                customer_name: v.customer_name,
                store_name: v.store_name.unwrap_or_else(|| "-".to_string()),
                amount_yen: v.amount_yen,
                notes: v.notes,
            })
            .collect(),
    };
    layout::render(&template)
}

async fn render_form(state: &AppState, context: &TenantContext) -> Result<String, AppError> {
    let customers = db::customers::list_for_organization(&state.db, &context.organization_id).await?;
    let stores = db::stores::list_for_organization(&state.db, &context.organization_id).await?;
    let template = VisitFormTemplate {
        customers: customers
            .into_iter()
            .map(|c| SelectOption { id: c.id, name: c.name })
            .collect(),
        stores: stores
            .into_iter()
            .map(|s| SelectOption { id: s.id, name: s.name })
            .collect(),
        today: local_time::today().to_string(),
    };
    layout::render(&template)
}

/// GET /dashboard/visits
pub async fn list(
    AuthenticatedSession(session): AuthenticatedSession,
    State(state): State<AppState>,
    Query(flash): Query<Flash>,
) -> Response {
    let context = match layout::page_context(&state, &session, Permission::ViewDashboard).await {
        Ok(context) => context,
        Err(response) => return response,
    };

    let form = render_form(&state, &context)
        .await
        .unwrap_or_else(|err| layout::degraded_body(views::VISITS, &err));

    let key = ViewKey::new(views::VISITS, context.organization_id.as_str(), context.role());
    let list = state
        .views
        .get_or_render(key, || render_list(&state, &context))
        .await
        .unwrap_or_else(|err| layout::degraded_body(views::VISITS, &err));

    layout::render_page(&context, "来店記録", flash, format!("{form}{list}")).into_response()
}

/// POST /dashboard/visits — Record a visit of a customer of this organization.
pub async fn create(
    AuthenticatedSession(session): AuthenticatedSession,
    State(state): State<AppState>,
    Form(form): Form<VisitForm>,
) -> Result<Redirect, AppError> {
    let input = match form.parse() {
        Ok(input) => input,
        Err(msg) => return Ok(layout::redirect_with_error(views::VISITS, &msg)),
    };

    let context = tenant::authorize(&state, &session, Permission::ViewDashboard).await?;
    let org_id = &context.organization_id;

    if db::customers::find_in_organization(&state.db, org_id, &input.customer_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound);
    }
    if let Some(store_id) = &input.store_id {
        if db::stores::find_in_organization(&state.db, org_id, store_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound);
        }
    }

    let visit = NewVisit {
        id: VisitId::new(),
        organization_id: org_id.clone(),
        customer_id: input.customer_id,
        store_id: input.store_id,
        visited_at: input.visited_at,
        amount_yen: input.amount_yen,
        notes: input.notes,
    };
    db::visits::insert(&state.db, &visit).await?;

    tracing::info!(organization_id = %org_id, visit_id = %visit.id, customer_id = %visit.customer_id, "visit recorded");
    state.views.revalidate_path(views::VISITS);
    state.views.revalidate_path(views::CUSTOMERS);

    Ok(layout::redirect_with_success(views::VISITS, "来店を記録しました。"))
}

pub fn routes() -> Router<AppState> {
    Router::new().route(views::VISITS, get(list).post(create))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> VisitForm {
        VisitForm {
            customer_id: CustomerId::new().as_str(),
            store_id: String::new(),
            date: "2026-04-01".to_string(),
            time: "14:30".to_string(),
            amount_yen: "5,500".to_string(),
            notes: " カット ".to_string(),
        }
    }

    #[test]
    fn parses_local_time_and_amount() {
        let input = form().parse().unwrap();
        assert_eq!(local_time::format_local(input.visited_at.unix_timestamp()), "2026-04-01 14:30");
        assert_eq!(input.amount_yen, 5500);
        assert_eq!(input.notes, "カット");
        assert!(input.store_id.is_none());
    }

    #[test]
    fn rejects_negative_amount_and_unknown_customer_id() {
        assert!(VisitForm { amount_yen: "-1".to_string(), ..form() }.parse().is_err());
        assert!(VisitForm { customer_id: "nope".to_string(), ..form() }.parse().is_err());
        assert!(VisitForm { store_id: "bad".to_string(), ..form() }.parse().is_err());
    }
}
