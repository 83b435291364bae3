use std::collections::HashMap;

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
    db::{self, customers::NewCustomer},
    domain::{CustomerId, Email, Permission},
    error::AppError,
    features::layout::{self, Flash},
    session::AuthenticatedSession,
    tenant::{self, TenantContext},
    views::{self, ViewKey},
    AppState,
};

pub struct CustomerRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub notes: String,
    pub visit_count: i64,
}

/// Customers body fragment.
#[derive(Template)]
#[template(path = "customers.html")]
pub struct CustomersTemplate {
    pub customers: Vec<CustomerRow>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CustomerForm {
    #[validate(length(min = 1, max = 100, message = "お名前は1〜100文字で入力してください。"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 254, message = "メールアドレスが長すぎます。"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 30, message = "電話番号は30文字以内で入力してください。"))]
    pub phone: String,
    #[serde(default)]
    #[validate(length(max = 1000, message = "メモは1000文字以内で入力してください。"))]
    pub notes: String,
}

impl CustomerForm {
    /// Validate and normalize into an insertable customer (minus ids).
    fn into_parts(self) -> Result<(String, Option<Email>, Option<String>, String), String> {
        let form = CustomerForm {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            notes: self.notes.trim().to_string(),
        };
        form.validate().map_err(|errors| layout::first_message(&errors))?;

        let email = match layout::non_blank(&form.email) {
            Some(raw) => Some(
                Email::new(raw).map_err(|_| "メールアドレスの形式が正しくありません。".to_string())?,
            ),
            None => None,
        };
        Ok((form.name, email, layout::non_blank(&form.phone), form.notes))
    }
}

async fn render_body(state: &AppState, context: &TenantContext) -> Result<String, AppError> {
    let customers = db::customers::list_for_organization(&state.db, &context.organization_id).await?;
    let counts: HashMap<String, i64> = db::visits::count_by_customer(&state.db, &context.organization_id)
        .await?
        .into_iter()
        .collect();

    let template = CustomersTemplate {
        customers: customers
            .into_iter()
            .map(|c| CustomerRow {
                visit_count: counts.get(&c.id).copied().unwrap_or(0),
                id: c.id,
                name: c.name,
                email: c.email.unwrap_or_default(),
                phone: c.phone.unwrap_or_default(),
                notes: c.notes,
            })
            .collect(),
    };
    layout::render(&template)
}

/// GET /dashboard/customers
pub async fn list(
    AuthenticatedSession(session): AuthenticatedSession,
    State(state): State<AppState>,
    Query(flash): Query<Flash>,
) -> Response {
    let context = match layout::page_context(&state, &session, Permission::ViewDashboard).await {
        Ok(context) => context,
        Err(response) => return response,
    };

    let key = ViewKey::new(views::CUSTOMERS, context.organization_id.as_str(), context.role());
    let body = state
        .views
        .get_or_render(key, || render_body(&state, &context))
        .await
        .unwrap_or_else(|err| layout::degraded_body(views::CUSTOMERS, &err));

    layout::render_page(&context, "顧客", flash, body).into_response()
}

/// POST /dashboard/customers
pub async fn create(
    AuthenticatedSession(session): AuthenticatedSession,
    State(state): State<AppState>,
    Form(form): Form<CustomerForm>,
) -> Result<Redirect, AppError> {
    let (name, email, phone, notes) = match form.into_parts() {
        Ok(parts) => parts,
        Err(msg) => return Ok(layout::redirect_with_error(views::CUSTOMERS, &msg)),
    };

    let context = tenant::authorize(&state, &session, Permission::ViewDashboard).await?;

    let customer = NewCustomer {
        id: CustomerId::new(),
        organization_id: context.organization_id.clone(),
        name,
        email,
        phone,
        notes,
    };
    db::customers::insert(&state.db, &customer).await?;

    tracing::info!(organization_id = %context.organization_id, customer_id = %customer.id, "customer created");
    state.views.revalidate_path(views::CUSTOMERS);

    Ok(layout::redirect_with_success(views::CUSTOMERS, "顧客を登録しました。"))
}

/// POST /dashboard/customers/{id}/delete
pub async fn delete(
    AuthenticatedSession(session): AuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let customer_id = CustomerId::from_string(&id).map_err(|_| AppError::NotFound)?;

    let context = tenant::authorize(&state, &session, Permission::ViewDashboard).await?;

    let deleted =
        db::customers::delete_in_organization(&state.db, &context.organization_id, &customer_id).await?;
    if !deleted {
        return Err(AppError::NotFound);
    }

    tracing::info!(organization_id = %context.organization_id, %customer_id, "customer deleted");
    state.views.revalidate_path(views::CUSTOMERS);
    // Their visits went with them.
    state.views.revalidate_path(views::VISITS);

    Ok(layout::redirect_with_success(views::CUSTOMERS, "顧客を削除しました。"))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(views::CUSTOMERS, get(list).post(create))
        .route("/dashboard/customers/{id}/delete", post(delete))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str) -> CustomerForm {
        CustomerForm {
            name: name.to_string(),
            email: email.to_string(),
            phone: " 090-1234-5678 ".to_string(),
            notes: String::new(),
        }
    }

    #[test]
    fn blank_optional_fields_become_none() {
        let (name, email, phone, _) = CustomerForm {
            phone: "  ".to_string(),
            ..form(" 山田 花子 ", "")
        }
        .into_parts()
        .unwrap();
        assert_eq!(name, "山田 花子");
        assert!(email.is_none());
        assert!(phone.is_none());
    }

    #[test]
    fn email_is_validated_when_given() {
        assert!(form("山田", "not-an-email").into_parts().is_err());
        let (_, email, phone, _) = form("山田", "hanako@example.com").into_parts().unwrap();
        assert_eq!(email.unwrap().as_str(), "hanako@example.com");
        assert_eq!(phone.as_deref(), Some("090-1234-5678"));
    }
}
