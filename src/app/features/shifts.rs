//! Staff shifts per store. A shift repeats weekly on one day of the week.

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use time::{Date, Weekday};
use validator::Validate;

use crate::app::{
    db::{
        self,
        shifts::{NewShift, Shift},
        stores::Store,
    },
    domain::{
        local_time,
        shift_window::{self, format_clock, weekday_from_number, weekday_label},
        Permission, ShiftId, ShiftWindow, StoreId,
    },
    error::AppError,
    features::layout::{self, Flash},
    session::AuthenticatedSession,
    tenant::{self, TenantContext},
    views::{self, ViewKey},
    AppState,
};

const WEEK: [Weekday; 7] = [
    Weekday::Monday,
    Weekday::Tuesday,
    Weekday::Wednesday,
    Weekday::Thursday,
    Weekday::Friday,
    Weekday::Saturday,
    Weekday::Sunday,
];

/// Shifts of `store_id` working on `date`, by start time.
pub async fn shifts_on(
    state: &AppState,
    context: &TenantContext,
    store_id: &StoreId,
    date: Date,
) -> Result<Vec<Shift>, AppError> {
    Ok(db::shifts::list_on_date(&state.db, &context.organization_id, store_id, date).await?)
}

/// All shifts of `store_id`, grouped by day Monday to Sunday.
pub async fn shifts_for_week(
    state: &AppState,
    context: &TenantContext,
    store_id: &StoreId,
) -> Result<Vec<(Weekday, Vec<Shift>)>, AppError> {
    let shifts = db::shifts::list_for_store(&state.db, &context.organization_id, store_id).await?;
    Ok(group_by_weekday(shifts))
}

/// Group shifts by weekday. Every day appears, Monday first; order within a
/// day is preserved. Rows with an out-of-range day are dropped.
pub fn group_by_weekday(shifts: Vec<Shift>) -> Vec<(Weekday, Vec<Shift>)> {
    let mut week: Vec<(Weekday, Vec<Shift>)> = WEEK.iter().map(|d| (*d, Vec::new())).collect();
    for shift in shifts {
        match shift.weekday() {
            Some(day) => {
                let idx = (shift_window::weekday_number(day) - 1) as usize;
                week[idx].1.push(shift);
            }
            None => tracing::warn!(shift_id = %shift.id, day_of_week = shift.day_of_week, "shift with invalid day"),
        }
    }
    week
}

pub struct ShiftRow {
    pub id: String,
    pub staff_name: String,
    pub start: String,
    pub end: String,
}

impl From<Shift> for ShiftRow {
    fn from(shift: Shift) -> Self {
        Self {
            start: format_clock(shift.start_minute),
            end: format_clock(shift.end_minute),
            id: shift.id,
            staff_name: shift.staff_name,
        }
    }
}

pub struct DayColumn {
    pub label: &'static str,
    pub shifts: Vec<ShiftRow>,
}

pub struct StoreOption {
    pub id: String,
    pub name: String,
    pub selected: bool,
}

/// Store picker and the shifts working on the requested date. Rendered per
/// request, since the date is free input.
#[derive(Template)]
#[template(path = "shifts_day.html")]
pub struct ShiftsDayTemplate {
    pub stores: Vec<StoreOption>,
    pub store_id: String,
    pub date: String,
    pub day_label: &'static str,
    pub on_date: Vec<ShiftRow>,
}

/// Weekly roster of one store. Cached per store.
#[derive(Template)]
#[template(path = "shifts.html")]
pub struct ShiftsTemplate {
    pub store_id: String,
    pub week: Vec<DayColumn>,
    pub can_manage: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ShiftsQuery {
    pub store_id: Option<String>,
    pub date: Option<String>,
    #[serde(flatten)]
    pub flash: Flash,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ShiftForm {
    pub store_id: String,
    #[validate(length(min = 1, max = 50, message = "スタッフ名は1〜50文字で入力してください。"))]
    pub staff_name: String,
    pub day_of_week: String,
    pub start: String,
    pub end: String,
}

/// A shift as entered, before ids are assigned.
#[derive(Debug)]
pub struct ShiftInput {
    pub store_id: StoreId,
    pub staff_name: String,
    pub day: Weekday,
    pub window: ShiftWindow,
}

impl ShiftForm {
    pub fn parse(&self) -> Result<ShiftInput, String> {
        let staff_name = self.staff_name.trim().to_string();
        ShiftForm {
            staff_name: staff_name.clone(),
            ..self.clone()
        }
        .validate()
        .map_err(|errors| layout::first_message(&errors))?;

        let store_id = StoreId::from_string(&self.store_id).map_err(|_| "店舗を選択してください。".to_string())?;
        let day = self
            .day_of_week
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(weekday_from_number)
            .ok_or_else(|| "曜日を選択してください。".to_string())?;
        let window = ShiftWindow::parse(&self.start, &self.end)
            .map_err(|_| "勤務時間は開始が終了より前になるようHH:MMで入力してください。".to_string())?;

        Ok(ShiftInput {
            store_id,
            staff_name,
            day,
            window,
        })
    }
}

fn shifts_path(store_id: &str) -> String {
    if store_id.is_empty() {
        views::SHIFTS.to_string()
    } else {
        format!("{}?store_id={}", views::SHIFTS, urlencoding::encode(store_id))
    }
}

async fn render_day(
    state: &AppState,
    context: &TenantContext,
    stores: Vec<Store>,
    selected: Option<&StoreId>,
    date: Date,
) -> Result<String, AppError> {
    let on_date = match selected {
        Some(store_id) => shifts_on(state, context, store_id, date).await?,
        None => Vec::new(),
    };
    let selected_id = selected.map(StoreId::as_str).unwrap_or_default();

    let template = ShiftsDayTemplate {
        stores: stores
            .into_iter()
            .map(|s| StoreOption {
                selected: s.id == selected_id,
                id: s.id,
                name: s.name,
            })
            .collect(),
        store_id: selected_id,
        date: date.to_string(),
        day_label: weekday_label(date.weekday()),
        on_date: on_date.into_iter().map(ShiftRow::from).collect(),
    };
    layout::render(&template)
}

async fn render_roster(state: &AppState, context: &TenantContext, store_id: &StoreId) -> Result<String, AppError> {
    let week = shifts_for_week(state, context, store_id).await?;
    let template = ShiftsTemplate {
        store_id: store_id.as_str(),
        week: week
            .into_iter()
            .map(|(day, shifts)| DayColumn {
                label: weekday_label(day),
                shifts: shifts.into_iter().map(ShiftRow::from).collect(),
            })
            .collect(),
        can_manage: context.can(Permission::ManageStoreSettings),
    };
    layout::render(&template)
}

/// GET /dashboard/shifts?store_id=&date= — Shifts working on a date, and the
/// weekly roster of the selected store. Defaults to the first store and today.
pub async fn list(
    AuthenticatedSession(session): AuthenticatedSession,
    State(state): State<AppState>,
    Query(query): Query<ShiftsQuery>,
) -> Result<Response, AppError> {
    let context = match layout::page_context(&state, &session, Permission::ViewDashboard).await {
        Ok(context) => context,
        Err(response) => return Ok(response),
    };

    let date = match query.date.as_deref().and_then(layout::non_blank_str) {
        Some(raw) => match local_time::parse_iso_date(raw) {
            Ok(date) => date,
            Err(_) => {
                return Ok(layout::redirect_with_error(views::SHIFTS, "日付が正しくありません。").into_response())
            }
        },
        None => local_time::today(),
    };

    let stores = match db::stores::list_for_organization(&state.db, &context.organization_id).await {
        Ok(stores) => stores,
        Err(err) => {
            let body = layout::degraded_body(views::SHIFTS, &err.into());
            return Ok(layout::render_page(&context, "シフト", query.flash, body).into_response());
        }
    };
    let selected = match query.store_id.as_deref().and_then(layout::non_blank_str) {
        Some(raw) => {
            let store_id = StoreId::from_string(raw).map_err(|_| AppError::NotFound)?;
            if !stores.iter().any(|s| s.id == store_id.as_str()) {
                return Err(AppError::NotFound);
            }
            Some(store_id)
        }
        None => stores.first().and_then(|s| StoreId::from_string(&s.id).ok()),
    };

    let day = render_day(&state, &context, stores, selected.as_ref(), date)
        .await
        .unwrap_or_else(|err| layout::degraded_body(views::SHIFTS, &err));

    // Only the roster is cached, and only for stores of this tenant.
    let roster = match &selected {
        Some(store_id) => {
            let key = ViewKey::new(views::SHIFTS, context.organization_id.as_str(), context.role())
                .with_variant(store_id.as_str());
            state
                .views
                .get_or_render(key, || render_roster(&state, &context, store_id))
                .await
                .unwrap_or_else(|err| layout::degraded_body(views::SHIFTS, &err))
        }
        None => String::new(),
    };

    Ok(layout::render_page(&context, "シフト", query.flash, format!("{day}{roster}")).into_response())
}

/// POST /dashboard/shifts
pub async fn create(
    AuthenticatedSession(session): AuthenticatedSession,
    State(state): State<AppState>,
    Form(form): Form<ShiftForm>,
) -> Result<Redirect, AppError> {
    let back = shifts_path(form.store_id.trim());
    let input = match form.parse() {
        Ok(input) => input,
        Err(msg) => return Ok(layout::redirect_with_error(&back, &msg)),
    };

    let context = tenant::authorize(&state, &session, Permission::ManageStoreSettings).await?;

    if db::stores::find_in_organization(&state.db, &context.organization_id, &input.store_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound);
    }

    let shift = NewShift {
        id: ShiftId::new(),
        organization_id: context.organization_id.clone(),
        store_id: input.store_id,
        staff_name: input.staff_name,
        day: input.day,
        window: input.window,
    };
    db::shifts::insert(&state.db, &shift).await?;

    tracing::info!(
        organization_id = %context.organization_id,
        store_id = %shift.store_id,
        shift_id = %shift.id,
        "shift created"
    );
    state.views.revalidate_path(views::SHIFTS);

    Ok(layout::redirect_with_success(&back, "シフトを追加しました。"))
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteShiftForm {
    #[serde(default)]
    pub store_id: String,
}

/// POST /dashboard/shifts/{id}/delete
pub async fn delete(
    AuthenticatedSession(session): AuthenticatedSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<DeleteShiftForm>,
) -> Result<Redirect, AppError> {
    let shift_id = ShiftId::from_string(&id).map_err(|_| AppError::NotFound)?;

    let context = tenant::authorize(&state, &session, Permission::ManageStoreSettings).await?;

    let deleted = db::shifts::delete_in_organization(&state.db, &context.organization_id, &shift_id).await?;
    if !deleted {
        return Err(AppError::NotFound);
    }

    state.views.revalidate_path(views::SHIFTS);
    Ok(layout::redirect_with_success(&shifts_path(form.store_id.trim()), "シフトを削除しました。"))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(views::SHIFTS, get(list).post(create))
        .route("/dashboard/shifts/{id}/delete", post(delete))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shift(staff: &str, day: i64, start: i64) -> Shift {
        Shift {
            id: ShiftId::new().as_str(),
            organization_id: String::new(),
            store_id: String::new(),
            staff_name: staff.to_string(),
            day_of_week: day,
            start_minute: start,
            end_minute: start + 60,
            created_at: 0,
        }
    }

    #[test]
    fn groups_monday_to_sunday() {
        let week = group_by_weekday(vec![
            shift("佐藤", 1, 540),
            shift("鈴木", 1, 600),
            shift("高橋", 7, 600),
            shift("bad", 9, 600),
        ]);
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].0, Weekday::Monday);
        assert_eq!(week[6].0, Weekday::Sunday);
        let monday: Vec<&str> = week[0].1.iter().map(|s| s.staff_name.as_str()).collect();
        assert_eq!(monday, ["佐藤", "鈴木"]);
        assert_eq!(week[6].1.len(), 1);
        assert_eq!(week.iter().map(|(_, s)| s.len()).sum::<usize>(), 3);
    }

    #[test]
    fn shift_form_parses_day_and_window() {
        let store_id = StoreId::new();
        let form = ShiftForm {
            store_id: store_id.as_str(),
            staff_name: " 田中 ".to_string(),
            day_of_week: "3".to_string(),
            start: "10:00".to_string(),
            end: "18:30".to_string(),
        };
        let input = form.parse().unwrap();
        assert_eq!(input.store_id, store_id);
        assert_eq!(input.staff_name, "田中");
        assert_eq!(input.day, Weekday::Wednesday);
        assert_eq!(input.window.start_minute(), 600);
        assert_eq!(input.window.end_minute(), 1110);
    }

    #[test]
    fn shift_form_rejects_inverted_window_and_bad_day() {
        let base = || ShiftForm {
            store_id: StoreId::new().as_str(),
            staff_name: "田中".to_string(),
            day_of_week: "1".to_string(),
            start: "18:00".to_string(),
            end: "10:00".to_string(),
        };
        assert!(base().parse().is_err());
        assert!(ShiftForm {
            day_of_week: "8".to_string(),
            start: "09:00".to_string(),
            ..base()
        }
        .parse()
        .is_err());
    }

    #[test]
    fn redirect_keeps_selected_store() {
        assert_eq!(shifts_path(""), "/dashboard/shifts");
        assert_eq!(shifts_path("01ABC"), "/dashboard/shifts?store_id=01ABC");
    }
}
