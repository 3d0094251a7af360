use crate::errors::AppError;
use crate::models::{
    AppSettings, CountResponse, DailyPoint, HistoryQuery, NotificationKind,
    NotificationPreferences, NotificationUpdate, SettingKind, SettingUpdate, StatsResponse,
};
use crate::state::AppState;
use crate::stats::date_key;
use crate::store::CountSnapshot;
use crate::ui::render_index;
use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
    Json,
};

const DEFAULT_HISTORY_DAYS: usize = 7;
const MAX_HISTORY_DAYS: usize = 90;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let snapshot = state.store.snapshot().await;
    Html(render_index(
        &date_key(snapshot.date),
        snapshot.total,
        snapshot.today,
        &snapshot.statistics,
    ))
}

pub async fn get_count(State(state): State<AppState>) -> Json<CountResponse> {
    Json(to_count_response(state.store.snapshot().await))
}

pub async fn increment(State(state): State<AppState>) -> Json<CountResponse> {
    Json(to_count_response(state.store.increment_snapshot().await))
}

pub async fn reset(State(state): State<AppState>) -> Json<CountResponse> {
    Json(to_count_response(state.store.reset_snapshot().await))
}

pub async fn increment_form(State(state): State<AppState>) -> Redirect {
    state.store.increment().await;
    Redirect::to("/")
}

pub async fn reset_form(State(state): State<AppState>) -> Redirect {
    state.store.reset().await;
    Redirect::to("/")
}

pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let snapshot = state.store.snapshot().await;

    Json(StatsResponse {
        total: snapshot.total,
        today: snapshot.today,
        daily_average: snapshot.statistics.daily_average,
        weekly_average: snapshot.statistics.weekly_average,
        highest_day: snapshot.statistics.highest_day,
    })
}

pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<DailyPoint>>, AppError> {
    let days = query.days.unwrap_or(DEFAULT_HISTORY_DAYS);
    if !(1..=MAX_HISTORY_DAYS).contains(&days) {
        return Err(AppError::bad_request(format!(
            "days must be between 1 and {MAX_HISTORY_DAYS}"
        )));
    }

    Ok(Json(state.store.history(days).await))
}

pub async fn get_notifications(State(state): State<AppState>) -> Json<NotificationPreferences> {
    Json(state.store.notification_preferences().await)
}

pub async fn put_notification(
    State(state): State<AppState>,
    Json(payload): Json<NotificationUpdate>,
) -> Result<Json<NotificationPreferences>, AppError> {
    let kind: NotificationKind = payload.kind.parse().map_err(AppError::bad_request)?;
    state
        .store
        .set_notification_preference(kind, payload.enabled)
        .await;
    Ok(Json(state.store.notification_preferences().await))
}

pub async fn get_settings(State(state): State<AppState>) -> Json<AppSettings> {
    Json(state.store.settings().await)
}

pub async fn put_setting(
    State(state): State<AppState>,
    Json(payload): Json<SettingUpdate>,
) -> Result<Json<AppSettings>, AppError> {
    let kind: SettingKind = payload.setting.parse().map_err(AppError::bad_request)?;
    state.store.set_setting(kind, payload.enabled).await;
    Ok(Json(state.store.settings().await))
}

fn to_count_response(snapshot: CountSnapshot) -> CountResponse {
    CountResponse {
        date: date_key(snapshot.date),
        total: snapshot.total,
        today: snapshot.today,
        degraded: snapshot.degraded,
    }
}
