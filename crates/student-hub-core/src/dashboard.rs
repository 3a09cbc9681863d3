//! Read-only aggregates for the profile page, the dashboard and the admin overview.
//!
//! Every window (today, this week, this month, last 30 days) is computed in UTC from the `now`
//! passed in. Weeks start on Monday.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use crate::error::HubResult;
use crate::store::{ConsultationRecord, HubStore, User};

const PROFILE_RECENT_LIMIT: usize = 5;
const DASHBOARD_RECENT_LIMIT: usize = 3;
const ACTIVE_WINDOW_DAYS: i64 = 30;
const ACTIVITY_LABEL: &str = "Đã thực hiện tư vấn chọn ngành";

#[derive(Debug, Clone, Serialize)]
pub struct ProfileStatistics {
    pub total_consultations: u64,
    pub this_month_consultations: u64,
    pub average_confidence: f64,
    pub days_since_joining: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileSummary {
    pub user: User,
    pub statistics: ProfileStatistics,
    pub recent_consultations: Vec<ConsultationRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    pub total_consultations: u64,
    pub this_week_consultations: u64,
    pub average_confidence: f64,
    pub join_days: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentActivity {
    pub id: i64,
    pub activity: &'static str,
    pub description: String,
    pub time: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformStats {
    pub total_users: u64,
    pub total_consultations: u64,
    pub active_users_today: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub user_stats: UserStats,
    pub recent_activity: Vec<RecentActivity>,
    pub platform_stats: PlatformStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminOverview {
    pub total_consultations: u64,
    pub total_users: u64,
    pub this_week_consultations: u64,
    pub this_month_consultations: u64,
    pub active_users_30_days: u64,
    pub average_confidence: f64,
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    midnight(now.date_naive())
}

pub fn start_of_week(now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive();
    let back = i64::from(today.weekday().num_days_from_monday());
    midnight(today - Duration::days(back))
}

pub fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive();
    midnight(today.with_day(1).unwrap_or(today))
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Whole days between `then` and `now`, never negative.
fn whole_days(then: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - then).num_days().max(0)
}

/// Relative English phrase such as "3 hours ago".
pub fn time_ago(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - then).num_seconds();
    let (amount, suffix) = if secs >= 0 {
        (secs, "ago")
    } else {
        (-secs, "from now")
    };
    let (n, unit) = match amount {
        s if s < 60 => (s.max(1), "second"),
        s if s < 3_600 => (s / 60, "minute"),
        s if s < 86_400 => (s / 3_600, "hour"),
        s if s < 7 * 86_400 => (s / 86_400, "day"),
        s if s < 30 * 86_400 => (s / (7 * 86_400), "week"),
        s if s < 365 * 86_400 => (s / (30 * 86_400), "month"),
        s => (s / (365 * 86_400), "year"),
    };
    let plural = if n == 1 { "" } else { "s" };
    format!("{n} {unit}{plural} {suffix}")
}

/// "Sở thích: a, b" from the stored survey input; "..." marks more than two interests.
pub fn interest_summary(input_data: &serde_json::Value) -> String {
    let interests: Vec<&str> = input_data
        .get("interests")
        .and_then(serde_json::Value::as_array)
        .map(|items| items.iter().filter_map(serde_json::Value::as_str).collect())
        .unwrap_or_default();
    let shown = interests.iter().take(2).copied().collect::<Vec<_>>().join(", ");
    let more = if interests.len() > 2 { "..." } else { "" };
    format!("Sở thích: {shown}{more}")
}

pub fn profile_summary(store: &HubStore, user: User, now: DateTime<Utc>) -> HubResult<ProfileSummary> {
    let statistics = ProfileStatistics {
        total_consultations: store.count_consultations_for_user(user.id, None)?,
        this_month_consultations: store
            .count_consultations_for_user(user.id, Some(start_of_month(now)))?,
        average_confidence: round_to(
            store.average_confidence_for_user(user.id)?.unwrap_or(0.0),
            1,
        ),
        days_since_joining: whole_days(user.created_at, now),
    };
    let recent_consultations = store.recent_consultations_for_user(user.id, PROFILE_RECENT_LIMIT)?;
    Ok(ProfileSummary {
        user,
        statistics,
        recent_consultations,
    })
}

pub fn platform_stats(store: &HubStore, now: DateTime<Utc>) -> HubResult<PlatformStats> {
    Ok(PlatformStats {
        total_users: store.count_users()?,
        total_consultations: store.count_consultations(None)?,
        active_users_today: store.count_active_users(start_of_day(now))?,
    })
}

pub fn dashboard_summary(store: &HubStore, user: &User, now: DateTime<Utc>) -> HubResult<DashboardSummary> {
    let user_stats = UserStats {
        total_consultations: store.count_consultations_for_user(user.id, None)?,
        this_week_consultations: store
            .count_consultations_for_user(user.id, Some(start_of_week(now)))?,
        average_confidence: round_to(
            store.average_confidence_for_user(user.id)?.unwrap_or(0.0),
            1,
        ),
        join_days: whole_days(user.created_at, now),
    };
    let recent_activity = store
        .recent_consultations_for_user(user.id, DASHBOARD_RECENT_LIMIT)?
        .into_iter()
        .map(|record| RecentActivity {
            id: record.id,
            activity: ACTIVITY_LABEL,
            description: interest_summary(&record.input_data),
            time: time_ago(record.created_at, now),
            created_at: record.created_at,
        })
        .collect();
    Ok(DashboardSummary {
        user_stats,
        recent_activity,
        platform_stats: platform_stats(store, now)?,
    })
}

pub fn admin_overview(store: &HubStore, now: DateTime<Utc>) -> HubResult<AdminOverview> {
    Ok(AdminOverview {
        total_consultations: store.count_consultations(None)?,
        total_users: store.count_users()?,
        this_week_consultations: store.count_consultations(Some(start_of_week(now)))?,
        this_month_consultations: store.count_consultations(Some(start_of_month(now)))?,
        active_users_30_days: store
            .count_active_users(now - Duration::days(ACTIVE_WINDOW_DAYS))?,
        average_confidence: round_to(store.average_confidence()?.unwrap_or(0.0), 2),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NewConsultation;
    use serde_json::json;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn draft(user_id: i64, confidence: f64) -> NewConsultation {
        NewConsultation {
            user_id,
            input_data: json!({"interests": ["Lập trình", "Toán học", "Âm nhạc"]}),
            ai_result: "reply".to_string(),
            recommended_majors: Vec::new(),
            study_suggestions: Vec::new(),
            confidence_score: confidence,
            session_id: "s".to_string(),
        }
    }

    #[test]
    fn week_starts_on_monday() {
        // 2025-08-14 is a Thursday.
        assert_eq!(start_of_week(at("2025-08-14T15:30:00Z")), at("2025-08-11T00:00:00Z"));
        assert_eq!(start_of_week(at("2025-08-11T00:00:00Z")), at("2025-08-11T00:00:00Z"));
        assert_eq!(start_of_week(at("2025-08-17T23:59:59Z")), at("2025-08-11T00:00:00Z"));
        assert_eq!(start_of_month(at("2025-08-14T15:30:00Z")), at("2025-08-01T00:00:00Z"));
        assert_eq!(start_of_day(at("2025-08-14T15:30:00Z")), at("2025-08-14T00:00:00Z"));
    }

    #[test]
    fn time_ago_picks_the_largest_unit() {
        let now = at("2025-08-14T12:00:00Z");
        assert_eq!(time_ago(now, now), "1 second ago");
        assert_eq!(time_ago(at("2025-08-14T11:59:15Z"), now), "45 seconds ago");
        assert_eq!(time_ago(at("2025-08-14T11:00:00Z"), now), "1 hour ago");
        assert_eq!(time_ago(at("2025-08-12T12:00:00Z"), now), "2 days ago");
        assert_eq!(time_ago(at("2025-07-31T12:00:00Z"), now), "2 weeks ago");
        assert_eq!(time_ago(at("2024-08-14T12:00:00Z"), now), "1 year ago");
    }

    #[test]
    fn interest_summary_truncates_after_two() {
        assert_eq!(
            interest_summary(&json!({"interests": ["a", "b", "c"]})),
            "Sở thích: a, b..."
        );
        assert_eq!(interest_summary(&json!({"interests": ["a", "b"]})), "Sở thích: a, b");
        assert_eq!(interest_summary(&json!({})), "Sở thích: ");
    }

    #[test]
    fn dashboard_counts_respect_windows() {
        let dir = tempfile::tempdir().unwrap();
        let store = HubStore::new(dir.path().join("dash.sqlite")).unwrap();
        let user = store.create_user("An", "an@x.com", "h", false).unwrap();
        let other = store.create_user("Bình", "binh@x.com", "h", false).unwrap();
        let now = at("2025-08-14T12:00:00Z");

        store.insert_consultation(&draft(user.id, 0.9), now - Duration::minutes(5)).unwrap();
        store.insert_consultation(&draft(user.id, 0.7), now - Duration::days(40)).unwrap();
        store.insert_consultation(&draft(other.id, 0.8), now - Duration::days(40)).unwrap();

        let summary = dashboard_summary(&store, &user, now).unwrap();
        assert_eq!(summary.user_stats.total_consultations, 2);
        assert_eq!(summary.user_stats.this_week_consultations, 1);
        assert_eq!(summary.user_stats.average_confidence, 0.8);
        assert_eq!(summary.recent_activity.len(), 2);
        assert_eq!(summary.recent_activity[0].description, "Sở thích: Lập trình, Toán học...");
        assert_eq!(summary.recent_activity[0].time, "5 minutes ago");
        assert_eq!(summary.platform_stats.total_users, 2);
        assert_eq!(summary.platform_stats.total_consultations, 3);
        assert_eq!(summary.platform_stats.active_users_today, 1);

        let overview = admin_overview(&store, now).unwrap();
        assert_eq!(overview.total_consultations, 3);
        assert_eq!(overview.active_users_30_days, 1);
        assert_eq!(overview.average_confidence, 0.8);
    }

    #[test]
    fn profile_without_history_reports_zeroes() {
        let dir = tempfile::tempdir().unwrap();
        let store = HubStore::new(dir.path().join("profile.sqlite")).unwrap();
        let user = store.create_user("An", "an@x.com", "h", false).unwrap();
        let summary = profile_summary(&store, user, Utc::now()).unwrap();
        assert_eq!(summary.statistics.total_consultations, 0);
        assert_eq!(summary.statistics.average_confidence, 0.0);
        assert_eq!(summary.statistics.days_since_joining, 0);
        assert!(summary.recent_consultations.is_empty());
    }
}
