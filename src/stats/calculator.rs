//! Statistics calculation logic
//!
//! Monthly grouping, derived overdue detection and the dashboard and
//! performance aggregates. All functions are pure; day arithmetic is the
//! naive difference of UTC timestamps, with no timezone normalization.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};

use crate::models::{IncomingMail, MailStatus, OutgoingMail};

use super::{BarChartRow, DashboardSummary, MailStats, PerformanceReport, MONTH_NAMES};

/// Days after which unanswered incoming mail counts as late
pub const OVERDUE_AFTER_DAYS: i64 = 7;

/// Default response time charged to unanswered mail, in days
const DEFAULT_RESPONSE_DAYS: f64 = 3.0;

/// Group both collections by (year, month)
///
/// Incoming mail feeds the per-type histogram; outgoing mail only counts.
/// Entries are sorted ascending by year, then month index.
pub fn compute_monthly_stats(
    incoming: &[IncomingMail],
    outgoing: &[OutgoingMail],
) -> Vec<MailStats> {
    let mut groups: HashMap<(i32, u32), MailStats> = HashMap::new();

    for mail in incoming {
        let (year, month0) = (mail.date.year(), mail.date.month0());
        let entry = groups
            .entry((year, month0))
            .or_insert_with(|| MailStats::new(MONTH_NAMES[month0 as usize], year));
        entry.incoming_count += 1;
        *entry.by_type.entry(mail.mail_type).or_insert(0) += 1;
    }

    for mail in outgoing {
        let (year, month0) = (mail.date.year(), mail.date.month0());
        let entry = groups
            .entry((year, month0))
            .or_insert_with(|| MailStats::new(MONTH_NAMES[month0 as usize], year));
        entry.outgoing_count += 1;
    }

    let mut stats: Vec<(u32, MailStats)> =
        groups.into_iter().map(|((_, m0), stat)| (m0, stat)).collect();
    stats.sort_by_key(|(month0, stat)| (stat.year, *month0));
    stats.into_iter().map(|(_, stat)| stat).collect()
}

/// Chart rows labelled "<Mois> <année>"
pub fn prepare_bar_chart_data(stats: &[MailStats]) -> Vec<BarChartRow> {
    stats
        .iter()
        .map(|stat| BarChartRow {
            name: format!("{} {}", stat.month, stat.year),
            incoming: stat.incoming_count,
            outgoing: stat.outgoing_count,
        })
        .collect()
}

/// Incoming mail that is late by day count
///
/// A record is late when it is neither completed nor already marked
/// overdue and was registered more than [`OVERDUE_AFTER_DAYS`] ago. This is
/// deliberately independent of the stored status field: the two notions of
/// lateness coexist without reconciliation.
pub fn collect_overdue(incoming: &[IncomingMail], now: DateTime<Utc>) -> Vec<IncomingMail> {
    incoming
        .iter()
        .filter(|mail| {
            if mail.status == MailStatus::Completed || mail.status == MailStatus::Overdue {
                return false;
            }
            (now - mail.date).num_days() > OVERDUE_AFTER_DAYS
        })
        .cloned()
        .collect()
}

/// Aggregates for the landing dashboard
pub fn dashboard_summary(
    incoming: &[IncomingMail],
    outgoing: &[OutgoingMail],
    now: DateTime<Utc>,
) -> DashboardSummary {
    let pending = incoming
        .iter()
        .filter(|m| m.status == MailStatus::Pending || m.status == MailStatus::Processing)
        .count() as u32;
    let processed = incoming
        .iter()
        .filter(|m| m.status == MailStatus::Completed)
        .count() as u32;
    let pending_outgoing = outgoing
        .iter()
        .filter(|m| m.status == MailStatus::Pending || m.status == MailStatus::Processing)
        .count() as u32;

    DashboardSummary {
        total_incoming: incoming.len() as u32,
        total_outgoing: outgoing.len() as u32,
        pending,
        processed,
        pending_outgoing,
        recent_incoming: incoming.iter().take(5).cloned().collect(),
        recent_outgoing: outgoing.iter().take(5).cloned().collect(),
        overdue_mails: collect_overdue(incoming, now),
    }
}

/// Performance indicators for the statistics page
pub fn performance_report(
    incoming: &[IncomingMail],
    outgoing: &[OutgoingMail],
    now: DateTime<Utc>,
) -> PerformanceReport {
    let total = incoming.len() + outgoing.len();

    let (this_year, this_month) = (now.year(), now.month());
    let (last_year, last_month) = if this_month == 1 {
        (this_year - 1, 12)
    } else {
        (this_year, this_month - 1)
    };

    let count_in_month = |year: i32, month: u32| -> u32 {
        let inc = incoming
            .iter()
            .filter(|m| m.date.year() == year && m.date.month() == month)
            .count();
        let out = outgoing
            .iter()
            .filter(|m| m.date.year() == year && m.date.month() == month)
            .count();
        (inc + out) as u32
    };

    let this_month_count = count_in_month(this_year, this_month);
    let last_month_count = count_in_month(last_year, last_month);

    let monthly_growth = if last_month_count > 0 {
        ((this_month_count as f64 - last_month_count as f64) / last_month_count as f64 * 100.0)
            .round() as i64
    } else {
        0
    };

    let average_response_days = if incoming.is_empty() {
        DEFAULT_RESPONSE_DAYS as i64
    } else {
        let total_days: f64 = incoming
            .iter()
            .map(|mail| match mail.response_date {
                Some(response) => {
                    (response - mail.date).num_milliseconds() as f64 / 86_400_000.0
                }
                None => DEFAULT_RESPONSE_DAYS,
            })
            .sum();
        (total_days / incoming.len() as f64).round() as i64
    };

    let efficiency_rate =
        (this_month_count as f64 / total.max(1) as f64 * 100.0).round() as i64;

    PerformanceReport {
        average_response_days,
        efficiency_rate,
        monthly_growth,
        this_month_count,
        last_month_count,
        answered_count: incoming.iter().filter(|m| m.response_date.is_some()).count() as u32,
    }
}
