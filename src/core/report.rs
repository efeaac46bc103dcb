//! Report formatting helpers.
//!
//! This module turns the structured results of the forecast and analytics
//! operations into short text fragments. All functions are framework-agnostic;
//! the bot layer arranges the fragments into Discord messages.

use crate::core::{
    analytics::{ProductPerformance, SlowMover},
    dates::format_sale_date,
    forecast::{Confidence, ProductForecast, SampledWindow},
    history::DayInYear,
    trends::{TrendBucket, TrendReport, YearOverYear},
};

/// An embed field: `(name, value, inline)`.
pub type Field = (String, String, bool);

/// Year-over-year rows shown in a trend report, most recent first.
const MAX_YEAR_OVER_YEAR_LINES: usize = 12;

/// Formats an amount with two decimals and the currency label, e.g. `12.50 KM`.
#[must_use]
pub fn format_money(amount: f64, currency: &str) -> String {
    format!("{amount:.2} {currency}")
}

/// Formats a quantity without decimals when it is whole, e.g. `12` or `2.5`.
#[must_use]
pub fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 && quantity.abs() < 1e15 {
        format!("{quantity:.0}")
    } else {
        format!("{quantity:.2}")
    }
}

/// Formats a percentage with an explicit sign, e.g. `+12.5%`.
#[must_use]
pub fn format_growth(percent: f64) -> String {
    if percent >= 0.0 {
        format!("+{percent:.1}%")
    } else {
        format!("{percent:.1}%")
    }
}

/// Confidence label with a traffic-light marker.
#[must_use]
pub const fn confidence_badge(confidence: Confidence) -> &'static str {
    match confidence {
        Confidence::High => "🟢 high",
        Confidence::Medium => "🟡 medium",
        Confidence::Low => "🔴 low",
    }
}

/// Generates a bar showing `value` relative to `max`, e.g. `████░░░░░░`.
///
/// Values at or below zero render as an empty bar; values above `max` as a
/// full one.
#[must_use]
pub fn format_bar(value: f64, max: f64, bar_length: Option<usize>) -> String {
    let length = bar_length.unwrap_or(10);
    let ratio = if max > 0.0 {
        (value / max).clamp(0.0, 1.0)
    } else {
        0.0
    };

    // ratio ∈ [0, 1] and length is small, so the product fits a usize
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let filled = (ratio * length as f64).round() as usize;
    let empty = length.saturating_sub(filled);

    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// One forecast as an embed field `(name, value)`.
#[must_use]
pub fn format_forecast_field(forecast: &ProductForecast, currency: &str) -> (String, String) {
    let name = format!(
        "{} · {} → order {}",
        forecast.product_code, forecast.product_name, forecast.suggested_order_quantity
    );

    let years = forecast
        .yearly_breakdown
        .iter()
        .map(|year| format!("{}: {}", year.year, format_quantity(year.quantity)))
        .collect::<Vec<_>>()
        .join(" | ");

    let value = format!(
        "{} · {:.2}/day · avg price {}\n{}",
        confidence_badge(forecast.confidence),
        forecast.avg_daily_quantity,
        format_money(forecast.avg_price, currency),
        years
    );

    (name, value)
}

/// One line per sampled window, e.g. `✅ 2024: 29.10.2024 – 07.11.2024`.
#[must_use]
pub fn format_window_lines(windows: &[SampledWindow]) -> String {
    windows
        .iter()
        .map(|sampled| {
            let marker = if sampled.has_data { "✅" } else { "▫️" };
            format!("{marker} {}", sampled.window)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A trend bucket line with a revenue bar scaled to `max_revenue`.
#[must_use]
pub fn format_trend_line(bucket: &TrendBucket, max_revenue: f64, currency: &str) -> String {
    format!(
        "`{:<10}` {} {}",
        bucket.period,
        format_bar(bucket.total_revenue, max_revenue, Some(12)),
        format_money(bucket.total_revenue, currency)
    )
}

/// Trend lines for the most recent `max_lines` buckets, with a note counting
/// the buckets left out.
#[must_use]
pub fn format_trend_lines(buckets: &[TrendBucket], currency: &str, max_lines: usize) -> String {
    let max_revenue = buckets
        .iter()
        .map(|bucket| bucket.total_revenue)
        .fold(0.0, f64::max);
    let skipped = buckets.len().saturating_sub(max_lines);
    let lines = buckets[skipped..]
        .iter()
        .map(|bucket| format_trend_line(bucket, max_revenue, currency))
        .collect::<Vec<_>>()
        .join("\n");

    if skipped > 0 {
        format!("… {skipped} earlier buckets\n{lines}")
    } else {
        lines
    }
}

/// One line per year-over-year change, most recent first, at most `max_lines`.
#[must_use]
pub fn format_year_over_year(changes: &[YearOverYear], max_lines: usize) -> String {
    changes
        .iter()
        .rev()
        .take(max_lines)
        .map(|change| {
            format!(
                "`{}` {} → {}: {}",
                change.period,
                change.previous_year,
                change.current_year,
                format_growth(change.growth_percent)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Summary, year-over-year and moving-average fields of a trend report.
/// The last two are present only when the report carries them.
#[must_use]
pub fn trend_report_fields(report: &TrendReport, currency: &str) -> Vec<Field> {
    let mut fields = vec![
        (
            "Total revenue".to_string(),
            format_money(report.summary.total_revenue, currency),
            true,
        ),
        (
            "Total quantity".to_string(),
            format_quantity(report.summary.total_quantity),
            true,
        ),
        (
            format!("Average per {} bucket", report.period),
            format_money(report.summary.avg_revenue_per_period, currency),
            true,
        ),
    ];

    if !report.year_over_year.is_empty() {
        fields.push((
            "Year over year".to_string(),
            truncate_text(
                &format_year_over_year(&report.year_over_year, MAX_YEAR_OVER_YEAR_LINES),
                1024,
            ),
            false,
        ));
    }

    if let Some(last) = report.moving_averages.last() {
        fields.push((
            "Moving averages".to_string(),
            format!(
                "7 days: {} · 30 days: {}",
                format_money(last.ma_7day, currency),
                format_money(last.ma_30day, currency)
            ),
            false,
        ));
    }

    fields
}

/// One year of a same-day comparison with a revenue bar.
#[must_use]
pub fn format_day_in_year_line(day: &DayInYear, max_revenue: f64, currency: &str) -> String {
    if day.sale_count == 0 {
        return format!("`{}` no sales", format_sale_date(day.date));
    }
    format!(
        "`{}` {} {} · {} pcs · {} sales · {}/sale",
        format_sale_date(day.date),
        format_bar(day.total_revenue, max_revenue, Some(10)),
        format_money(day.total_revenue, currency),
        format_quantity(day.total_quantity),
        day.sale_count,
        format_money(day.avg_per_sale, currency)
    )
}

/// A best-seller line, e.g. `A1 Apple — 40 pcs · 40.00 KM · 4 sales`.
#[must_use]
pub fn format_performance_line(rank: usize, product: &ProductPerformance, currency: &str) -> String {
    format!(
        "**{rank}.** `{}` {} — {} pcs · {} · {} sales · {:.1}/month",
        product.totals.product_code,
        product.totals.product_name,
        format_quantity(product.totals.total_quantity),
        format_money(product.totals.total_revenue, currency),
        product.totals.sale_count,
        product.avg_monthly_quantity
    )
}

/// A slow-mover line with its recommendation.
#[must_use]
pub fn format_slow_mover_line(mover: &SlowMover) -> String {
    format!(
        "`{}` {} — last sold {} ({} days ago) → **{}**",
        mover.performance.totals.product_code,
        mover.performance.totals.product_name,
        format_sale_date(mover.performance.totals.last_sale),
        mover.days_since_last_sale,
        mover.recommendation
    )
}

/// Truncates `text` to at most `max_chars` characters, marking the cut with `…`.
#[must_use]
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        aggregate::ProductTotals,
        analytics::Recommendation,
        forecast::YearBreakdown,
        trends::{MovingAveragePoint, TrendPeriod, TrendSummary},
        window::HistoricalWindow,
    };
    use crate::test_utils::date;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(12.5, "KM"), "12.50 KM");
        assert_eq!(format_money(0.0, "EUR"), "0.00 EUR");
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(12.0), "12");
        assert_eq!(format_quantity(2.5), "2.50");
        assert_eq!(format_quantity(-3.0), "-3");
    }

    #[test]
    fn test_format_growth() {
        assert_eq!(format_growth(12.345), "+12.3%");
        assert_eq!(format_growth(0.0), "+0.0%");
        assert_eq!(format_growth(-50.0), "-50.0%");
    }

    #[test]
    fn test_format_bar() {
        assert_eq!(format_bar(10.0, 10.0, Some(10)), "██████████");
        assert_eq!(format_bar(5.0, 10.0, Some(10)), "█████░░░░░");
        assert_eq!(format_bar(0.0, 10.0, Some(10)), "░░░░░░░░░░");
        assert_eq!(format_bar(-3.0, 10.0, Some(4)), "░░░░");
        assert_eq!(format_bar(30.0, 10.0, Some(4)), "████");
        assert_eq!(format_bar(1.0, 0.0, None), "░░░░░░░░░░");
    }

    #[test]
    fn test_format_forecast_field() {
        let forecast = ProductForecast {
            product_code: "A1".to_string(),
            product_name: "Apple".to_string(),
            avg_daily_quantity: 1.5,
            total_historical_quantity: 30.0,
            suggested_order_quantity: 15,
            years_analyzed: 2,
            historical_revenue: 300.0,
            avg_price: 10.0,
            confidence: Confidence::Medium,
            yearly_breakdown: vec![
                YearBreakdown {
                    year: 2024,
                    quantity: 20.0,
                    revenue: 200.0,
                },
                YearBreakdown {
                    year: 2023,
                    quantity: 10.0,
                    revenue: 100.0,
                },
            ],
        };

        let (name, value) = format_forecast_field(&forecast, "KM");
        assert_eq!(name, "A1 · Apple → order 15");
        assert_eq!(
            value,
            "🟡 medium · 1.50/day · avg price 10.00 KM\n2024: 20 | 2023: 10"
        );
    }

    #[test]
    fn test_format_window_lines() {
        let windows = vec![
            SampledWindow {
                window: HistoricalWindow {
                    start: date(2024, 10, 29),
                    end: date(2024, 11, 7),
                    year: 2024,
                },
                has_data: true,
            },
            SampledWindow {
                window: HistoricalWindow {
                    start: date(2023, 10, 29),
                    end: date(2023, 11, 7),
                    year: 2023,
                },
                has_data: false,
            },
        ];

        assert_eq!(
            format_window_lines(&windows),
            "✅ 2024: 29.10.2024 – 07.11.2024\n▫️ 2023: 29.10.2023 – 07.11.2023"
        );
    }

    #[test]
    fn test_format_slow_mover_line() {
        let mover = SlowMover {
            performance: ProductPerformance {
                totals: ProductTotals {
                    product_code: "B2".to_string(),
                    product_name: "Brandy".to_string(),
                    total_quantity: 3.0,
                    total_revenue: 300.0,
                    sale_count: 3,
                    avg_price: 100.0,
                    first_sale: date(2023, 4, 1),
                    last_sale: date(2023, 6, 1),
                },
                days_on_market: 62,
                avg_monthly_quantity: 1.45,
                velocity_score: 100.0,
            },
            days_since_last_sale: 200,
            recommendation: Recommendation::Discontinue,
        };

        assert_eq!(
            format_slow_mover_line(&mover),
            "`B2` Brandy — last sold 01.06.2023 (200 days ago) → **discontinue**"
        );
    }

    fn bucket(period: &str, revenue: f64) -> TrendBucket {
        TrendBucket {
            period: period.to_string(),
            total_revenue: revenue,
            total_quantity: 1.0,
            sale_count: 1,
            avg_price: revenue,
        }
    }

    fn change(period: &str, current_year: i32, growth: f64) -> YearOverYear {
        YearOverYear {
            period: period.to_string(),
            current_year,
            previous_year: current_year - 1,
            growth_percent: growth,
            current_revenue: 0.0,
            previous_revenue: 0.0,
        }
    }

    #[test]
    fn test_format_trend_lines_keeps_most_recent() {
        let buckets = vec![bucket("2024", 5.0), bucket("2025", 10.0), bucket("2026", 10.0)];

        let lines = format_trend_lines(&buckets, "KM", 2);
        assert_eq!(
            lines,
            "… 1 earlier buckets\n\
             `2025      ` ████████████ 10.00 KM\n\
             `2026      ` ████████████ 10.00 KM"
        );

        let all = format_trend_lines(&buckets, "KM", 30);
        assert_eq!(all.lines().count(), 3);
        assert!(all.starts_with("`2024      ` ██████░░░░░░ 5.00 KM"));
    }

    #[test]
    fn test_format_year_over_year() {
        let changes: Vec<YearOverYear> = (1..=14)
            .map(|i| change(&format!("2025-{i:02}"), 2025, f64::from(i)))
            .collect();

        let text = format_year_over_year(&changes, 12);
        assert_eq!(text.lines().count(), 12);
        assert_eq!(text.lines().next(), Some("`2025-14` 2024 → 2025: +14.0%"));
    }

    #[test]
    fn test_trend_report_fields() {
        let mut report = TrendReport {
            period: TrendPeriod::Monthly,
            buckets: vec![bucket("2025-01", 10.0)],
            year_over_year: Vec::new(),
            moving_averages: Vec::new(),
            summary: TrendSummary {
                total_revenue: 10.0,
                total_quantity: 1.0,
                avg_revenue_per_period: 10.0,
                periods_count: 1,
            },
        };

        let fields = trend_report_fields(&report, "KM");
        assert_eq!(fields.len(), 3);
        assert_eq!(
            fields[2],
            (
                "Average per monthly bucket".to_string(),
                "10.00 KM".to_string(),
                true
            )
        );

        report.year_over_year.push(change("2025-01", 2025, -20.0));
        report.moving_averages.push(MovingAveragePoint {
            date: date(2025, 1, 31),
            daily_revenue: 10.0,
            ma_7day: 7.0,
            ma_30day: 3.0,
        });
        let fields = trend_report_fields(&report, "KM");
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[3].1, "`2025-01` 2024 → 2025: -20.0%");
        assert_eq!(fields[4].1, "7 days: 7.00 KM · 30 days: 3.00 KM");
    }

    #[test]
    fn test_format_day_in_year_line() {
        let mut day = DayInYear {
            year: 2024,
            date: date(2024, 10, 29),
            total_revenue: 20.0,
            total_quantity: 6.0,
            sale_count: 2,
            avg_per_sale: 10.0,
        };
        assert_eq!(
            format_day_in_year_line(&day, 20.0, "KM"),
            "`29.10.2024` ██████████ 20.00 KM · 6 pcs · 2 sales · 10.00 KM/sale"
        );

        day.sale_count = 0;
        assert_eq!(format_day_in_year_line(&day, 20.0, "KM"), "`29.10.2024` no sales");
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("abcdefghij", 5), "abcd…");
    }
}
