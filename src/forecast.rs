use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};

use crate::models::Appointment;

/// Triple exponential smoothing over an hourly series, additive variant.
/// Returns one-step-ahead fitted values aligned with the input, or an empty
/// vector when the series is shorter than one season. Coefficients are taken
/// as given; values outside [0, 1] and NaN inputs propagate unchecked.
pub fn holt_winters(
    series: &[f64],
    alpha: f64,
    beta: f64,
    gamma: f64,
    season_length: usize,
) -> Vec<f64> {
    assert!(season_length > 0, "season_length must be positive");

    let n = series.len();
    let m = season_length;
    if n < m {
        return Vec::new();
    }

    let level0 = series[..m].iter().sum::<f64>() / m as f64;
    let trend0 = if n >= 2 * m {
        (0..m)
            .map(|i| (series[m + i] - series[i]) / m as f64)
            .sum::<f64>()
            / m as f64
    } else {
        0.0
    };

    let mut seasonal = vec![0.0; n];
    for i in 0..m {
        seasonal[i] = series[i] - level0;
    }

    let mut level = vec![0.0; n];
    let mut trend = vec![0.0; n];
    let mut forecast = vec![0.0; n];

    for i in 0..m {
        level[i] = level0;
        trend[i] = trend0;
        forecast[i] = level0 + seasonal[i];
    }

    for t in m..n {
        let s_prev = seasonal[t - m];
        let l = alpha * (series[t] - s_prev) + (1.0 - alpha) * (level[t - 1] + trend[t - 1]);
        let b = beta * (l - level[t - 1]) + (1.0 - beta) * trend[t - 1];
        level[t] = l;
        trend[t] = b;
        seasonal[t] = gamma * (series[t] - l) + (1.0 - gamma) * s_prev;
        forecast[t] = level[t - 1] + trend[t - 1] + s_prev;
    }

    forecast
}

/// Counts appointment starts per calendar hour over a contiguous window
/// beginning at `from` (expected to sit on an hour boundary).
pub fn hourly_series(appointments: &[Appointment], from: NaiveDateTime, hours: usize) -> Vec<f64> {
    let mut counts = vec![0.0; hours];

    for appt in appointments {
        let offset = appt.starts_at.signed_duration_since(from);
        if offset < Duration::zero() {
            continue;
        }
        let index = (offset.num_minutes() / 60) as usize;
        if index < hours {
            counts[index] += 1.0;
        }
    }

    counts
}

pub fn cutoff_date(since_days: i64) -> NaiveDate {
    Utc::now().date_naive() - Duration::days(since_days.max(1))
}
