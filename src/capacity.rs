use chrono::{Datelike, Duration, NaiveDateTime, Timelike};

use crate::config::{ShopConfig, StatusBucket};
use crate::models::{Appointment, DaySummary, UtilizationCell, UtilizationGrid, UtilizationTotals};

pub fn bin_appointments(appointments: &[Appointment], config: &ShopConfig) -> UtilizationGrid {
    let mut cells = [[UtilizationCell::default(); 24]; 7];
    let mut capacity = [[0i64; 24]; 7];

    for (day, hours) in config.week.iter().enumerate() {
        if !hours.enabled {
            continue;
        }
        for hour in hours.open_hour()..hours.close_hour().min(24) {
            capacity[day][hour as usize] = i64::from(config.chairs) * 60;
        }
    }

    let mut totals = UtilizationTotals::default();

    for appt in appointments {
        if appt.duration_minutes <= 0 {
            continue;
        }

        let bucket = config.classify_status(&appt.status);
        totals.appointments += 1;
        match bucket {
            StatusBucket::Kept => totals.kept += 1,
            StatusBucket::NoShow => totals.noshow += 1,
            StatusBucket::Cancelled => totals.cancelled += 1,
            StatusBucket::Unclassified => {}
        }

        // Walk the span in calendar-hour segments; minutes are clipped to the
        // hour boundary and to the appointment's end, so the split is exact.
        let end = appt.starts_at + Duration::minutes(appt.duration_minutes);
        let mut cursor = appt.starts_at;
        while cursor < end {
            let segment_end = end.min(hour_floor(cursor) + Duration::hours(1));
            let minutes = segment_end.signed_duration_since(cursor).num_minutes();
            let day = cursor.weekday().num_days_from_sunday() as usize;
            let cell = &mut cells[day][cursor.hour() as usize];

            cell.appts += 1;
            match bucket {
                StatusBucket::Kept => {
                    cell.kept += 1;
                    cell.booked_minutes += minutes;
                }
                StatusBucket::NoShow => {
                    cell.noshow += 1;
                    cell.noshow_minutes += minutes;
                }
                StatusBucket::Cancelled => {
                    cell.cancelled += 1;
                    cell.cancel_minutes += minutes;
                }
                StatusBucket::Unclassified => {}
            }

            cursor = segment_end;
        }
    }

    for day in 0..7 {
        for hour in 0..24 {
            let cell = cells[day][hour];
            totals.booked_minutes += cell.booked_minutes;
            totals.noshow_minutes += cell.noshow_minutes;
            totals.cancel_minutes += cell.cancel_minutes;
            totals.capacity_minutes += capacity[day][hour];
        }
    }

    totals.utilization = ratio(totals.booked_minutes as f64, totals.capacity_minutes as f64);
    totals.noshow_rate = ratio(totals.noshow as f64, totals.appointments as f64);

    UtilizationGrid {
        cells,
        capacity,
        totals,
    }
}

pub fn day_summaries(grid: &UtilizationGrid) -> Vec<DaySummary> {
    (0..7)
        .map(|day| {
            let mut booked_minutes = 0i64;
            let mut capacity_minutes = 0i64;
            let mut appts = 0usize;
            let mut noshow = 0usize;

            for hour in 0..24 {
                let cell = grid.cells[day][hour];
                booked_minutes += cell.booked_minutes;
                appts += cell.appts;
                noshow += cell.noshow;
                capacity_minutes += grid.capacity[day][hour];
            }

            DaySummary {
                day,
                booked_minutes,
                capacity_minutes,
                utilization: ratio(booked_minutes as f64, capacity_minutes as f64),
                appts,
                noshow,
                noshow_rate: ratio(noshow as f64, appts as f64),
            }
        })
        .collect()
}

fn hour_floor(t: NaiveDateTime) -> NaiveDateTime {
    t - Duration::minutes(i64::from(t.minute())) - Duration::seconds(i64::from(t.second()))
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DayHours;
    use chrono::NaiveDate;
    use uuid::Uuid;

    // 2026-03-02 is a Monday.
    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn monday_shop() -> ShopConfig {
        let closed = DayHours {
            opens: "00:00".to_string(),
            closes: "00:00".to_string(),
            enabled: false,
        };
        let mut config = ShopConfig {
            chairs: 2,
            week: [
                closed.clone(),
                DayHours {
                    opens: "10:00".to_string(),
                    closes: "19:00".to_string(),
                    enabled: true,
                },
                closed.clone(),
                closed.clone(),
                closed.clone(),
                closed.clone(),
                closed,
            ],
            ..ShopConfig::default()
        };
        config.kept_statuses = vec!["completed".to_string()];
        config
    }

    fn appointment(hour: u32, minute: u32, duration_minutes: i64, status: &str) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            staff: "Rae".to_string(),
            service: "Fade".to_string(),
            status: status.to_string(),
            starts_at: monday().and_hms_opt(hour, minute, 0).unwrap(),
            duration_minutes,
        }
    }

    #[test]
    fn closed_hours_have_zero_capacity() {
        let grid = bin_appointments(&[], &monday_shop());

        for hour in 0..24 {
            assert_eq!(grid.capacity[0][hour], 0);
            let expected = if (10..19).contains(&hour) { 120 } else { 0 };
            assert_eq!(grid.capacity[1][hour], expected);
        }
        assert_eq!(grid.totals.capacity_minutes, 9 * 120);
    }

    #[test]
    fn single_hour_appointment_lands_in_one_cell() {
        let grid = bin_appointments(&[appointment(10, 0, 45, "completed")], &monday_shop());

        assert_eq!(grid.cells[1][10].booked_minutes, 45);
        assert_eq!(grid.cells[1][10].appts, 1);
        assert_eq!(grid.cells[1][11].booked_minutes, 0);
        assert_eq!(grid.totals.booked_minutes, 45);
    }

    #[test]
    fn appointment_splits_at_the_hour_boundary() {
        let grid = bin_appointments(&[appointment(10, 40, 40, "completed")], &monday_shop());

        assert_eq!(grid.cells[1][10].booked_minutes, 20);
        assert_eq!(grid.cells[1][11].booked_minutes, 20);
        assert_eq!(grid.cells[1][10].appts, 1);
        assert_eq!(grid.cells[1][11].appts, 1);
        assert_eq!(grid.totals.appointments, 1);
    }

    #[test]
    fn cell_counts_overlap_per_hour_but_totals_count_once() {
        let grid = bin_appointments(&[appointment(10, 30, 180, "completed")], &monday_shop());

        let cell_appts: usize = (0..24).map(|hour| grid.cells[1][hour].appts).sum();
        assert_eq!(cell_appts, 4);
        assert_eq!(grid.totals.appointments, 1);
        assert_eq!(grid.totals.booked_minutes, 180);
    }

    #[test]
    fn statuses_route_minutes_to_disjoint_buckets() {
        let appointments = vec![
            appointment(10, 0, 30, "completed"),
            appointment(11, 0, 30, "no-show"),
            appointment(12, 0, 30, "cancelled"),
            appointment(13, 0, 30, "pending"),
        ];
        let grid = bin_appointments(&appointments, &monday_shop());

        assert_eq!(grid.cells[1][10].booked_minutes, 30);
        assert_eq!(grid.cells[1][11].noshow_minutes, 30);
        assert_eq!(grid.cells[1][12].cancel_minutes, 30);

        let unclassified = grid.cells[1][13];
        assert_eq!(unclassified.appts, 1);
        assert_eq!(
            unclassified.booked_minutes + unclassified.noshow_minutes + unclassified.cancel_minutes,
            0
        );
        assert_eq!(grid.totals.appointments, 4);
        assert_eq!(grid.totals.kept, 1);
        assert_eq!(grid.totals.noshow, 1);
        assert_eq!(grid.totals.cancelled, 1);
    }

    #[test]
    fn non_positive_durations_are_skipped() {
        let appointments = vec![
            appointment(10, 0, 0, "completed"),
            appointment(10, 0, -15, "completed"),
        ];
        let grid = bin_appointments(&appointments, &monday_shop());

        assert_eq!(grid.totals.appointments, 0);
        assert_eq!(grid.totals.booked_minutes, 0);
        let cell_appts: usize = (0..24).map(|hour| grid.cells[1][hour].appts).sum();
        assert_eq!(cell_appts, 0);
    }

    #[test]
    fn monday_afternoon_scenario() {
        let grid = bin_appointments(&[appointment(14, 30, 60, "completed")], &monday_shop());

        assert_eq!(grid.cells[1][14].booked_minutes, 30);
        assert_eq!(grid.cells[1][15].booked_minutes, 30);
        assert_eq!(grid.capacity[1][14], 120);
        let expected = 60.0 / (9.0 * 120.0);
        assert!((grid.totals.utilization - expected).abs() < 1e-9);
    }

    #[test]
    fn empty_input_produces_zero_rates() {
        let grid = bin_appointments(&[], &monday_shop());

        assert_eq!(grid.totals.utilization, 0.0);
        assert_eq!(grid.totals.noshow_rate, 0.0);
        assert!(grid.totals.utilization.is_finite());
    }

    #[test]
    fn bookings_outside_open_hours_still_accumulate_minutes() {
        // The grid records demand wherever it lands; capacity stays 0.
        let grid = bin_appointments(&[appointment(7, 0, 30, "completed")], &monday_shop());

        assert_eq!(grid.cells[1][7].booked_minutes, 30);
        assert_eq!(grid.capacity[1][7], 0);
    }

    #[test]
    fn day_summaries_roll_up_the_grid() {
        let appointments = vec![
            appointment(10, 0, 60, "completed"),
            appointment(11, 0, 60, "no-show"),
        ];
        let grid = bin_appointments(&appointments, &monday_shop());
        let summaries = day_summaries(&grid);

        assert_eq!(summaries.len(), 7);
        let monday = &summaries[1];
        assert_eq!(monday.booked_minutes, 60);
        assert_eq!(monday.capacity_minutes, 9 * 120);
        assert!((monday.utilization - 60.0 / 1080.0).abs() < 1e-9);
        assert_eq!(monday.appts, 2);
        assert_eq!(monday.noshow, 1);
        assert!((monday.noshow_rate - 0.5).abs() < 1e-9);

        let sunday = &summaries[0];
        assert_eq!(sunday.capacity_minutes, 0);
        assert_eq!(sunday.utilization, 0.0);
    }
}
