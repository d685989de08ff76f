use std::fmt::Write;

use chrono::NaiveDate;

use crate::capacity;
use crate::config::ShopConfig;
use crate::models::{Appointment, DAY_NAMES};
use crate::promo;

pub fn build_report(
    scope: Option<&str>,
    cutoff: NaiveDate,
    appointments: &[Appointment],
    config: &ShopConfig,
    top: usize,
    projected: &[(u32, f64)],
) -> String {
    let grid = capacity::bin_appointments(appointments, config);
    let summaries = capacity::day_summaries(&grid);
    let slots = promo::off_peak_slots(&grid, top);
    let totals = &grid.totals;

    let mut output = String::new();
    let scope_label = scope.unwrap_or("all staff and services");

    let _ = writeln!(output, "# Slot Utilization Report");
    let _ = writeln!(
        output,
        "Generated for {} (appointments since {})",
        scope_label, cutoff
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Key Metrics");

    if totals.appointments == 0 {
        let _ = writeln!(output, "No appointments recorded for this window.");
    } else {
        let _ = writeln!(
            output,
            "- Chair utilization: {:.1}% ({} of {} chair-minutes booked)",
            totals.utilization * 100.0,
            totals.booked_minutes,
            totals.capacity_minutes
        );
        let _ = writeln!(
            output,
            "- Appointments: {} ({} kept, {} no-show, {} cancelled)",
            totals.appointments, totals.kept, totals.noshow, totals.cancelled
        );
        let _ = writeln!(
            output,
            "- No-show rate: {:.1}%",
            totals.noshow_rate * 100.0
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Daily Utilization");

    let mut open_days = 0;
    for summary in summaries.iter() {
        if summary.capacity_minutes == 0 {
            continue;
        }
        open_days += 1;
        let _ = writeln!(
            output,
            "- {}: {:.1}% booked, {} appointment-hours, {} no-shows",
            DAY_NAMES[summary.day],
            summary.utilization * 100.0,
            summary.appts,
            summary.noshow
        );
    }
    if open_days == 0 {
        let _ = writeln!(output, "No open hours configured.");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Off-Peak Windows");

    if slots.is_empty() {
        let _ = writeln!(output, "No open hours to recommend.");
    } else {
        for slot in slots.iter() {
            let _ = writeln!(
                output,
                "- {} {:02}:00 ({:.1}% booked, {} appointment-hours): {}",
                DAY_NAMES[slot.day],
                slot.hour,
                slot.utilization * 100.0,
                slot.appts,
                slot.promo
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Projected Busy Hours");

    if projected.is_empty() {
        let _ = writeln!(output, "Not enough history to project busy hours.");
    } else {
        for (hour, expected) in projected.iter() {
            let _ = writeln!(
                output,
                "- {:02}:00 expected {:.1} visits",
                hour,
                expected.max(0.0)
            );
        }
    }

    output
}
