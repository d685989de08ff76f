use crate::models::{OffPeakSlot, UtilizationGrid, DAY_NAMES};

const THEMES: [&str; 5] = [
    "Quiet hour special",
    "Early bird window",
    "Midweek refresh",
    "Walk-in happy hour",
    "Off-peak tune-up",
];

const PERKS: [&str; 6] = [
    "10% off any cut",
    "a free beard trim with any service",
    "double loyalty stamps",
    "a complimentary hot towel finish",
    "15% off for first-time visitors",
    "a bring-a-friend discount",
];

pub fn off_peak_slots(grid: &UtilizationGrid, top: usize) -> Vec<OffPeakSlot> {
    let mut slots = Vec::new();

    for day in 0..7 {
        for hour in 0..24 {
            let capacity = grid.capacity[day][hour];
            if capacity == 0 {
                continue;
            }
            let cell = grid.cells[day][hour];
            slots.push(OffPeakSlot {
                day,
                hour: hour as u32,
                utilization: cell.booked_minutes as f64 / capacity as f64,
                appts: cell.appts,
                promo: promo_line(day, hour as u32),
            });
        }
    }

    // Least-utilized first; among equals, prefer hours with some demand
    // history over hours that have never seen a booking.
    slots.sort_by(|a, b| {
        a.utilization
            .partial_cmp(&b.utilization)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.appts.cmp(&a.appts))
    });
    slots.truncate(top);
    slots
}

pub fn promo_line(day: usize, hour: u32) -> String {
    let theme = THEMES[(day * 24 + hour as usize) % THEMES.len()];
    let perk = PERKS[(day * 7 + hour as usize) % PERKS.len()];
    format!(
        "{}: book {} at {:02}:00 and get {}",
        theme, DAY_NAMES[day], hour, perk
    )
}
