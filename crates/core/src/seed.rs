//! Fixed sample dataset used by the reseed endpoint.

use crate::vehicle::VehicleInput;

fn entry(
    name: &str,
    status: &str,
    km: f64,
    oil_change_due: f64,
    safety_due: &str,
    drivers: &[&str],
    comment: &str,
) -> VehicleInput {
    VehicleInput {
        name: Some(name.to_string()),
        status: Some(status.to_string()),
        km: Some(km),
        oil_change_due: Some(oil_change_due),
        safety_due: Some(safety_due.to_string()),
        drivers: Some(drivers.iter().map(|d| d.to_string()).collect()),
        comment: Some(comment.to_string()),
    }
}

/// The sample fleet written by a reseed.
pub fn sample_fleet() -> Vec<VehicleInput> {
    vec![
        entry(
            "Bus 101",
            "on-road",
            125_000.0,
            130_000.0,
            "2024-12-31",
            &["John Smith"],
            "",
        ),
        entry(
            "Bus 102",
            "in-shop",
            98_500.0,
            100_000.0,
            "2024-11-15",
            &["Maria Garcia", "David Lee"],
            "Brake pads being replaced",
        ),
        entry(
            "Van 201",
            "on-road",
            45_200.0,
            50_000.0,
            "2025-02-28",
            &["Sarah Johnson"],
            "",
        ),
        entry(
            "Truck 301",
            "out-of-service",
            210_750.0,
            212_000.0,
            "2024-09-30",
            &["Michael Brown"],
            "Awaiting transmission parts",
        ),
        entry(
            "Van 202",
            "on-road",
            12_300.0,
            15_000.0,
            "2025-06-30",
            &["Emily Davis", "Robert Wilson"],
            "",
        ),
    ]
}
