use once_cell::sync::Lazy;
use prometheus::{register_int_counter, Encoder, IntCounter, TextEncoder};

// Prometheus metrics (default registry)
pub static CONFIGURATION_WRITES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "catering_configuration_writes_total",
        "Total persisted service configuration changes"
    )
    .expect("register configuration_writes_total")
});

pub static CONFIGURATION_VERSION_BUMPS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "catering_configuration_version_bumps_total",
        "Total structural changes that advanced a configuration version"
    )
    .expect("register configuration_version_bumps_total")
});

pub static SELECTION_WRITES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "catering_selection_writes_total",
        "Total selection saves and single option updates"
    )
    .expect("register selection_writes_total")
});

pub static SELECTION_DEFAULTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "catering_selection_defaults_total",
        "Total default selections synthesized on read"
    )
    .expect("register selection_defaults_total")
});

pub static SELECTION_MIGRATIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "catering_selection_migrations_total",
        "Total selections migrated to a new configuration version"
    )
    .expect("register selection_migrations_total")
});

pub static LOCK_CONFLICTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "catering_selection_lock_conflicts_total",
        "Total lock attempts rejected because the selection was already locked"
    )
    .expect("register lock_conflicts_total")
});

pub static STALE_REVISIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "catering_stale_revisions_total",
        "Total writes rejected by the revision compare-and-swap"
    )
    .expect("register stale_revisions_total")
});

/// Render the default registry in the Prometheus text format.
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Force registration so every counter is exported from startup, even at zero.
pub fn init() {
    Lazy::force(&CONFIGURATION_WRITES_TOTAL);
    Lazy::force(&CONFIGURATION_VERSION_BUMPS_TOTAL);
    Lazy::force(&SELECTION_WRITES_TOTAL);
    Lazy::force(&SELECTION_DEFAULTS_TOTAL);
    Lazy::force(&SELECTION_MIGRATIONS_TOTAL);
    Lazy::force(&LOCK_CONFLICTS_TOTAL);
    Lazy::force(&STALE_REVISIONS_TOTAL);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_metrics_include_registered_counters() {
        init();
        SELECTION_WRITES_TOTAL.inc();
        let text = encode_metrics().unwrap();
        assert!(text.contains("catering_selection_writes_total"));
        assert!(text.contains("catering_configuration_version_bumps_total"));
    }
}
