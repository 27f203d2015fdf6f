//! List the offerings the enabler supports

use crate::output::{self, OutputFormat};
use cf_tls_types::OfferingRegistry;
use serde::Serialize;
use tabled::Tabled;

/// Table row for offering display
#[derive(Debug, Serialize, Tabled)]
struct OfferingRow {
    /// Offering name
    offering: String,
    /// TLS-enable parameter key
    parameter: String,
}

/// Print the resolved registry
pub fn execute(registry: &OfferingRegistry, format: OutputFormat) {
    let rows: Vec<OfferingRow> = registry
        .entries()
        .iter()
        .map(|o| OfferingRow {
            offering: o.name.clone(),
            parameter: o.parameter.clone(),
        })
        .collect();
    output::print_output(rows, format);
}
