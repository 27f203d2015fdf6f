//! Arbitrary-parameter builder
//!
//! Renders the JSON body passed to `update-service -c`: a single key named
//! after the offering's TLS parameter, valued with the hostname list.

use crate::offering::SupportedOffering;
use serde_json::{Map, Value};

/// Build the update-service parameter body for an offering.
pub fn update_parameters(offering: &SupportedOffering, hostnames: &[String]) -> String {
    let mut body = Map::new();
    body.insert(offering.parameter.clone(), Value::from(hostnames.to_vec()));
    Value::Object(body).to_string()
}
