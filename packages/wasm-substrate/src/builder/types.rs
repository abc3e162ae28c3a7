//! Request types for building calls and extrinsics from JSON
//!
//! A request names the call and lists its arguments positionally; each
//! argument is converted according to the type the metadata declares for it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What to call and with which arguments
///
/// # Example
/// ```json
/// {
///   "call": "balances.transfer",
///   "args": ["5FHneW46xGXgs5mUiveU4sbTyGBzmstUspZC92UhjJM694ty", "1000000000000"],
///   "types": { "AssetId": "u32" }
/// }
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    /// Dotted `module.function` name
    pub call: String,
    /// Positional arguments, in declared order
    #[serde(default)]
    pub args: Vec<serde_json::Value>,
    /// Extra type aliases (name -> existing type) for runtime-specific types
    #[serde(default)]
    pub types: BTreeMap<String, String>,
}
