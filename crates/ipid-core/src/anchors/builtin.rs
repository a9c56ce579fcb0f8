use crate::anchors::{parse_anchor_table_str, AnchorTable};
use crate::error::IpidError;

const IPID_FR_JSON: &str = include_str!("../../../../anchors/ipid-fr.json");

/// Name of the table used when no custom table is given.
pub const BUILTIN_NAME: &str = "ipid-fr";

/// Available built-in anchor tables.
pub const PRESETS: &[&str] = &[BUILTIN_NAME];

/// Compile the default French IPID table.
pub fn load_builtin() -> Result<AnchorTable, IpidError> {
    load_preset(BUILTIN_NAME)
}

/// Compile a built-in anchor table by name.
pub fn load_preset(name: &str) -> Result<AnchorTable, IpidError> {
    match name {
        BUILTIN_NAME => parse_anchor_table_str(IPID_FR_JSON),
        _ => Err(IpidError::AnchorTableInvalid(format!(
            "unknown preset '{}'. Available: {}",
            name,
            PRESETS.join(", ")
        ))),
    }
}
