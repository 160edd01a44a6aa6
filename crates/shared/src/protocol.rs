//! Repository REST endpoints consumed by the client.

pub const DEVICE_DESCRIPTIONS_PATH: &str = "deviceDescriptions";
pub const EXAMPLE_PATH: &str = "example";
pub const STATUS_PATH: &str = "status";
pub const CAPABILITIES_PATH: &str = "capabilities";

/// Indentation used when rendering descriptions for editing.
pub const PRETTY_INDENT: &[u8] = b"    ";

/// Renders a JSON value with [`PRETTY_INDENT`] indentation.
pub fn pretty_print(value: &serde_json::Value) -> serde_json::Result<String> {
    use serde::Serialize;

    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(PRETTY_INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}
