//! Inspect command - summarizes a key-exchange XML document

use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;

use crate::domain::keypair::RsaParameters;

/// Run the inspect-key command
pub async fn run(file: &Path) -> anyhow::Result<()> {
    super::bootstrap();

    let xml = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;

    let parameters = RsaParameters::from_xml(&xml)?;
    print!("{}", describe(&parameters));
    Ok(())
}

/// One line for the key kind, then one line per present field
pub fn describe(parameters: &RsaParameters) -> String {
    let kind = if parameters.is_private() {
        "private"
    } else {
        "public"
    };

    let mut out = String::new();
    let _ = writeln!(out, "{} key", kind);
    for (name, len) in parameters.present_fields() {
        let _ = writeln!(out, "  {:<9}{} bytes", name, len);
    }
    out
}
