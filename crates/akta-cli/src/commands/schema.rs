use akta_core::{ComplianceAnswer, RefreshReport};
use schemars::schema_for;
use serde_json::{Value, json};

use crate::cli::root_commands::{SchemaArgs, SchemaKind};

/// JSON Schema of the requested API shapes.
pub fn schemas(kind: SchemaKind) -> anyhow::Result<Value> {
    let answer = serde_json::to_value(schema_for!(ComplianceAnswer))?;
    let report = serde_json::to_value(schema_for!(RefreshReport))?;
    Ok(match kind {
        SchemaKind::Answer => answer,
        SchemaKind::Report => report,
        SchemaKind::All => json!({
            "ComplianceAnswer": answer,
            "RefreshReport": report,
        }),
    })
}

/// Handle `akta schema`. Schemas are JSON whatever `--format` says.
pub fn handle(args: &SchemaArgs) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&schemas(args.kind)?)?);
    Ok(())
}
