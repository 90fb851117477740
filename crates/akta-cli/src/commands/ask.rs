use akta_core::ValidationStatus;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AskArgs;
use crate::commands::as_of_or_today;
use crate::context::AppContext;
use crate::output::output;

/// Handle `akta ask`.
///
/// Inputs given as flags replace the figures stated in the question. The
/// answer is printed even when it failed; the exit status reports the failure.
pub async fn handle(args: &AskArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let as_of = as_of_or_today(args.as_of);
    let inputs = args.inputs.to_inputs();
    let inputs = (!inputs.is_empty()).then_some(inputs);

    let answer = ctx.composer.answer_query(&args.query, as_of, inputs).await;
    output(&answer, flags.format)?;

    if answer.validation_status == ValidationStatus::Failed {
        let kind = answer.error.as_ref().map_or("unknown", |e| e.kind.as_str());
        anyhow::bail!("answer failed ({kind})");
    }
    Ok(())
}
