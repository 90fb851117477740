use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Ask(args) => commands::ask::handle(&args, ctx, flags).await,
        Commands::Refresh(args) => commands::refresh::handle(&args, ctx, flags).await,
        Commands::Watch(args) => commands::refresh::watch(&args, ctx).await,
        Commands::Ingest(args) => commands::ingest::handle(&args, ctx, flags).await,
        Commands::Rules { .. } | Commands::Breakdown(_) | Commands::Budget(_) | Commands::Schema(_) => {
            unreachable!("rules/breakdown/budget/schema are pre-dispatched in main")
        }
    }
}
