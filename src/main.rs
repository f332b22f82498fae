//! Entry point: parse CLI and dispatch to command handlers.

use clap::Parser;
use rinkstats::{
    cli::{Commands, Rinkstats},
    commands::{
        aggregate::{handle_aggregate, AggregateParams},
        process::{handle_process, ProcessParams},
    },
    Result,
};

/// Run the CLI.
fn main() -> Result<()> {
    let app = Rinkstats::parse();

    match app.command {
        Commands::Process {
            common,
            threads,
            shootout_seconds,
            refresh,
        } => handle_process(ProcessParams {
            game_ids: common.game_ids,
            input_dir: common.input_dir,
            threads,
            shootout_seconds,
            refresh,
            as_json: common.json,
        })?,

        Commands::Aggregate {
            common,
            table,
            level,
            strength,
            score,
            teammates,
            opposition,
            position,
        } => handle_aggregate(AggregateParams {
            game_ids: common.game_ids,
            input_dir: common.input_dir,
            table,
            level,
            strength,
            score,
            teammates,
            opposition,
            position,
            as_json: common.json,
        })?,
    }

    Ok(())
}
