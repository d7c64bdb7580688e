//! Runs the five-seat table, logging the board once per time unit until Ctrl-C
//! (or for `DINING_RUN_UNITS` units), then prints the final report.

use dining_philosophers::{BoardSink, Table, TableConfig, TableError};
use ring_framework::tracing::setup_tracing;
use ring_framework::{After, CtrlC};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), TableError> {
    setup_tracing();

    let config = TableConfig::from_env()?;
    info!(philosophers = ?config.names, "Setting the table");

    let board = Arc::new(BoardSink::new(&config.names));
    let running = Table::new(config.clone(), Arc::clone(&board))?.start();
    let ticker = tokio::spawn(show_board(Arc::clone(&board), config.time_unit));

    let result = match config.run_for {
        Some(units) => running.run_until(After(config.units(units))).await,
        None => {
            info!("Press Ctrl-C to stop");
            running.run_until(CtrlC).await
        }
    };
    ticker.abort();
    let report = result?;

    for p in &report.philosophers {
        info!(
            philosopher = %p.name,
            first = p.order[0],
            second = p.order[1],
            meals = p.meals,
            "Final"
        );
    }
    info!(board = %board, "Final board");
    Ok(())
}

async fn show_board(board: Arc<BoardSink>, period: Duration) {
    let mut interval = tokio::time::interval(period);
    loop {
        interval.tick().await;
        info!(board = %board, "Board");
    }
}
