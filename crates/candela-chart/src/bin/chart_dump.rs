//! chart_dump - render a chart to its primitive list as JSON.
//!
//! Usage: `chart_dump [CSV_PATH] [SYMBOL]`
//!
//! Loads candles from a CSV file (or generates a small deterministic
//! sample when no path is given), draws one of each annotation kind
//! through the real gesture path, and prints the rendered frame to
//! stdout.

use std::sync::Arc;

use anyhow::Result;
use candela_chart::{ChartSession, MemoryStore, ScreenPos, Viewport};
use candela_core::{Candle, ToolType};
use candela_data::{CsvLoader, DataSource};

fn sample_candles(symbol: &str) -> Vec<Candle> {
    // A fixed little walk, enough to exercise every primitive kind.
    let closes = [
        100.0_f32, 102.5, 101.0, 105.0, 104.0, 108.5, 107.0, 111.0, 109.5, 113.0,
    ];
    let mut candles = Vec::with_capacity(closes.len());
    let mut open = 99.0_f32;
    for (i, close) in closes.into_iter().enumerate() {
        let high = open.max(close) + 1.5;
        let low = open.min(close) - 1.5;
        candles.push(Candle::new(
            symbol,
            1_700_000_000.0 + i as f64 * 86_400.0,
            open,
            high,
            low,
            close,
            250_000.0 + i as f32 * 100_000.0,
        ));
        open = close;
    }
    candles
}

async fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let csv_path = args.next();
    let symbol = args.next().unwrap_or_else(|| "DEMO".to_string());

    let candles = match &csv_path {
        Some(path) => CsvLoader::new(path, &symbol).load()?,
        None => sample_candles(&symbol),
    };
    log::info!("loaded {} candles for {symbol}", candles.len());

    let store = Arc::new(MemoryStore::new());
    let mut session = ChartSession::new(&symbol, Viewport::new(800.0, 400.0), store);
    session.set_candles(candles);

    // One drag per tool, sweeping across the viewport.
    let gestures = [
        (ToolType::TrendLine, (60.0, 320.0), (740.0, 90.0)),
        (ToolType::SupportResistance, (60.0, 250.0), (740.0, 250.0)),
        (ToolType::Rectangle, (200.0, 120.0), (400.0, 220.0)),
        (ToolType::Fibonacci, (500.0, 80.0), (700.0, 300.0)),
    ];
    for (tool, (x1, y1), (x2, y2)) in gestures {
        session.arm_tool(tool);
        session.pointer_down(ScreenPos::new(x1, y1));
        session.pointer_move(ScreenPos::new((x1 + x2) / 2.0, (y1 + y2) / 2.0));
        let outcome = session
            .pointer_up(ScreenPos::new(x2, y2))
            .await?
            .ok_or_else(|| anyhow::anyhow!("{tool} gesture did not complete"))?;
        log::info!("committed {tool} as id {}", outcome.annotation().id);
    }

    let frame = session.render();
    log::info!("frame holds {} primitives", frame.len());
    println!("{}", serde_json::to_string_pretty(&frame)?);

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
