//! CSV candle loading.

use std::path::{Path, PathBuf};

use anyhow::Context;
use candela_core::Candle;

use crate::validation::is_plausible_candle;
use crate::DataSource;

/// Loads candles for one symbol from a CSV file.
pub struct CsvLoader {
    path: PathBuf,
    symbol: String,
}

impl CsvLoader {
    pub fn new<P: AsRef<Path>>(path: P, symbol: impl Into<String>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            symbol: symbol.into(),
        }
    }
}

impl DataSource for CsvLoader {
    fn load(&self) -> anyhow::Result<Vec<Candle>> {
        load_candles_from_csv(&self.path, &self.symbol)
    }
}

/// Parse a datetime string "YYYY-MM-DD HH:MM:SS" or a raw unix timestamp.
pub fn parse_datetime(s: &str) -> Option<f64> {
    // Raw unix timestamp, e.g. "1325412060.0"
    if let Ok(ts) = s.parse::<f64>() {
        return Some(ts);
    }

    // Format: "2017-08-17 04:00:00"
    let parts: Vec<&str> = s.split(&['-', ' ', ':']).collect();
    if parts.len() < 6 {
        return None;
    }
    let year: i32 = parts[0].parse().ok()?;
    let month: u32 = parts[1].parse().ok()?;
    let day: u32 = parts[2].parse().ok()?;
    let hour: u32 = parts[3].parse().ok()?;
    let min: u32 = parts[4].parse().ok()?;
    let sec: u32 = parts[5].parse().ok()?;
    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return None;
    }

    // Days since the unix epoch, ignoring leap seconds
    let mut days: i64 = 0;
    for y in 1970..year {
        days += if is_leap_year(y) { 366 } else { 365 };
    }
    let month_days = [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334];
    days += month_days[month as usize - 1] as i64;
    if month > 2 && is_leap_year(year) {
        days += 1;
    }
    days += (day - 1) as i64;

    let timestamp = days * 86400 + hour as i64 * 3600 + min as i64 * 60 + sec as i64;
    Some(timestamp as f64)
}

pub(crate) fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Load candles from a CSV file, tagging each row with `symbol`.
///
/// Column positions are sniffed from the header (timestamp, open, high,
/// low, close, volume by name) with a positional fallback for headerless
/// standard-order files. Rows with inconsistent OHLC values are skipped
/// with a warning; the result is sorted chronologically.
pub fn load_candles_from_csv<P: AsRef<Path>>(path: P, symbol: &str) -> anyhow::Result<Vec<Candle>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .from_path(path)
        .with_context(|| format!("failed to open CSV file {path:?}"))?;

    let headers = reader.headers()?.clone();
    let headers_lower: Vec<String> = headers.iter().map(|h| h.to_lowercase()).collect();

    let position = |name: &str| headers_lower.iter().position(|h| h == name);
    let ts_col = headers_lower
        .iter()
        .position(|h| h.contains("timestamp") || h == "time")
        .unwrap_or(0);
    let open_col = position("open").unwrap_or(1);
    let high_col = position("high").unwrap_or(2);
    let low_col = position("low").unwrap_or(3);
    let close_col = position("close").unwrap_or(4);
    let volume_col = position("volume").unwrap_or(5);

    let mut candles = Vec::new();
    let mut skipped = 0usize;

    for (row, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("malformed CSV record at row {row}"))?;

        let mut timestamp = record
            .get(ts_col)
            .and_then(parse_datetime)
            .with_context(|| format!("unparseable timestamp at row {row}"))?;
        // Milliseconds (13+ digits) vs seconds (10 digits)
        if timestamp > 1e12 {
            timestamp /= 1000.0;
        }

        let field = |col: usize| -> anyhow::Result<f32> {
            record
                .get(col)
                .unwrap_or("0")
                .parse()
                .with_context(|| format!("unparseable number at row {row}, column {col}"))
        };

        let candle = Candle::new(
            symbol,
            timestamp,
            field(open_col)?,
            field(high_col)?,
            field(low_col)?,
            field(close_col)?,
            field(volume_col)?,
        );

        if is_plausible_candle(&candle) {
            candles.push(candle);
        } else {
            skipped += 1;
        }
    }

    if skipped > 0 {
        log::warn!("skipped {skipped} CSV rows with inconsistent OHLC values");
    }

    // Chronological order regardless of file order
    candles.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));

    Ok(candles)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_parse_datetime_unix() {
        assert_eq!(parse_datetime("1325412060.0"), Some(1_325_412_060.0));
        assert_eq!(parse_datetime("1000"), Some(1000.0));
    }

    #[test]
    fn test_parse_datetime_formatted() {
        // 2017-08-17 04:00:00 UTC
        assert_eq!(parse_datetime("2017-08-17 04:00:00"), Some(1_502_942_400.0));
    }

    #[test]
    fn test_parse_datetime_garbage() {
        assert_eq!(parse_datetime("not a date"), None);
        assert_eq!(parse_datetime("2017-08"), None);
    }

    fn write_temp_csv(contents: &str) -> std::path::PathBuf {
        use std::sync::atomic::{AtomicUsize, Ordering};
        static COUNTER: AtomicUsize = AtomicUsize::new(0);

        let mut path = std::env::temp_dir();
        path.push(format!(
            "candela-csv-test-{}-{}.csv",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_sorts_and_tags_symbol() {
        let path = write_temp_csv(
            "timestamp,open,high,low,close,volume\n\
             2000,101.0,106.0,96.0,103.0,2000\n\
             1000,100.0,105.0,95.0,102.0,1000\n",
        );
        let candles = load_candles_from_csv(&path, "BTCUSDT").unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].timestamp, 1000.0);
        assert_eq!(candles[1].timestamp, 2000.0);
        assert!(candles.iter().all(|c| c.symbol == "BTCUSDT"));
    }

    #[test]
    fn test_load_sniffs_reordered_columns() {
        let path = write_temp_csv(
            "open,close,high,low,volume,timestamp\n\
             100.0,102.0,105.0,95.0,1000,1000\n",
        );
        let candles = load_candles_from_csv(&path, "ETHUSDT").unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].open, 100.0);
        assert_eq!(candles[0].high, 105.0);
        assert_eq!(candles[0].low, 95.0);
        assert_eq!(candles[0].close, 102.0);
    }

    #[test]
    fn test_load_converts_milliseconds() {
        let path = write_temp_csv(
            "timestamp,open,high,low,close,volume\n\
             1502942400000,100.0,105.0,95.0,102.0,1000\n",
        );
        let candles = load_candles_from_csv(&path, "BTCUSDT").unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(candles[0].timestamp, 1_502_942_400.0);
    }

    #[test]
    fn test_load_skips_inconsistent_rows() {
        let path = write_temp_csv(
            "timestamp,open,high,low,close,volume\n\
             1000,100.0,105.0,95.0,102.0,1000\n\
             2000,100.0,90.0,95.0,102.0,1000\n",
        );
        let candles = load_candles_from_csv(&path, "BTCUSDT").unwrap();
        std::fs::remove_file(&path).ok();

        // The high-below-close row is dropped, not clamped
        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].timestamp, 1000.0);
    }
}
