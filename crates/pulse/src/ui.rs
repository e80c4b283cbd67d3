use chrono::{DateTime, Local};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use pulse_common::{ChartPoint, ChartSeries, Quote};
use std::fmt::Write;
use std::time::Duration;

const SPARKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const CHART_WIDTH: usize = 64;
const NAME_WIDTH: usize = 24;
const EMPTY: &str = "—";

pub fn spinner(msg: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

// -------------------------------------------------------------------------------------------------
// number formatting

/// e.g., `Some(1234.5), "USD"` -> `$1,234.50`; `None` -> `—`
pub fn format_currency(value: Option<f64>, currency: &str) -> String {
    let Some(value) = value else {
        return EMPTY.to_string();
    };
    let (prefix, decimals) = match currency {
        "USD" => ("$", 2),
        "EUR" => ("€", 2),
        "GBP" => ("£", 2),
        "JPY" => ("¥", 0),
        _ => ("", 2),
    };
    let sign = if value < 0.0 { "-" } else { "" };
    let amount = group_thousands(value.abs(), decimals);
    if prefix.is_empty() {
        format!("{sign}{amount} {currency}")
    } else {
        format!("{sign}{prefix}{amount}")
    }
}

/// e.g., `1.2` -> `+1.20`, `-0.5` -> `-0.50`
pub fn format_change(value: f64) -> String {
    if value >= 0.0 {
        format!("+{:.2}", value.abs())
    } else {
        format!("{value:.2}")
    }
}

/// e.g., `2952061607936` -> `2.95T`; `None` -> `—`
pub fn format_compact(value: Option<f64>) -> String {
    let Some(value) = value else {
        return EMPTY.to_string();
    };
    let (scaled, suffix) = match value.abs() {
        v if v >= 1e12 => (value / 1e12, "T"),
        v if v >= 1e9 => (value / 1e9, "B"),
        v if v >= 1e6 => (value / 1e6, "M"),
        v if v >= 1e3 => (value / 1e3, "K"),
        _ => (value, ""),
    };
    let digits = format!("{scaled:.2}");
    let digits = digits.trim_end_matches('0').trim_end_matches('.');
    format!("{digits}{suffix}")
}

fn group_thousands(value: f64, decimals: usize) -> String {
    let fixed = format!("{value:.decimals$}");
    let (int, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut grouped = String::with_capacity(int.len() + int.len() / 3);
    for (i, ch) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if !frac.is_empty() {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

fn signed(text: String, value: f64) -> String {
    if value >= 0.0 {
        text.green().to_string()
    } else {
        text.red().to_string()
    }
}

fn clock(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.with_timezone(&Local).format("%H:%M").to_string())
        .unwrap_or_else(|| EMPTY.to_string())
}

fn last_updated(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

// -------------------------------------------------------------------------------------------------
// components

/// Every quote in one scrolling-ticker style line: `AAPL $189.84 +0.64%  MSFT ...`
pub fn ticker(quotes: &[Quote]) -> String {
    quotes
        .iter()
        .map(|q| {
            format!(
                "{} {} {}",
                q.symbol.bold(),
                format_currency(Some(q.price), &q.currency),
                signed(format!("{}%", format_change(q.change_percent)), q.change_percent)
            )
        })
        .collect::<Vec<_>>()
        .join("  │  ")
}

/// One watchlist card; the active one is marked with `▶`.
pub fn card(quote: &Quote, active: bool) -> String {
    let marker = if active { "▶" } else { " " };
    let width = NAME_WIDTH;
    let name: String = quote.short_name.chars().take(width).collect();
    let change = format!(
        "{} ({}%)",
        format_change(quote.change),
        format_change(quote.change_percent)
    );
    format!(
        "{marker} {:<6} {:<width$} {:>14}  {}",
        quote.symbol,
        name,
        format_currency(Some(quote.price), &quote.currency),
        signed(change, quote.change_percent),
    )
}

/// Detail panel of the active symbol.
pub fn detail(active: Option<&str>, quote: Option<&Quote>) -> String {
    let Some(q) = quote else {
        return format!(
            "{}\nSelect a stock to view its intraday chart.",
            active.unwrap_or(EMPTY).bold()
        );
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({})   {}  {}",
        q.short_name.bold(),
        q.symbol,
        format_currency(Some(q.price), &q.currency).bold(),
        signed(
            format!(
                "{} ({}%)",
                format_change(q.change),
                format_change(q.change_percent)
            ),
            q.change
        ),
    );
    let _ = writeln!(
        out,
        "Market Cap {}   Volume {}   52W High {}   52W Low {}",
        format_compact(q.market_cap),
        format_compact(q.volume),
        format_currency(q.high_52_week, &q.currency),
        format_currency(q.low_52_week, &q.currency),
    );
    let _ = write!(
        out,
        "Market State {}   Last updated {}",
        q.market_state,
        last_updated(&q.last_updated)
    );
    out
}

/// Resample `points` to at most `width` columns & draw them as a sparkline.
pub fn sparkline(points: &[ChartPoint], width: usize) -> String {
    if points.is_empty() || width == 0 {
        return String::new();
    }

    let columns: Vec<f64> = if points.len() <= width {
        points.iter().map(|p| p.price).collect()
    } else {
        (0..width)
            .map(|i| {
                let start = i * points.len() / width;
                let end = ((i + 1) * points.len() / width).max(start + 1);
                let bucket = &points[start..end];
                bucket.iter().map(|p| p.price).sum::<f64>() / bucket.len() as f64
            })
            .collect()
    };

    let min = columns.iter().copied().fold(f64::INFINITY, f64::min);
    let max = columns.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;

    columns
        .iter()
        .map(|price| {
            if span <= 0.0 {
                SPARKS[SPARKS.len() / 2]
            } else {
                let level = ((price - min) / span * (SPARKS.len() - 1) as f64).round() as usize;
                SPARKS[level.min(SPARKS.len() - 1)]
            }
        })
        .collect()
}

/// Area chart panel: sparkline, price range & time span.
pub fn chart(series: Option<&ChartSeries>, currency: &str) -> String {
    let Some(series) = series.filter(|s| !s.points.is_empty()) else {
        return "Chart data unavailable.".dimmed().to_string();
    };
    let points = &series.points;

    let low = points.iter().map(|p| p.price).fold(f64::INFINITY, f64::min);
    let high = points.iter().map(|p| p.price).fold(f64::NEG_INFINITY, f64::max);
    let (first, last) = (points[0], points[points.len() - 1]);

    format!(
        "{}\n{} → {}   low {}   high {}",
        signed(sparkline(points, CHART_WIDTH), last.price - first.price),
        clock(first.timestamp),
        clock(last.timestamp),
        format_currency(Some(low), currency),
        format_currency(Some(high), currency),
    )
}

// -------------------------------------------------------------------------------------------------
// full dashboard frame

/// Everything the dashboard shows, borrowed from the watchlist & pollers.
pub struct Frame<'a> {
    pub symbols: &'a [String],
    pub active: Option<&'a str>,
    pub quotes: Option<&'a [Quote]>,
    pub quotes_error: Option<&'a str>,
    pub loading: bool,
    pub chart: Option<&'a ChartSeries>,
}

impl Frame<'_> {
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", "Pulse Markets".bold());

        let quotes = self.quotes.unwrap_or_default();
        if !quotes.is_empty() {
            let _ = writeln!(out, "{}\n", ticker(quotes));
        }

        let _ = writeln!(
            out,
            "{}  {}",
            "Watchlist".bold(),
            "live quotes update every 10 seconds".dimmed()
        );
        if self.symbols.is_empty() {
            let _ = writeln!(out, "  (empty; type +SYMBOL to track one)");
        }
        if self.loading && self.quotes.is_none() {
            let _ = writeln!(out, "  loading ...");
        }
        if self.quotes_error.is_some() {
            let _ = writeln!(
                out,
                "  {}",
                "Unable to load stock data. Please try again later.".red()
            );
        }
        for quote in quotes {
            let _ = writeln!(out, "{}", card(quote, self.active == Some(quote.symbol.as_str())));
        }

        let active_quote = self
            .active
            .and_then(|active| quotes.iter().find(|q| q.symbol == active));
        let _ = writeln!(out, "\n{}", detail(self.active, active_quote));
        if let Some(q) = active_quote {
            let _ = writeln!(out, "\n{}", chart(self.chart, &q.currency));
        }

        let _ = write!(out, "\n{}", "+SYM track  -SYM drop  SYM select  q quit".dimmed());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(symbol: &str, price: f64, change: f64) -> Quote {
        Quote {
            symbol: symbol.to_string(),
            short_name: format!("{symbol} Inc."),
            price,
            change,
            change_percent: change / price * 100.0,
            high_52_week: None,
            low_52_week: Some(100.0),
            market_cap: Some(2_952_061_607_936.0),
            volume: None,
            currency: "USD".to_string(),
            market_state: "REGULAR".to_string(),
            last_updated: "2024-01-19T21:00:01.000Z".to_string(),
        }
    }

    fn point(timestamp: i64, price: f64) -> ChartPoint {
        ChartPoint { timestamp, price }
    }

    #[test]
    fn currency() {
        assert_eq!(format_currency(Some(1234.5), "USD"), "$1,234.50");
        assert_eq!(format_currency(Some(-0.5), "EUR"), "-€0.50");
        assert_eq!(format_currency(Some(1234567.0), "JPY"), "¥1,234,567");
        assert_eq!(format_currency(Some(12.0), "CHF"), "12.00 CHF");
        assert_eq!(format_currency(None, "USD"), "—");
    }

    #[test]
    fn change_and_compact() {
        assert_eq!(format_change(1.2), "+1.20");
        assert_eq!(format_change(0.0), "+0.00");
        assert_eq!(format_change(-0.456), "-0.46");
        assert_eq!(format_compact(Some(2_952_061_607_936.0)), "2.95T");
        assert_eq!(format_compact(Some(53_665_607.0)), "53.67M");
        assert_eq!(format_compact(Some(1_000.0)), "1K");
        assert_eq!(format_compact(Some(999.0)), "999");
        assert_eq!(format_compact(None), "—");
    }

    #[test]
    fn sparkline_spans_min_to_max() {
        let points: Vec<_> = (0..8).map(|i| point(i, i as f64)).collect();
        assert_eq!(sparkline(&points, 8), "▁▂▃▄▅▆▇█");

        let flat = vec![point(0, 5.0), point(1, 5.0)];
        assert_eq!(sparkline(&flat, 8), "▅▅");

        let many: Vec<_> = (0..1000).map(|i| point(i, (i % 7) as f64)).collect();
        assert_eq!(sparkline(&many, 64).chars().count(), 64);
        assert_eq!(sparkline(&[], 64), "");
    }

    #[test]
    fn frame_shows_cards_and_active_detail() {
        colored::control::set_override(false);
        let symbols = vec!["AAPL".to_string(), "MSFT".to_string()];
        let quotes = vec![quote("AAPL", 190.0, 1.5), quote("MSFT", 400.0, -2.0)];
        let chart = ChartSeries {
            symbol: "MSFT".to_string(),
            points: vec![point(1_705_674_600_000, 401.0), point(1_705_674_660_000, 400.0)],
        };

        let frame = Frame {
            symbols: &symbols,
            active: Some("MSFT"),
            quotes: Some(&quotes),
            quotes_error: None,
            loading: false,
            chart: Some(&chart),
        }
        .render();

        assert!(frame.contains("▶ MSFT"));
        assert!(frame.contains("  AAPL"));
        assert!(frame.contains("-2.00 (-0.50%)"));
        assert!(frame.contains("Market Cap 2.95T   Volume —   52W High —   52W Low $100.00"));
        assert!(frame.contains("high $401.00"));
    }

    #[test]
    fn frame_without_quotes() {
        colored::control::set_override(false);
        let frame = Frame {
            symbols: &[],
            active: None,
            quotes: None,
            quotes_error: Some("request failed"),
            loading: false,
            chart: None,
        }
        .render();

        assert!(frame.contains("(empty; type +SYMBOL to track one)"));
        assert!(frame.contains("Unable to load stock data"));
        assert!(frame.contains("Select a stock to view its intraday chart."));
    }
}
