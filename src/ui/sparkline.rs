//! Price-trend geometry shared by the detail chart and the list's 7-day strip.

pub const WIDTH: f64 = 320.0;
pub const HEIGHT: f64 = 90.0;
pub const PADDING: f64 = 6.0;

const GLYPHS: [char; 8] = [
    '\u{2581}', '\u{2582}', '\u{2583}', '\u{2584}', '\u{2585}', '\u{2586}', '\u{2587}', '\u{2588}',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
}

impl Trend {
    pub fn of(data: &[f64]) -> Option<Self> {
        match (data.first(), data.last()) {
            (Some(first), Some(last)) if data.len() >= 2 => Some(if last >= first {
                Trend::Up
            } else {
                Trend::Down
            }),
            _ => None,
        }
    }
}

/// Samples normalised into a `WIDTH` x `HEIGHT` area (y grows upward).
#[derive(Debug, Clone, PartialEq)]
pub struct SparkShape {
    pub points: Vec<(f64, f64)>,
    pub trend: Trend,
}

impl SparkShape {
    /// `None` for fewer than two samples.
    pub fn new(data: &[f64]) -> Option<Self> {
        let trend = Trend::of(data)?;
        let min = data.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let range = if max - min == 0.0 { 1.0 } else { max - min };
        let last = (data.len() - 1) as f64;

        let points = data
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let x = PADDING + (i as f64 / last) * (WIDTH - PADDING * 2.0);
                let y = PADDING + ((v - min) / range) * (HEIGHT - PADDING * 2.0);
                (x, y)
            })
            .collect();

        Some(Self { points, trend })
    }

    pub fn segments(&self) -> impl Iterator<Item = ((f64, f64), (f64, f64))> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }
}

/// Block-glyph strip of at most `width` characters; empty below two samples.
pub fn glyphs(data: &[f64], width: usize) -> String {
    if data.len() < 2 || width == 0 {
        return String::new();
    }
    let sampled = downsample(data, width);
    let min = sampled.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = sampled.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    sampled
        .iter()
        .map(|v| {
            if range == 0.0 {
                GLYPHS[GLYPHS.len() / 2]
            } else {
                let idx = ((v - min) / range * (GLYPHS.len() - 1) as f64).round() as usize;
                GLYPHS[idx.min(GLYPHS.len() - 1)]
            }
        })
        .collect()
}

/// Bar heights in `0..=resolution` for ratatui's `Sparkline`, one per column.
pub fn bars(data: &[f64], width: usize, resolution: u64) -> Vec<u64> {
    let sampled = downsample(data, width);
    let min = sampled.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = sampled.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range == 0.0 {
        return vec![resolution / 2; sampled.len()];
    }
    sampled
        .iter()
        .map(|p| ((p - min) / range * resolution as f64) as u64)
        .collect()
}

pub fn downsample(data: &[f64], target_len: usize) -> Vec<f64> {
    if target_len == 0 || data.is_empty() {
        return vec![];
    }
    if data.len() <= target_len {
        return data.to_vec();
    }
    let mut result: Vec<f64> = Vec::with_capacity(target_len);
    let bucket_size = data.len() as f64 / target_len as f64;
    for i in 0..target_len {
        let start = (i as f64 * bucket_size) as usize;
        let end = (((i + 1) as f64 * bucket_size) as usize).min(data.len());
        if start >= end {
            if let Some(&last) = result.last() {
                result.push(last);
            }
            continue;
        }
        // min-max-close keeps peaks and valleys
        let slice = &data[start..end];
        let min = slice.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = slice.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let close = slice[slice.len() - 1];
        if let Some(&prev) = result.last() {
            if (min - prev).abs() > (max - prev).abs() {
                result.push(min);
            } else {
                result.push(max);
            }
        } else {
            result.push(close);
        }
    }
    result
}
