//! Charts module - Chart rendering

mod plotter;
mod renderer;

pub use plotter::ChartPlotter;
pub use renderer::{ChartRenderer, RenderError, EXPORT_HEIGHT, EXPORT_WIDTH};

/// Color palette for counties, in selection order.
pub const PALETTE: [(u8, u8, u8); 10] = [
    (52, 152, 219),  // Blue
    (231, 76, 60),   // Red
    (46, 204, 113),  // Green
    (155, 89, 182),  // Purple
    (243, 156, 18),  // Orange
    (26, 188, 156),  // Teal
    (233, 30, 99),   // Pink
    (0, 188, 212),   // Cyan
    (121, 85, 72),   // Brown
    (96, 125, 139),  // Blue Grey
];

pub fn palette_rgb(index: usize) -> (u8, u8, u8) {
    PALETTE[index % PALETTE.len()]
}

/// The two chart types offered by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    #[default]
    Percentile,
    TimeSeries,
}

impl ChartKind {
    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Percentile => "Percentile Chart",
            ChartKind::TimeSeries => "Time Series",
        }
    }
}

pub fn percentile_title(attribute: &str) -> String {
    format!("Percentile Distribution for {}", attribute)
}

pub fn trend_title(attribute: &str) -> String {
    format!("Trends Over Time for {}", attribute)
}

/// Default file name for an exported percentile chart.
pub fn percentile_file_name(attribute: &str) -> String {
    format!("{}_percentile_chart.png", attribute)
}

/// Default file name for an exported trend chart.
pub fn trend_file_name(attribute: &str) -> String {
    format!("{}_line_chart.png", attribute)
}

/// Split a series into runs of consecutive years that have values, so the
/// trend line breaks at missing years.
pub fn present_runs(years: &[i32], values: &[Option<f64>]) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();

    for (&year, value) in years.iter().zip(values) {
        match value {
            Some(v) => current.push((f64::from(year), *v)),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }

    runs
}

/// Value-axis range with 15% padding, for the static charts.
pub fn padded_range(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if min > max {
        return (0.0, 100.0);
    }
    let pad = if max > min { (max - min) * 0.15 } else { min.abs().max(1.0) * 0.15 };
    (min - pad, max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_break_at_missing_years() {
        let years = [2010, 2011, 2012, 2013, 2014, 2015];
        let values = [Some(1.0), Some(2.0), None, Some(4.0), None, None];
        assert_eq!(
            present_runs(&years, &values),
            vec![
                vec![(2010.0, 1.0), (2011.0, 2.0)],
                vec![(2013.0, 4.0)],
            ]
        );
        assert!(present_runs(&years, &[None; 6]).is_empty());
    }

    #[test]
    fn padded_range_handles_flat_and_empty_input() {
        assert_eq!(padded_range(Vec::new()), (0.0, 100.0));
        let (lo, hi) = padded_range([5.0, 5.0]);
        assert!(lo < 5.0 && hi > 5.0);
        let (lo, hi) = padded_range([0.0, 10.0, f64::NAN]);
        assert!((lo + 1.5).abs() < 1e-9 && (hi - 11.5).abs() < 1e-9);
    }

    #[test]
    fn export_names_follow_the_attribute() {
        assert_eq!(percentile_file_name("ObesityRate"), "ObesityRate_percentile_chart.png");
        assert_eq!(trend_file_name("ObesityRate"), "ObesityRate_line_chart.png");
        assert_eq!(percentile_title("X"), "Percentile Distribution for X");
        assert_eq!(trend_title("X"), "Trends Over Time for X");
    }

    #[test]
    fn palette_wraps_around() {
        assert_eq!(palette_rgb(0), palette_rgb(PALETTE.len()));
    }
}
