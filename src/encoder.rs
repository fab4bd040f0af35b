//! Dataset encoding
//!
//! Renders aggregated counts into the two artifacts of a dataset: a
//! tab-separated `.dat` table and a gnuplot `.plt` script drawing it as a
//! row-stacked histogram. Rendering is pure; writing is left to a
//! [`DatasetSink`](crate::sinks::DatasetSink).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::AggregationConfig;
use crate::types::{ActionCounts, ActionSet};

/// Cell text for a label the row does not carry
pub const MISSING_VALUE: &str = "-";

/// Which of the two table layouts a dataset uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    /// One row per run, rates per minute and per participant
    Runs,
    /// One row per subject or group, raw totals
    Subjects,
}

/// A rendered dataset, ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedDataset {
    pub name: String,
    pub kind: DatasetKind,
    pub rows: usize,
    pub sample_size: Option<usize>,
    pub table: String,
    pub script: String,
}

impl EncodedDataset {
    pub fn table_file(&self) -> String {
        format!("{}.dat", self.name)
    }

    pub fn script_file(&self) -> String {
        format!("{}.plt", self.name)
    }
}

/// Renders tables and plot scripts for one label set
#[derive(Debug, Clone)]
pub struct DatasetEncoder {
    actions: ActionSet,
    y_max: Option<u32>,
}

impl DatasetEncoder {
    pub fn new(actions: ActionSet, y_max: Option<u32>) -> Self {
        Self { actions, y_max }
    }

    pub fn from_config(config: &AggregationConfig) -> Self {
        Self::new(config.actions, config.y_max)
    }

    /// Encode a per-run table whose rows are already normalized
    pub fn encode_runs(
        &self,
        name: &str,
        rows: &BTreeMap<String, ActionCounts>,
        sample_size: usize,
    ) -> EncodedDataset {
        let table = self.render_table("# Actions by run and type", "Type", rows, format_rate);
        let script = self.render_script(
            name,
            "Runs",
            "Interactions per minutes/per child",
            &format!("{name} (n={sample_size})"),
        );

        EncodedDataset {
            name: name.to_string(),
            kind: DatasetKind::Runs,
            rows: rows.len(),
            sample_size: Some(sample_size),
            table,
            script,
        }
    }

    /// Encode a per-subject (or per-group) table of raw totals
    pub fn encode_subjects(
        &self,
        name: &str,
        rows: &BTreeMap<String, ActionCounts>,
    ) -> EncodedDataset {
        let table =
            self.render_table("# Actions by subject and type", "Subject", rows, format_count);
        let script = self.render_script(name, "Subject", "Nb of Interactions", name);

        EncodedDataset {
            name: name.to_string(),
            kind: DatasetKind::Subjects,
            rows: rows.len(),
            sample_size: None,
            table,
            script,
        }
    }

    fn render_table(
        &self,
        comment: &str,
        key_column: &str,
        rows: &BTreeMap<String, ActionCounts>,
        format_value: fn(f64) -> String,
    ) -> String {
        let mut out = String::new();
        out.push_str(comment);
        out.push('\n');

        out.push_str(key_column);
        for action in self.actions.actions() {
            out.push('\t');
            out.push_str(action.as_str());
        }
        out.push('\n');

        for (key, counts) in rows {
            out.push_str(&format!("\"{key}\"\t"));
            for action in self.actions.actions() {
                match counts.get(*action) {
                    Some(value) => out.push_str(&format_value(value)),
                    None => out.push_str(MISSING_VALUE),
                }
                out.push('\t');
            }
            out.push('\n');
        }

        out
    }

    fn render_script(&self, name: &str, xlabel: &str, ylabel: &str, title: &str) -> String {
        let columns = self.actions.len();

        let mut lines = vec![
            "set key autotitle columnheader".to_string(),
            format!("set xlabel \"{xlabel}\""),
            format!("set ylabel \"{ylabel}\""),
            "set terminal pngcairo size 800,600 enhanced font 'Verdana,10'".to_string(),
        ];
        if let Some(y_max) = self.y_max {
            lines.push(format!("set yrange [0:{y_max}]"));
        }
        lines.extend([
            format!("set title '{title}'"),
            format!("set output '{name}.png'"),
            "set style data histograms".to_string(),
            "set style histogram rowstacked".to_string(),
            "set boxwidth 0.9 relative".to_string(),
            "set style fill solid 1.0 border -1".to_string(),
            format!("set palette defined {}", self.palette()),
            "unset colorbox".to_string(),
            format!(
                "plot for [i=2:{}] '{name}.dat' using i:xtic(1) lt palette frac (i-2)/{}.",
                columns + 1,
                columns.saturating_sub(1).max(1)
            ),
        ]);

        lines.join("\n") + "\n"
    }

    /// Palette entries in column order, so column `i` samples its own colour
    fn palette(&self) -> String {
        let entries: Vec<String> = self
            .actions
            .actions()
            .iter()
            .enumerate()
            .map(|(idx, action)| format!("{idx} '{}'", action.color()))
            .collect();
        format!("({})", entries.join(", "))
    }
}

/// Significant digits kept in rate cells
const RATE_PRECISION: i32 = 12;

/// Float text for rates, `%.12g` style: trailing zeros are dropped, whole
/// numbers keep a trailing `.0`, and exponents below -4 or from 12 up use a
/// two-digit signed exponent (`2.5e-05`, `1e+12`).
pub fn format_rate(value: f64) -> String {
    debug_assert!(value.is_finite());

    // The exponent after rounding decides between fixed and scientific form
    let scientific = format!("{:.*e}", (RATE_PRECISION - 1) as usize, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return scientific;
    };

    if exponent < -4 || exponent >= RATE_PRECISION {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!("{}e{sign}{:02}", strip_zeros(mantissa), exponent.abs());
    }

    let decimals = (RATE_PRECISION - 1 - exponent) as usize;
    let fixed = format!("{value:.decimals$}");
    let text = strip_zeros(&fixed);
    if text.contains('.') {
        text.to_string()
    } else {
        format!("{text}.0")
    }
}

fn strip_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

/// Integer text for raw totals
pub fn format_count(value: f64) -> String {
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Action;
    use pretty_assertions::assert_eq;

    fn rows(entries: &[(&str, &[(Action, f64)])]) -> BTreeMap<String, ActionCounts> {
        entries
            .iter()
            .map(|(key, pairs)| {
                (
                    key.to_string(),
                    ActionCounts::from_pairs(ActionSet::Engagement, pairs),
                )
            })
            .collect()
    }

    #[test]
    fn test_run_table_layout() {
        let encoder = DatasetEncoder::new(ActionSet::Engagement, None);
        let data = rows(&[
            ("1", &[(Action::Talk, 0.5), (Action::Look, 2.0)]),
            ("10", &[(Action::Show, 1.25)]),
        ]);

        let dataset = encoder.encode_runs("study", &data, 4);

        assert_eq!(
            dataset.table,
            "# Actions by run and type\n\
             Type\tshow\ttalk\ttouch\tmis\tges\tlook\tplay\n\
             \"1\"\t0.0\t0.5\t0.0\t0.0\t0.0\t2.0\t0.0\t\n\
             \"10\"\t1.25\t0.0\t0.0\t0.0\t0.0\t0.0\t0.0\t\n"
        );
        assert_eq!(dataset.rows, 2);
        assert_eq!(dataset.sample_size, Some(4));
        assert_eq!(dataset.table_file(), "study.dat");
        assert_eq!(dataset.script_file(), "study.plt");
    }

    #[test]
    fn test_run_script() {
        let encoder = DatasetEncoder::new(ActionSet::Engagement, Some(12));
        let dataset = encoder.encode_runs("study", &BTreeMap::new(), 6);

        assert_eq!(
            dataset.script,
            "set key autotitle columnheader\n\
             set xlabel \"Runs\"\n\
             set ylabel \"Interactions per minutes/per child\"\n\
             set terminal pngcairo size 800,600 enhanced font 'Verdana,10'\n\
             set yrange [0:12]\n\
             set title 'study (n=6)'\n\
             set output 'study.png'\n\
             set style data histograms\n\
             set style histogram rowstacked\n\
             set boxwidth 0.9 relative\n\
             set style fill solid 1.0 border -1\n\
             set palette defined (0 '#0f5778', 1 '#c50e00', 2 '#32782e', 3 '#6bff62', 4 '#dfe934', 5 '#f25329', 6 '#45170c')\n\
             unset colorbox\n\
             plot for [i=2:8] 'study.dat' using i:xtic(1) lt palette frac (i-2)/6.\n"
        );
    }

    #[test]
    fn test_subject_table_and_script() {
        let encoder = DatasetEncoder::new(ActionSet::Engagement, None);
        let data = rows(&[("p03", &[(Action::Play, 7.0)]), ("p10", &[])]);

        let dataset = encoder.encode_subjects("children", &data);

        assert_eq!(
            dataset.table,
            "# Actions by subject and type\n\
             Subject\tshow\ttalk\ttouch\tmis\tges\tlook\tplay\n\
             \"p03\"\t0\t0\t0\t0\t0\t0\t7\t\n\
             \"p10\"\t0\t0\t0\t0\t0\t0\t0\t\n"
        );
        assert!(dataset.script.contains("set xlabel \"Subject\"\n"));
        assert!(dataset.script.contains("set ylabel \"Nb of Interactions\"\n"));
        assert!(dataset.script.contains("set title 'children'\n"));
        assert!(!dataset.script.contains("yrange"));
        assert_eq!(dataset.kind, DatasetKind::Subjects);
        assert_eq!(dataset.sample_size, None);
    }

    #[test]
    fn test_full_set_palette_has_eleven_colours() {
        let encoder = DatasetEncoder::new(ActionSet::Full, None);
        let dataset = encoder.encode_subjects("all", &BTreeMap::new());

        assert!(dataset
            .script
            .contains("set palette defined (0 '#0f5778', 1 '#c50e00', 2 '#c5008d', 3 '#4852e3', 4 '#20b9ff', 5 '#32782e', 6 '#6bff62', 7 '#dfe934', 8 '#f9e0a2', 9 '#f25329', 10 '#45170c')\n"));
        assert!(dataset
            .script
            .ends_with("plot for [i=2:12] 'all.dat' using i:xtic(1) lt palette frac (i-2)/10.\n"));
    }

    #[test]
    fn test_missing_label_renders_placeholder() {
        let encoder = DatasetEncoder::new(ActionSet::Full, None);
        let mut data = BTreeMap::new();
        data.insert(
            "1".to_string(),
            ActionCounts::from_pairs(ActionSet::Engagement, &[(Action::Talk, 2.0)]),
        );

        let dataset = encoder.encode_subjects("mixed", &data);
        let row = dataset.table.lines().nth(2).unwrap();
        assert_eq!(row, "\"1\"\t0\t2\t-\t-\t-\t0\t0\t0\t-\t0\t0\t");
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(0.0), "0.0");
        assert_eq!(format_rate(2.0), "2.0");
        assert_eq!(format_rate(0.5), "0.5");
        assert_eq!(format_rate(1.25), "1.25");
        assert_eq!(format_rate(1.0 / 3.0), "0.333333333333");
        assert_eq!(format_rate(1.0 / 6.0), "0.166666666667");
        assert_eq!(format_rate(0.000025), "2.5e-05");
        assert_eq!(format_rate(1.0 / 30000.0), "3.33333333333e-05");
        assert_eq!(format_rate(0.0001), "0.0001");
        assert_eq!(format_rate(123456789012.0), "123456789012.0");
        assert_eq!(format_rate(1e12), "1e+12");
        assert_eq!(format_rate(1e16), "1e+16");
    }

    #[test]
    fn test_format_rate_rounds_into_next_decade() {
        assert_eq!(format_rate(999999999999.9), "1e+12");
        assert_eq!(format_rate(0.99999999999999), "1.0");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0.0), "0");
        assert_eq!(format_count(42.0), "42");
    }
}
