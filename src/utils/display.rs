//! Display and output formatting utilities

use crate::config::OutputFormat;
use crate::sat::{ClauseStore, Key, Solution, Var};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Format solutions for display
pub struct SolutionFormatter;

/// One line of `solutions_summary.json`
#[derive(Debug, Clone, Serialize)]
pub struct SolutionSummary {
    pub index: usize,
    pub true_count: usize,
    pub solve_time_ms: u128,
}

impl From<&Solution> for SolutionSummary {
    fn from(solution: &Solution) -> Self {
        Self {
            index: solution.index,
            true_count: solution.len(),
            solve_time_ms: solution.solve_time.as_millis(),
        }
    }
}

impl SolutionFormatter {
    /// Format a single solution for console output. With a store, true variables that carry
    /// a label are listed by label as well.
    pub fn format_solution(solution: &Solution, store: Option<&ClauseStore>) -> String {
        let mut output = String::new();

        output.push_str(&format!("=== Solution {} ===\n", solution.index));
        output.push_str(&format!("Solve Time: {:.3}s\n", solution.solve_time.as_secs_f64()));
        output.push_str(&format!("True Variables: {}\n", solution.len()));

        let vars: Vec<String> = solution.true_vars.iter().map(Var::to_string).collect();
        output.push_str(&format!("v {} 0\n", vars.join(" ")));

        if let Some(store) = store {
            let labelled: Vec<String> = store
                .allocator()
                .allocations()
                .filter(|(_, var)| solution.contains(*var))
                .map(|(label, var)| format!("  {:>6}  {}", var, label))
                .collect();
            if !labelled.is_empty() {
                output.push_str("Labelled:\n");
                output.push_str(&labelled.join("\n"));
                output.push('\n');
            }
        }

        output
    }

    /// Format multiple solutions as a summary table
    pub fn format_solution_summary(solutions: &[Solution]) -> String {
        let mut output = String::new();

        output.push_str("Solutions Summary:\n");
        output.push_str("Index    | Time(ms) | True\n");
        output.push_str("---------|----------|--------\n");

        for solution in solutions {
            output.push_str(&format!(
                "{:8} | {:8} | {:6}\n",
                solution.index,
                solution.solve_time.as_millis(),
                solution.len()
            ));
        }

        output
    }

    /// Rows padded into aligned columns
    pub fn format_table(rows: &[Vec<String>]) -> String {
        let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
        let widths: Vec<usize> = (0..columns)
            .map(|c| {
                rows.iter()
                    .filter_map(|row| row.get(c))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut output = String::new();
        for row in rows {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, &width)| format!("{:width$}", cell, width = width))
                .collect();
            output.push_str(cells.join(" | ").trim_end());
            output.push('\n');
        }
        output
    }

    /// Picture of a region over grid cells: `█` where the cell's variable is true in
    /// `solution`, `·` where it is false, blank where the grid has no such cell.
    /// Non-point keys are ignored.
    pub fn format_region(cells: &BTreeMap<Key, Var>, solution: &Solution) -> String {
        let points: Vec<(i64, i64, bool)> = cells
            .iter()
            .filter_map(|(key, &var)| match key {
                Key::Point(x, y) => Some((*x, *y, solution.contains(var))),
                _ => None,
            })
            .collect();
        let (Some(min_x), Some(max_x), Some(min_y), Some(max_y)) = (
            points.iter().map(|p| p.0).min(),
            points.iter().map(|p| p.0).max(),
            points.iter().map(|p| p.1).min(),
            points.iter().map(|p| p.1).max(),
        ) else {
            return String::new();
        };

        let lookup: BTreeMap<(i64, i64), bool> = points.into_iter().map(|(x, y, on)| ((x, y), on)).collect();
        let mut output = String::new();
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                output.push(match lookup.get(&(x, y)) {
                    Some(true) => '█',
                    Some(false) => '·',
                    None => ' ',
                });
            }
            output.push('\n');
        }
        output
    }

    /// Save solutions to files based on output format
    pub fn save_solutions<P: AsRef<Path>>(
        solutions: &[Solution],
        output_dir: P,
        format: OutputFormat,
        store: Option<&ClauseStore>,
    ) -> Result<()> {
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

        match format {
            OutputFormat::Text => {
                for solution in solutions {
                    let filepath = output_dir.join(format!("solution_{:03}.txt", solution.index));
                    std::fs::write(&filepath, Self::format_solution(solution, store))
                        .with_context(|| format!("Failed to write {}", filepath.display()))?;
                }
            }
            OutputFormat::Json => {
                for solution in solutions {
                    let filepath = output_dir.join(format!("solution_{:03}.json", solution.index));
                    let json = serde_json::to_string_pretty(solution)?;
                    std::fs::write(&filepath, json)
                        .with_context(|| format!("Failed to write {}", filepath.display()))?;
                }

                let summary_path = output_dir.join("solutions_summary.json");
                let summaries: Vec<SolutionSummary> = solutions.iter().map(SolutionSummary::from).collect();
                std::fs::write(&summary_path, serde_json::to_string_pretty(&summaries)?)
                    .with_context(|| format!("Failed to write {}", summary_path.display()))?;
            }
        }

        Ok(())
    }
}

/// Color output utilities
pub struct ColorOutput;

impl ColorOutput {
    /// Format text with color (if terminal supports it)
    pub fn colored(text: &str, color: Color) -> String {
        if Self::supports_color() {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err() && (std::env::var("TERM").unwrap_or_default() != "dumb")
    }

    pub fn success(text: &str) -> String {
        Self::colored(text, Color::Green)
    }

    pub fn error(text: &str) -> String {
        Self::colored(text, Color::Red)
    }

    pub fn warning(text: &str) -> String {
        Self::colored(text, Color::Yellow)
    }

    pub fn info(text: &str) -> String {
        Self::colored(text, Color::Blue)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label;
    use crate::test_support::in_process_store;
    use std::collections::BTreeSet;
    use std::time::Duration;
    use tempfile::tempdir;

    fn solution(index: usize, vars: &[Var]) -> Solution {
        Solution {
            index,
            true_vars: vars.iter().copied().collect::<BTreeSet<_>>(),
            solve_time: Duration::from_millis(7),
        }
    }

    #[test]
    fn test_solution_lists_labels() {
        let mut store = in_process_store();
        let a = store.auto_term(label!("a", 1)).unwrap();
        let b = store.auto_term(label!("b", 2)).unwrap();
        let text = SolutionFormatter::format_solution(&solution(1, &[b]), Some(&store));
        assert!(text.contains("=== Solution 1 ==="));
        assert!(text.contains("v 2 0"));
        assert!(text.contains("(b 2)"));
        assert!(!text.contains("(a 1)"));
        assert_eq!(a, 1);

        let plain = SolutionFormatter::format_solution(&solution(2, &[]), None);
        assert!(!plain.contains("Labelled"));
    }

    #[test]
    fn test_summary_and_table() {
        let summary = SolutionFormatter::format_solution_summary(&[solution(1, &[1, 2]), solution(2, &[3])]);
        assert_eq!(summary.lines().count(), 5);
        assert!(summary.contains("       1 |        7 |      2"));

        let rows = vec![
            vec!["ann".to_string(), "cat".to_string()],
            vec!["robert".to_string(), "-".to_string()],
        ];
        assert_eq!(SolutionFormatter::format_table(&rows), "ann    | cat\nrobert | -\n");
    }

    #[test]
    fn test_region_picture() {
        let cells = BTreeMap::from([
            (Key::Point(0, 0), 1),
            (Key::Point(1, 0), 2),
            (Key::Point(1, 1), 3),
        ]);
        let picture = SolutionFormatter::format_region(&cells, &solution(1, &[1, 3]));
        assert_eq!(picture, "█·\n █\n");
        assert_eq!(SolutionFormatter::format_region(&BTreeMap::new(), &solution(1, &[])), "");
    }

    #[test]
    fn test_save_solutions() {
        let dir = tempdir().unwrap();
        let solutions = vec![solution(1, &[1]), solution(2, &[2])];

        SolutionFormatter::save_solutions(&solutions, dir.path(), OutputFormat::Text, None).unwrap();
        assert!(dir.path().join("solution_001.txt").exists());
        assert!(dir.path().join("solution_002.txt").exists());

        let json_dir = dir.path().join("json");
        SolutionFormatter::save_solutions(&solutions, &json_dir, OutputFormat::Json, None).unwrap();
        let saved: Solution =
            serde_json::from_str(&std::fs::read_to_string(json_dir.join("solution_002.json")).unwrap()).unwrap();
        assert_eq!(saved.true_vars, BTreeSet::from([2]));
        let summary = std::fs::read_to_string(json_dir.join("solutions_summary.json")).unwrap();
        assert!(summary.contains("\"true_count\": 1"));
    }

    #[test]
    fn test_color_output() {
        let colored = ColorOutput::colored("test", Color::Red);
        assert!(colored.contains("test"));
    }
}
