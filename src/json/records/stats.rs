use grep_cli::is_tty_stdout;
use owo_colors::{OwoColorize, Stream};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use crate::json::IndexMap;

/// Container for the data collected about a flattening run along the way
#[derive(Debug, PartialEq, Eq, Default, Clone, Serialize, Deserialize)]
pub struct Stats {
    pub record_count: usize,
    pub leaf_types_count: IndexMap<String, usize>,
    pub failed_records: Vec<String>,
}

impl Stats {
    pub fn new() -> Stats {
        Stats {
            record_count: 0,
            leaf_types_count: IndexMap::new(),
            failed_records: Vec::new(),
        }
    }

    pub fn leaf_type_occurance(&self) -> IndexMap<String, f64> {
        self.leaf_types_count
            .iter()
            .map(|(k, v)| (k.to_owned(), 100f64 * *v as f64 / self.record_count as f64))
            .collect()
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stream = Stream::Stdout;
        writeln!(f, "Records written: {}", self.record_count)?;
        writeln!(f, "\nLeaf type counts:\n{:#?}", self.leaf_types_count)?;
        writeln!(f, "\nLeaf type occurance rate:")?;
        for (k, v) in self.leaf_type_occurance() {
            writeln!(f, "{}: {:.3}%", k, v)?;
        }
        if !self.failed_records.is_empty() {
            writeln!(
                f,
                "{}\n{:?}",
                "Failed records:".if_supports_color(stream, |text| text.red()),
                self.failed_records
                    .if_supports_color(stream, |text| text.red())
            )?;
        }
        Ok(())
    }
}

impl Stats {
    pub fn print(&self) -> std::result::Result<(), serde_json::Error> {
        if is_tty_stdout() {
            println!("{}", self);
            Ok(())
        } else {
            let json_out = serde_json::to_string_pretty(self)?;
            println!("{}", json_out);
            Ok(())
        }
    }
}

impl Add for Stats {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        let mut output = self;

        for (k, v) in rhs.leaf_types_count {
            let counter = output.leaf_types_count.entry(k).or_insert(0);
            *counter += v
        }

        output.record_count += rhs.record_count;
        output.failed_records.extend(rhs.failed_records);

        output
    }
}

impl Add<&Self> for Stats {
    type Output = Self;

    fn add(self, rhs: &Self) -> Self::Output {
        self.add(rhs.clone())
    }
}

impl<'a> Sum<&'a Self> for Stats {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, x| acc + x)
    }
}
