//! Filter builders for `-filter_complex` graphs and `-vf` chains.

use std::fmt;

/// Wraps a stream label in brackets (`0:v` -> `[0:v]`).
#[must_use]
pub fn label(name: &str) -> String {
    format!("[{name}]")
}

/// One step of a filter graph: labeled inputs, a comma-joined chain of
/// filters, labeled outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterStep {
    inputs: Vec<String>,
    filters: Vec<String>,
    outputs: Vec<String>,
}

impl FilterStep {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an input label (without brackets).
    #[must_use]
    pub fn input(mut self, name: impl Into<String>) -> Self {
        self.inputs.push(name.into());
        self
    }

    /// Adds a filter to the chain. Empty filters are ignored.
    #[must_use]
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        if !filter.is_empty() {
            self.filters.push(filter);
        }
        self
    }

    /// Adds an output label (without brackets).
    #[must_use]
    pub fn output(mut self, name: impl Into<String>) -> Self {
        self.outputs.push(name.into());
        self
    }

    #[must_use]
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    #[must_use]
    pub fn outputs(&self) -> &[String] {
        &self.outputs
    }
}

impl fmt::Display for FilterStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for name in &self.inputs {
            write!(f, "[{name}]")?;
        }
        write!(f, "{}", self.filters.join(","))?;
        for name in &self.outputs {
            write!(f, "[{name}]")?;
        }
        Ok(())
    }
}

/// A complete filter graph; steps are joined with `;`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterGraph {
    steps: Vec<FilterStep>,
}

impl FilterGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn step(mut self, step: FilterStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn push(&mut self, step: FilterStep) {
        self.steps.push(step);
    }

    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn steps(&self) -> &[FilterStep] {
        &self.steps
    }

    #[must_use]
    pub fn build(&self) -> String {
        self.steps
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl fmt::Display for FilterGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build())
    }
}

/// Builder for simple `-vf` filter chains
#[derive(Debug, Default)]
pub struct VideoFilterChain {
    filters: Vec<String>,
}

impl VideoFilterChain {
    /// Creates a new empty filter chain
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `scale=<expr>` filter. Blank expressions are ignored.
    #[must_use]
    pub fn add_scale(self, expr: &str) -> Self {
        let expr = expr.trim();
        if expr.is_empty() {
            self
        } else {
            self.add_filter(format!("scale={expr}"))
        }
    }

    /// Adds a custom filter to the chain
    #[must_use]
    pub fn add_filter(mut self, filter: String) -> Self {
        if !filter.is_empty() {
            self.filters.push(filter);
        }
        self
    }

    /// Builds the chain into a single filter string
    #[must_use]
    pub fn build(self) -> Option<String> {
        if self.filters.is_empty() {
            None
        } else {
            Some(self.filters.join(","))
        }
    }
}
