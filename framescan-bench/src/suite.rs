//! Benchmark suites: ordered, parameterized queries.

use crate::{BenchError, BenchResult};

/// Placeholder substituted with the entry ordinal in query templates.
pub const ORDINAL_PLACEHOLDER: &str = "{ordinal}";

const TPCH_QUERY_TEMPLATE: &str = "PRAGMA tpch({ordinal})";

const TPCH_QUERY_NAMES: [&str; 22] = [
    "Pricing Summary Report",
    "Minimum Cost Supplier",
    "Shipping Priority",
    "Order Priority Checking",
    "Local Supplier Volume",
    "Forecasting Revenue Change",
    "Volume Shipping",
    "National Market Share",
    "Product Type Profit Measure",
    "Returned Item Reporting",
    "Important Stock Identification",
    "Shipping Modes and Order Priority",
    "Customer Distribution",
    "Promotion Effect",
    "Top Supplier",
    "Parts/Supplier Relationship",
    "Small-Quantity-Order Revenue",
    "Large Volume Customer",
    "Discounted Revenue",
    "Potential Part Promotion",
    "Suppliers Who Kept Orders Waiting",
    "Global Sales Opportunity",
];

/// `{prefix}{tag}_q{ordinal:02}`, e.g. `pandas_tpch_q07`.
pub fn benchmark_name(prefix: &str, tag: &str, ordinal: u32) -> String {
    format!("{}{}_q{:02}", prefix, tag, ordinal)
}

pub fn render_template(template: &str, ordinal: u32) -> String {
    template.replace(ORDINAL_PLACEHOLDER, &ordinal.to_string())
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuiteEntry {
    pub ordinal: u32,
    pub name: String,
    pub query: String,
}

impl SuiteEntry {
    pub fn new(ordinal: u32, name: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            ordinal,
            name: name.into(),
            query: query.into(),
        }
    }

    pub fn from_template(ordinal: u32, name: impl Into<String>, template: &str) -> Self {
        Self::new(ordinal, name, render_template(template, ordinal))
    }
}

#[derive(Debug, Clone)]
pub struct Suite {
    tag: String,
    extensions: Vec<String>,
    entries: Vec<SuiteEntry>,
}

impl Suite {
    /// Ordinals must start at 1 and strictly increase.
    pub fn new(tag: impl Into<String>, entries: Vec<SuiteEntry>) -> BenchResult<Self> {
        let tag = tag.into();
        if entries.is_empty() {
            return Err(BenchError::Config(format!("suite {} has no entries", tag)));
        }
        let mut last = 0;
        for entry in &entries {
            if entry.ordinal <= last {
                return Err(BenchError::Config(format!(
                    "suite {}: ordinal {} out of order",
                    tag, entry.ordinal
                )));
            }
            last = entry.ordinal;
        }
        Ok(Self {
            tag,
            extensions: Vec::new(),
            entries,
        })
    }

    /// The 22 TPC-H queries, as shipped by the engine's `tpch` extension.
    pub fn tpch() -> Self {
        let entries = TPCH_QUERY_NAMES
            .iter()
            .zip(1..)
            .map(|(name, ordinal)| SuiteEntry::from_template(ordinal, *name, TPCH_QUERY_TEMPLATE))
            .collect();
        Self {
            tag: "tpch".to_string(),
            extensions: Vec::new(),
            entries,
        }
        .with_extension("tpch")
    }

    /// Engine extension every session running this suite must load.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extensions.push(extension.into());
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn entries(&self) -> &[SuiteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
