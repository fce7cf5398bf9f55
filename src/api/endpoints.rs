//! Resource paths and query construction

use std::fmt;
use std::str::FromStr;

use anyhow::bail;

pub const DEFAULT_API_BASE: &str = "https://api.toon.eu/toon/v3";

pub const AGREEMENTS: &str = "/agreements";
pub const STATUS: &str = "/status";
pub const GAS_FLOWS: &str = "/consumption/gas/flows";
pub const GAS_DATA: &str = "/consumption/gas/data";
pub const ELECTRICITY_FLOWS: &str = "/consumption/electricity/flows";
pub const ELECTRICITY_DATA: &str = "/consumption/electricity/data";
pub const DISTRICT_HEAT_DATA: &str = "/consumption/districtheat/data";

/// Bucket size for graph data
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Interval {
    /// Let the server pick (hourly for graphs)
    #[default]
    None,
    Hours,
    Days,
    Weeks,
    Months,
    Years,
}

impl Interval {
    pub const ALL: [Interval; 6] = [
        Interval::None,
        Interval::Hours,
        Interval::Days,
        Interval::Weeks,
        Interval::Months,
        Interval::Years,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::None => "none",
            Interval::Hours => "hours",
            Interval::Days => "days",
            Interval::Weeks => "weeks",
            Interval::Months => "months",
            Interval::Years => "years",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let lower = s.to_lowercase();
        match Interval::ALL.iter().find(|i| i.as_str() == lower) {
            Some(interval) => Ok(*interval),
            None => bail!("Interval {} not supported", s),
        }
    }
}

/// Unix timestamps in milliseconds; unset bounds fall back to the server default (last 24h).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl TimeRange {
    pub fn new(start: Option<i64>, end: Option<i64>) -> Self {
        Self { start, end }
    }
}

/// `fromTime`, `toTime` and `interval` query parameters, in that order.
pub fn time_params(range: TimeRange, interval: Interval) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(start) = range.start {
        params.push(("fromTime", start.to_string()));
    }
    if let Some(end) = range.end {
        params.push(("toTime", end.to_string()));
    }
    if interval != Interval::None {
        params.push(("interval", interval.to_string()));
    }
    params
}

/// `{base}[/{agreement_id}]{endpoint}[?query]`
pub fn endpoint_url(
    base: &str,
    endpoint: &str,
    params: &[(&str, String)],
    agreement_id: Option<&str>,
) -> String {
    let base = base.trim_end_matches('/');
    let mut uri = match agreement_id {
        Some(id) if !id.is_empty() => format!("{}/{}{}", base, id, endpoint),
        _ => format!("{}{}", base, endpoint),
    };

    if !params.is_empty() {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())))
            .finish();
        uri.push('?');
        uri.push_str(&query);
    }
    uri
}
