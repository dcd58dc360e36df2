use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use tfprofile_types::{Metrics, ParsedLog};

use crate::error::{Error, Result};

/// Column a resource table can be ordered by
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortField {
    Resource,
    NumCalls,
    TotalTime,
    ModifyStarted,
    ModifyEnded,
    DesiredState,
    Operation,
    FinalState,
}

impl SortField {
    /// Resolve a column name or its long alias
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "resource" | "address" => Some(Self::Resource),
            "n" | "num_calls" => Some(Self::NumCalls),
            "tot_time" | "total_time" => Some(Self::TotalTime),
            "modify_started" | "started" => Some(Self::ModifyStarted),
            "modify_ended" | "completed" => Some(Self::ModifyEnded),
            "desired_state" | "desired_status" => Some(Self::DesiredState),
            "operation" => Some(Self::Operation),
            "final_state" | "after_status" => Some(Self::FinalState),
            _ => None,
        }
    }

    /// Column name as shown in the table header
    pub fn name(&self) -> &'static str {
        match self {
            Self::Resource => "resource",
            Self::NumCalls => "n",
            Self::TotalTime => "tot_time",
            Self::ModifyStarted => "modify_started",
            Self::ModifyEnded => "modify_ended",
            Self::DesiredState => "desired_state",
            Self::Operation => "operation",
            Self::FinalState => "final_state",
        }
    }

    fn compare(&self, a: (&str, &Metrics), b: (&str, &Metrics)) -> Ordering {
        let (addr_a, ma) = a;
        let (addr_b, mb) = b;
        match self {
            Self::Resource => addr_a.cmp(addr_b),
            Self::NumCalls => ma.num_calls.cmp(&mb.num_calls),
            Self::TotalTime => ma.total_time_ms.cmp(&mb.total_time_ms),
            Self::ModifyStarted => ma
                .started_index_or_sentinel()
                .cmp(&mb.started_index_or_sentinel()),
            Self::ModifyEnded => ma
                .completed_index_or_sentinel()
                .cmp(&mb.completed_index_or_sentinel()),
            Self::DesiredState => ma.desired_status.as_str().cmp(mb.desired_status.as_str()),
            Self::Operation => ma.operation.as_str().cmp(mb.operation.as_str()),
            Self::FinalState => ma.after_status.as_str().cmp(mb.after_status.as_str()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// One `field=direction` pair
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub direction: Direction,
}

/// Multi-key ordering over resources, e.g. `tot_time=desc,n=asc`
///
/// Keys are applied left to right; remaining ties fall back to the
/// resource address, ascending, so every ordering is total.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    /// Parse a comma-separated list of `field=asc|desc` pairs
    ///
    /// A blank specification is valid and sorts by address.
    pub fn parse(spec: &str) -> Result<Self> {
        if spec.trim().is_empty() {
            return Ok(Self::default());
        }

        let keys = spec
            .split(',')
            .map(|pair| parse_key(pair.trim()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { keys })
    }

    /// Addresses of `log` in this order; the log itself is untouched
    pub fn sort<'a>(&self, log: &'a ParsedLog) -> Vec<&'a str> {
        let mut rows: Vec<(&str, &Metrics)> =
            log.iter().map(|(addr, m)| (addr.as_str(), m)).collect();
        rows.sort_by(|a, b| self.compare(*a, *b));
        rows.into_iter().map(|(addr, _)| addr).collect()
    }

    fn compare(&self, a: (&str, &Metrics), b: (&str, &Metrics)) -> Ordering {
        self.keys
            .iter()
            .map(|key| {
                let ord = key.field.compare(a, b);
                match key.direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            })
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| a.0.cmp(b.0))
    }
}

fn parse_key(pair: &str) -> Result<SortKey> {
    if pair.is_empty() {
        return Err(Error::SortConfig("empty sort key".to_string()));
    }
    let (field, direction) = pair.split_once('=').ok_or_else(|| {
        Error::SortConfig(format!("expected `field=asc|desc`, got `{pair}`"))
    })?;

    let field = field.trim();
    let field = SortField::from_name(field)
        .ok_or_else(|| Error::SortConfig(format!("unknown sort field `{field}`")))?;

    let direction = match direction.trim() {
        "asc" => Direction::Asc,
        "desc" => Direction::Desc,
        other => {
            return Err(Error::SortConfig(format!(
                "unknown sort direction `{other}` for `{}`",
                field.name()
            )));
        }
    };

    Ok(SortKey { field, direction })
}

impl FromStr for SortSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.keys.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            let direction = match key.direction {
                Direction::Asc => "asc",
                Direction::Desc => "desc",
            };
            write!(f, "{}={}", key.field.name(), direction)?;
        }
        Ok(())
    }
}
