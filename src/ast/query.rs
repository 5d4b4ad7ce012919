use serde::Serialize;

use crate::ast::{Expr, Literal, Source};

/// The query part of a statement, before any pipes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Query {
    Sequence(Sequence),
    Join(Join),
    Event(EventQuery),
}

/// Ordered series of events.
///
/// ```text
/// sequence by user.name with maxspan=5m
///   [process where process.name == "cmd.exe"]
///   [network where true]
/// until [process where event.type == "end"]
/// ```
///
/// `join_keys` come from a `by` written before `with maxspan`;
/// `disallowed_keys` from a `by` written after it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Sequence {
    pub source: Source,
    pub join_keys: Option<Vec<Expr>>,
    pub disallowed_keys: Option<Vec<Expr>>,
    pub max_span: Option<TimeValue>,
    /// Never empty.
    pub terms: Vec<SequenceTerm>,
    pub until: Option<SequenceTerm>,
}

/// Events sharing join keys, in any order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Join {
    pub source: Source,
    pub join_keys: Option<Vec<Expr>>,
    /// Never empty.
    pub terms: Vec<JoinTerm>,
    pub until: Option<JoinTerm>,
}

/// A single event filter, e.g. `process where pid == 4`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EventQuery {
    pub source: Source,
    pub filter: EventFilter,
}

/// `<category> where <condition>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EventFilter {
    pub source: Source,
    pub category: EventCategory,
    pub condition: Expr,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum EventCategory {
    /// `any`
    Any,
    /// Named category, written as an identifier or a string
    Named(String),
}

/// A bracketed filter inside a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SequenceTerm {
    pub source: Source,
    pub filter: EventFilter,
    pub keys: Option<Vec<Expr>>,
    /// `with <key>=<value>`, e.g. `with runs=3`.
    pub parameter: Option<TermParameter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TermParameter {
    pub key: String,
    /// Always a numeric literal.
    pub value: Literal,
}

/// A bracketed filter inside a join.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct JoinTerm {
    pub source: Source,
    pub filter: EventFilter,
    pub keys: Option<Vec<Expr>>,
}

/// `maxspan` value, e.g. `30s`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TimeValue {
    /// Numeric literal.
    pub amount: Literal,
    pub unit: Option<TimeUnit>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TimeUnit {
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    pub fn parse(unit: &str) -> Option<TimeUnit> {
        let unit = match unit {
            "ms" => TimeUnit::Milliseconds,
            "s" => TimeUnit::Seconds,
            "m" => TimeUnit::Minutes,
            "h" => TimeUnit::Hours,
            "d" => TimeUnit::Days,
            _ => return None,
        };
        Some(unit)
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            TimeUnit::Milliseconds => "ms",
            TimeUnit::Seconds => "s",
            TimeUnit::Minutes => "m",
            TimeUnit::Hours => "h",
            TimeUnit::Days => "d",
        }
    }

    pub fn millis(&self) -> u64 {
        match self {
            TimeUnit::Milliseconds => 1,
            TimeUnit::Seconds => 1_000,
            TimeUnit::Minutes => 60_000,
            TimeUnit::Hours => 3_600_000,
            TimeUnit::Days => 86_400_000,
        }
    }
}

impl SequenceTerm {
    /// The `runs` repetition count, when the term carries `with runs=<n>`.
    pub fn runs(&self) -> Option<i64> {
        match &self.parameter {
            Some(TermParameter {
                key,
                value: Literal::Integer(n),
            }) if key == "runs" => Some(*n),
            _ => None,
        }
    }
}

impl Query {
    pub fn source(&self) -> &Source {
        match self {
            Query::Sequence(sequence) => &sequence.source,
            Query::Join(join) => &join.source,
            Query::Event(event) => &event.source,
        }
    }
}
