//! Grid points and parameter grids.
//!
//! A [`GridPoint`] is one configuration of a sweep: an ordered list of
//! `name = value` tags. A [`ParamGrid`] holds named axes and lazily yields
//! the cartesian product of their values, first axis outermost, which is the
//! order nested `for` loops over the axes would produce.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single tag value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl TagValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TagValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers widen to floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TagValue::Float(x) => Some(*x),
            TagValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TagValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Bool(b) => write!(f, "{}", b),
            TagValue::Int(i) => write!(f, "{}", i),
            TagValue::Float(x) => write!(f, "{}", x),
            TagValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for TagValue {
    fn from(v: bool) -> Self {
        TagValue::Bool(v)
    }
}

impl From<i64> for TagValue {
    fn from(v: i64) -> Self {
        TagValue::Int(v)
    }
}

impl From<usize> for TagValue {
    fn from(v: usize) -> Self {
        TagValue::Int(v as i64)
    }
}

impl From<f64> for TagValue {
    fn from(v: f64) -> Self {
        TagValue::Float(v)
    }
}

impl From<&str> for TagValue {
    fn from(v: &str) -> Self {
        TagValue::Str(v.to_string())
    }
}

impl From<String> for TagValue {
    fn from(v: String) -> Self {
        TagValue::Str(v)
    }
}

/// One configuration to benchmark: ordered `name = value` tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    tags: Vec<(String, TagValue)>,
}

impl GridPoint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a tag. A repeated name replaces the earlier value in place.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<TagValue>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.tags.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.tags.push((name, value)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&TagValue> {
        self.tags.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Tag names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagValue)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// True when both points carry the same tag names in the same order.
    pub fn same_keys(&self, other: &GridPoint) -> bool {
        self.keys().eq(other.keys())
    }
}

impl fmt::Display for GridPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.tags.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", k, v)?;
        }
        f.write_str("}")
    }
}

/// Named axes whose cartesian product forms the sweep.
#[derive(Debug, Clone, Default)]
pub struct ParamGrid {
    axes: Vec<(String, Vec<TagValue>)>,
}

impl ParamGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an axis. Axes added first vary slowest.
    pub fn axis<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<TagValue>,
    {
        self.axes
            .push((name.into(), values.into_iter().map(Into::into).collect()));
        self
    }

    /// Number of grid points. Zero if any axis is empty.
    pub fn len(&self) -> usize {
        if self.axes.is_empty() {
            return 0;
        }
        self.axes.iter().map(|(_, v)| v.len()).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lazily iterate over all grid points.
    pub fn points(&self) -> GridPoints<'_> {
        GridPoints {
            grid: self,
            cursor: vec![0; self.axes.len()],
            done: self.is_empty(),
        }
    }
}

/// Iterator over the points of a [`ParamGrid`].
pub struct GridPoints<'a> {
    grid: &'a ParamGrid,
    cursor: Vec<usize>,
    done: bool,
}

impl Iterator for GridPoints<'_> {
    type Item = GridPoint;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let point = self
            .grid
            .axes
            .iter()
            .zip(&self.cursor)
            .fold(GridPoint::new(), |p, ((name, values), &i)| {
                p.with(name.clone(), values[i].clone())
            });

        // Odometer increment, last axis fastest.
        self.done = true;
        for (slot, (_, values)) in self.cursor.iter_mut().zip(&self.grid.axes).rev() {
            *slot += 1;
            if *slot < values.len() {
                self.done = false;
                break;
            }
            *slot = 0;
        }

        Some(point)
    }
}

/// `num` integers evenly spaced on a log10 scale between `start` and `stop`,
/// both inclusive, rounded to the nearest integer.
pub fn logspace_int(start: usize, stop: usize, num: usize) -> Vec<usize> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let lo = (start.max(1) as f64).log10();
            let hi = (stop.max(1) as f64).log10();
            let step = (hi - lo) / (num - 1) as f64;
            (0..num)
                .map(|i| 10f64.powf(lo + step * i as f64).round() as usize)
                .collect()
        }
    }
}
