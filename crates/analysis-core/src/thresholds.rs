//! Fixed scoring tables.
//!
//! Both scorers express their rules as ordered tables rather than chains of
//! conditionals. A [`ThresholdTable`] is scanned top-down and the first rule
//! whose bound matches decides the points; when nothing matches the table's
//! fallback applies. A [`BandTable`] maps a value to the half-open band that
//! contains it.

/// Strict comparison against a single bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    /// value > bound
    Above(f64),
    /// value < bound
    Below(f64),
}

impl Bound {
    pub fn matches(&self, value: f64) -> bool {
        match *self {
            Bound::Above(b) => value > b,
            Bound::Below(b) => value < b,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdTable {
    pub name: &'static str,
    pub rules: &'static [(Bound, i32)],
    pub fallback: i32,
}

impl ThresholdTable {
    pub const fn new(name: &'static str, rules: &'static [(Bound, i32)], fallback: i32) -> Self {
        Self { name, rules, fallback }
    }

    /// Points for `value`: first matching rule wins. NaN never matches.
    pub fn points(&self, value: f64) -> i32 {
        self.rules
            .iter()
            .find(|(bound, _)| bound.matches(value))
            .map(|&(_, points)| points)
            .unwrap_or(self.fallback)
    }

    /// Largest contribution this table can make.
    pub fn max_points(&self) -> i32 {
        self.rules
            .iter()
            .map(|&(_, p)| p)
            .fold(self.fallback, i32::max)
    }
}

/// A `[lower, upper)` range; `lower_inclusive = false` makes it `(lower, upper)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub lower: f64,
    pub upper: f64,
    pub lower_inclusive: bool,
    pub points: i32,
}

impl Band {
    pub fn contains(&self, value: f64) -> bool {
        let above_lower = if self.lower_inclusive { value >= self.lower } else { value > self.lower };
        above_lower && value < self.upper
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandTable {
    pub name: &'static str,
    pub bands: &'static [Band],
}

impl BandTable {
    pub const fn new(name: &'static str, bands: &'static [Band]) -> Self {
        Self { name, bands }
    }

    /// Points of the first band containing `value`, 0 if none does.
    pub fn points(&self, value: f64) -> i32 {
        self.bands
            .iter()
            .find(|band| band.contains(value))
            .map(|band| band.points)
            .unwrap_or(0)
    }

    pub fn max_points(&self) -> i32 {
        self.bands.iter().map(|b| b.points).fold(0, i32::max)
    }
}
