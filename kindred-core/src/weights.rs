//! Category weights used to blend per-category similarity.
//!
//! Callers supply partial [`WeightOverrides`]; [`WeightConfig::resolve`]
//! merges them onto [`DEFAULT_WEIGHTS`], discards unusable entries and
//! renormalises so the result always sums to `1.0`.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Deserializer, Serialize};

use crate::Category;

/// Built-in category weights applied when no override is supplied.
pub const DEFAULT_WEIGHTS: [(Category, f64); 4] = [
    (Category::Movie, 0.35),
    (Category::Tv, 0.25),
    (Category::Artist, 0.25),
    (Category::Hobby, 0.15),
];

/// Partial weight overrides supplied by a caller.
///
/// Malformed input is never an error. Deserialisation and
/// [`WeightOverrides::from_json`] silently drop unknown categories and
/// non-numeric values; [`WeightConfig::resolve`] later drops non-positive and
/// non-finite weights.
///
/// # Examples
/// ```
/// use kindred_core::{Category, WeightOverrides};
///
/// let overrides: WeightOverrides =
///     serde_json::from_str(r#"{"movie": 0.5, "podcast": 1.0, "tv": "lots"}"#).unwrap();
/// assert_eq!(overrides.get(Category::Movie), Some(0.5));
/// assert_eq!(overrides.get(Category::Tv), None);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct WeightOverrides {
    weights: BTreeMap<Category, f64>,
}

impl WeightOverrides {
    /// Construct an empty set of overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the override for a category.
    pub fn set_weight(&mut self, category: Category, weight: f64) {
        self.weights.insert(category, weight);
    }

    /// Add an override while returning `self` for chaining.
    #[must_use]
    pub fn with_weight(mut self, category: Category, weight: f64) -> Self {
        self.set_weight(category, weight);
        self
    }

    /// Return the override for a category, if present.
    #[must_use]
    pub fn get(&self, category: Category) -> Option<f64> {
        self.weights.get(&category).copied()
    }

    /// Report whether no overrides were supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Build overrides from an untyped JSON payload.
    ///
    /// Anything other than an object yields no overrides. Keys are parsed as
    /// categories; entries whose key or value cannot be interpreted are
    /// skipped.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };
        let weights = object
            .iter()
            .filter_map(|(key, raw)| {
                let category = key.parse::<Category>().ok()?;
                let weight = raw.as_f64()?;
                Some((category, weight))
            })
            .collect();
        Self { weights }
    }
}

impl<'de> Deserialize<'de> for WeightOverrides {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        Ok(Self::from_json(&value))
    }
}

/// Normalised category weights.
///
/// Invariant: unless empty, the weights are finite, positive and sum to
/// `1.0` within floating tolerance. An empty config only arises from
/// [`WeightConfig::restricted_to`] when no weighted category is active.
///
/// # Examples
/// ```
/// use kindred_core::{Category, WeightConfig, WeightOverrides};
///
/// let overrides = WeightOverrides::new().with_weight(Category::Hobby, -1.0);
/// let config = WeightConfig::resolve(Some(&overrides));
/// assert_eq!(config.get(Category::Hobby), None);
/// assert!((config.total() - 1.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WeightConfig {
    weights: BTreeMap<Category, f64>,
}

impl WeightConfig {
    /// Return the normalised [`DEFAULT_WEIGHTS`].
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            weights: normalise(DEFAULT_WEIGHTS.into_iter().collect()),
        }
    }

    /// Merge overrides onto the defaults and renormalise.
    ///
    /// Non-positive and non-finite weights are discarded. When nothing valid
    /// remains the defaults are used instead.
    #[must_use]
    pub fn resolve(overrides: Option<&WeightOverrides>) -> Self {
        let mut merged: BTreeMap<Category, f64> = DEFAULT_WEIGHTS.into_iter().collect();
        if let Some(supplied) = overrides {
            merged.extend(supplied.weights.iter().map(|(c, w)| (*c, *w)));
        }
        let weights = normalise(merged);
        if weights.is_empty() {
            Self::defaults()
        } else {
            Self { weights }
        }
    }

    /// Keep only the `active` categories and renormalise.
    ///
    /// The result is empty when none of the active categories carries a
    /// weight.
    #[must_use]
    pub fn restricted_to(&self, active: &BTreeSet<Category>) -> Self {
        let kept = self
            .weights
            .iter()
            .filter(|(category, _)| active.contains(*category))
            .map(|(category, weight)| (*category, *weight))
            .collect();
        Self {
            weights: normalise(kept),
        }
    }

    /// Return the weight for a category, if it carries one.
    #[must_use]
    pub fn get(&self, category: Category) -> Option<f64> {
        self.weights.get(&category).copied()
    }

    /// Return the weight for a category, treating absent entries as `0.0`.
    #[must_use]
    pub fn weight(&self, category: Category) -> f64 {
        self.get(category).unwrap_or(0.0)
    }

    /// Sum of all weights.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Report whether no category carries a weight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Iterate over weighted categories in scoring order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        self.weights.iter().map(|(category, weight)| (*category, *weight))
    }
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

fn is_usable(weight: f64) -> bool {
    weight.is_finite() && weight > 0.0
}

#[expect(
    clippy::float_arithmetic,
    reason = "renormalising divides each weight by the total"
)]
fn normalise(raw: BTreeMap<Category, f64>) -> BTreeMap<Category, f64> {
    let usable: BTreeMap<Category, f64> = raw
        .into_iter()
        .filter(|(_, weight)| is_usable(*weight))
        .collect();
    let sum: f64 = usable.values().sum();
    if !is_usable(sum) {
        return BTreeMap::new();
    }
    usable
        .into_iter()
        .map(|(category, weight)| (category, weight / sum))
        .collect()
}
