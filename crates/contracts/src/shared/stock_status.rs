//! Low-stock classification.
//!
//! Every stock view buckets items by `quantity / low_stock_threshold`
//! expressed as a percentage. The cutoffs come from [`ThresholdPolicy`];
//! shops can override the default policy through [`StockPolicies`].

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::enums::ShopKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockTier {
    Critical,
    Warning,
    Normal,
}

impl StockTier {
    pub fn code(&self) -> &'static str {
        match self {
            StockTier::Critical => "critical",
            StockTier::Warning => "warning",
            StockTier::Normal => "normal",
        }
    }

    /// Case-insensitive inverse of [`StockTier::code`]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "critical" => Some(StockTier::Critical),
            "warning" => Some(StockTier::Warning),
            "normal" => Some(StockTier::Normal),
            _ => None,
        }
    }

    /// Critical and Warning items need attention
    pub fn needs_attention(&self) -> bool {
        !matches!(self, StockTier::Normal)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StockStatusError {
    #[error("low-stock threshold must be a positive number, got {0}")]
    InvalidThreshold(f64),

    #[error("quantity must be a non-negative number, got {0}")]
    InvalidQuantity(f64),

    #[error("invalid threshold policy: {0}")]
    InvalidPolicy(String),
}

/// Percentage cutoffs for one shop. Both cutoffs are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPolicy {
    pub critical_percent: f64,
    pub warning_percent: f64,
    /// Items expiring within this many days are raised to at least Warning
    #[serde(default)]
    pub expiry_warning_days: Option<i64>,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self {
            critical_percent: 20.0,
            warning_percent: 50.0,
            expiry_warning_days: Some(7),
        }
    }
}

impl ThresholdPolicy {
    pub fn validate(&self) -> Result<(), StockStatusError> {
        let finite = self.critical_percent.is_finite() && self.warning_percent.is_finite();
        if !finite || self.critical_percent < 0.0 || self.warning_percent < 0.0 {
            return Err(StockStatusError::InvalidPolicy(
                "cutoffs must be finite and non-negative".into(),
            ));
        }
        if self.critical_percent > self.warning_percent {
            return Err(StockStatusError::InvalidPolicy(format!(
                "critical cutoff {} is above warning cutoff {}",
                self.critical_percent, self.warning_percent
            )));
        }
        if matches!(self.expiry_warning_days, Some(d) if d < 0) {
            return Err(StockStatusError::InvalidPolicy(
                "expiry_warning_days must not be negative".into(),
            ));
        }
        Ok(())
    }

    pub fn classify(&self, quantity: f64, threshold: f64) -> Result<StockTier, StockStatusError> {
        let percentage = stock_percentage(quantity, threshold)?;
        Ok(self.tier_for(percentage))
    }

    fn tier_for(&self, percentage: f64) -> StockTier {
        if percentage <= self.critical_percent {
            StockTier::Critical
        } else if percentage <= self.warning_percent {
            StockTier::Warning
        } else {
            StockTier::Normal
        }
    }

    /// Classifies and applies the expiry rule against `today`
    pub fn assess(
        &self,
        quantity: f64,
        threshold: f64,
        expiry: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Result<StockAssessment, StockStatusError> {
        let percentage = stock_percentage(quantity, threshold)?;
        let mut tier = self.tier_for(percentage);

        let days_to_expiry = expiry.map(|d| (d - today).num_days());
        let expiring_soon = match (days_to_expiry, self.expiry_warning_days) {
            (Some(left), Some(window)) => left <= window,
            _ => false,
        };
        if expiring_soon && tier == StockTier::Normal {
            tier = StockTier::Warning;
        }

        Ok(StockAssessment {
            tier,
            percentage,
            expiring_soon,
            days_to_expiry,
        })
    }
}

/// `quantity / threshold * 100`, refusing inputs that would yield NaN or infinity
pub fn stock_percentage(quantity: f64, threshold: f64) -> Result<f64, StockStatusError> {
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(StockStatusError::InvalidThreshold(threshold));
    }
    if !quantity.is_finite() || quantity < 0.0 {
        return Err(StockStatusError::InvalidQuantity(quantity));
    }
    Ok(quantity / threshold * 100.0)
}

/// Classification with the default policy
pub fn classify(quantity: f64, threshold: f64) -> Result<StockTier, StockStatusError> {
    ThresholdPolicy::default().classify(quantity, threshold)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockAssessment {
    pub tier: StockTier,
    pub percentage: f64,
    pub expiring_soon: bool,
    /// Negative once the item has expired
    pub days_to_expiry: Option<i64>,
}

/// Default policy plus per-shop overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockPolicies {
    #[serde(default)]
    pub default: ThresholdPolicy,
    #[serde(default)]
    pub shops: HashMap<ShopKind, ThresholdPolicy>,
}

impl StockPolicies {
    pub fn for_shop(&self, shop: ShopKind) -> &ThresholdPolicy {
        self.shops.get(&shop).unwrap_or(&self.default)
    }

    pub fn validate(&self) -> Result<(), StockStatusError> {
        self.default.validate()?;
        for (shop, policy) in &self.shops {
            policy.validate().map_err(|e| {
                StockStatusError::InvalidPolicy(format!("shop {}: {}", shop, e))
            })?;
        }
        Ok(())
    }
}

/// Number of items per tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierCounts {
    pub critical: usize,
    pub warning: usize,
    pub normal: usize,
}

impl TierCounts {
    pub fn add(&mut self, tier: StockTier) {
        match tier {
            StockTier::Critical => self.critical += 1,
            StockTier::Warning => self.warning += 1,
            StockTier::Normal => self.normal += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.critical + self.warning + self.normal
    }
}

impl FromIterator<StockTier> for TierCounts {
    fn from_iter<I: IntoIterator<Item = StockTier>>(iter: I) -> Self {
        let mut counts = TierCounts::default();
        for tier in iter {
            counts.add(tier);
        }
        counts
    }
}
