//! Budget Allocator - weighted split with exact-sum reconciliation
//!
//! Amounts are whole currency units. After proportional rounding the signed
//! remainder is booked against the heaviest channel, so for every total
//! `sum(channels) + contingency == total` with no drift.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::{BudgetLine, BudgetPlan};

/// One row of a weight table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelWeight {
    pub channel: String,
    pub weight: f64,
}

impl ChannelWeight {
    pub fn new(channel: impl Into<String>, weight: f64) -> Self {
        Self { channel: channel.into(), weight }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub channels: Vec<BudgetLine>,
    pub contingency: u64,
}

impl Allocation {
    pub fn into_plan(self, total: u64) -> BudgetPlan {
        BudgetPlan {
            total,
            channels: self.channels,
            contingency: self.contingency,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetAllocator {
    contingency_percent: f64,
}

impl BudgetAllocator {
    /// Percentages outside `0..=100` are clamped.
    pub fn new(contingency_percent: f64) -> Self {
        let contingency_percent = if contingency_percent.is_finite() {
            contingency_percent.clamp(0.0, 100.0)
        } else {
            0.0
        };
        Self { contingency_percent }
    }

    pub fn contingency_percent(&self) -> f64 {
        self.contingency_percent
    }

    /// Split `total` across `weights`, holding back the contingency.
    ///
    /// Never fails: an empty table leaves everything in contingency, and a
    /// table whose weights are all zero (or invalid) is split evenly.
    pub fn allocate(&self, total: u64, weights: &[ChannelWeight]) -> Allocation {
        if weights.is_empty() {
            return Allocation { channels: vec![], contingency: total };
        }

        let contingency = self.contingency_for(total);
        let distributable = total - contingency;

        let clean: Vec<f64> = weights
            .iter()
            .map(|w| if w.weight.is_finite() && w.weight > 0.0 { w.weight } else { 0.0 })
            .collect();
        let weight_sum: f64 = clean.iter().sum();
        let shares: Vec<f64> = if weight_sum > 0.0 {
            clean.iter().map(|w| w / weight_sum).collect()
        } else {
            vec![1.0 / clean.len() as f64; clean.len()]
        };

        let mut amounts: Vec<u64> = shares
            .iter()
            .map(|share| ((distributable as f64) * share).round() as u64)
            .collect();

        reconcile(&mut amounts, &shares, distributable);

        let channels = weights
            .iter()
            .zip(amounts)
            .map(|(w, amount)| BudgetLine {
                channel: w.channel.clone(),
                amount,
                percentage: percentage_of(amount, total),
            })
            .collect();

        Allocation { channels, contingency }
    }

    fn contingency_for(&self, total: u64) -> u64 {
        let raw = ((total as f64) * self.contingency_percent / 100.0).round() as u64;
        raw.min(total)
    }
}

impl Default for BudgetAllocator {
    fn default() -> Self {
        Self::new(10.0)
    }
}

/// Book `target - sum(amounts)` against the heaviest channel (first in
/// catalog order on ties). A negative remainder larger than that channel's
/// amount spills to the next heaviest so no amount goes below zero.
fn reconcile(amounts: &mut [u64], shares: &[f64], target: u64) {
    let sum: u128 = amounts.iter().map(|a| u128::from(*a)).sum();
    let target = u128::from(target);
    if sum == target {
        return;
    }

    let mut order: Vec<usize> = (0..amounts.len()).collect();
    // Stable sort keeps catalog order among equal weights.
    order.sort_by(|&a, &b| shares[b].total_cmp(&shares[a]));

    if sum < target {
        let missing = (target - sum) as u64;
        debug!(missing, channel = order[0], "reconciling allocation shortfall");
        amounts[order[0]] += missing;
        return;
    }

    let mut excess = (sum - target) as u64;
    debug!(excess, channel = order[0], "reconciling allocation overshoot");
    for idx in order {
        if excess == 0 {
            break;
        }
        let taken = excess.min(amounts[idx]);
        amounts[idx] -= taken;
        excess -= taken;
    }
}

/// `round(amount / total * 100)`; informational only.
pub fn percentage_of(amount: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    ((amount as f64) / (total as f64) * 100.0).round() as u32
}
