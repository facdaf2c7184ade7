//! Bottling from a source container: per-line validation, the pending queue
//! and the per-(product, bottle size) run ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stillgauge_core::{AggregateRoot, DomainError, DomainResult, ExpectedVersion, ProductId};
use stillgauge_events::{AuditEntry, AuditQuantities, TransactionType};
use stillgauge_gauging::{
    Gauger, REFERENCE_TEMPERATURE_F, parse_non_negative, parse_positive_count, round2,
};

use crate::container::{ContainerState, EPSILON};
use crate::engine::InventoryEngine;
use crate::request::{BottlingPayload, OperationRequest, PendingCommit, RemainderAction};

/// US wine gallons per litre.
pub const WINE_GALLONS_PER_LITER: f64 = 0.264172;

pub const BOTTLES_PER_CASE: u32 = 12;

/// Volume of one bottle in wine gallons.
pub fn bottle_volume_wine_gallons(bottle_size_ml: u32) -> f64 {
    (f64::from(bottle_size_ml) / 1000.0) * WINE_GALLONS_PER_LITER
}

/// Requested count, in bottles or in cases of 12.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "count", rename_all = "snake_case")]
pub enum BottleCount {
    Bottles(u32),
    Cases(u32),
}

impl BottleCount {
    pub fn bottles(self) -> u32 {
        match self {
            BottleCount::Bottles(n) => n,
            BottleCount::Cases(n) => n.saturating_mul(BOTTLES_PER_CASE),
        }
    }
}

/// Whether the operator counts bottles or cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountUnit {
    #[default]
    Bottles,
    Cases,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    Loss,
    Gain,
}

/// Remainder policy for a bottling line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RemainderPolicy {
    /// Leave what is not bottled in the source.
    Keep,
    /// Bottle as many as fit and write off the rest.
    Empty,
    /// The operator states the loss or gain; the source ends empty.
    Adjust { kind: AdjustmentKind, wine_gallons: f64 },
}

/// Remainder choice as picked in a form, before the amount is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainderChoice {
    Keep,
    Empty,
    Adjust(AdjustmentKind),
}

/// One bottling line item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BottlingLine {
    pub bottle_size_ml: u32,
    pub count: BottleCount,
    pub remainder: RemainderPolicy,
}

impl BottlingLine {
    /// Build a line from raw form fields.
    ///
    /// The count must be a positive whole number. In adjust mode the
    /// loss/gain amount must be a non-negative number of wine gallons.
    pub fn from_raw(
        bottle_size_ml: u32,
        count_raw: &str,
        unit: CountUnit,
        remainder: RemainderChoice,
        adjustment_raw: &str,
    ) -> DomainResult<Self> {
        let field = match unit {
            CountUnit::Bottles => "bottle count",
            CountUnit::Cases => "case count",
        };
        let n = parse_positive_count(field, count_raw)?;
        let count = match unit {
            CountUnit::Bottles => BottleCount::Bottles(n),
            CountUnit::Cases => BottleCount::Cases(n),
        };
        let remainder = match remainder {
            RemainderChoice::Keep => RemainderPolicy::Keep,
            RemainderChoice::Empty => RemainderPolicy::Empty,
            RemainderChoice::Adjust(kind) => RemainderPolicy::Adjust {
                kind,
                wine_gallons: parse_non_negative("adjustment amount", adjustment_raw)?,
            },
        };
        Ok(Self {
            bottle_size_ml,
            count,
            remainder,
        })
    }
}

/// A validated line, ready to commit.
#[derive(Debug, Clone, PartialEq)]
pub struct BottlingPlan {
    pub line: BottlingLine,
    pub product_id: Option<ProductId>,
    pub payload: BottlingPayload,
    pub audit: AuditEntry,
    pub max_bottles: u32,
    /// Spirit left in the source after this line.
    pub remaining_wine_gallons: f64,
}

impl From<BottlingPlan> for PendingCommit {
    fn from(plan: BottlingPlan) -> Self {
        PendingCommit {
            request: OperationRequest::Bottle(plan.payload),
            audit: plan.audit,
        }
    }
}

/// Bottles of `bottle_size_ml` that fit in `available_wine_gallons`.
pub fn max_bottles(available_wine_gallons: f64, bottle_size_ml: u32) -> u32 {
    let per_bottle = bottle_volume_wine_gallons(bottle_size_ml);
    if per_bottle <= 0.0 || available_wine_gallons <= 0.0 {
        return 0;
    }
    (available_wine_gallons / per_bottle + EPSILON).floor() as u32
}

fn plan_line(
    gauger: &Gauger,
    source: &ContainerState,
    available_wine_gallons: f64,
    line: &BottlingLine,
    expected_version: ExpectedVersion,
    occurred_at: DateTime<Utc>,
) -> DomainResult<BottlingPlan> {
    if line.bottle_size_ml == 0 {
        return Err(DomainError::validation("bottle size must be greater than 0 mL"));
    }
    if let RemainderPolicy::Adjust { wine_gallons, .. } = line.remainder {
        if !(wine_gallons.is_finite() && wine_gallons >= 0.0) {
            return Err(DomainError::validation("adjustment amount cannot be negative"));
        }
    }

    let per_bottle = bottle_volume_wine_gallons(line.bottle_size_ml);
    let max = max_bottles(available_wine_gallons, line.bottle_size_ml);

    // Emptying always bottles the maximum, whatever count was requested.
    let bottles = match line.remainder {
        RemainderPolicy::Empty => max,
        _ => line.count.bottles(),
    };
    if bottles == 0 {
        return Err(DomainError::validation(format!(
            "{} has too little spirit for a single {} mL bottle",
            source.name(),
            line.bottle_size_ml
        )));
    }
    if bottles > max {
        return Err(DomainError::insufficient(
            source.name(),
            round2(f64::from(bottles) * per_bottle),
            round2(available_wine_gallons),
            "wine gallons",
        ));
    }

    let bottled = f64::from(bottles) * per_bottle;
    let left = (available_wine_gallons - bottled).max(0.0);
    let density = gauger.spirit_density(source.proof(), REFERENCE_TEMPERATURE_F);

    let (remainder_action, remainder_weight_lbs, adjustment_amount, remaining) = match line.remainder {
        RemainderPolicy::Keep => (RemainderAction::Keep, round2(left * density), None, left),
        RemainderPolicy::Empty => (RemainderAction::Empty, 0.0, Some(round2(left)), 0.0),
        RemainderPolicy::Adjust { kind, wine_gallons } => {
            let action = match kind {
                AdjustmentKind::Loss => RemainderAction::Loss,
                AdjustmentKind::Gain => RemainderAction::Gain,
            };
            (action, 0.0, Some(wine_gallons), 0.0)
        }
    };

    let bottled_wine_gallons = round2(bottled);
    let bottled_proof_gallons = round2(bottled * source.proof() / 100.0);

    let payload = BottlingPayload {
        container_id: source.id_typed(),
        bottle_size_ml: line.bottle_size_ml,
        number_of_bottles: bottles,
        remainder_action,
        bottled_wine_gallons,
        remainder_weight_lbs,
        adjustment_amount,
        expected_version,
    };
    let audit = AuditEntry::new(
        TransactionType::Bottling,
        source.id_typed(),
        source.name(),
        AuditQuantities {
            proof: Some(source.proof()),
            weight_lbs: Some(round2(bottled * density)),
            wine_gallons: Some(bottled_wine_gallons),
            proof_gallons: Some(bottled_proof_gallons),
            bottles: Some(bottles),
        },
        format!(
            "Bottled {bottles} x {} mL ({bottled_wine_gallons:.2} wine gallons, {bottled_proof_gallons:.2} PG); remainder {:?}",
            line.bottle_size_ml, remainder_action
        ),
        occurred_at,
    );

    Ok(BottlingPlan {
        line: *line,
        product_id: source.product_id(),
        payload,
        audit,
        max_bottles: max,
        remaining_wine_gallons: remaining,
    })
}

/// Ordered bottling lines pending against one source container.
///
/// Each line is validated when queued, against whatever the earlier lines
/// leave in the source. A failed line is not queued and never disturbs the
/// lines already accepted.
#[derive(Debug, Clone)]
pub struct BottlingQueue {
    gauger: Gauger,
    source: ContainerState,
    initial_wine_gallons: f64,
    items: Vec<BottlingPlan>,
}

impl BottlingQueue {
    pub fn new(gauger: Gauger, source: ContainerState) -> Self {
        let initial_wine_gallons = source.gauge(&gauger).wine_gallons;
        Self {
            gauger,
            source,
            initial_wine_gallons,
            items: Vec::new(),
        }
    }

    pub fn source(&self) -> &ContainerState {
        &self.source
    }

    pub fn items(&self) -> &[BottlingPlan] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Wine gallons still available to later lines.
    pub fn remaining_wine_gallons(&self) -> f64 {
        self.items
            .last()
            .map(|item| item.remaining_wine_gallons)
            .unwrap_or(self.initial_wine_gallons)
    }

    /// Bottles of a size that still fit, for display.
    pub fn max_bottles(&self, bottle_size_ml: u32) -> u32 {
        max_bottles(self.remaining_wine_gallons(), bottle_size_ml)
    }

    /// Validate `line` against what is left and queue it.
    ///
    /// Every committed line advances the source's version by one, so the
    /// n-th line expects the snapshot version plus n.
    pub fn enqueue(&mut self, line: BottlingLine, occurred_at: DateTime<Utc>) -> DomainResult<&BottlingPlan> {
        let expected_version = ExpectedVersion::exact(self.source.version() + self.items.len() as u64);
        let plan = plan_line(
            &self.gauger,
            &self.source,
            self.remaining_wine_gallons(),
            &line,
            expected_version,
            occurred_at,
        )
        .inspect_err(|err| {
            tracing::warn!(source = %self.source.id_typed(), error = %err, "bottling line rejected");
        })?;
        tracing::debug!(
            source = %self.source.id_typed(),
            bottles = plan.payload.number_of_bottles,
            bottle_size_ml = line.bottle_size_ml,
            remaining_wine_gallons = plan.remaining_wine_gallons,
            "bottling line queued"
        );
        let index = self.items.len();
        self.items.push(plan);
        Ok(&self.items[index])
    }

    /// Drop the most recently queued line.
    pub fn pop(&mut self) -> Option<BottlingPlan> {
        self.items.pop()
    }

    pub fn into_items(self) -> Vec<BottlingPlan> {
        self.items
    }
}

/// Outcome of recording a bottling line in the run ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunUpdate {
    Created,
    Accumulated,
}

/// Aggregate of bottled output per (product, bottle size).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottlingRun {
    pub product_id: Option<ProductId>,
    pub bottle_size_ml: u32,
    pub bottle_count: u64,
    pub wine_gallons: f64,
}

/// Run records keyed by (product, bottle size).
///
/// Recording is keyed, not deduplicated: committing the same lines twice
/// accumulates twice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BottlingRunLedger {
    runs: Vec<BottlingRun>,
}

impl BottlingRunLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn runs(&self) -> &[BottlingRun] {
        &self.runs
    }

    pub fn find(&self, product_id: Option<ProductId>, bottle_size_ml: u32) -> Option<&BottlingRun> {
        self.runs
            .iter()
            .find(|r| r.product_id == product_id && r.bottle_size_ml == bottle_size_ml)
    }

    pub fn record(
        &mut self,
        product_id: Option<ProductId>,
        bottle_size_ml: u32,
        bottles: u32,
        wine_gallons: f64,
    ) -> RunUpdate {
        match self
            .runs
            .iter_mut()
            .find(|r| r.product_id == product_id && r.bottle_size_ml == bottle_size_ml)
        {
            Some(run) => {
                run.bottle_count += u64::from(bottles);
                run.wine_gallons = round2(run.wine_gallons + wine_gallons);
                RunUpdate::Accumulated
            }
            None => {
                self.runs.push(BottlingRun {
                    product_id,
                    bottle_size_ml,
                    bottle_count: u64::from(bottles),
                    wine_gallons: round2(wine_gallons),
                });
                RunUpdate::Created
            }
        }
    }
}

impl InventoryEngine {
    /// Start a bottling queue against `source`.
    pub fn bottling_queue(&self, source: &ContainerState) -> BottlingQueue {
        BottlingQueue::new(self.gauger().clone(), source.clone())
    }

    /// Validate a single bottling line against the whole source.
    pub fn bottle(
        &self,
        source: &ContainerState,
        line: &BottlingLine,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<BottlingPlan> {
        let available = source.gauge(self.gauger()).wine_gallons;
        plan_line(
            self.gauger(),
            source,
            available,
            line,
            ExpectedVersion::of(source),
            occurred_at,
        )
    }
}
