//! Distribution policy resolution
//!
//! A state-free decision function invoked on every plan create/update. It
//! turns a requested distribution (fixed amount-times-count or explicit
//! custom entries) into a schedule whose minor-unit sum equals the plan's
//! total exactly. When a fixed request cannot divide evenly, the resolver
//! falls back to an equivalent custom schedule rather than losing minor
//! units to rounding; the switch is visible in the returned [`Resolved`]
//! variant.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{schedule_dates, Cadence, Money};

use crate::error::PlanError;
use crate::plan::DistributionPolicy;

/// Upper bound on the number of installments a single plan may carry.
///
/// Counts arrive from the API as plain integers; without a ceiling a large
/// value would drive date generation past chrono's representable range and
/// pre-allocate schedule vectors sized by the raw count.
pub const MAX_INSTALLMENTS: u32 = 1_000;

/// Named tolerance configuration for schedule/total mismatches
///
/// Fixed plans are system-generated, so only a one-minor-unit artifact of
/// division is tolerated before the amount is corrected. Custom plans are
/// user-authored: up to `custom_adjust_units` of accumulated rounding noise
/// is absorbed into the last entry, anything larger is rejected as a
/// genuine input error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tolerances {
    pub fixed_correction_units: i64,
    pub custom_adjust_units: i64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            fixed_correction_units: 1,
            custom_adjust_units: 2,
        }
    }
}

/// A caller-supplied custom schedule entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomEntry {
    pub due_date: NaiveDate,
    pub amount: Money,
    pub note: Option<String>,
}

/// The distribution requested by the caller
#[derive(Debug, Clone, PartialEq)]
pub enum DistributionRequest {
    Fixed {
        installment_amount: Money,
        installment_count: u32,
    },
    Custom(Vec<CustomEntry>),
}

/// One resolved installment before persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledInstallment {
    pub due_date: NaiveDate,
    pub amount: Money,
    pub note: Option<String>,
}

/// Outcome of distribution resolution
///
/// The policy switch on a fixed request with a division remainder is a
/// documented branch of this type, not a hidden side effect: callers match
/// on the variant and can never observe an inconsistent intermediate state.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// Uniform schedule; every entry carries `installment_amount`
    Fixed {
        installment_amount: Money,
        schedule: Vec<ScheduledInstallment>,
    },
    /// Per-date amounts; `display_amount` is the base per-installment
    /// amount kept on the plan record for presentation
    Custom {
        display_amount: Money,
        schedule: Vec<ScheduledInstallment>,
    },
}

impl Resolved {
    pub fn policy(&self) -> DistributionPolicy {
        match self {
            Resolved::Fixed { .. } => DistributionPolicy::Fixed,
            Resolved::Custom { .. } => DistributionPolicy::Custom,
        }
    }

    pub fn schedule(&self) -> &[ScheduledInstallment] {
        match self {
            Resolved::Fixed { schedule, .. } | Resolved::Custom { schedule, .. } => schedule,
        }
    }

    pub fn into_schedule(self) -> Vec<ScheduledInstallment> {
        match self {
            Resolved::Fixed { schedule, .. } | Resolved::Custom { schedule, .. } => schedule,
        }
    }

    /// Per-installment amount stored on the plan record
    pub fn display_amount(&self) -> Money {
        match self {
            Resolved::Fixed {
                installment_amount, ..
            } => *installment_amount,
            Resolved::Custom { display_amount, .. } => *display_amount,
        }
    }

    /// Sum of the schedule in minor units
    pub fn total_minor_units(&self) -> Result<i64, PlanError> {
        let mut sum = 0i64;
        for entry in self.schedule() {
            sum += entry.amount.to_minor_units()?;
        }
        Ok(sum)
    }
}

/// Resolves a distribution request against the plan's declared total
///
/// Pure: the same inputs always produce the same schedule. The returned
/// schedule's minor-unit sum always equals `total`'s minor-unit value; a
/// request that cannot be made exact within tolerance is rejected instead.
pub fn resolve(
    total: Money,
    start_date: NaiveDate,
    cadence: Cadence,
    request: DistributionRequest,
    tolerances: &Tolerances,
) -> Result<Resolved, PlanError> {
    if !total.is_positive() {
        return Err(PlanError::input(
            "total_planned_amount",
            "must be a positive amount",
        ));
    }

    match request {
        DistributionRequest::Fixed {
            installment_amount,
            installment_count,
        } => resolve_fixed(
            total,
            start_date,
            cadence,
            installment_amount,
            installment_count,
            tolerances,
        ),
        DistributionRequest::Custom(entries) => resolve_custom(total, entries, tolerances),
    }
}

fn resolve_fixed(
    total: Money,
    start_date: NaiveDate,
    cadence: Cadence,
    installment_amount: Money,
    installment_count: u32,
    tolerances: &Tolerances,
) -> Result<Resolved, PlanError> {
    if installment_count == 0 {
        return Err(PlanError::input(
            "number_of_installments",
            "must be at least 1",
        ));
    }
    if installment_count > MAX_INSTALLMENTS {
        return Err(PlanError::input(
            "number_of_installments",
            format!("must be at most {MAX_INSTALLMENTS}"),
        ));
    }
    if installment_amount.currency() != total.currency() {
        return Err(PlanError::input(
            "installment_amount",
            "currency must match the plan total",
        ));
    }

    let dates = schedule_dates(start_date, cadence, installment_count);
    if dates.len() != installment_count as usize {
        return Err(PlanError::input(
            "cadence",
            format!("cadence '{cadence}' cannot generate {installment_count} installment dates"),
        ));
    }

    let total_units = total.to_minor_units()?;
    let requested_units = installment_amount.to_minor_units()?;
    let count = installment_count as i64;
    let base_units = total_units / count;
    let remainder_units = total_units % count;

    if remainder_units == 0 {
        // Perfect division: the base amount is the only uniform amount whose
        // sum is exact. A requested amount within tolerance is a rounding
        // artifact; a larger mismatch is corrected silently all the same.
        let diff = requested_units * count - total_units;
        if diff != 0 {
            if diff.abs() <= tolerances.fixed_correction_units {
                tracing::debug!(
                    requested = requested_units,
                    corrected = base_units,
                    "rounding artifact in fixed installment amount"
                );
            } else {
                tracing::info!(
                    requested = requested_units,
                    corrected = base_units,
                    total = total_units,
                    "correcting fixed installment amount to divide total evenly"
                );
            }
        }

        let amount = Money::from_minor(base_units, total.currency());
        let schedule = dates
            .into_iter()
            .map(|due_date| ScheduledInstallment {
                due_date,
                amount,
                note: None,
            })
            .collect();
        return Ok(Resolved::Fixed {
            installment_amount: amount,
            schedule,
        });
    }

    // The total cannot be made uniform without fractional minor units:
    // convert to a custom schedule. The first `remainder_units` entries
    // (earliest first) carry one extra minor unit, so the sum is exact and
    // all amounts stay within one minor unit of each other.
    tracing::info!(
        total = total_units,
        count,
        remainder = remainder_units,
        "fixed distribution does not divide evenly; converting to custom schedule"
    );

    let parts = total.allocate(installment_count)?;
    let schedule = dates
        .into_iter()
        .zip(parts)
        .map(|(due_date, amount)| ScheduledInstallment {
            due_date,
            amount,
            note: None,
        })
        .collect();

    Ok(Resolved::Custom {
        display_amount: Money::from_minor(base_units, total.currency()),
        schedule,
    })
}

fn resolve_custom(
    total: Money,
    entries: Vec<CustomEntry>,
    tolerances: &Tolerances,
) -> Result<Resolved, PlanError> {
    if entries.is_empty() {
        return Err(PlanError::input(
            "custom_installments",
            "at least one installment is required",
        ));
    }
    if let Some(entry) = entries
        .iter()
        .find(|e| e.amount.currency() != total.currency())
    {
        return Err(PlanError::input(
            "custom_installments",
            format!(
                "installment dated {} is denominated in {}, plan total in {}",
                entry.due_date,
                entry.amount.currency(),
                total.currency()
            ),
        ));
    }

    let total_units = total.to_minor_units()?;
    let mut entry_units = Vec::with_capacity(entries.len());
    for entry in &entries {
        entry_units.push(entry.amount.to_minor_units()?);
    }
    let sum_units: i64 = entry_units.iter().sum();
    let diff = total_units - sum_units;

    if diff != 0 {
        if diff.abs() > tolerances.custom_adjust_units {
            // A material mismatch must be surfaced, never silently absorbed
            // into a donor-visible schedule.
            return Err(PlanError::TotalMismatch {
                expected: total_units,
                actual: sum_units,
            });
        }
        tracing::debug!(
            diff,
            total = total_units,
            "absorbing sub-unit rounding into final custom installment"
        );
    }

    let currency = total.currency();
    let last = entries.len() - 1;
    let mut schedule: Vec<ScheduledInstallment> = entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            let units = if i == last {
                entry_units[i] + diff
            } else {
                entry_units[i]
            };
            ScheduledInstallment {
                due_date: entry.due_date,
                amount: Money::from_minor(units, currency),
                note: entry.note,
            }
        })
        .collect();

    // Reject entries that share a date, regardless of amount correctness
    let mut seen = schedule.iter().map(|e| e.due_date).collect::<Vec<_>>();
    seen.sort_unstable();
    if let Some(dup) = seen.windows(2).find(|w| w[0] == w[1]) {
        return Err(PlanError::DuplicateDate(dup[0]));
    }

    schedule.sort_by_key(|e| e.due_date);
    let display_amount = Money::from_minor(total_units / schedule.len() as i64, currency);

    Ok(Resolved::Custom {
        display_amount,
        schedule,
    })
}
