/* Copyright © 2025 taxlot contributors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */
use crate::basis::disposal::HoldingPeriod;
use crate::basis::method::CostBasisMethod;
use anyhow::{bail, Error};
use chrono::NaiveDate;
use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tax jurisdiction. Closed set; each member carries its long-term
/// holding threshold and its rule for which gains are taxable at all.
#[derive(
	Clone, Copy, Debug, Deserialize, PartialEq, Eq, Serialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Jurisdiction {
	Us,
	De,
}

impl Jurisdiction {
	/// Holding strictly longer than this many days is long-term
	pub fn long_term_threshold_days(&self) -> i64 {
		match self {
			Jurisdiction::Us => 365,
			Jurisdiction::De => 365,
		}
	}

	/// The portion of a realized gain/loss that counts toward taxable
	/// totals. Germany exempts private crypto sales held past the
	/// threshold entirely; the US taxes both periods, at different
	/// rates that are out of scope here.
	pub fn taxable_portion(
		&self,
		gain_loss: Decimal,
		period: HoldingPeriod,
	) -> Decimal {
		match self {
			Jurisdiction::Us => gain_loss,
			Jurisdiction::De => match period {
				HoldingPeriod::Short => gain_loss,
				HoldingPeriod::Long => Decimal::ZERO,
			},
		}
	}
}

impl std::fmt::Display for Jurisdiction {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Jurisdiction::Us => write!(f, "us"),
			Jurisdiction::De => write!(f, "de"),
		}
	}
}

/// Everything a run needs to know up front. Validated before any
/// transaction is touched; a bad config never produces a half-run.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationConfig {
	pub method: CostBasisMethod,
	pub jurisdiction: Jurisdiction,
	pub tax_year: i32,
	pub currency: String,

	pub begin: NaiveDate,
	pub end: NaiveDate,

	/// Empty means every asset seen in the input
	#[serde(default)]
	pub assets: Vec<String>,
}

impl CalculationConfig {
	pub fn validate(&self) -> Result<(), Error> {
		if self.begin > self.end {
			bail!(
				"Date range begins {} but ends {}",
				self.begin,
				self.end
			);
		}

		if self.currency.trim().is_empty() {
			bail!("No calculation currency configured");
		}

		if self.method == CostBasisMethod::SpecificId {
			bail!(
				"Specific-identification lot selection is not yet implemented"
			);
		}

		Ok(())
	}

	pub fn includes_asset(&self, asset: &str) -> bool {
		self.assets.is_empty()
			|| self.assets.iter().any(|a| a == asset)
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "error")]
pub enum CalculationStatus {
	Running,
	Completed,
	Failed(String),
}

/// Running totals, all in the configured currency. The gain/loss
/// identity (gain = proceeds - cost) holds by construction; the
/// aggregate is checked again when the run finalizes.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationTotals {
	pub total_proceeds: Decimal,
	pub total_cost_basis: Decimal,
	pub total_gain_loss: Decimal,
	pub total_taxable_gain_loss: Decimal,
}

/// The persistent record of one engine run. Created at the start,
/// finalized exactly once, then immutable and re-readable for
/// reporting.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBasisCalculation {
	pub id: Uuid,
	pub config: CalculationConfig,
	pub status: CalculationStatus,
	pub totals: CalculationTotals,

	pub lots_created: u64,
	pub disposals_processed: u64,
	pub transactions_processed: u64,
	pub assets_processed: u64,
}

impl CostBasisCalculation {
	pub fn new(config: CalculationConfig) -> Self {
		Self {
			id: Uuid::new_v4(),
			config,
			status: CalculationStatus::Running,
			totals: CalculationTotals::default(),
			lots_created: 0,
			disposals_processed: 0,
			transactions_processed: 0,
			assets_processed: 0,
		}
	}

	pub fn is_completed(&self) -> bool {
		self.status == CalculationStatus::Completed
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rust_decimal_macros::dec;

	fn config(method: CostBasisMethod) -> CalculationConfig {
		CalculationConfig {
			method,
			jurisdiction: Jurisdiction::Us,
			tax_year: 2024,
			currency: "USD".to_string(),
			begin: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
			end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
			assets: vec![],
		}
	}

	#[test]
	fn test_validate_rejects_inverted_range() {
		let mut c = config(CostBasisMethod::Fifo);
		c.begin = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
		assert!(c.validate().is_err());
	}

	#[test]
	fn test_validate_rejects_specific_id() {
		let c = config(CostBasisMethod::SpecificId);
		let err = c.validate().unwrap_err();
		assert!(err.to_string().contains("not yet implemented"));
	}

	#[test]
	fn test_asset_filter() {
		let mut c = config(CostBasisMethod::Fifo);
		assert!(c.includes_asset("BTC"));

		c.assets = vec!["ETH".to_string()];
		assert!(c.includes_asset("ETH"));
		assert!(!c.includes_asset("BTC"));
	}

	#[test]
	fn test_german_long_term_gains_are_exempt() {
		let j = Jurisdiction::De;
		assert_eq!(
			j.taxable_portion(dec!(100), HoldingPeriod::Long),
			dec!(0)
		);
		assert_eq!(
			j.taxable_portion(dec!(100), HoldingPeriod::Short),
			dec!(100)
		);
		assert_eq!(
			Jurisdiction::Us.taxable_portion(dec!(100), HoldingPeriod::Long),
			dec!(100)
		);
	}
}
