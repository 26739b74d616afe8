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
use crate::basis::ledger::LotLedger;
use crate::basis::lot::Lot;
use anyhow::{bail, Error};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The accounting convention deciding which lot(s) a disposal
/// consumes. A closed set on purpose: every match on it is checked
/// for exhaustiveness, so a new method can never silently fall
/// through to a wrong default.
#[derive(
	Clone, Copy, Debug, Deserialize, PartialEq, Eq, Serialize, ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum CostBasisMethod {
	Fifo,
	Lifo,
	AverageCost,

	/// Reserved; selecting it fails fast rather than falling back
	SpecificId,
}

impl CostBasisMethod {
	/// Average cost keeps one synthetic lot per asset
	pub fn is_pooled(&self) -> bool {
		matches!(self, CostBasisMethod::AverageCost)
	}

	/// Picks the lots a disposal of `quantity` consumes and how much
	/// of each, without mutating the ledger. Partial consumption of
	/// the final lot is normal. Asking for more than the asset holds
	/// is a hard error: it means an acquisition is missing upstream,
	/// and clamping would silently understate the cost basis.
	pub fn select_lots_for_disposal(
		&self,
		ledger: &LotLedger,
		asset: &str,
		quantity: Decimal,
		disposal_date: &DateTime<Utc>,
	) -> Result<Vec<(u64, Decimal)>, Error> {
		if let CostBasisMethod::SpecificId = self {
			bail!(
				"Specific-identification lot selection is not yet implemented"
			);
		}

		let available = ledger.total_remaining(asset);
		if quantity > available {
			bail!(
				"Cannot dispose {} {} on {}: only {} remains across all lots",
				quantity,
				asset,
				disposal_date.date_naive(),
				available
			);
		}

		let lots = ledger.lots(asset);
		let ordered: Vec<&Lot> = match self {
			CostBasisMethod::Fifo | CostBasisMethod::AverageCost => {
				lots.iter().collect()
			},
			CostBasisMethod::Lifo => lots.iter().rev().collect(),
			CostBasisMethod::SpecificId => unreachable!(),
		};

		let mut selections = vec![];
		let mut remaining = quantity;

		for lot in ordered {
			if lot.remaining_quantity.is_zero() {
				continue;
			}

			let take = remaining.min(lot.remaining_quantity);
			selections.push((lot.id, take));
			remaining -= take;

			if remaining.is_zero() {
				break;
			}
		}

		Ok(selections)
	}
}

impl fmt::Display for CostBasisMethod {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			CostBasisMethod::Fifo => write!(f, "FIFO"),
			CostBasisMethod::Lifo => write!(f, "LIFO"),
			CostBasisMethod::AverageCost => write!(f, "average-cost"),
			CostBasisMethod::SpecificId => write!(f, "specific-id"),
		}
	}
}
