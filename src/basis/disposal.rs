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
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// A taxable event: an outflow that truly left the user's control,
/// realized against one or more lots. Immutable once created.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Disposal {
	pub id: Uuid,

	/// Which lots were consumed, in consumption order
	pub lots_consumed: Vec<LotConsumption>,

	pub asset: String,
	pub disposal_date: DateTime<Utc>,

	pub quantity_disposed: Decimal,
	pub proceeds: Decimal,
	pub cost_basis_consumed: Decimal,

	/// Always proceeds - cost_basis_consumed
	pub realized_gain_loss: Decimal,

	pub holding_period: HoldingPeriod,
	pub disposal_transaction_id: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LotConsumption {
	pub lot_id: u64,
	pub quantity: Decimal,
	pub cost_basis_portion: Decimal,
}

/// Short or long relative to the jurisdiction's threshold, measured
/// from the earliest acquisition date among the consumed lots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldingPeriod {
	Short,
	Long,
}

impl fmt::Display for HoldingPeriod {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			HoldingPeriod::Short => write!(f, "short"),
			HoldingPeriod::Long => write!(f, "long"),
		}
	}
}

/// The non-taxable counterpart of a Disposal: an outflow matched to a
/// confirmed transfer, so the lot's acquisition date and unit cost
/// travel to the destination instead of realizing gain or loss.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LotTransfer {
	pub id: Uuid,
	pub from_lot_id: u64,
	pub to_transaction_id: String,
	pub quantity: Decimal,
	pub preserves_acquisition_date: bool,
	pub created_at: DateTime<Utc>,
}
