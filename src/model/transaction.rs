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
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A canonical transaction as supplied by an upstream source adapter.
/// By the time one of these reaches this crate it has already been
/// normalized and deduplicated; we treat it as read-only.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
	pub id: String,
	pub timestamp: DateTime<Utc>,

	/// Where this was observed, e.g. "kraken" or "bitcoin"
	pub source: String,

	pub movements: Movements,

	/// Fees are retained for audit but do not consume lots
	#[serde(default)]
	pub fees: Vec<Movement>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Movements {
	#[serde(default)]
	pub inflows: Vec<Movement>,

	#[serde(default)]
	pub outflows: Vec<Movement>,
}

/// A single directed quantity of one asset within a transaction.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
	pub asset: String,
	pub amount: Decimal,
}

impl Transaction {
	/// The calendar date this transaction occurred on, in UTC.
	pub fn date(&self) -> NaiveDate {
		self.timestamp.date_naive()
	}
}
