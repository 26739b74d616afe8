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
use serde::{Deserialize, Serialize};
use std::fmt;

/// A claim that two independently-observed transactions are the same
/// economic transfer, e.g. an exchange withdrawal and the on-chain
/// deposit that it became. Links are produced and reviewed upstream;
/// this crate never changes their status, it only reads them.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionLink {
	pub id: String,

	pub source_transaction_id: String,
	pub target_transaction_id: String,

	/// Both amounts are denominated in this asset
	pub asset: String,

	/// Always positive; what left the source
	pub source_amount: Decimal,

	/// Always positive; what arrived at the target. May be smaller
	/// than source_amount when a network fee was taken in-flight.
	pub target_amount: Decimal,

	pub link_type: LinkType,

	/// Heuristic 0..=1 from the upstream matcher
	pub confidence_score: Decimal,

	pub match_criteria: MatchCriteria,
	pub status: LinkStatus,

	#[serde(default)]
	pub reviewed_by: Option<String>,

	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
	ExchangeToBlockchain,
	BlockchainToBlockchain,
	ExchangeToExchange,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
	Suggested,
	Confirmed,
	Rejected,
}

/// The evidence the upstream matcher recorded when it proposed the
/// link. Carried along for review surfaces; not consulted here.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCriteria {
	pub asset_match: bool,
	pub amount_similarity: Decimal,
	pub timing_valid: bool,
	pub timing_hours: Decimal,
}

impl TransactionLink {
	pub fn is_confirmed(&self) -> bool {
		self.status == LinkStatus::Confirmed
	}

	/// A link tying a transaction to itself is meaningless outside of
	/// test fixtures, and a sign of upstream matcher trouble.
	pub fn is_self_referential(&self) -> bool {
		self.source_transaction_id == self.target_transaction_id
	}
}

impl fmt::Display for LinkStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			LinkStatus::Suggested => write!(f, "suggested"),
			LinkStatus::Confirmed => write!(f, "confirmed"),
			LinkStatus::Rejected => write!(f, "rejected"),
		}
	}
}
