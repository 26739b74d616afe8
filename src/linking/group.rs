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
use crate::linking::link::TransactionLink;
use serde::Serialize;
use std::collections::BTreeSet;
use uuid::Uuid;

/// One connected component of the confirmed-link graph: a set of
/// transactions that are really a single transfer chain observed by
/// several sources. Built fresh on each run and never mutated after
/// construction; the group id is new every time.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedTransactionGroup {
	pub group_id: Uuid,

	/// Member transaction ids
	pub transactions: BTreeSet<String>,

	/// Distinct source identifiers among the members, e.g.
	/// {"kraken", "bitcoin"}
	pub sources: BTreeSet<String>,

	/// The confirmed links that connected the group, in input order
	pub link_chain: Vec<TransactionLink>,
}

impl LinkedTransactionGroup {
	pub fn is_singleton(&self) -> bool {
		self.transactions.len() == 1
	}
}
