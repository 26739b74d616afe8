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
use crate::model::prices::PriceRecord;
use crate::model::transaction::Transaction;
use anyhow::{anyhow, Error};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;

/// The deduplicated, normalized export this engine runs over:
/// canonical transactions, reviewed links, and the daily prices the
/// run will need. Producing this file is the upstream collaborators'
/// business.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputFile {
	pub transactions: Vec<Transaction>,

	#[serde(default)]
	pub links: Vec<TransactionLink>,

	#[serde(default)]
	pub prices: Vec<PriceRecord>,
}

/// What the `check` directive found. Problems make the input unfit to
/// calculate over; warnings are survivable oddities worth a look.
#[derive(Debug, Default)]
pub struct CheckReport {
	pub problems: Vec<String>,
	pub warnings: Vec<String>,
}

impl InputFile {
	pub fn load(path: &str) -> Result<Self, Error> {
		let content = fs::read_to_string(path)
			.map_err(|e| anyhow!("Cannot read {}: {}", path, e))?;
		let input: InputFile = serde_json::from_str(&content)
			.map_err(|e| anyhow!("Cannot parse {}: {}", path, e))?;
		Ok(input)
	}

	/// Surfaces data-integrity trouble before a run wastes time on
	/// it. Links naming unknown transactions are only warnings; the
	/// graph builder and the index skip them by contract.
	pub fn check(&self) -> CheckReport {
		let mut report = CheckReport::default();

		let mut seen_transactions = HashSet::new();
		for tx in &self.transactions {
			if !seen_transactions.insert(tx.id.as_str()) {
				report.problems.push(format!(
					"Duplicate transaction id {}",
					tx.id
				));
			}

			for m in tx
				.movements
				.inflows
				.iter()
				.chain(tx.movements.outflows.iter())
			{
				if m.amount <= Decimal::ZERO {
					report.problems.push(format!(
						"Transaction {} has a non-positive {} movement of {}",
						tx.id, m.asset, m.amount
					));
				}
			}
		}

		let mut seen_links = HashSet::new();
		for link in &self.links {
			if !seen_links.insert(link.id.as_str()) {
				report
					.problems
					.push(format!("Duplicate link id {}", link.id));
			}

			if link.source_amount <= Decimal::ZERO
				|| link.target_amount <= Decimal::ZERO
			{
				report.problems.push(format!(
					"Link {} has non-positive amounts",
					link.id
				));
			}

			if link.confidence_score < Decimal::ZERO
				|| link.confidence_score > Decimal::ONE
			{
				report.problems.push(format!(
					"Link {} has confidence {} outside 0..=1",
					link.id, link.confidence_score
				));
			}

			if link.is_self_referential() {
				report.warnings.push(format!(
					"Link {} ties transaction {} to itself",
					link.id, link.source_transaction_id
				));
			}

			for endpoint in [
				&link.source_transaction_id,
				&link.target_transaction_id,
			] {
				if !seen_transactions.contains(endpoint.as_str()) {
					report.warnings.push(format!(
						"Link {} names unknown transaction {}",
						link.id, endpoint
					));
				}
			}
		}

		report
	}
}
