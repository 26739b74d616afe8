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
use crate::linking::group::LinkedTransactionGroup;

/// Renders linked-transaction groups for review: which observed
/// transactions are really one transfer chain, and through which
/// confirmed links. Groups are numbered by position; the underlying
/// group ids are fresh each build and not meaningful to print.
pub struct GroupReporter {
	groups: Vec<LinkedTransactionGroup>,
}

impl GroupReporter {
	pub fn new(groups: Vec<LinkedTransactionGroup>) -> Self {
		Self { groups }
	}

	pub fn print(&self) {
		if self.groups.is_empty() {
			println!("No transactions");
			return;
		}

		for (n, group) in self.groups.iter().enumerate() {
			if n > 0 {
				println!();
			}

			println!(
				"Group {}: {} transactions across {} sources",
				n + 1,
				group.transactions.len(),
				group.sources.len()
			);

			let sources: Vec<&str> =
				group.sources.iter().map(String::as_str).collect();
			println!("  sources: {}", sources.join(", "));

			let transactions: Vec<&str> =
				group.transactions.iter().map(String::as_str).collect();
			println!("  transactions: {}", transactions.join(", "));

			if group.link_chain.is_empty() {
				continue;
			}

			println!("  links:");
			for link in &group.link_chain {
				println!(
					"    {}: {} -> {} ({}, confidence {})",
					link.id,
					link.source_transaction_id,
					link.target_transaction_id,
					link.status,
					link.confidence_score.normalize(),
				);
			}
		}
	}
}
