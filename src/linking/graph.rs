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
use crate::linking::link::TransactionLink;
use crate::model::transaction::Transaction;
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

/// Clusters transactions into connected components using confirmed
/// links as edges. Transactions touched by no confirmed link come out
/// as singleton groups. Links naming a transaction outside the
/// supplied set are skipped, not errors: sources are imported
/// piecemeal and a link may point at a transaction that simply has not
/// been loaded this run.
///
/// Cycles are harmless; the disjoint set collapses them into one
/// component without visiting anything twice.
pub fn build_link_graph(
	transactions: &[Transaction],
	links: &[TransactionLink],
) -> Vec<LinkedTransactionGroup> {
	let index_of: HashMap<&str, usize> = transactions
		.iter()
		.enumerate()
		.map(|(i, t)| (t.id.as_str(), i))
		.collect();

	let mut set = DisjointSet::new(transactions.len());

	for link in links {
		if !link.is_confirmed() {
			continue;
		}

		let (Some(&a), Some(&b)) = (
			index_of.get(link.source_transaction_id.as_str()),
			index_of.get(link.target_transaction_id.as_str()),
		) else {
			continue; // dangling reference
		};

		set.union(a, b);
	}

	// root index -> member indices; members arrive in input order, so
	// each component is keyed by its smallest member and the resulting
	// group sequence is deterministic across runs
	let mut components: HashMap<usize, Vec<usize>> = HashMap::new();
	let mut order: Vec<usize> = vec![];

	for i in 0..transactions.len() {
		let root = set.find(i);
		let members = components.entry(root).or_default();
		if members.is_empty() {
			order.push(root);
		}
		members.push(i);
	}

	order
		.into_iter()
		.map(|root| {
			let members = &components[&root];

			let transaction_ids: BTreeSet<String> = members
				.iter()
				.map(|&i| transactions[i].id.clone())
				.collect();

			let sources: BTreeSet<String> = members
				.iter()
				.map(|&i| transactions[i].source.clone())
				.collect();

			let link_chain: Vec<TransactionLink> = links
				.iter()
				.filter(|l| {
					l.is_confirmed()
						&& transaction_ids
							.contains(&l.source_transaction_id)
						&& transaction_ids
							.contains(&l.target_transaction_id)
				})
				.cloned()
				.collect();

			LinkedTransactionGroup {
				group_id: Uuid::new_v4(),
				transactions: transaction_ids,
				sources,
				link_chain,
			}
		})
		.collect()
}

/// Parent-array disjoint set with path compression and union by rank.
/// Indices are positions in the transaction slice, so there are no
/// back-pointers or shared ownership to manage.
struct DisjointSet {
	parent: Vec<usize>,
	rank: Vec<u32>,
}

impl DisjointSet {
	fn new(size: usize) -> Self {
		Self {
			parent: (0..size).collect(),
			rank: vec![0; size],
		}
	}

	fn find(&mut self, x: usize) -> usize {
		if self.parent[x] != x {
			self.parent[x] = self.find(self.parent[x]);
		}
		self.parent[x]
	}

	fn union(&mut self, a: usize, b: usize) {
		let ra = self.find(a);
		let rb = self.find(b);
		if ra == rb {
			return;
		}

		match self.rank[ra].cmp(&self.rank[rb]) {
			std::cmp::Ordering::Less => self.parent[ra] = rb,
			std::cmp::Ordering::Greater => self.parent[rb] = ra,
			std::cmp::Ordering::Equal => {
				self.parent[rb] = ra;
				self.rank[ra] += 1;
			},
		}
	}
}
