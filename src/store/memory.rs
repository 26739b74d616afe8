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
use crate::basis::calculation::CostBasisCalculation;
use crate::basis::calculator::CalculationOutcome;
use crate::basis::disposal::{Disposal, LotTransfer};
use crate::basis::lot::Lot;
use anyhow::{bail, Error};
use std::collections::BTreeMap;
use uuid::Uuid;

/// In-memory stand-in for the persistence collaborator: calculations
/// retrievable by id, their lots/disposals/transfers queryable as a
/// set. A storage engine behind a database would expose the same
/// surface.
#[derive(Default)]
pub struct MemoryStore {
	calculations: BTreeMap<Uuid, CostBasisCalculation>,
	lots: BTreeMap<Uuid, Vec<Lot>>,
	disposals: BTreeMap<Uuid, Vec<Disposal>>,
	transfers: BTreeMap<Uuid, Vec<LotTransfer>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores a finished run. Only completed calculations are
	/// accepted; an aborted run's partial state must be discarded,
	/// never persisted as if it were authoritative.
	pub fn put(&mut self, outcome: CalculationOutcome) -> Result<Uuid, Error> {
		if !outcome.calculation.is_completed() {
			bail!(
				"Refusing to store calculation {} with status {:?}",
				outcome.calculation.id,
				outcome.calculation.status
			);
		}

		let id = outcome.calculation.id;
		self.calculations.insert(id, outcome.calculation);
		self.lots.insert(id, outcome.lots);
		self.disposals.insert(id, outcome.disposals);
		self.transfers.insert(id, outcome.transfers);
		Ok(id)
	}

	pub fn calculation(&self, id: &Uuid) -> Option<&CostBasisCalculation> {
		self.calculations.get(id)
	}

	pub fn lots(&self, calculation_id: &Uuid) -> &[Lot] {
		self.lots
			.get(calculation_id)
			.map(|v| v.as_slice())
			.unwrap_or(&[])
	}

	pub fn disposals(&self, calculation_id: &Uuid) -> &[Disposal] {
		self.disposals
			.get(calculation_id)
			.map(|v| v.as_slice())
			.unwrap_or(&[])
	}

	pub fn transfers(&self, calculation_id: &Uuid) -> &[LotTransfer] {
		self.transfers
			.get(calculation_id)
			.map(|v| v.as_slice())
			.unwrap_or(&[])
	}

	pub fn disposal(&self, id: &Uuid) -> Option<&Disposal> {
		self.disposals.values().flatten().find(|d| &d.id == id)
	}
}
