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
use crate::basis::disposal::{Disposal, LotTransfer};
use crate::reports::table::Table;
use rust_decimal::Decimal;

/// Prints a completed calculation: the disposal detail, the totals in
/// the configured currency, and the run counters.
pub struct CalcReporter<'a> {
	calculation: &'a CostBasisCalculation,
	disposals: &'a [Disposal],
	transfers: &'a [LotTransfer],
}

impl<'a> CalcReporter<'a> {
	pub fn new(
		calculation: &'a CostBasisCalculation,
		disposals: &'a [Disposal],
		transfers: &'a [LotTransfer],
	) -> Self {
		Self {
			calculation,
			disposals,
			transfers,
		}
	}

	pub fn print(&self) {
		let config = &self.calculation.config;
		println!("Calculation method: {}", config.method);
		println!("Jurisdiction: {}", config.jurisdiction);
		println!(
			"Period: {} to {} ({})",
			config.begin, config.end, config.currency
		);

		if self.disposals.is_empty() {
			println!();
			println!("No disposals in range");
		} else {
			self.print_disposals();
		}

		let t = &self.calculation.totals;
		println!();
		println!("Proceeds: {}", render(t.total_proceeds));
		println!("Cost basis: {}", render(t.total_cost_basis));
		println!("Gain/loss: {}", render(t.total_gain_loss));
		println!(
			"Taxable gain/loss: {}",
			render(t.total_taxable_gain_loss)
		);

		println!();
		println!(
			"Transactions: {} | Lots created: {} | Disposals: {} | Transfers: {} | Assets: {}",
			self.calculation.transactions_processed,
			self.calculation.lots_created,
			self.calculation.disposals_processed,
			self.transfers.len(),
			self.calculation.assets_processed,
		);
	}

	fn print_disposals(&self) {
		let mut table = Table::new(7);
		table.right_align(vec![2, 3, 4, 5]);

		table.add_header(vec![
			"Date", "Asset", "Qty", "Proceeds", "Cost", "G/L", "Held",
		]);
		table.add_separator();

		for d in self.disposals {
			let date = d.disposal_date.date_naive().to_string();
			let qty = render(d.quantity_disposed);
			let proceeds = render(d.proceeds);
			let cost = render(d.cost_basis_consumed);
			let gain = render(d.realized_gain_loss);
			let held = d.holding_period.to_string();

			table.add_row(vec![
				&date, &d.asset, &qty, &proceeds, &cost, &gain, &held,
			]);
		}

		table.print();
	}
}

/// Renders an amount with trailing zeros stripped.
fn render(value: Decimal) -> String {
	value.normalize().to_string()
}
