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
use crate::basis::calculation::{
	CalculationConfig, CalculationStatus, CostBasisCalculation,
};
use crate::basis::disposal::{
	Disposal, HoldingPeriod, LotConsumption, LotTransfer,
};
use crate::basis::ledger::LotLedger;
use crate::basis::lot::Lot;
use crate::basis::method::CostBasisMethod;
use crate::linking::index::LinkIndex;
use crate::linking::link::TransactionLink;
use crate::model::prices::PriceSource;
use crate::model::transaction::{Movement, Transaction};
use anyhow::{bail, Error};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet, VecDeque};
use uuid::Uuid;

/// Everything one run produces. When the calculation failed, the
/// record carries the error and the artifact vectors are empty;
/// partial lot state is never handed out as if it were trustworthy.
pub struct CalculationOutcome {
	pub calculation: CostBasisCalculation,
	pub lots: Vec<Lot>,
	pub disposals: Vec<Disposal>,
	pub transfers: Vec<LotTransfer>,
}

/// Cost basis travelling from a consumed source-side lot to the
/// linked target transaction, waiting for its inflow to be walked.
struct PendingBasis {
	acquisition_date: DateTime<Utc>,
	unit_cost_basis: Decimal,
	quantity: Decimal,
}

/// Walks all relevant transactions in chronological order, classifies
/// every movement as acquisition, transfer or disposal, and drives
/// the lot ledger accordingly.
///
/// History before the configured begin date is still replayed (lots
/// disposed in-range may have been acquired years earlier); only
/// events inside the range are recorded and totalled. Nothing after
/// the end date is touched.
pub struct Calculator<'a> {
	config: CalculationConfig,
	prices: &'a dyn PriceSource,
}

impl<'a> Calculator<'a> {
	pub fn new(
		config: CalculationConfig,
		prices: &'a dyn PriceSource,
	) -> Self {
		Self { config, prices }
	}

	/// Runs one calculation to completion. Errors do not propagate:
	/// they finalize the record as Failed with the triggering error
	/// retained, because a half-processed run must never look like a
	/// trustworthy one.
	pub fn run(
		&self,
		transactions: &[Transaction],
		links: &[TransactionLink],
	) -> CalculationOutcome {
		let mut calculation =
			CostBasisCalculation::new(self.config.clone());

		match self.walk(&mut calculation, transactions, links) {
			Ok((lots, disposals, transfers)) => {
				calculation.lots_created = lots.len() as u64;
				calculation.status = CalculationStatus::Completed;
				CalculationOutcome {
					calculation,
					lots,
					disposals,
					transfers,
				}
			},
			Err(e) => {
				calculation.status =
					CalculationStatus::Failed(e.to_string());
				CalculationOutcome {
					calculation,
					lots: vec![],
					disposals: vec![],
					transfers: vec![],
				}
			},
		}
	}

	#[allow(clippy::type_complexity)]
	fn walk(
		&self,
		calculation: &mut CostBasisCalculation,
		transactions: &[Transaction],
		links: &[TransactionLink],
	) -> Result<(Vec<Lot>, Vec<Disposal>, Vec<LotTransfer>), Error> {
		self.config.validate()?;

		// Chronological order with input position as the stable
		// tie-break, i.e. ingestion sequence
		let mut ordered: Vec<&Transaction> = transactions
			.iter()
			.filter(|t| t.date() <= self.config.end)
			.collect();
		ordered.sort_by_key(|t| t.timestamp);

		let mut index = LinkIndex::new(links);
		let mut ledger = LotLedger::new(self.config.method.is_pooled());

		// target transaction id -> basis en route to it
		let mut pending: HashMap<String, VecDeque<PendingBasis>> =
			HashMap::new();

		let mut disposals = vec![];
		let mut transfers = vec![];
		let mut assets_touched: HashSet<String> = HashSet::new();

		for tx in ordered {
			calculation.transactions_processed += 1;
			let in_range = tx.date() >= self.config.begin;

			// Outflows first: a transfer's source half must queue its
			// basis before the matching inflow looks for it, which
			// matters when both halves share a timestamp or even a
			// transaction
			for movement in &tx.movements.outflows {
				if !self.config.includes_asset(&movement.asset) {
					continue;
				}
				assets_touched.insert(movement.asset.clone());
				self.process_outflow(
					calculation,
					tx,
					movement,
					in_range,
					&mut index,
					&mut ledger,
					&mut pending,
					&mut disposals,
					&mut transfers,
				)?;
			}

			for movement in &tx.movements.inflows {
				if !self.config.includes_asset(&movement.asset) {
					continue;
				}
				assets_touched.insert(movement.asset.clone());
				self.process_inflow(
					tx,
					movement,
					&mut index,
					&mut ledger,
					&mut pending,
				)?;
			}
		}

		calculation.assets_processed = assets_touched.len() as u64;

		// The identity the reporting surface relies on
		let t = &calculation.totals;
		if t.total_gain_loss != t.total_proceeds - t.total_cost_basis {
			bail!(
				"Totals are inconsistent: {} proceeds - {} cost != {} gain",
				t.total_proceeds,
				t.total_cost_basis,
				t.total_gain_loss
			);
		}

		Ok((ledger.into_lots(), disposals, transfers))
	}

	#[allow(clippy::too_many_arguments)]
	fn process_outflow(
		&self,
		calculation: &mut CostBasisCalculation,
		tx: &Transaction,
		movement: &Movement,
		in_range: bool,
		index: &mut LinkIndex,
		ledger: &mut LotLedger,
		pending: &mut HashMap<String, VecDeque<PendingBasis>>,
		disposals: &mut Vec<Disposal>,
		transfers: &mut Vec<LotTransfer>,
	) -> Result<(), Error> {
		if movement.amount <= Decimal::ZERO {
			bail!(
				"Transaction {} has a non-positive {} outflow of {}",
				tx.id,
				movement.asset,
				movement.amount
			);
		}

		let matched = index
			.find_by_source(&tx.id, &movement.asset, movement.amount)
			.cloned();

		let Some(link) = matched else {
			return self.process_disposal(
				calculation,
				tx,
				movement,
				in_range,
				ledger,
				disposals,
			);
		};

		// Same-owner transfer: no gain or loss. The oldest basis
		// travels first regardless of the disposal method.
		index.consume_source_link(&link);

		let selection_method = if self.config.method.is_pooled() {
			CostBasisMethod::AverageCost
		} else {
			CostBasisMethod::Fifo
		};

		let picks = selection_method.select_lots_for_disposal(
			ledger,
			&movement.asset,
			movement.amount,
			&tx.timestamp,
		)?;

		for (lot_id, quantity) in picks {
			let lot = ledger
				.lot(&movement.asset, lot_id)
				.expect("selected lot exists");
			let basis = PendingBasis {
				acquisition_date: lot.acquisition_date,
				unit_cost_basis: lot.unit_cost_basis,
				quantity,
			};

			ledger.consume(&movement.asset, lot_id, quantity)?;
			pending
				.entry(link.target_transaction_id.clone())
				.or_default()
				.push_back(basis);

			if in_range {
				transfers.push(LotTransfer {
					id: Uuid::new_v4(),
					from_lot_id: lot_id,
					to_transaction_id: link
						.target_transaction_id
						.clone(),
					quantity,
					preserves_acquisition_date: true,
					created_at: tx.timestamp,
				});
			}
		}

		Ok(())
	}

	fn process_disposal(
		&self,
		calculation: &mut CostBasisCalculation,
		tx: &Transaction,
		movement: &Movement,
		in_range: bool,
		ledger: &mut LotLedger,
		disposals: &mut Vec<Disposal>,
	) -> Result<(), Error> {
		let unit_price = self.prices.unit_price(
			&movement.asset,
			&tx.timestamp,
			&self.config.currency,
		)?;

		let picks = self.config.method.select_lots_for_disposal(
			ledger,
			&movement.asset,
			movement.amount,
			&tx.timestamp,
		)?;

		let mut lots_consumed = vec![];
		let mut cost_basis_consumed = Decimal::ZERO;
		let mut earliest_acquisition: Option<DateTime<Utc>> = None;

		for (lot_id, quantity) in picks {
			let lot = ledger
				.lot(&movement.asset, lot_id)
				.expect("selected lot exists");

			let portion = quantity * lot.unit_cost_basis;
			cost_basis_consumed += portion;

			earliest_acquisition = Some(match earliest_acquisition {
				Some(d) => d.min(lot.acquisition_date),
				None => lot.acquisition_date,
			});

			lots_consumed.push(LotConsumption {
				lot_id,
				quantity,
				cost_basis_portion: portion,
			});

			ledger.consume(&movement.asset, lot_id, quantity)?;
		}

		let proceeds = movement.amount * unit_price;
		let realized = proceeds - cost_basis_consumed;

		let acquired =
			earliest_acquisition.expect("disposal consumed at least one lot");
		let days_held = (tx.timestamp - acquired).num_days();
		let holding_period = if days_held
			> self.config.jurisdiction.long_term_threshold_days()
		{
			HoldingPeriod::Long
		} else {
			HoldingPeriod::Short
		};

		// Disposals replayed before the reporting range rebuild lot
		// state but stay out of the record and the totals
		if !in_range {
			return Ok(());
		}

		let totals = &mut calculation.totals;
		totals.total_proceeds += proceeds;
		totals.total_cost_basis += cost_basis_consumed;
		totals.total_gain_loss += realized;
		totals.total_taxable_gain_loss += self
			.config
			.jurisdiction
			.taxable_portion(realized, holding_period);

		calculation.disposals_processed += 1;

		disposals.push(Disposal {
			id: Uuid::new_v4(),
			lots_consumed,
			asset: movement.asset.clone(),
			disposal_date: tx.timestamp,
			quantity_disposed: movement.amount,
			proceeds,
			cost_basis_consumed,
			realized_gain_loss: realized,
			holding_period,
			disposal_transaction_id: tx.id.clone(),
		});

		Ok(())
	}

	fn process_inflow(
		&self,
		tx: &Transaction,
		movement: &Movement,
		index: &mut LinkIndex,
		ledger: &mut LotLedger,
		pending: &mut HashMap<String, VecDeque<PendingBasis>>,
	) -> Result<(), Error> {
		if movement.amount <= Decimal::ZERO {
			bail!(
				"Transaction {} has a non-positive {} inflow of {}",
				tx.id,
				movement.asset,
				movement.amount
			);
		}

		let matched =
			index.find_by_target(&tx.id, &movement.asset).cloned();

		let Some(link) = matched else {
			// A true acquisition, valued at the market price
			let unit_cost = self.prices.unit_price(
				&movement.asset,
				&tx.timestamp,
				&self.config.currency,
			)?;
			ledger.add_acquisition(
				&movement.asset,
				tx.timestamp,
				movement.amount,
				unit_cost,
				&tx.id,
				&tx.source,
			);
			return Ok(());
		};

		index.consume_target_link(&link);

		// Install the basis the source side queued for us. Acquiring
		// at market price instead would fabricate basis, so a missing
		// queue is a hard stop.
		let queue = pending
			.get_mut(&link.target_transaction_id)
			.filter(|q| !q.is_empty());
		let Some(queue) = queue else {
			bail!(
				"Transfer {} arrived at transaction {} before its source \
				 outflow was processed; check source clocks and ordering",
				link.id,
				tx.id
			);
		};

		let mut remaining = movement.amount;
		while remaining > Decimal::ZERO {
			let Some(basis) = queue.pop_front() else {
				bail!(
					"Transfer into transaction {} carries more {} than \
					 the linked outflow recorded",
					tx.id,
					movement.asset
				);
			};

			let take = remaining.min(basis.quantity);
			ledger.add_transferred_lot(
				&movement.asset,
				basis.acquisition_date,
				take,
				basis.unit_cost_basis,
				&tx.id,
				&tx.source,
			);
			remaining -= take;

			// Whatever the network fee ate stays queued; if nothing
			// else claims it, its basis is forfeited
			if basis.quantity > take {
				queue.push_front(PendingBasis {
					quantity: basis.quantity - take,
					..basis
				});
			}
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::basis::calculation::Jurisdiction;
	use crate::linking::link::{LinkStatus, LinkType, MatchCriteria};
	use crate::model::prices::{PriceRecord, StaticPrices};
	use crate::model::transaction::Movements;
	use chrono::{NaiveDate, TimeZone};
	use rust_decimal_macros::dec;

	fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
		Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
	}

	fn inflow_tx(
		id: &str,
		source: &str,
		when: DateTime<Utc>,
		asset: &str,
		amount: Decimal,
	) -> Transaction {
		Transaction {
			id: id.to_string(),
			timestamp: when,
			source: source.to_string(),
			movements: Movements {
				inflows: vec![Movement {
					asset: asset.to_string(),
					amount,
				}],
				outflows: vec![],
			},
			fees: vec![],
		}
	}

	fn outflow_tx(
		id: &str,
		source: &str,
		when: DateTime<Utc>,
		asset: &str,
		amount: Decimal,
	) -> Transaction {
		Transaction {
			id: id.to_string(),
			timestamp: when,
			source: source.to_string(),
			movements: Movements {
				inflows: vec![],
				outflows: vec![Movement {
					asset: asset.to_string(),
					amount,
				}],
			},
			fees: vec![],
		}
	}

	fn confirmed_link(
		id: &str,
		source: &str,
		target: &str,
		asset: &str,
		amount: Decimal,
	) -> TransactionLink {
		TransactionLink {
			id: id.to_string(),
			source_transaction_id: source.to_string(),
			target_transaction_id: target.to_string(),
			asset: asset.to_string(),
			source_amount: amount,
			target_amount: amount,
			link_type: LinkType::ExchangeToBlockchain,
			confidence_score: dec!(0.95),
			match_criteria: MatchCriteria {
				asset_match: true,
				amount_similarity: dec!(1),
				timing_valid: true,
				timing_hours: dec!(1),
			},
			status: LinkStatus::Confirmed,
			reviewed_by: Some("reviewer".to_string()),
			created_at: Utc::now(),
			updated_at: Utc::now(),
		}
	}

	fn btc_prices() -> StaticPrices {
		let mut records = vec![];
		for (y, m, d, p) in [
			(2023, 1, 10, 20000),
			(2024, 1, 10, 30000),
			(2024, 2, 10, 50000),
			(2024, 3, 10, 60000),
			(2024, 6, 10, 55000),
		] {
			records.push(PriceRecord {
				asset: "BTC".to_string(),
				date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
				currency: "USD".to_string(),
				unit_price: Decimal::from(p),
			});
		}
		StaticPrices::new(records)
	}

	fn config(method: CostBasisMethod) -> CalculationConfig {
		CalculationConfig {
			method,
			jurisdiction: Jurisdiction::Us,
			tax_year: 2024,
			currency: "USD".to_string(),
			begin: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
			end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
			assets: vec![],
		}
	}

	/// Two acquisitions at different costs, one disposal spanning
	/// both lots
	fn divergence_inputs() -> Vec<Transaction> {
		vec![
			inflow_tx("buy1", "kraken", at(2024, 1, 10), "BTC", dec!(1)),
			inflow_tx("buy2", "kraken", at(2024, 2, 10), "BTC", dec!(1)),
			outflow_tx("sell", "kraken", at(2024, 3, 10), "BTC", dec!(1.5)),
		]
	}

	fn run(method: CostBasisMethod) -> CalculationOutcome {
		let prices = btc_prices();
		Calculator::new(config(method), &prices)
			.run(&divergence_inputs(), &[])
	}

	#[test]
	fn test_fifo_lifo_average_diverge_but_identity_holds() {
		let fifo = run(CostBasisMethod::Fifo);
		let lifo = run(CostBasisMethod::Lifo);
		let avg = run(CostBasisMethod::AverageCost);

		// proceeds are the same everywhere: 1.5 * 60000
		for outcome in [&fifo, &lifo, &avg] {
			assert!(outcome.calculation.is_completed());
			let t = &outcome.calculation.totals;
			assert_eq!(t.total_proceeds, dec!(90000));
			assert_eq!(
				t.total_gain_loss,
				t.total_proceeds - t.total_cost_basis
			);
		}

		// FIFO: 1 @ 30000 + 0.5 @ 50000 = 55000 cost
		assert_eq!(fifo.calculation.totals.total_cost_basis, dec!(55000));
		// LIFO: 1 @ 50000 + 0.5 @ 30000 = 65000 cost
		assert_eq!(lifo.calculation.totals.total_cost_basis, dec!(65000));
		// Average: 1.5 @ 40000 = 60000 cost
		assert_eq!(avg.calculation.totals.total_cost_basis, dec!(60000));

		assert_eq!(fifo.calculation.totals.total_gain_loss, dec!(35000));
		assert_eq!(lifo.calculation.totals.total_gain_loss, dec!(25000));
		assert_eq!(avg.calculation.totals.total_gain_loss, dec!(30000));
	}

	#[test]
	fn test_disposal_consumption_is_recorded_per_lot() {
		let fifo = run(CostBasisMethod::Fifo);
		assert_eq!(fifo.disposals.len(), 1);

		let d = &fifo.disposals[0];
		assert_eq!(d.quantity_disposed, dec!(1.5));
		assert_eq!(d.lots_consumed.len(), 2);
		assert_eq!(d.lots_consumed[0].quantity, dec!(1));
		assert_eq!(d.lots_consumed[0].cost_basis_portion, dec!(30000));
		assert_eq!(d.lots_consumed[1].quantity, dec!(0.5));
		assert_eq!(d.lots_consumed[1].cost_basis_portion, dec!(25000));
		assert_eq!(
			d.realized_gain_loss,
			d.proceeds - d.cost_basis_consumed
		);
		assert_eq!(d.holding_period, HoldingPeriod::Short);
	}

	#[test]
	fn test_linked_transfer_is_neutral() {
		let transactions = vec![
			inflow_tx("buy", "kraken", at(2024, 1, 10), "BTC", dec!(1)),
			outflow_tx("wd", "kraken", at(2024, 2, 10), "BTC", dec!(1)),
			inflow_tx("dep", "bitcoin", at(2024, 2, 10), "BTC", dec!(1)),
			outflow_tx("sell", "bitcoin", at(2024, 3, 10), "BTC", dec!(1)),
		];
		let links = vec![confirmed_link("l1", "wd", "dep", "BTC", dec!(1))];

		let prices = btc_prices();
		let outcome = Calculator::new(config(CostBasisMethod::Fifo), &prices)
			.run(&transactions, &links);

		assert!(outcome.calculation.is_completed());

		// The withdrawal produced a transfer, not a disposal
		assert_eq!(outcome.transfers.len(), 1);
		assert_eq!(outcome.transfers[0].to_transaction_id, "dep");
		assert!(outcome.transfers[0].preserves_acquisition_date);
		assert_eq!(outcome.disposals.len(), 1);

		// The final sale realizes against the original January basis,
		// not a February re-acquisition
		let d = &outcome.disposals[0];
		assert_eq!(d.cost_basis_consumed, dec!(30000));
		assert_eq!(d.proceeds, dec!(60000));
		assert_eq!(
			outcome.calculation.totals.total_gain_loss,
			dec!(30000)
		);
	}

	#[test]
	fn test_unlinked_withdrawal_is_a_disposal() {
		let transactions = vec![
			inflow_tx("buy", "kraken", at(2024, 1, 10), "BTC", dec!(1)),
			outflow_tx("wd", "kraken", at(2024, 2, 10), "BTC", dec!(1)),
		];

		let prices = btc_prices();
		let outcome = Calculator::new(config(CostBasisMethod::Fifo), &prices)
			.run(&transactions, &[]);

		assert!(outcome.calculation.is_completed());
		assert!(outcome.transfers.is_empty());
		assert_eq!(outcome.disposals.len(), 1);
		assert_eq!(
			outcome.calculation.totals.total_gain_loss,
			dec!(20000)
		);
	}

	#[test]
	fn test_insufficient_lots_fail_the_calculation() {
		let transactions = vec![
			inflow_tx("buy", "kraken", at(2024, 1, 10), "BTC", dec!(1)),
			outflow_tx("sell", "kraken", at(2024, 2, 10), "BTC", dec!(2)),
		];

		let prices = btc_prices();
		let outcome = Calculator::new(config(CostBasisMethod::Fifo), &prices)
			.run(&transactions, &[]);

		match &outcome.calculation.status {
			CalculationStatus::Failed(e) => {
				assert!(e.contains("BTC"), "error was: {}", e);
			},
			other => panic!("expected failure, got {:?}", other),
		}
		assert!(outcome.lots.is_empty());
		assert!(outcome.disposals.is_empty());
	}

	#[test]
	fn test_missing_price_fails_the_calculation() {
		let transactions =
			vec![inflow_tx("buy", "kraken", at(2024, 5, 5), "BTC", dec!(1))];

		let prices = btc_prices(); // no 2024-05-05 price
		let outcome = Calculator::new(config(CostBasisMethod::Fifo), &prices)
			.run(&transactions, &[]);

		match &outcome.calculation.status {
			CalculationStatus::Failed(e) => {
				assert!(e.contains("2024-05-05"), "error was: {}", e);
			},
			other => panic!("expected failure, got {:?}", other),
		}
	}

	#[test]
	fn test_holding_period_long_and_german_exemption() {
		let transactions = vec![
			inflow_tx("buy", "kraken", at(2023, 1, 10), "BTC", dec!(1)),
			outflow_tx("sell", "kraken", at(2024, 6, 10), "BTC", dec!(1)),
		];

		let prices = btc_prices();
		let mut de_config = config(CostBasisMethod::Fifo);
		de_config.jurisdiction = Jurisdiction::De;

		let outcome = Calculator::new(de_config, &prices)
			.run(&transactions, &[]);

		assert!(outcome.calculation.is_completed());
		let d = &outcome.disposals[0];
		assert_eq!(d.holding_period, HoldingPeriod::Long);

		let t = &outcome.calculation.totals;
		assert_eq!(t.total_gain_loss, dec!(35000));
		assert_eq!(t.total_taxable_gain_loss, dec!(0));
	}

	#[test]
	fn test_pre_range_history_is_replayed_but_not_reported() {
		// Acquired and partially sold in 2023; only the 2024 sale
		// should appear in a 2024 run
		let transactions = vec![
			inflow_tx("buy", "kraken", at(2023, 1, 10), "BTC", dec!(2)),
			outflow_tx("old-sell", "kraken", at(2023, 1, 10), "BTC", dec!(1)),
			outflow_tx("sell", "kraken", at(2024, 3, 10), "BTC", dec!(1)),
		];

		let prices = btc_prices();
		let outcome = Calculator::new(config(CostBasisMethod::Fifo), &prices)
			.run(&transactions, &[]);

		assert!(outcome.calculation.is_completed());
		assert_eq!(outcome.disposals.len(), 1);
		assert_eq!(outcome.disposals[0].disposal_transaction_id, "sell");
		assert_eq!(outcome.calculation.disposals_processed, 1);

		// 60000 proceeds - 20000 basis from 2023
		assert_eq!(
			outcome.calculation.totals.total_gain_loss,
			dec!(40000)
		);
	}

	#[test]
	fn test_counters() {
		let fifo = run(CostBasisMethod::Fifo);
		let c = &fifo.calculation;
		assert_eq!(c.transactions_processed, 3);
		assert_eq!(c.disposals_processed, 1);
		assert_eq!(c.assets_processed, 1);
		assert_eq!(c.lots_created, 2);
	}

	#[test]
	fn test_asset_filter_skips_other_assets() {
		let mut cfg = config(CostBasisMethod::Fifo);
		cfg.assets = vec!["ETH".to_string()];

		let prices = btc_prices();
		let outcome = Calculator::new(cfg, &prices)
			.run(&divergence_inputs(), &[]);

		// Nothing BTC was processed, so nothing could fail or realize
		assert!(outcome.calculation.is_completed());
		assert_eq!(outcome.calculation.assets_processed, 0);
		assert!(outcome.disposals.is_empty());
	}

	#[test]
	fn test_transfer_with_network_fee_forfeits_fee_basis() {
		// 1 BTC leaves, 0.9 BTC arrives; the missing 0.1 keeps no lot
		let transactions = vec![
			inflow_tx("buy", "kraken", at(2024, 1, 10), "BTC", dec!(1)),
			outflow_tx("wd", "kraken", at(2024, 2, 10), "BTC", dec!(1)),
			inflow_tx("dep", "bitcoin", at(2024, 2, 10), "BTC", dec!(0.9)),
		];
		let mut link = confirmed_link("l1", "wd", "dep", "BTC", dec!(1));
		link.target_amount = dec!(0.9);

		let prices = btc_prices();
		let outcome = Calculator::new(config(CostBasisMethod::Fifo), &prices)
			.run(&transactions, &[link]);

		assert!(outcome.calculation.is_completed());
		let open: Decimal = outcome
			.lots
			.iter()
			.map(|l| l.remaining_quantity)
			.sum();
		assert_eq!(open, dec!(0.9));
		assert_eq!(outcome.calculation.totals.total_gain_loss, dec!(0));
	}
}
