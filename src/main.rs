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
	CalculationConfig, CalculationStatus, Jurisdiction,
};
use crate::basis::calculator::Calculator;
use crate::basis::method::CostBasisMethod;
use crate::linking::graph::build_link_graph;
use crate::model::prices::StaticPrices;
use crate::parsing::input::InputFile;
use crate::reports::calc_reporter::CalcReporter;
use crate::reports::group_reporter::GroupReporter;
use crate::store::memory::MemoryStore;
use anyhow::{anyhow, bail, Error};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, ValueEnum};

mod basis;
mod config;
mod linking;
mod model;
mod parsing;
mod reports;
mod store;

#[derive(Parser)]
#[command(
	name = "taxlot",
	version,
	about = "Cost basis and transfer matching for cryptocurrency ledgers"
)]
struct Cli {
	// ----------------
	// -- POSITIONAL --
	// ----------------
	/// The command to execute
	command: Directive,

	// -----------
	// -- FLAGS --
	// -----------
	/// Specifies the input file
	#[arg(short)]
	file: String,

	/// Ignore taxable events prior to this date (YYYY-MM-DD)
	#[arg(short, long)]
	begin: Option<NaiveDate>,

	/// Ignore transactions after this date (YYYY-MM-DD)
	#[arg(short, long)]
	end: Option<NaiveDate>,

	/// Accounting method for disposals
	#[arg(short, long)]
	method: Option<CostBasisMethod>,

	/// Currency all totals are expressed in
	#[arg(short, long)]
	currency: Option<String>,

	/// Tax jurisdiction for holding-period rules
	#[arg(long)]
	jurisdiction: Option<Jurisdiction>,

	/// Tax year recorded on the calculation
	#[arg(long)]
	year: Option<i32>,

	/// Restrict the calculation to this asset (repeatable)
	#[arg(long = "asset")]
	assets: Vec<String>,

	/// Custom config file location (default: ~/.config/taxlot/config.toml)
	#[arg(long)]
	config: Option<String>,
}

impl Cli {
	/// Extra validations on top of what clap does
	fn validate(&self) -> Result<(), Error> {
		if let Some(year) = self.year {
			// nothing to account for before the genesis block
			if !(2009..=2100).contains(&year) {
				bail!("Implausible tax year {}", year);
			}
		}

		Ok(())
	}
}

#[derive(Clone, PartialEq, ValueEnum)]
enum Directive {
	/// Run a cost-basis calculation and report it
	Calc,

	/// Cluster transactions into linked groups
	Groups,

	/// Find possible data integrity concerns in the input
	Check,
}

fn main() -> Result<(), Error> {
	let args = Cli::parse();
	args.validate()?;

	let input = InputFile::load(&args.file)?;

	match args.command {
		Directive::Calc => calc(args, input),
		Directive::Groups => {
			let groups =
				build_link_graph(&input.transactions, &input.links);
			GroupReporter::new(groups).print();
			Ok(())
		},
		Directive::Check => check(input),
	}
}

fn calc(args: Cli, input: InputFile) -> Result<(), Error> {
	// Only this command inspects config in any way, so we don't
	// bother to read it until this point
	let config = parsing::filesystem::get_config(args.config.as_ref())?;
	let defaults = config.defaults.unwrap_or_default();

	let calc_config = CalculationConfig {
		method: args
			.method
			.or(defaults.method)
			.unwrap_or(CostBasisMethod::Fifo),
		jurisdiction: args
			.jurisdiction
			.or(defaults.jurisdiction)
			.unwrap_or(Jurisdiction::Us),
		tax_year: args.year.unwrap_or_else(|| Local::now().year()),
		currency: args
			.currency
			.or(defaults.currency)
			.unwrap_or_else(|| "USD".to_string()),
		begin: args.begin.unwrap_or(NaiveDate::MIN),
		end: args.end.unwrap_or(NaiveDate::MAX),
		assets: args.assets,
	};

	let prices = StaticPrices::new(input.prices);
	let calculator = Calculator::new(calc_config, &prices);
	let outcome = calculator.run(&input.transactions, &input.links);

	if let CalculationStatus::Failed(e) = &outcome.calculation.status {
		bail!("Calculation failed: {}", e);
	}

	let mut store = MemoryStore::new();
	let id = store.put(outcome)?;
	let calculation = store
		.calculation(&id)
		.ok_or_else(|| anyhow!("Calculation {} was not stored", id))?;

	CalcReporter::new(
		calculation,
		store.disposals(&id),
		store.transfers(&id),
	)
	.print();

	Ok(())
}

fn check(input: InputFile) -> Result<(), Error> {
	let report = input.check();

	println!(
		"Checked {} transactions and {} links",
		input.transactions.len(),
		input.links.len()
	);

	for warning in &report.warnings {
		println!("warning: {}", warning);
	}
	for problem in &report.problems {
		println!("problem: {}", problem);
	}

	if !report.problems.is_empty() {
		bail!("{} problems found", report.problems.len());
	}

	println!("No problems found");
	Ok(())
}
