// ⌨️ Command Shell - line-oriented front end over the catalog
//
// Each input line is split into words and parsed with clap, so every
// command gets argument validation and `help` output for free.

use anyhow::Result;
use car_catalog::{
    Catalog, Category, SedanSpec, SuvSpec, TruckSpec, TrunkSize, Vehicle, VehicleSpec,
};
use clap::{Args, Parser, Subcommand};
use std::io::{BufRead, Write};

#[derive(Parser, Debug)]
#[command(name = "catalog", no_binary_name = true, disable_version_flag = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a vehicle to the catalog
    Add {
        #[command(subcommand)]
        kind: AddKind,
    },
    /// List vehicles grouped by category, optionally only one category
    List { category: Option<Category> },
    /// List vehicles by price, low to high
    Asc,
    /// List vehicles by price, high to low
    Desc,
    /// Show one vehicle
    Find { make: String, model: String },
    /// Remove a vehicle
    Remove { make: String, model: String },
    /// Reduce a vehicle's price by a percentage (0-100)
    Discount {
        make: String,
        model: String,
        #[arg(allow_negative_numbers = true)]
        percent: f64,
    },
    /// Set a vehicle's price
    Reprice {
        make: String,
        model: String,
        #[arg(allow_negative_numbers = true)]
        price: f64,
    },
    /// Catalog totals
    Stats,
    /// Dump the catalog as JSON
    Json,
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

#[derive(Args, Debug)]
struct Common {
    make: String,
    model: String,
    #[arg(allow_negative_numbers = true)]
    year: i32,
    #[arg(allow_negative_numbers = true)]
    price: f64,
}

#[derive(Subcommand, Debug)]
enum AddKind {
    Sedan {
        #[command(flatten)]
        common: Common,
        #[arg(long, default_value_t = 5)]
        seats: u8,
        #[arg(long)]
        navigation: bool,
        #[arg(long)]
        sunroof: bool,
        #[arg(long, default_value = "medium")]
        trunk: TrunkSize,
    },
    Suv {
        #[command(flatten)]
        common: Common,
        #[arg(long, default_value_t = 5)]
        seats: u8,
        #[arg(long)]
        navigation: bool,
        #[arg(long)]
        awd: bool,
        /// Cargo space in cubic feet
        #[arg(long, default_value_t = 30)]
        cargo: u32,
    },
    Truck {
        #[command(flatten)]
        common: Common,
        /// Payload capacity in tons
        #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
        payload: f64,
        #[arg(long, default_value = "Automatic")]
        transmission: String,
        #[arg(long, default_value_t = 2)]
        axles: u8,
        #[arg(long)]
        sleeper: bool,
    },
}

impl AddKind {
    fn into_vehicle(self) -> std::result::Result<Vehicle, car_catalog::ValidationError> {
        let (common, spec) = match self {
            AddKind::Sedan {
                common,
                seats,
                navigation,
                sunroof,
                trunk,
            } => (
                common,
                VehicleSpec::Sedan(SedanSpec {
                    seating_capacity: seats,
                    has_navigation: navigation,
                    has_sunroof: sunroof,
                    trunk_size: trunk,
                }),
            ),
            AddKind::Suv {
                common,
                seats,
                navigation,
                awd,
                cargo,
            } => (
                common,
                VehicleSpec::Suv(SuvSpec {
                    seating_capacity: seats,
                    has_navigation: navigation,
                    all_wheel_drive: awd,
                    cargo_space: cargo,
                }),
            ),
            AddKind::Truck {
                common,
                payload,
                transmission,
                axles,
                sleeper,
            } => (
                common,
                VehicleSpec::Truck(TruckSpec {
                    payload_capacity: payload,
                    transmission,
                    axle_count: axles,
                    has_sleeper: sleeper,
                }),
            ),
        };

        Vehicle::new(common.make, common.model, common.year, common.price, spec)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Split a line into words; double quotes group words ("Land Rover").
fn split_words(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_word = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_word = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_word {
                    words.push(std::mem::take(&mut current));
                    has_word = false;
                }
            }
            c => {
                current.push(c);
                has_word = true;
            }
        }
    }

    if in_quotes {
        return Err("unterminated quote".to_string());
    }
    if has_word {
        words.push(current);
    }
    Ok(words)
}

pub struct Shell<'a, R, W> {
    catalog: &'a mut Catalog,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Shell<'a, R, W> {
    pub fn new(catalog: &'a mut Catalog, input: R, output: W) -> Self {
        Shell {
            catalog,
            input,
            output,
        }
    }

    /// Read and execute commands until `quit` or end of input
    pub fn run(&mut self) -> Result<()> {
        writeln!(self.output, "===== Car Catalog System =====")?;
        writeln!(self.output, "Type 'help' for commands.")?;

        let mut line = String::new();
        loop {
            write!(self.output, "\ncatalog> ")?;
            self.output.flush()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                log::debug!("end of input");
                break;
            }

            let words = match split_words(line.trim()) {
                Ok(words) if words.is_empty() => continue,
                Ok(words) => words,
                Err(message) => {
                    writeln!(self.output, "Error: {}", message)?;
                    continue;
                }
            };

            let command = match Line::try_parse_from(&words) {
                Ok(parsed) => parsed.command,
                Err(err) => {
                    write!(self.output, "{}", err.render())?;
                    continue;
                }
            };

            log::debug!("command: {:?}", command);
            if self.execute(command)? == Flow::Quit {
                break;
            }
        }

        writeln!(self.output, "\nThank you for using the Car Catalog. Bye!")?;
        Ok(())
    }

    fn execute(&mut self, command: Command) -> Result<Flow> {
        match command {
            Command::Add { kind } => {
                let vehicle = match kind.into_vehicle() {
                    Ok(vehicle) => vehicle,
                    Err(err) => {
                        writeln!(self.output, "Error: {}", err)?;
                        return Ok(Flow::Continue);
                    }
                };
                let label = format!(
                    "{} {} {} ({})",
                    vehicle.year(),
                    vehicle.make(),
                    vehicle.model(),
                    vehicle.category()
                );
                match self.catalog.add(vehicle) {
                    Ok(id) => {
                        log::info!("added {} as {}", label, id);
                        writeln!(self.output, "Added {}", label)?;
                    }
                    Err(err) => self.report(err)?,
                }
            }
            Command::List { category: None } => {
                writeln!(self.output, "\n===== All Cars in Catalog =====")?;
                let vehicles: Vec<&Vehicle> = self.catalog.list_all().collect();
                write_vehicles(&mut self.output, "Car", &vehicles)?;
            }
            Command::List {
                category: Some(category),
            } => {
                writeln!(self.output, "\n===== {}s in Catalog =====", category)?;
                let vehicles: Vec<&Vehicle> = self.catalog.list_by_category(category).collect();
                if vehicles.is_empty() {
                    writeln!(self.output, "No {}s found in the catalog.", category)?;
                } else {
                    write_vehicles(&mut self.output, category.as_str(), &vehicles)?;
                }
            }
            Command::Asc => {
                writeln!(self.output, "\n===== Cars Sorted by Price (Low to High) =====")?;
                let vehicles: Vec<&Vehicle> = self.catalog.list_by_price_ascending().collect();
                write_vehicles(&mut self.output, "Car", &vehicles)?;
            }
            Command::Desc => {
                writeln!(self.output, "\n===== Cars Sorted by Price (High to Low) =====")?;
                let vehicles: Vec<&Vehicle> = self.catalog.list_by_price_descending().collect();
                write_vehicles(&mut self.output, "Car", &vehicles)?;
            }
            Command::Find { make, model } => match self.catalog.find_by_make_model(&make, &model) {
                Some(vehicle) => {
                    writeln!(self.output, "\n===== Car Found =====")?;
                    writeln!(self.output, "{}", vehicle)?;
                }
                None => writeln!(self.output, "Car not found.")?,
            },
            Command::Remove { make, model } => {
                if self.catalog.remove(&make, &model) {
                    log::info!("removed {} {}", make, model);
                    writeln!(self.output, "Car removed successfully!")?;
                } else {
                    writeln!(self.output, "Car not found.")?;
                }
            }
            Command::Discount {
                make,
                model,
                percent,
            } => match self.catalog.apply_discount(&make, &model, percent) {
                Ok(()) => {
                    log::info!("discounted {} {} by {}%", make, model, percent);
                    self.write_new_price(&make, &model)?;
                }
                Err(err) => self.report(err)?,
            },
            Command::Reprice { make, model, price } => {
                match self.catalog.reprice(&make, &model, price) {
                    Ok(()) => {
                        log::info!("repriced {} {} to {}", make, model, price);
                        self.write_new_price(&make, &model)?;
                    }
                    Err(err) => self.report(err)?,
                }
            }
            Command::Stats => {
                let stats = self.catalog.stats();
                writeln!(self.output, "\n===== Catalog Summary =====")?;
                writeln!(self.output, "Total cars: {}", stats.total)?;
                if let Some(capacity) = self.catalog.config().capacity {
                    writeln!(self.output, "Capacity: {}/{}", stats.total, capacity)?;
                }
                if !self.catalog.config().allow_duplicates {
                    writeln!(self.output, "Duplicate make/model: rejected")?;
                }
                for (category, count) in &stats.by_category {
                    writeln!(self.output, "  {}: {}", category, count)?;
                }
                writeln!(self.output, "Total value: ${:.2}", stats.total_value)?;
                writeln!(self.output, "Average price: ${:.2}", stats.average_price)?;
                writeln!(
                    self.output,
                    "Insurance estimate (all cars): ${:.2}/yr",
                    stats.total_insurance
                )?;
            }
            Command::Json => {
                let vehicles: Vec<&Vehicle> = self.catalog.list_all().collect();
                writeln!(self.output, "{}", serde_json::to_string_pretty(&vehicles)?)?;
            }
            Command::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    fn write_new_price(&mut self, make: &str, model: &str) -> Result<()> {
        if let Some(vehicle) = self.catalog.find_by_make_model(make, model) {
            writeln!(self.output, "New price: ${:.2}", vehicle.price())?;
        }
        Ok(())
    }

    fn report(&mut self, err: car_catalog::CatalogError) -> Result<()> {
        log::warn!("{}", err);
        writeln!(self.output, "Error: {}", err)?;
        Ok(())
    }
}

fn write_vehicles<W: Write>(output: &mut W, label: &str, vehicles: &[&Vehicle]) -> Result<()> {
    if vehicles.is_empty() {
        writeln!(output, "No cars in the catalog.")?;
        return Ok(());
    }

    for (i, vehicle) in vehicles.iter().enumerate() {
        writeln!(output, "\n--- {} #{} ---", label, i + 1)?;
        writeln!(output, "{}", vehicle)?;
    }
    Ok(())
}
