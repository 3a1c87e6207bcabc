// 🚗 Vehicle Records - closed set of variants sharing common fields
//
// Identity: UUID + catalog handle (never changes)
// Values: make, model, year, category are fixed at creation; price may be
// mutated in place through set_price / apply_discount.

use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Oldest accepted model year.
pub const MIN_YEAR: i32 = 1886;
/// Newest accepted model year; also the reference year for vehicle age.
pub const MAX_YEAR: i32 = 2025;

const BASE_PREMIUM_RATE: f64 = 0.04;
const AGE_DISCOUNT_PER_YEAR: f64 = 0.03;
const MIN_AGE_FACTOR: f64 = 0.5;

// ============================================================================
// CATEGORY
// ============================================================================

/// Fixed classification tag. Declaration order is catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Sedan,
    #[serde(rename = "SUV")]
    Suv,
    Truck,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Sedan, Category::Suv, Category::Truck];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Sedan => "Sedan",
            Category::Suv => "SUV",
            Category::Truck => "Truck",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sedan" => Ok(Category::Sedan),
            "suv" => Ok(Category::Suv),
            "truck" => Ok(Category::Truck),
            other => Err(ValidationError::new(
                "category",
                format!("expected Sedan, SUV or Truck, got '{}'", other),
            )),
        }
    }
}

// ============================================================================
// VARIANT ATTRIBUTES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrunkSize {
    Small,
    Medium,
    Large,
}

impl TrunkSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrunkSize::Small => "Small",
            TrunkSize::Medium => "Medium",
            TrunkSize::Large => "Large",
        }
    }
}

impl FromStr for TrunkSize {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "small" => Ok(TrunkSize::Small),
            "medium" => Ok(TrunkSize::Medium),
            "large" => Ok(TrunkSize::Large),
            other => Err(ValidationError::new(
                "trunk_size",
                format!("expected Small, Medium or Large, got '{}'", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SedanSpec {
    pub seating_capacity: u8,
    pub has_navigation: bool,
    pub has_sunroof: bool,
    pub trunk_size: TrunkSize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuvSpec {
    pub seating_capacity: u8,
    pub has_navigation: bool,
    pub all_wheel_drive: bool,
    /// Cargo space in cubic feet
    pub cargo_space: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruckSpec {
    /// Payload capacity in tons
    pub payload_capacity: f64,
    pub transmission: String,
    pub axle_count: u8,
    pub has_sleeper: bool,
}

/// Variant-specific attributes. The variant decides the category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category")]
pub enum VehicleSpec {
    Sedan(SedanSpec),
    #[serde(rename = "SUV")]
    Suv(SuvSpec),
    Truck(TruckSpec),
}

impl VehicleSpec {
    pub fn category(&self) -> Category {
        match self {
            VehicleSpec::Sedan(_) => Category::Sedan,
            VehicleSpec::Suv(_) => Category::Suv,
            VehicleSpec::Truck(_) => Category::Truck,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            VehicleSpec::Sedan(sedan) => validate_seating(sedan.seating_capacity),
            VehicleSpec::Suv(suv) => validate_seating(suv.seating_capacity),
            VehicleSpec::Truck(truck) => {
                if !truck.payload_capacity.is_finite() || truck.payload_capacity < 0.0 {
                    return Err(ValidationError::new(
                        "payload_capacity",
                        format!("must be a non-negative number, got {}", truck.payload_capacity),
                    ));
                }
                if truck.transmission.trim().is_empty() {
                    return Err(ValidationError::new("transmission", "Required field is empty"));
                }
                if !(2..=8).contains(&truck.axle_count) {
                    return Err(ValidationError::new(
                        "axle_count",
                        format!("must be between 2 and 8, got {}", truck.axle_count),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Premium multiplier for the variant and its equipment.
    fn risk_factor(&self) -> f64 {
        match self {
            VehicleSpec::Sedan(sedan) => {
                if sedan.has_sunroof {
                    1.05
                } else {
                    1.0
                }
            }
            VehicleSpec::Suv(suv) => {
                let base = 1.15;
                if suv.all_wheel_drive {
                    base * 0.95
                } else {
                    base
                }
            }
            VehicleSpec::Truck(truck) => {
                let mut factor = 1.30 * (1.0 + 0.02 * truck.payload_capacity);
                if truck.has_sleeper {
                    factor *= 1.10;
                }
                factor
            }
        }
    }
}

fn validate_seating(seats: u8) -> Result<(), ValidationError> {
    if (1..=9).contains(&seats) {
        Ok(())
    } else {
        Err(ValidationError::new(
            "seating_capacity",
            format!("must be between 1 and 9, got {}", seats),
        ))
    }
}

fn validate_price(price: f64) -> Result<(), ValidationError> {
    if price.is_finite() && price >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new(
            "price",
            format!("must be a non-negative number, got {}", price),
        ))
    }
}

// ============================================================================
// VEHICLE
// ============================================================================

/// One cataloged vehicle.
///
/// Fields are private so the invariants checked by [`Vehicle::new`] hold for
/// the life of the value: price is finite and non-negative, the year is in
/// `MIN_YEAR..=MAX_YEAR` and the category never changes.
#[derive(Debug, Clone, Serialize)]
pub struct Vehicle {
    id: Uuid,
    make: String,
    model: String,
    year: i32,
    price: f64,
    #[serde(flatten)]
    spec: VehicleSpec,
    listed_at: DateTime<Utc>,
}

impl Vehicle {
    pub fn new(
        make: impl Into<String>,
        model: impl Into<String>,
        year: i32,
        price: f64,
        spec: VehicleSpec,
    ) -> Result<Self, ValidationError> {
        let make = make.into().trim().to_string();
        let model = model.into().trim().to_string();

        if make.is_empty() {
            return Err(ValidationError::new("make", "Required field is empty"));
        }
        if model.is_empty() {
            return Err(ValidationError::new("model", "Required field is empty"));
        }
        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(ValidationError::new(
                "year",
                format!("must be between {} and {}, got {}", MIN_YEAR, MAX_YEAR, year),
            ));
        }
        validate_price(price)?;
        spec.validate()?;

        Ok(Vehicle {
            id: Uuid::new_v4(),
            make,
            model,
            year,
            price,
            spec,
            listed_at: Utc::now(),
        })
    }

    pub fn sedan(
        make: impl Into<String>,
        model: impl Into<String>,
        year: i32,
        price: f64,
        spec: SedanSpec,
    ) -> Result<Self, ValidationError> {
        Self::new(make, model, year, price, VehicleSpec::Sedan(spec))
    }

    pub fn suv(
        make: impl Into<String>,
        model: impl Into<String>,
        year: i32,
        price: f64,
        spec: SuvSpec,
    ) -> Result<Self, ValidationError> {
        Self::new(make, model, year, price, VehicleSpec::Suv(spec))
    }

    pub fn truck(
        make: impl Into<String>,
        model: impl Into<String>,
        year: i32,
        price: f64,
        spec: TruckSpec,
    ) -> Result<Self, ValidationError> {
        Self::new(make, model, year, price, VehicleSpec::Truck(spec))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn make(&self) -> &str {
        &self.make
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn spec(&self) -> &VehicleSpec {
        &self.spec
    }

    pub fn category(&self) -> Category {
        self.spec.category()
    }

    pub fn listed_at(&self) -> DateTime<Utc> {
        self.listed_at
    }

    /// Exact (case-sensitive) make + model match
    pub fn matches(&self, make: &str, model: &str) -> bool {
        self.make == make && self.model == model
    }

    pub fn set_price(&mut self, price: f64) -> Result<(), ValidationError> {
        validate_price(price)?;
        self.price = price;
        Ok(())
    }

    /// Reduce the price by `percent` (0..=100). On error the price is untouched.
    pub fn apply_discount(&mut self, percent: f64) -> Result<(), ValidationError> {
        if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
            return Err(ValidationError::new(
                "discount",
                format!("must be between 0 and 100 percent, got {}", percent),
            ));
        }
        self.price *= 1.0 - percent / 100.0;
        Ok(())
    }

    /// Estimated annual insurance premium.
    ///
    /// 4% of the price, reduced by 3% per year of age (floored at half),
    /// then scaled by the variant's risk factor.
    pub fn insurance_estimate(&self) -> f64 {
        let age = f64::from((MAX_YEAR - self.year).max(0));
        let age_factor = (1.0 - AGE_DISCOUNT_PER_YEAR * age).max(MIN_AGE_FACTOR);
        self.price * BASE_PREMIUM_RATE * age_factor * self.spec.risk_factor()
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {} {}", self.year, self.make, self.model)?;
        writeln!(f, "Type: {}", self.category())?;
        writeln!(f, "Price: ${:.2}", self.price)?;
        match &self.spec {
            VehicleSpec::Sedan(sedan) => {
                writeln!(f, "Seating Capacity: {}", sedan.seating_capacity)?;
                writeln!(f, "Navigation: {}", yes_no(sedan.has_navigation))?;
                writeln!(f, "Sunroof: {}", yes_no(sedan.has_sunroof))?;
                writeln!(f, "Trunk Size: {}", sedan.trunk_size.as_str())?;
            }
            VehicleSpec::Suv(suv) => {
                writeln!(f, "Seating Capacity: {}", suv.seating_capacity)?;
                writeln!(f, "Navigation: {}", yes_no(suv.has_navigation))?;
                writeln!(f, "All-Wheel Drive: {}", yes_no(suv.all_wheel_drive))?;
                writeln!(f, "Cargo Space: {} cu ft", suv.cargo_space)?;
            }
            VehicleSpec::Truck(truck) => {
                writeln!(f, "Payload Capacity: {} tons", truck.payload_capacity)?;
                writeln!(f, "Transmission: {}", truck.transmission)?;
                writeln!(f, "Axle Count: {}", truck.axle_count)?;
                writeln!(f, "Sleeper Cabin: {}", yes_no(truck.has_sleeper))?;
            }
        }
        write!(f, "Insurance Estimate: ${:.2}/yr", self.insurance_estimate())
    }
}

// ============================================================================
// TESTS
// ============================================================================
