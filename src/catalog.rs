// 🏪 Catalog - the facade over records, category list and price index
//
// Owns every record (in an arena) plus both orderings over them:
// - CategoryList: category order, arrival order within a category
// - PriceIndex: price order
//
// Invariant between operations: the list and the index hold exactly the
// same set of handles, and every handle resolves to a resident record.

use crate::arena::{Arena, Handle};
use crate::config::CatalogConfig;
use crate::error::{CatalogError, Result, ValidationError};
use crate::list::CategoryList;
use crate::price_index::{PriceEntry, PriceIndex};
use crate::vehicle::{Category, SedanSpec, SuvSpec, TruckSpec, TrunkSize, Vehicle};
use serde::Serialize;
use std::collections::BTreeMap;

/// Identity of a resident vehicle. Stops resolving once the vehicle is removed.
pub type VehicleId = Handle;

#[derive(Debug, Clone)]
struct Listing {
    vehicle: Vehicle,
    arrival: u64,
}

/// Aggregate figures over the current catalog
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStats {
    pub total: usize,
    pub by_category: BTreeMap<Category, usize>,
    pub total_value: f64,
    pub average_price: f64,
    pub total_insurance: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    config: CatalogConfig,
    listings: Arena<Listing>,
    list: CategoryList,
    index: PriceIndex,
    next_arrival: u64,
}

impl Catalog {
    pub fn new() -> Self {
        Self::with_config(CatalogConfig::default())
    }

    pub fn with_config(config: CatalogConfig) -> Self {
        Catalog {
            config,
            listings: Arena::new(),
            list: CategoryList::new(),
            index: PriceIndex::new(),
            next_arrival: 0,
        }
    }

    /// Catalog pre-loaded with one vehicle of each category
    pub fn with_samples() -> Result<Self> {
        let mut catalog = Catalog::new();
        catalog.add_samples()?;
        Ok(catalog)
    }

    /// Add the sample vehicles: Toyota Camry, Honda CR-V, Ford F-150
    pub fn add_samples(&mut self) -> Result<()> {
        self.add(Vehicle::sedan(
            "Toyota",
            "Camry",
            2022,
            25000.0,
            SedanSpec {
                seating_capacity: 5,
                has_navigation: true,
                has_sunroof: false,
                trunk_size: TrunkSize::Medium,
            },
        )?)?;
        self.add(Vehicle::suv(
            "Honda",
            "CR-V",
            2023,
            32000.0,
            SuvSpec {
                seating_capacity: 5,
                has_navigation: true,
                all_wheel_drive: true,
                cargo_space: 39,
            },
        )?)?;
        self.add(Vehicle::truck(
            "Ford",
            "F-150",
            2021,
            40000.0,
            TruckSpec {
                payload_capacity: 1.0,
                transmission: "Automatic".to_string(),
                axle_count: 2,
                has_sleeper: false,
            },
        )?)?;
        Ok(())
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    // ========================================================================
    // MUTATIONS
    // ========================================================================

    /// Add a vehicle to both the list and the price index.
    ///
    /// Policy checks run before anything is touched, so a rejected vehicle
    /// leaves the catalog exactly as it was.
    pub fn add(&mut self, vehicle: Vehicle) -> Result<VehicleId> {
        if let Some(capacity) = self.config.capacity {
            if self.len() >= capacity {
                return Err(CatalogError::CapacityExceeded { capacity });
            }
        }
        if !self.config.allow_duplicates
            && self.find_id(vehicle.make(), vehicle.model()).is_some()
        {
            return Err(CatalogError::Duplicate {
                make: vehicle.make().to_string(),
                model: vehicle.model().to_string(),
            });
        }

        let category = vehicle.category();
        let price = vehicle.price();
        let arrival = self.next_arrival;
        self.next_arrival += 1;

        let id = self.listings.insert(Listing { vehicle, arrival });
        self.list.insert_by_category(id, category);
        self.index.insert(PriceEntry {
            vehicle: id,
            price,
            arrival,
        });

        Ok(id)
    }

    /// Remove the first vehicle matching make and model. False if none does.
    pub fn remove(&mut self, make: &str, model: &str) -> bool {
        match self.find_id(make, model) {
            Some(id) => self.remove_by_id(id).is_some(),
            None => false,
        }
    }

    /// Remove a vehicle by handle and hand it back.
    ///
    /// The index has no node deletion, so it is rebuilt from the list.
    pub fn remove_by_id(&mut self, id: VehicleId) -> Option<Vehicle> {
        if !self.list.remove(id) {
            return None;
        }
        self.reindex();
        self.listings.remove(id).map(|listing| listing.vehicle)
    }

    /// Discount the first vehicle matching make and model by `percent`.
    pub fn apply_discount(&mut self, make: &str, model: &str, percent: f64) -> Result<()> {
        let id = self
            .find_id(make, model)
            .ok_or_else(|| CatalogError::not_found(make, model))?;
        self.update_price(id, |vehicle| vehicle.apply_discount(percent))
    }

    pub fn apply_discount_by_id(&mut self, id: VehicleId, percent: f64) -> Result<()> {
        self.update_price(id, |vehicle| vehicle.apply_discount(percent))
    }

    /// Set a new price on the first vehicle matching make and model.
    pub fn reprice(&mut self, make: &str, model: &str, price: f64) -> Result<()> {
        let id = self
            .find_id(make, model)
            .ok_or_else(|| CatalogError::not_found(make, model))?;
        self.update_price(id, |vehicle| vehicle.set_price(price))
    }

    /// Mutate a price in place, then re-key the index so price order holds.
    fn update_price<F>(&mut self, id: VehicleId, update: F) -> Result<()>
    where
        F: FnOnce(&mut Vehicle) -> std::result::Result<(), ValidationError>,
    {
        let listing = self
            .listings
            .get_mut(id)
            .ok_or(CatalogError::UnknownHandle(id))?;
        update(&mut listing.vehicle)?;
        self.reindex();
        Ok(())
    }

    fn reindex(&mut self) {
        let Catalog {
            listings, list, index, ..
        } = self;

        index.rebuild(list.iter().filter_map(|id| {
            listings.get(id).map(|listing| PriceEntry {
                vehicle: id,
                price: listing.vehicle.price(),
                arrival: listing.arrival,
            })
        }));
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn get(&self, id: VehicleId) -> Option<&Vehicle> {
        self.listings.get(id).map(|listing| &listing.vehicle)
    }

    pub fn find_id(&self, make: &str, model: &str) -> Option<VehicleId> {
        self.list.find_by_make_model(|id| self.get(id), make, model)
    }

    pub fn find_by_make_model(&self, make: &str, model: &str) -> Option<&Vehicle> {
        self.find_id(make, model).and_then(|id| self.get(id))
    }

    /// Handles in category order
    pub fn ids(&self) -> impl Iterator<Item = VehicleId> + '_ {
        self.list.iter()
    }

    pub fn category_ids(&self, category: Category) -> impl Iterator<Item = VehicleId> + '_ {
        self.list.iter_category(category)
    }

    pub fn ascending_ids(&self) -> impl Iterator<Item = VehicleId> + '_ {
        self.index.ascending()
    }

    pub fn descending_ids(&self) -> impl Iterator<Item = VehicleId> + '_ {
        self.index.descending()
    }

    /// Every vehicle, grouped by category
    pub fn list_all(&self) -> impl Iterator<Item = &Vehicle> + '_ {
        self.ids().filter_map(move |id| self.get(id))
    }

    pub fn list_by_category(&self, category: Category) -> impl Iterator<Item = &Vehicle> + '_ {
        self.category_ids(category).filter_map(move |id| self.get(id))
    }

    pub fn list_by_price_ascending(&self) -> impl Iterator<Item = &Vehicle> + '_ {
        self.ascending_ids().filter_map(move |id| self.get(id))
    }

    pub fn list_by_price_descending(&self) -> impl Iterator<Item = &Vehicle> + '_ {
        self.descending_ids().filter_map(move |id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Number of nodes in the price index
    pub fn index_len(&self) -> usize {
        self.index.len()
    }

    /// Height of the price index (it is never rebalanced)
    pub fn index_height(&self) -> usize {
        self.index.height()
    }

    pub fn stats(&self) -> CatalogStats {
        let mut by_category: BTreeMap<Category, usize> =
            Category::ALL.iter().map(|category| (*category, 0)).collect();
        let mut total_value = 0.0;
        let mut total_insurance = 0.0;

        for vehicle in self.list_all() {
            *by_category.entry(vehicle.category()).or_insert(0) += 1;
            total_value += vehicle.price();
            total_insurance += vehicle.insurance_estimate();
        }

        let total = self.len();
        let average_price = if total == 0 {
            0.0
        } else {
            total_value / total as f64
        };

        CatalogStats {
            total,
            by_category,
            total_value,
            average_price,
            total_insurance,
        }
    }

    /// Check every structural invariant of the catalog.
    pub fn is_consistent(&self) -> bool {
        let categories: Vec<Category> = self.list.categories().collect();
        if !categories.windows(2).all(|pair| pair[0] <= pair[1]) {
            return false;
        }

        if !self.index.is_ordered() {
            return false;
        }

        // Index keys must match the records' current prices
        let keys_current = self.index.entries().all(|entry| {
            self.get(entry.vehicle)
                .is_some_and(|vehicle| vehicle.price() == entry.price)
        });
        if !keys_current {
            return false;
        }

        let mut listed: Vec<VehicleId> = self.list.iter().collect();
        let mut indexed: Vec<VehicleId> = self.index.ascending().collect();
        listed.sort();
        indexed.sort();

        listed == indexed
            && listed.len() == self.listings.len()
            && listed.iter().all(|id| self.listings.contains(*id))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::tests::{sedan_spec, suv_spec, truck_spec};

    fn names<'a>(vehicles: impl Iterator<Item = &'a Vehicle>) -> Vec<String> {
        vehicles.map(|v| v.model().to_string()).collect()
    }

    #[test]
    fn test_sample_scenario() {
        let catalog = Catalog::with_samples().unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(names(catalog.list_by_price_ascending()), vec!["Camry", "CR-V", "F-150"]);
        assert_eq!(names(catalog.list_all()), vec!["Camry", "CR-V", "F-150"]);
        assert_eq!(names(catalog.list_by_price_descending()), vec!["F-150", "CR-V", "Camry"]);
        assert!(catalog.is_consistent());
    }

    #[test]
    fn test_remove_scenario() {
        let mut catalog = Catalog::with_samples().unwrap();

        assert!(catalog.remove("Honda", "CR-V"));
        assert!(catalog.find_by_make_model("Honda", "CR-V").is_none());
        assert_eq!(names(catalog.list_all()), vec!["Camry", "F-150"]);
        assert_eq!(names(catalog.list_by_price_ascending()), vec!["Camry", "F-150"]);
        assert_eq!(catalog.index_len(), 2);
        assert!(catalog.is_consistent());
    }

    #[test]
    fn test_add_grows_both_structures() {
        let mut catalog = Catalog::with_samples().unwrap();
        let before = (catalog.len(), catalog.index_len());

        let id = catalog
            .add(Vehicle::suv("Jeep", "Wrangler", 2020, 28000.0, suv_spec()).unwrap())
            .unwrap();

        assert_eq!(catalog.len(), before.0 + 1);
        assert_eq!(catalog.index_len(), before.1 + 1);
        let found = catalog.find_by_make_model("Jeep", "Wrangler").unwrap();
        assert_eq!(found.id(), catalog.get(id).unwrap().id());
    }

    #[test]
    fn test_list_all_groups_by_category() {
        let mut catalog = Catalog::new();
        catalog.add(Vehicle::truck("Ram", "1500", 2020, 35000.0, truck_spec()).unwrap()).unwrap();
        catalog.add(Vehicle::suv("Kia", "Sorento", 2021, 30000.0, suv_spec()).unwrap()).unwrap();
        catalog
            .add(Vehicle::sedan("Honda", "Accord", 2019, 20000.0, sedan_spec()).unwrap())
            .unwrap();
        catalog.add(Vehicle::suv("Mazda", "CX-5", 2022, 29000.0, suv_spec()).unwrap()).unwrap();

        assert_eq!(names(catalog.list_all()), vec!["Accord", "Sorento", "CX-5", "1500"]);
        assert_eq!(names(catalog.list_by_category(Category::Suv)), vec!["Sorento", "CX-5"]);
        assert_eq!(catalog.list_by_category(Category::Sedan).count(), 1);
    }

    #[test]
    fn test_remove_missing_returns_false() {
        let mut catalog = Catalog::new();
        assert!(!catalog.remove("Honda", "CR-V"));

        let mut catalog = Catalog::with_samples().unwrap();
        assert!(!catalog.remove("Honda", "Civic"));
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.index_len(), 3);
    }

    #[test]
    fn test_removed_handle_is_invalidated() {
        let mut catalog = Catalog::with_samples().unwrap();
        let id = catalog.find_id("Ford", "F-150").unwrap();

        let removed = catalog.remove_by_id(id).unwrap();
        assert_eq!(removed.model(), "F-150");
        assert!(catalog.get(id).is_none());
        assert!(catalog.remove_by_id(id).is_none());
        assert_eq!(
            catalog.apply_discount_by_id(id, 5.0),
            Err(CatalogError::UnknownHandle(id))
        );
    }

    #[test]
    fn test_discount_reorders_price_index() {
        let mut catalog = Catalog::with_samples().unwrap();

        catalog.apply_discount("Ford", "F-150", 50.0).unwrap();

        assert_eq!(catalog.find_by_make_model("Ford", "F-150").unwrap().price(), 20000.0);
        assert_eq!(names(catalog.list_by_price_ascending()), vec!["F-150", "Camry", "CR-V"]);
        assert!(catalog.is_consistent());
    }

    #[test]
    fn test_discount_edges() {
        let mut catalog = Catalog::with_samples().unwrap();

        catalog.apply_discount("Toyota", "Camry", 0.0).unwrap();
        assert_eq!(catalog.find_by_make_model("Toyota", "Camry").unwrap().price(), 25000.0);

        let err = catalog.apply_discount("Toyota", "Camry", 101.0).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
        assert_eq!(catalog.find_by_make_model("Toyota", "Camry").unwrap().price(), 25000.0);

        catalog.apply_discount("Toyota", "Camry", 100.0).unwrap();
        assert_eq!(catalog.find_by_make_model("Toyota", "Camry").unwrap().price(), 0.0);
        assert!(catalog.is_consistent());
    }

    #[test]
    fn test_discount_missing_vehicle() {
        let mut catalog = Catalog::with_samples().unwrap();
        let err = catalog.apply_discount("Tesla", "Model 3", 10.0).unwrap_err();
        assert_eq!(err, CatalogError::not_found("Tesla", "Model 3"));
    }

    #[test]
    fn test_reprice() {
        let mut catalog = Catalog::with_samples().unwrap();

        catalog.reprice("Toyota", "Camry", 45000.0).unwrap();
        assert_eq!(names(catalog.list_by_price_descending()), vec!["Camry", "F-150", "CR-V"]);

        assert!(catalog.reprice("Toyota", "Camry", -5.0).is_err());
        assert_eq!(catalog.find_by_make_model("Toyota", "Camry").unwrap().price(), 45000.0);
        assert!(catalog.reprice("Toyota", "Corolla", 5.0).unwrap_err().is_not_found());
    }

    #[test]
    fn test_capacity_is_enforced() {
        let mut catalog = Catalog::with_config(CatalogConfig::new().with_capacity(1));
        catalog
            .add(Vehicle::sedan("Toyota", "Camry", 2022, 25000.0, sedan_spec()).unwrap())
            .unwrap();

        let err = catalog
            .add(Vehicle::suv("Honda", "CR-V", 2023, 32000.0, suv_spec()).unwrap())
            .unwrap_err();
        assert_eq!(err, CatalogError::CapacityExceeded { capacity: 1 });
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.index_len(), 1);
    }

    #[test]
    fn test_duplicates() {
        let mut catalog = Catalog::new();
        catalog
            .add(Vehicle::sedan("Toyota", "Camry", 2022, 25000.0, sedan_spec()).unwrap())
            .unwrap();
        catalog
            .add(Vehicle::sedan("Toyota", "Camry", 2018, 15000.0, sedan_spec()).unwrap())
            .unwrap();
        assert_eq!(catalog.len(), 2);
        // First in list order wins
        assert_eq!(catalog.find_by_make_model("Toyota", "Camry").unwrap().year(), 2022);

        let mut strict = Catalog::with_config(CatalogConfig::new().with_allow_duplicates(false));
        strict
            .add(Vehicle::sedan("Toyota", "Camry", 2022, 25000.0, sedan_spec()).unwrap())
            .unwrap();
        let err = strict
            .add(Vehicle::sedan("Toyota", "Camry", 2018, 15000.0, sedan_spec()).unwrap())
            .unwrap_err();
        assert!(matches!(err, CatalogError::Duplicate { .. }));
        assert_eq!(strict.len(), 1);
    }

    #[test]
    fn test_equal_prices_keep_arrival_order_after_rebuild() {
        let mut catalog = Catalog::new();
        catalog.add(Vehicle::suv("Kia", "Sorento", 2021, 30000.0, suv_spec()).unwrap()).unwrap();
        catalog.add(Vehicle::sedan("Audi", "A4", 2021, 30000.0, sedan_spec()).unwrap()).unwrap();
        catalog.add(Vehicle::truck("Ram", "1500", 2021, 10000.0, truck_spec()).unwrap()).unwrap();

        let before = names(catalog.list_by_price_ascending());
        assert_eq!(before, vec!["1500", "Sorento", "A4"]);

        catalog.remove("Ram", "1500");
        assert_eq!(names(catalog.list_by_price_ascending()), vec!["Sorento", "A4"]);
    }

    #[test]
    fn test_stats() {
        let catalog = Catalog::with_samples().unwrap();
        let stats = catalog.stats();

        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_category[&Category::Suv], 1);
        assert_eq!(stats.total_value, 97000.0);
        assert!((stats.average_price - 97000.0 / 3.0).abs() < 1e-9);
        assert!(stats.total_insurance > 0.0);

        let empty = Catalog::new().stats();
        assert_eq!(empty.total, 0);
        assert_eq!(empty.average_price, 0.0);
        assert_eq!(empty.by_category[&Category::Truck], 0);
    }
}
