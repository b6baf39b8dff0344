use medicine_common::{NewMedicine, NewPriceOffer, NewSupplier, PaymentStatus};
use medicine_prices::database::get_medicine_count;
use medicine_prices::{seed_sample_data, CatalogService, Database, PriceEngine, PurchaseRecorder};
use tempfile::TempDir;

// Test fixtures

fn open_temp_db(dir: &TempDir) -> Database {
    Database::open(&dir.path().join("nested").join("medicine_prices.db")).unwrap()
}

fn add_stockist(db: &Database, name: &str) -> i64 {
    CatalogService::new(db)
        .add_supplier(&NewSupplier::new(name).unwrap())
        .unwrap()
}

fn add_medicine_at(
    db: &Database,
    name: &str,
    company: &str,
    stockist: i64,
    mrp: f64,
    discount: f64,
) -> i64 {
    CatalogService::new(db)
        .add_medicine_with_price(
            &NewMedicine::new(name, company).unwrap(),
            &NewPriceOffer::new(stockist, mrp * 0.8, mrp, discount).unwrap(),
        )
        .unwrap()
}

// Persistence

#[test]
fn test_open_creates_missing_directory() {
    let dir = TempDir::new().unwrap();
    let _db = open_temp_db(&dir);
    assert!(dir.path().join("nested").join("medicine_prices.db").exists());
}

#[test]
fn test_data_survives_reopen() {
    let dir = TempDir::new().unwrap();
    {
        let db = open_temp_db(&dir);
        let stockist = add_stockist(&db, "MediCorp Distributors");
        add_medicine_at(&db, "Paracetamol 500mg", "Cipla", stockist, 30.0, 10.0);
        PurchaseRecorder::new(&db)
            .record_purchase("Paracetamol 500mg", "MediCorp Distributors", 27.0, 27.0)
            .unwrap();
    }

    let db = open_temp_db(&dir);
    assert_eq!(get_medicine_count(db.conn()).unwrap(), 1);
    let results = PriceEngine::new(&db).search_lowest_price("para").unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].final_price, 27.0);
    assert_eq!(
        PriceEngine::new(&db).get_dashboard_stats().unwrap().total_purchases,
        1
    );
}

// End-to-end comparison flow

#[test]
fn test_compare_then_record_purchase() {
    let dir = TempDir::new().unwrap();
    let db = open_temp_db(&dir);
    let medicorp = add_stockist(&db, "MediCorp Distributors");
    let pharmacare = add_stockist(&db, "PharmaCare Solutions");
    let lifeline = add_stockist(&db, "LifeLine Medical");

    let dolo = add_medicine_at(&db, "Dolo 650mg", "Micro Labs", medicorp, 80.0, 0.0);
    let catalog = CatalogService::new(&db);
    catalog
        .add_medicine_price(
            dolo,
            &NewPriceOffer::new(pharmacare, 60.0, 80.0, 6.25)
                .unwrap()
                .with_payment(PaymentStatus::Paid, 75.0)
                .unwrap(),
        )
        .unwrap();
    catalog
        .add_medicine_price(dolo, &NewPriceOffer::new(lifeline, 60.0, 75.0, 0.0).unwrap())
        .unwrap();

    let engine = PriceEngine::new(&db);
    let best = engine.search_lowest_price("dolo").unwrap();
    assert_eq!(best.len(), 1);
    assert_eq!(best[0].final_price, 75.0);
    // PharmaCare and LifeLine tie at 75.00; the older offer wins
    assert_eq!(best[0].stockist_name, "PharmaCare Solutions");

    let offers = engine.get_all_stockist_prices(dolo).unwrap();
    assert_eq!(offers.len(), 3);
    let ranks: Vec<u32> = offers.iter().map(|o| o.price_rank).collect();
    assert_eq!(ranks, vec![1, 1, 3]);
    assert_eq!(offers[0].paid_status, PaymentStatus::Paid);
    assert_eq!(offers[2].stockist_name, "MediCorp Distributors");

    let recorder = PurchaseRecorder::new(&db);
    let overpaid = recorder
        .record_purchase("Dolo 650mg", "MediCorp Distributors", 80.0, best[0].final_price)
        .unwrap();
    assert_eq!(overpaid, -5.0);
    let saved = recorder
        .record_purchase("Dolo 650mg", "Street Pharmacy", 60.0, best[0].final_price)
        .unwrap();
    assert_eq!(saved, 15.0);

    let stats = engine.get_dashboard_stats().unwrap();
    assert_eq!(stats.total_purchases, 2);
    assert_eq!(stats.total_savings, 10.0);
    assert_eq!(stats.avg_savings, 5.0);
    assert_eq!(stats.best_deals.len(), 1);
    assert_eq!(stats.best_deals[0].price, 75.0);
}

#[test]
fn test_failed_combined_add_leaves_no_medicine() {
    let dir = TempDir::new().unwrap();
    let db = open_temp_db(&dir);
    let result = CatalogService::new(&db).add_medicine_with_price(
        &NewMedicine::new("Orphan Tablet", "Nobody").unwrap(),
        &NewPriceOffer::new(12345, 1.0, 2.0, 0.0).unwrap(),
    );
    assert!(result.is_err());
    assert!(PriceEngine::new(&db)
        .get_all_medicines_with_prices()
        .unwrap()
        .is_empty());
}

// Seeded catalog

#[test]
fn test_every_seeded_medicine_has_a_consistent_best_price() {
    let dir = TempDir::new().unwrap();
    let db = open_temp_db(&dir);
    seed_sample_data(&db).unwrap();
    let engine = PriceEngine::new(&db);

    for row in engine.get_all_medicines_with_prices().unwrap() {
        let offers = engine.get_all_stockist_prices(row.id).unwrap();
        assert!(offers.len() as i64 >= row.stockist_count);
        assert_eq!(offers[0].price_rank, 1);
        assert_eq!(Some(offers[0].final_price), row.lowest_price);

        let min = offers
            .iter()
            .map(|o| o.final_price)
            .fold(f64::INFINITY, f64::min);
        for offer in offers.iter().filter(|o| o.price_rank == 1) {
            assert_eq!(offer.final_price, min);
        }
    }
}

#[test]
fn test_seeded_search_by_generic_name() {
    let dir = TempDir::new().unwrap();
    let db = open_temp_db(&dir);
    seed_sample_data(&db).unwrap();

    let names: Vec<String> = PriceEngine::new(&db)
        .search_lowest_price("  Paracetamol ")
        .unwrap()
        .into_iter()
        .map(|r| r.medicine_name)
        .collect();
    assert_eq!(names, vec!["Dolo 650mg", "Paracetamol 500mg"]);
}
