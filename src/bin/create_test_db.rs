use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use servicebay::{
    CallRecordForm, NewServiceRecord, NewVehicle, Part, VehicleType, create_service_record,
    create_vehicle, initialize_db, upsert_call_record,
};

/// A utility for creating a demo database for the servicebay server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

const OWNERS: [(&str, &str); 6] = [
    ("Aroha Ngata", "021 555 0101"),
    ("Ben Carter", "022 555 0102"),
    ("Chloe Wong", "027 555 0103"),
    ("Dev Patel", "021 555 0104"),
    ("Emma Brown", "022 555 0105"),
    ("Aroha Ngata", "021 555 0101"),
];

const MODELS: [(VehicleType, &str, &str, Option<f64>); 6] = [
    (VehicleType::Car, "Toyota", "Corolla", Some(1800.0)),
    (VehicleType::Bike, "Honda", "CB500F", Some(471.0)),
    (VehicleType::Car, "Mazda", "CX-5", Some(2500.0)),
    (VehicleType::Car, "Ford", "Ranger", Some(3200.0)),
    (VehicleType::Bike, "Yamaha", "MT-07", Some(689.0)),
    (VehicleType::Car, "Tesla", "Model 3", None),
];

const SERVICES: [(&str, &str, f64, f64); 5] = [
    ("Oil Change", "Oil filter", 18.5, 60.0),
    ("Brake Pads", "Brake pad set", 85.0, 120.0),
    ("Tyre Rotation", "Valve stems", 6.0, 45.0),
    ("Full Service", "Service kit", 110.0, 220.0),
    ("Chain Adjustment", "Chain lube", 12.0, 35.0),
];

const TECHNICIANS: [Option<&str>; 4] = [Some("Bob"), Some("Carol"), Some("Bob"), None];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    let today = OffsetDateTime::now_utc().date();
    let allowed_vehicle_types = [VehicleType::Bike, VehicleType::Car];

    println!("Creating vehicles...");

    for (index, ((owner, phone), (vehicle_type, make, model, engine_capacity))) in
        OWNERS.into_iter().zip(MODELS).enumerate()
    {
        // Spread the next service dates so that some vehicles are overdue and some upcoming.
        let next_service_offset = index as i64 * 25 - 40;

        create_vehicle(
            NewVehicle {
                id: format!("SB-{:03}", index + 1),
                vehicle_type,
                make: make.to_owned(),
                model: model.to_owned(),
                year: 2012 + index as u16 * 2,
                engine_capacity,
                owner: owner.to_owned(),
                phone: phone.to_owned(),
                last_service: today - Duration::days(240),
                next_service: today + Duration::days(next_service_offset),
                last_service_kilometers: 40_000 + index as u32 * 9_000,
                current_kilometers: 45_000 + index as u32 * 9_000,
            },
            &allowed_vehicle_types,
            today,
            &conn,
        )?;
    }

    println!("Creating service records...");

    for index in 0..40_usize {
        let vehicle_number = index % OWNERS.len() + 1;
        let (service_type, part_name, part_cost, labor_cost) = SERVICES[index % SERVICES.len()];
        // Oldest first so the vehicles end up with their most recent service.
        let days_ago = (39 - index as i64) * 6;

        create_service_record(
            NewServiceRecord {
                vehicle_id: format!("SB-{vehicle_number:03}"),
                date: today - Duration::days(days_ago),
                service_type: service_type.to_owned(),
                parts: vec![Part {
                    name: part_name.to_owned(),
                    cost: part_cost,
                }],
                labor_cost,
                discount: if index % 7 == 0 { 15.0 } else { 0.0 },
                technician: TECHNICIANS[index % TECHNICIANS.len()].map(str::to_owned),
                notes: (index % 3 == 0).then(|| "Customer waited on site".to_owned()),
                has_coupon: index % 7 == 0,
                coupon_type: (index % 7 == 0).then(|| "Loyalty".to_owned()),
                // The most recent few services have not been signed off yet.
                kilometers: if days_ago < 12 {
                    0
                } else {
                    40_000 + index as u32 * 1_100
                },
                next_service: None,
            },
            today,
            &conn,
        )?;
    }

    println!("Creating call records...");

    upsert_call_record(
        "SB-001",
        CallRecordForm {
            called: true,
            notes: Some("Booked in for next week".to_owned()),
        },
        today,
        &conn,
    )?;
    upsert_call_record(
        "SB-002",
        CallRecordForm {
            called: false,
            notes: Some("No answer, try again".to_owned()),
        },
        today,
        &conn,
    )?;

    println!("Success!");

    Ok(())
}
