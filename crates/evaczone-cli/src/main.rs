use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use evaczone_lib::{
    nearest_of_category, resolve_containment, NewZone, Point, ZoneCategory, ZoneStore,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "evaczone zone database utilities")]
struct Cli {
    /// Path to the zone database.
    #[arg(long, default_value = "evaczone.db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the schema and seed the sample zone set.
    Init {
        /// Reseed even when the database already contains zones.
        #[arg(long)]
        force: bool,
    },
    /// Manage zones.
    Zones {
        #[command(subcommand)]
        command: ZonesCommand,
    },
    /// Check a position against the stored zones.
    Check {
        /// Latitude in decimal degrees.
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Longitude in decimal degrees.
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },
}

#[derive(Subcommand, Debug)]
enum ZonesCommand {
    /// List zones, optionally filtered by category.
    List {
        /// Category filter: hazard_high, hazard_medium, or safe.
        #[arg(long)]
        category: Option<String>,
    },
    /// Add a zone. The address stays unresolved; the service geocodes online.
    Add {
        #[arg(long)]
        name: String,
        /// Category: hazard_high, hazard_medium, or safe.
        #[arg(long)]
        category: String,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        #[arg(long, allow_negative_numbers = true)]
        radius_km: f64,
        #[arg(long)]
        description: Option<String>,
    },
    /// Remove a zone by id.
    Remove { id: i64 },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Init { force } => handle_init(&cli.db, force),
        Command::Zones { command } => match command {
            ZonesCommand::List { category } => handle_list(&cli.db, category.as_deref()),
            ZonesCommand::Add {
                name,
                category,
                lat,
                lon,
                radius_km,
                description,
            } => handle_add(&cli.db, name, &category, lat, lon, radius_km, description),
            ZonesCommand::Remove { id } => handle_remove(&cli.db, id),
        },
        Command::Check { lat, lon } => handle_check(&cli.db, lat, lon),
    }
}

fn open_store(db: &Path) -> Result<ZoneStore> {
    ZoneStore::open(db)
        .with_context(|| format!("failed to open zone database at {}", db.display()))
}

fn handle_init(db: &Path, force: bool) -> Result<()> {
    let store = open_store(db)?;

    let existing = store.zone_count()?;
    if existing > 0 {
        if !force {
            bail!(
                "database already contains {} zones; pass --force to reseed",
                existing
            );
        }
        for zone in store.list_zones()? {
            store.delete_zone(zone.id)?;
        }
    }

    let seeded = sample_zones()
        .iter()
        .map(|zone| store.create_zone(zone))
        .collect::<evaczone_lib::Result<Vec<_>>>()?;

    println!("Created {} zones:", seeded.len());
    for zone in &seeded {
        println!("- {} ({})", zone.name, zone.category);
    }

    Ok(())
}

fn handle_list(db: &Path, category: Option<&str>) -> Result<()> {
    let store = open_store(db)?;

    let zones = match category {
        Some(label) => store.list_zones_by_category(label.parse::<ZoneCategory>()?)?,
        None => store.list_zones()?,
    };

    if zones.is_empty() {
        println!("No zones stored.");
        return Ok(());
    }

    for zone in &zones {
        println!(
            "{}: {} ({}) center {:.4},{:.4} radius {:.2} km",
            zone.id, zone.name, zone.category, zone.latitude, zone.longitude, zone.radius_km
        );
    }

    Ok(())
}

fn handle_add(
    db: &Path,
    name: String,
    category: &str,
    lat: f64,
    lon: f64,
    radius_km: f64,
    description: Option<String>,
) -> Result<()> {
    let store = open_store(db)?;

    let zone = store.create_zone(&NewZone {
        name,
        category: category.parse::<ZoneCategory>()?,
        latitude: lat,
        longitude: lon,
        radius_km,
        address: None,
        description,
    })?;

    println!("Created zone {}: {} ({})", zone.id, zone.name, zone.category);
    Ok(())
}

fn handle_remove(db: &Path, id: i64) -> Result<()> {
    let store = open_store(db)?;
    store.delete_zone(id)?;
    println!("Deleted zone {}", id);
    Ok(())
}

fn handle_check(db: &Path, lat: f64, lon: f64) -> Result<()> {
    let store = open_store(db)?;
    let zones = store.list_zones()?;
    let point = Point::new(lat, lon);

    println!("Position {:.4},{:.4}:", lat, lon);

    let Some(zone) = resolve_containment(point, &zones) else {
        println!("- Not inside any zone");
        return Ok(());
    };

    println!("- Inside zone {}: {} ({})", zone.id, zone.name, zone.category);

    if zone.category.is_hazardous() {
        match nearest_of_category(point, &zones, ZoneCategory::Safe) {
            Some(nearest) => println!(
                "- Nearest safe zone: {} ({:.2} km away)",
                nearest.zone.name, nearest.distance_km
            ),
            None => println!("- No safe zone available"),
        }
    } else {
        println!("- No evacuation needed");
    }

    Ok(())
}

/// The sample zone set used to bootstrap a fresh deployment.
fn sample_zones() -> Vec<NewZone> {
    let zone = |name: &str, category, latitude, longitude, radius_km, description: &str| NewZone {
        name: name.to_string(),
        category,
        latitude,
        longitude,
        radius_km,
        address: None,
        description: Some(description.to_string()),
    };

    vec![
        zone(
            "Downtown Danger Zone",
            ZoneCategory::HazardHigh,
            37.7749,
            -122.4194,
            1.0,
            "High risk area due to potential flooding and structural hazards.",
        ),
        zone(
            "Industrial Hazard Zone",
            ZoneCategory::HazardHigh,
            37.7833,
            -122.4167,
            0.8,
            "Chemical hazards and industrial risks present.",
        ),
        zone(
            "Coastal Warning Zone",
            ZoneCategory::HazardMedium,
            37.8083,
            -122.4156,
            1.2,
            "Moderate risk of coastal flooding and storm surge.",
        ),
        zone(
            "Hill District Alert Zone",
            ZoneCategory::HazardMedium,
            37.7516,
            -122.4477,
            0.9,
            "Landslide risk during heavy rain periods.",
        ),
        zone(
            "Central Park Safe Zone",
            ZoneCategory::Safe,
            37.7694,
            -122.4862,
            1.5,
            "Designated evacuation area with emergency supplies and shelter.",
        ),
        zone(
            "Highland Safe Zone",
            ZoneCategory::Safe,
            37.7928,
            -122.4551,
            1.2,
            "Elevated area safe from flooding with medical facilities.",
        ),
    ]
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
