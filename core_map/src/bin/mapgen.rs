use std::{fs, path::PathBuf, process::ExitCode};

use clap::Parser;
use tracing::{error, info};

use core_map::{load_map_presets_from_env, Map, MapGenConfig, MapRandom, Terrain};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless hex map generator", long_about = None)]
struct Cli {
    /// Size code, 3..=20; each step of two doubles both axes.
    #[arg(long, default_value_t = 3)]
    size: u32,
    /// 16-digit seed string (digits 1-8), or any phrase to hash into one.
    #[arg(long, default_value = "8667715887436237")]
    seed: String,
    /// Preset id from the builtin set or `MAP_PRESETS_PATH`.
    #[arg(long)]
    preset: Option<String>,
    /// Write the persisted snapshot (bincode) here.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Print statistics as JSON instead of a summary.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let seed_random = MapRandom::from_phrase(&cli.seed);
    let seed = seed_random.seed();

    let config = match &cli.preset {
        Some(id) => {
            let (presets, _) = load_map_presets_from_env();
            match presets.resolve(id) {
                Ok(preset) => preset.config(cli.size, seed),
                Err(err) => {
                    error!(error = %err, known = ?presets.ids(), "mapgen.unknown_preset");
                    return ExitCode::FAILURE;
                }
            }
        }
        None => MapGenConfig::new(cli.size, seed),
    };

    let map = match Map::generate(&config) {
        Ok(map) => map,
        Err(err) => {
            error!(error = %err, "mapgen.failed");
            return ExitCode::FAILURE;
        }
    };

    let stats = map.stats();
    let fingerprint = map.fingerprint();
    if cli.json {
        let report = serde_json::json!({
            "cols": map.geometry().cols(),
            "rows": map.geometry().rows(),
            "seed": seed_random.to_seed_string(),
            "fingerprint": format!("{fingerprint:016x}"),
            "stats": stats,
        });
        println!("{report}");
    } else {
        println!(
            "{}x{} seed {} fingerprint {fingerprint:016x}",
            map.geometry().cols(),
            map.geometry().rows(),
            seed_random.to_seed_string(),
        );
        println!(
            "land {:.1}%  water vertices {}  objects {}  deposits {}  desert triangles {}",
            stats.land_ratio() * 100.0,
            stats.water_vertices,
            stats.objects,
            stats.deposit_vertices,
            stats.band(Terrain::Desert0) + stats.band(Terrain::Desert1) + stats.band(Terrain::Desert2),
        );
    }

    if let Some(path) = cli.out {
        let snapshot = map.to_snapshot();
        let bytes = match map_schema::encode_snapshot(&snapshot) {
            Ok(bytes) => bytes,
            Err(err) => {
                error!(error = %err, "mapgen.encode_failed");
                return ExitCode::FAILURE;
            }
        };
        if let Err(err) = fs::write(&path, bytes) {
            error!(path = %path.display(), error = %err, "mapgen.write_failed");
            return ExitCode::FAILURE;
        }
        info!(path = %path.display(), hash = snapshot.header.hash, "mapgen.snapshot_written");
    }

    ExitCode::SUCCESS
}
