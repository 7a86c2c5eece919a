//! elver: electroluminescence photon generation for a gaseous TPC
//!
//! Reads an input deck, seeds thermal electrons in the drift volume,
//! drifts each one towards the amplification gap and synthesizes the
//! secondary VUV photons it produces there.

use std::error::Error;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use colored::Colorize;
use rand::prelude::*;
use rand_distr::StandardNormal;
use rand_xoshiro::Xoshiro256StarStar;
use rayon::prelude::*;

mod analysis;
mod constants;
mod drift;
mod el;
mod field;
mod gas;
mod geometry;
mod input;
mod particle;

use analysis::{ExcitationHit, PromptSample};
use constants::*;
use drift::{CollisionCounts, DriftTransport, McDrift};
use el::{ElModel, ElYield, Outcome, RunContext};
use field::PiecewiseField;
use input::{format_elapsed, Config, InputError};
use particle::{Particle, Species};

/// Everything one worker accumulated over its share of the seeds.
struct WorkerOutput {
    photons: Vec<Particle>,
    hits: Vec<ExcitationHit>,
    prompt: Vec<PromptSample>,
    triggered: u64,
    no_amplification: u64,
    rejected: u64,
    counts: CollisionCounts,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    let path = args.get(1).ok_or(InputError::InvalidFile)?;

    let mut config = Config::from_file(Path::new(path))?;
    config.with_context("constants")?;

    // control
    let nelectrons: usize = config.read("control:electrons")?;
    let rng_seed: usize = config.read("control:rng_seed").unwrap_or(0);
    let seed_energy: f64 = config.read("control:seed_energy").unwrap_or(7.0);
    let transverse_spread: f64 = config.read("control:transverse_spread").unwrap_or(1.0);
    let photon_list: Option<String> = config.read("control:photon_list").ok();

    // gas
    let table: String = config.read("gas:table")?;
    let ion_mobility: Option<String> = config.read("gas:ion_mobility").ok();
    let thermal_energy: f64 = config.read("gas:thermal_energy")?;
    let drift_velocity: f64 = config.read("gas:drift_velocity").unwrap_or(DEFAULT_DRIFT_VELOCITY);
    let photon_energy: f64 = config.read("gas:photon_energy").unwrap_or(XE_EMISSION_ENERGY);

    // detector geometry, cm
    let active_radius: f64 = config.read("detector:active_radius")?;
    let active_length: f64 = config.read("detector:active_length")?;
    let chamber_radius: f64 = config.read("detector:chamber_radius").unwrap_or(active_radius + 5.0);
    let chamber_length: f64 = config.read("detector:chamber_length").unwrap_or(active_length + 10.0);

    // amplification stage
    let gap: f64 = config.read("el:gap").unwrap_or(DEFAULT_GAP_LENGTH);
    let drift_field: f64 = config.read("el:drift_field").unwrap_or(DEFAULT_DRIFT_FIELD);
    let el_field: f64 = config.read("el:field").unwrap_or(DEFAULT_EL_FIELD);
    let slope: f64 = config.read("el:yield_slope").unwrap_or(DEFAULT_YIELD_SLOPE);
    let offset: f64 = config.read("el:yield_offset").unwrap_or(DEFAULT_YIELD_OFFSET);
    let fluctuation: f64 = config.read("el:fluctuation").unwrap_or(DEFAULT_YIELD_FLUCTUATION);
    let attachment: f64 = config.read("el:attachment").unwrap_or(0.0);

    // Gas and mobility data load once, before anything fires.
    let gas = gas::initialize(&table, ion_mobility.as_deref())?;

    println!("{} v{}", "elver".bold(), env!("CARGO_PKG_VERSION"));
    println!(
        "{} {} at {} bar, {} K",
        "gas:".cyan(), gas.composition(), gas.pressure(), gas.temperature(),
    );

    let geometry = PiecewiseField::new(active_radius, active_length, gap, drift_field, el_field);
    let el_yield = ElYield {
        el_field,
        pressure: gas.pressure(),
        gap,
        fluctuation,
        slope,
        offset,
        drift_velocity,
        photon_energy,
    };

    if el_yield.expected_photons() <= 0.0 {
        eprintln!(
            "{} configured field and pressure give a non-positive EL yield ({:.1} photons/cm/bar), no photons will be produced",
            "warning:".bold().yellow(), el_yield.yield_per_cm_bar(),
        );
    } else {
        println!(
            "{} {:.1} photons/cm/bar, {:.1} photons expected per electron",
            "yield:".cyan(), el_yield.yield_per_cm_bar(), el_yield.expected_photons(),
        );
    }

    let model = ElModel::new(&geometry, el_yield, thermal_energy);
    let mobility = drift_velocity / drift_field;

    // Thermal electron seeds: Gaussian transverse spread about the
    // axis, uniform in depth across the drift volume.
    let mut rng = Xoshiro256StarStar::seed_from_u64(rng_seed as u64);
    let seeds: Vec<Particle> = (0..nelectrons)
        .map(|_| {
            let x = transverse_spread * rng.sample::<f64, _>(StandardNormal);
            let y = transverse_spread * rng.sample::<f64, _>(StandardNormal);
            let z = rng.gen_range(geometry.gap_top(), geometry.cathode_top());
            Particle::create(Species::ThermalElectron, [x, y, z].into(), 0.0)
                .with_energy(seed_energy)
        })
        .collect();

    let start = std::time::Instant::now();
    let chunk_size = (seeds.len() / (4 * rayon::current_num_threads())).max(1);

    // One worker per chunk, each with its own drift engine, RNG and
    // run context; the diagnostic counters merge at the end.
    let outputs: Vec<WorkerOutput> = seeds
        .par_chunks(chunk_size)
        .enumerate()
        .map(|(i, chunk)| {
            let mut drift = McDrift::new(geometry.into(), mobility, rng_seed as u64 + 2 * i as u64)
                .with_area(chamber_radius, 0.5 * chamber_length)
                .with_attachment(attachment);
            let mut rng = Xoshiro256StarStar::seed_from_u64(rng_seed as u64 + 2 * i as u64 + 1);

            let mut photons: Vec<Particle> = Vec::new();
            let mut hits: Vec<ExcitationHit> = Vec::new();
            let mut prompt: Vec<PromptSample> = Vec::new();
            let mut no_amplification = 0;
            let mut rejected = 0;

            let mut ctx = RunContext::new(&mut hits, &mut prompt);
            for seed in chunk {
                match model.process(seed, &mut drift, &mut ctx, &mut rng) {
                    Outcome::Rejected => rejected += 1,
                    Outcome::NoAmplification => no_amplification += 1,
                    Outcome::Photons(mut ph) => photons.append(&mut ph),
                }
            }
            let triggered = ctx.triggered;
            drop(ctx);

            WorkerOutput {
                photons,
                hits,
                prompt,
                triggered,
                no_amplification,
                rejected,
                counts: drift.collision_counts(),
            }
        })
        .collect();

    let mut photons: Vec<Particle> = Vec::new();
    let mut hits = 0;
    let mut prompt = 0;
    let mut triggered = 0;
    let mut no_amplification = 0;
    let mut rejected = 0;
    let mut counts = CollisionCounts::default();
    for mut out in outputs {
        photons.append(&mut out.photons);
        hits += out.hits.len();
        prompt += out.prompt.len();
        triggered += out.triggered;
        no_amplification += out.no_amplification;
        rejected += out.rejected;
        counts = counts + out.counts;
    }

    let amplified = triggered - no_amplification;
    println!(
        "{} {} seeds: {} triggered, {} rejected, {} reached the gap, {} lost",
        "run:".cyan(), nelectrons, triggered, rejected, amplified, no_amplification,
    );
    println!(
        "{} {} photons ({:.1} per amplified electron), {} excitation hits, {} prompt samples",
        "out:".cyan(),
        photons.len(),
        if amplified > 0 {photons.len() as f64 / amplified as f64} else {0.0},
        hits, prompt,
    );
    println!("{} {}", "collisions:".cyan(), counts);

    if let Some(list) = photon_list {
        let mut file = File::create(&list)?;
        for photon in &photons {
            writeln!(file, "{}", photon)?;
        }
        println!("{} photon list written to {}", "out:".cyan(), list);
    }

    println!("{} {}", "runtime:".cyan(), format_elapsed(start.elapsed()));

    Ok(())
}
