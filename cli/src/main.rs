use std::process::ExitCode;
use clap::Parser;
use crate::args::*;
use crate::commands::{initialize, pressure, sphere_bins, stress_tensor, CliError};

mod args;
mod commands;

#[cfg(test)]
mod tests;

fn run(args: &Args) -> Result<Option<String>, CliError> {
    match &args.command {
        Commands::Init {
            size,
            lattice_cell,
            particle_mass,
            temperature,
            time_step,
            seed,
            lj,
        } => {
            initialize(&args.file, size, *lattice_cell, *particle_mass, *temperature,
                       *time_step, *seed, lj.as_deref(), args.pretty_print)?;
            Ok(None)
        }
        Commands::Pressure {
            cell_structure,
            skin,
            category,
            kmax,
            csv,
        } => {
            pressure(&args.file, commands::cell_structure(*cell_structure, *skin), category, *kmax, csv.as_deref()).map(Some)
        }
        Commands::StressTensor {
            volume,
            particles,
            all,
        } => {
            stress_tensor(&args.file, *volume, particles, *all).map(Some)
        }
        Commands::SphereBins {
            r_min,
            r_max,
            r_bins,
            center,
        } => {
            sphere_bins(&args.file, *r_min, *r_max, *r_bins, center).map(Some)
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    match run(&args) {
        Ok(output) => {
            if let Some(output) = output {
                println!("{}", output);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{}", err);
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
