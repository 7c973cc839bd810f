use std::fs::File;

use clap::{Parser, Subcommand};
use corridor_cad::{
    alignment::{HorizontalSegment, VerticalSegment},
    corridor::CorridorGenerator,
    export::AlignmentExport,
    io::{
        project::{read_project_json, Project},
        write_json,
    },
    stationing::{StationUnit, Stationing},
};

/// Command line front end for the corridor design engine.
#[derive(Parser)]
#[command(name = "corridor_cad_cli", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the horizontal and vertical segments of a project.
    Segments { project: String },
    /// Print x, y, azimuth and elevation at a station.
    Point { project: String, station: f64 },
    /// Format a distance along the alignment as a station label.
    StationLabel {
        distance: f64,
        #[arg(long, default_value_t = 0.0)]
        start_station: f64,
        /// Use 1+00 stations instead of 1+000.
        #[arg(long)]
        imperial: bool,
    },
    /// Parse a station label back into a distance.
    ParseStation {
        label: String,
        #[arg(long, default_value_t = 0.0)]
        start_station: f64,
        #[arg(long)]
        imperial: bool,
    },
    /// Effective value of a component parameter at a station.
    Resolve {
        project: String,
        component: String,
        parameter: String,
        station: f64,
        /// Value used when no constraint applies; defaults to the component's own value.
        #[arg(long)]
        default: Option<f64>,
    },
    /// Generate the corridor and write its station profiles as JSON.
    Corridor {
        project: String,
        #[arg(long)]
        max_spacing: Option<f64>,
        #[arg(long)]
        min_spacing: Option<f64>,
        #[arg(long)]
        output: Option<String>,
    },
    /// Write alignment segment records for BIM export.
    ExportSegments { project: String, output: String },
}

fn init_logging() {
    if let Ok(path) = std::env::var("CORRIDOR_CAD_LOG") {
        match File::create(&path) {
            Ok(file) => {
                env_logger::Builder::from_default_env()
                    .target(env_logger::Target::Pipe(Box::new(file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Failed to create log file {}: {}", path, e);
                env_logger::Builder::from_default_env().init();
            }
        }
    } else {
        env_logger::Builder::from_default_env().init();
    }
}

fn fail(message: String) -> ! {
    eprintln!("{}", message);
    std::process::exit(1);
}

fn load_project(path: &str) -> Project {
    match read_project_json(path) {
        Ok(project) => {
            log::debug!("loaded project '{}' from {}", project.name, path);
            project
        }
        Err(e) => fail(format!("Error reading {}: {}", path, e)),
    }
}

fn stationing(start_station: f64, imperial: bool) -> Stationing {
    let unit = if imperial {
        StationUnit::Imperial
    } else {
        StationUnit::Metric
    };
    Stationing::new(start_station, unit)
}

/// Azimuth in degrees, clockwise from north.
fn azimuth(dx: f64, dy: f64) -> f64 {
    dx.atan2(dy).to_degrees().rem_euclid(360.0)
}

fn print_segments(project: &Project) {
    let labels = project.settings.stationing;
    let horizontal = match project.horizontal() {
        Ok(h) => h,
        Err(e) => fail(format!("Error building alignment: {}", e)),
    };
    let mut station = 0.0;
    for segment in horizontal.segments() {
        let sta = labels.label(station);
        match segment {
            HorizontalSegment::Tangent { length, .. } => {
                println!("Line {} length {:.3}", sta, length)
            }
            HorizontalSegment::Arc {
                length,
                radius,
                turn_direction,
                ..
            } => println!(
                "CircularArc {} length {:.3} radius {:.3} {:?}",
                sta, length, radius, turn_direction
            ),
            HorizontalSegment::Terminator { .. } => println!("Endpoint {}", sta),
        }
        station += segment.length();
    }
    let vertical = match project.vertical() {
        Ok(v) => v,
        Err(e) => fail(format!("Error building profile: {}", e)),
    };
    for segment in vertical.segments() {
        let sta = labels.label(segment.start_station());
        match segment {
            VerticalSegment::Grade { length, slope, .. } => println!(
                "ConstantGradient {} length {:.3} grade {:.3}%",
                sta,
                length,
                slope * 100.0
            ),
            VerticalSegment::Parabola {
                length, k_value, ..
            } => println!("ParabolicArc {} length {:.3} K {:.3}", sta, length, k_value),
        }
    }
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Segments { project } => print_segments(&load_project(&project)),
        Commands::Point { project, station } => {
            let project = load_project(&project);
            let alignment = match project.alignment() {
                Ok(a) => a,
                Err(e) => fail(format!("Error building alignment: {}", e)),
            };
            match (
                alignment.horizontal.get_point_at_station(station),
                alignment.vertical.get_elevation(station),
            ) {
                (Ok(p), Ok(z)) => println!(
                    "{:.3},{:.3},{:.4},{:.3}",
                    p.position.x,
                    p.position.y,
                    azimuth(p.direction.x, p.direction.y),
                    z
                ),
                (Err(e), _) | (_, Err(e)) => fail(format!("Error at station {}: {}", station, e)),
            }
        }
        Commands::StationLabel {
            distance,
            start_station,
            imperial,
        } => println!("{}", stationing(start_station, imperial).label(distance)),
        Commands::ParseStation {
            label,
            start_station,
            imperial,
        } => match stationing(start_station, imperial).distance(&label) {
            Ok(d) => println!("{:.3}", d),
            Err(e) => fail(format!("Error parsing {}: {}", label, e)),
        },
        Commands::Resolve {
            project,
            component,
            parameter,
            station,
            default,
        } => {
            let project = load_project(&project);
            let fallback = default.or_else(|| {
                project
                    .assembly
                    .component(&component)
                    .and_then(|c| c.base_value(&parameter))
            });
            let Some(fallback) = fallback else {
                fail(format!(
                    "Error: no default for {}.{}, pass --default",
                    component, parameter
                ));
            };
            match project.constraint_set() {
                Ok(set) => println!(
                    "{:.3}",
                    set.resolver()
                        .resolve(&component, &parameter, station, fallback)
                ),
                Err(e) => fail(format!("Error loading constraints: {}", e)),
            }
        }
        Commands::Corridor {
            project,
            max_spacing,
            min_spacing,
            output,
        } => {
            let project = load_project(&project);
            let mut settings = project.settings;
            if let Some(max) = max_spacing {
                settings.max_spacing = max;
            }
            if let Some(min) = min_spacing {
                settings.min_spacing = min;
            }
            let result = project.alignment().and_then(|alignment| {
                let constraints = project.constraint_set()?;
                CorridorGenerator::new(settings).generate(
                    &alignment.horizontal,
                    &alignment.vertical,
                    &project.assembly,
                    &constraints.resolver(),
                )
            });
            let profiles = match result {
                Ok(p) => p,
                Err(e) => fail(format!("Error generating corridor: {}", e)),
            };
            match output {
                Some(path) => match write_json(&path, &profiles) {
                    Ok(()) => println!("Wrote {} station profiles to {}", profiles.len(), path),
                    Err(e) => fail(format!("Error writing {}: {}", path, e)),
                },
                None => {
                    let labels = settings.stationing;
                    println!("{} station profiles", profiles.len());
                    if let (Some(first), Some(last)) = (profiles.first(), profiles.last()) {
                        println!(
                            "{} to {}, {} points per section",
                            labels.label(first.station),
                            labels.label(last.station),
                            first.profile_points.len()
                        );
                    }
                }
            }
        }
        Commands::ExportSegments { project, output } => {
            let project = load_project(&project);
            let export = match project.alignment() {
                Ok(a) => AlignmentExport::new(&a.horizontal, &a.vertical),
                Err(e) => fail(format!("Error building alignment: {}", e)),
            };
            match write_json(&output, &export) {
                Ok(()) => println!("Wrote {}", output),
                Err(e) => fail(format!("Error writing {}: {}", output, e)),
            }
        }
    }
}
