use chrono::Utc;
use clap::{Parser, Subcommand};
use lenscalc::calibration::{
    CalibrationMeasurement, CalibrationRecord, CalibrationStore, JsonFilePersistence,
};
use lenscalc::config::{self, EngineConfig};
use lenscalc::crop::{CropRequest, compute_crop_frame};
use lenscalc::exposure::{
    ExposureRequest, ExposureSettings, FilterStack, ReciprocityModel, plan_exposure, standard_scale,
};
use lenscalc::optics::{
    CapturePlane, FocusDistance, OpticalSystem, depth_of_field_with_coc, dof_table, field_of_view,
};
use lenscalc::{output, units};
use std::path::{Path, PathBuf};

/// Lens and sensor shared by the optics commands.
#[derive(clap::Args, Clone)]
struct LensArgs {
    /// Focal length in mm
    #[arg(long)]
    focal: f64,

    /// Aperture f-number
    #[arg(long, default_value_t = 8.0)]
    aperture: f64,

    /// Sensor or film width in mm
    #[arg(long, default_value_t = 36.0)]
    sensor_width: f64,

    /// Sensor or film height in mm
    #[arg(long, default_value_t = 24.0)]
    sensor_height: f64,
}

impl LensArgs {
    fn system(&self) -> OpticalSystem {
        OpticalSystem::new(
            self.focal,
            self.aperture,
            self.sensor_width,
            self.sensor_height,
        )
    }
}

/// Focus distance; omitted means infinity.
#[derive(clap::Args, Clone)]
struct FocusArgs {
    /// Focus distance (mm, or feet with --feet). Omit for infinity
    #[arg(long)]
    focus: Option<f64>,

    /// Interpret distances as feet (50 ft and beyond counts as infinity)
    #[arg(long)]
    feet: bool,
}

impl FocusArgs {
    fn resolve(&self) -> FocusDistance {
        match self.focus {
            None => FocusDistance::Infinity,
            Some(v) => distance(v, self.feet),
        }
    }
}

/// Capture plane of the simulated camera.
#[derive(clap::Args, Clone)]
struct PlaneArgs {
    /// Format name used for calibration lookup (e.g. 6x7)
    #[arg(long)]
    plane: String,

    /// Capture plane width in mm
    #[arg(long)]
    plane_width: f64,

    /// Capture plane height in mm
    #[arg(long)]
    plane_height: f64,
}

impl PlaneArgs {
    fn capture_plane(&self) -> CapturePlane {
        CapturePlane::new(self.plane.clone(), self.plane_width, self.plane_height)
    }
}

#[derive(Parser)]
#[command(name = "lenscalc")]
#[command(about = "Depth of field, field of view, crop frames and exposure for photographers")]
#[command(long_about = "\
Depth of field, field of view, crop frames and exposure for photographers

All lengths are millimeters unless --feet is given. Focus distances of 50 ft
or more are treated as infinity.

Settings are read from lenscalc.toml in --config-dir (stock defaults when
absent). Calibration records live in calibrations.json next to it.

Run 'lenscalc gen-config' to generate a documented lenscalc.toml.")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Directory holding lenscalc.toml and the calibration file
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Near limit, far limit and hyperfocal distance
    Dof {
        #[command(flatten)]
        lens: LensArgs,
        #[command(flatten)]
        focus: FocusArgs,
    },
    /// Angles of view and linear field at the focus distance
    Fov {
        #[command(flatten)]
        lens: LensArgs,
        #[command(flatten)]
        focus: FocusArgs,
    },
    /// Depth of field for every aperture × distance combination
    DofTable {
        #[command(flatten)]
        lens: LensArgs,
        /// Comma-separated f-numbers
        #[arg(long, value_delimiter = ',', required = true)]
        apertures: Vec<f64>,
        /// Comma-separated focus distances (mm, or feet with --feet)
        #[arg(long, value_delimiter = ',', required = true)]
        distances: Vec<f64>,
        /// Interpret distances as feet
        #[arg(long)]
        feet: bool,
    },
    /// Crop frame for a simulated camera on a phone preview
    Crop {
        /// Phone model
        #[arg(long)]
        device: String,
        /// Phone lens (e.g. wide, ultra-wide, tele)
        #[arg(long, default_value = "wide")]
        lens: String,
        #[command(flatten)]
        plane: PlaneArgs,
        /// Simulated focal length in mm
        #[arg(long)]
        focal: f64,
        /// Diagonal field of view of the phone lens, degrees
        #[arg(long)]
        device_fov: f64,
        /// Preview width in pixels
        #[arg(long)]
        screen_width: f64,
        /// Preview height in pixels
        #[arg(long)]
        screen_height: f64,
    },
    /// Shutter time for target settings, with filters and reciprocity
    Exposure {
        /// Metered aperture EV
        #[arg(long, allow_hyphen_values = true)]
        metered_aperture_ev: f64,
        /// Metered shutter EV
        #[arg(long, allow_hyphen_values = true)]
        metered_shutter_ev: f64,
        /// Metered ISO EV
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        metered_iso_ev: f64,
        /// Target aperture EV
        #[arg(long, allow_hyphen_values = true)]
        aperture_ev: f64,
        /// Target ISO EV
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        iso_ev: f64,
        /// Exposure compensation in stops
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        compensation: f64,
        /// Comma-separated filter strengths in stops
        #[arg(long, value_delimiter = ',')]
        filters: Vec<f64>,
        /// JSON film profile (reciprocity model). Omit for no correction
        #[arg(long)]
        film: Option<PathBuf>,
    },
    /// Manage crop-frame calibrations
    #[command(subcommand)]
    Calibration(CalibrationCommand),
    /// Print a stock lenscalc.toml with all options documented
    GenConfig,
}

#[derive(Subcommand)]
enum CalibrationCommand {
    /// Record a measurement, replacing any calibration with the same key
    Add {
        #[arg(long)]
        device: String,
        #[arg(long, default_value = "wide")]
        lens: String,
        #[arg(long, default_value_t = 1.0)]
        zoom: f64,
        #[command(flatten)]
        plane: PlaneArgs,
        /// Focal length in mm
        #[arg(long)]
        focal: f64,
        /// Measured size of the reference object across the frame, mm
        #[arg(long)]
        object_size: f64,
        /// Distance to the reference object, mm
        #[arg(long)]
        distance: f64,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// List calibrations, newest first
    List,
    /// Delete one calibration by id
    Delete { id: String },
    /// Delete all calibrations
    Clear,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // gen-config must work even when the existing lenscalc.toml is broken
    let config = match cli.command {
        Command::GenConfig => EngineConfig::default(),
        _ => config::load_config(&cli.config_dir)?,
    };

    match cli.command {
        Command::Dof { lens, focus } => {
            let result = depth_of_field_with_coc(
                &lens.system(),
                focus.resolve(),
                config.optics.coc_divisor,
            )?;
            output::print_lines(&output::format_dof(&result));
        }
        Command::Fov { lens, focus } => {
            let result = field_of_view(&lens.system(), focus.resolve())?;
            output::print_lines(&output::format_fov(&result));
        }
        Command::DofTable {
            lens,
            apertures,
            distances,
            feet,
        } => {
            init_thread_pool(&config.processing);
            let distances: Vec<FocusDistance> =
                distances.iter().map(|&d| distance(d, feet)).collect();
            let rows = dof_table(
                &lens.system(),
                &apertures,
                &distances,
                config.optics.coc_divisor,
            );
            output::print_lines(&output::format_dof_table(lens.focal, &rows));
        }
        Command::Crop {
            device,
            lens,
            plane,
            focal,
            device_fov,
            screen_width,
            screen_height,
        } => {
            let store = open_store(&config, &cli.config_dir)?;
            let request = CropRequest {
                device_model: device,
                lens_type: lens,
                capture_plane: plane.capture_plane(),
                focal_length: focal,
                device_diagonal_fov: device_fov.to_radians(),
                screen_width,
                screen_height,
            };
            let frame = compute_crop_frame(&request, &store, config.crop.min_display_size)?;
            output::print_lines(&output::format_crop(&frame));
        }
        Command::Exposure {
            metered_aperture_ev,
            metered_shutter_ev,
            metered_iso_ev,
            aperture_ev,
            iso_ev,
            compensation,
            filters,
            film,
        } => {
            let film = match film {
                Some(path) => load_film(&path)?,
                None => ReciprocityModel::None { cutoff: 1.0 },
            };
            let request = ExposureRequest {
                metered: ExposureSettings::new(
                    metered_aperture_ev,
                    metered_shutter_ev,
                    metered_iso_ev,
                ),
                target_aperture_ev: aperture_ev,
                target_iso_ev: iso_ev,
                ev_compensation: compensation,
                filters: FilterStack::from_stops(&filters),
            };
            let plan = plan_exposure(
                &request,
                &film,
                &standard_scale(),
                config.exposure.max_duration_secs,
            );
            output::print_lines(&output::format_exposure(&plan));
        }
        Command::Calibration(command) => run_calibration(command, &config, &cli.config_dir)?,
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn run_calibration(
    command: CalibrationCommand,
    config: &EngineConfig,
    config_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = open_store(config, config_dir)?;
    match command {
        CalibrationCommand::Add {
            device,
            lens,
            zoom,
            plane,
            focal,
            object_size,
            distance,
            notes,
        } => {
            let measurement = CalibrationMeasurement {
                device_model: device,
                lens_type: lens,
                zoom_factor: zoom,
                capture_plane: plane.capture_plane(),
                focal_length: focal,
                measured_object_size: object_size,
                measured_distance: distance,
                notes,
            };
            let record = CalibrationRecord::from_measurement(&measurement, Utc::now())?;
            store.add(record.clone())?;
            output::print_lines(&output::format_calibrations(&[record]));
        }
        CalibrationCommand::List => {
            output::print_lines(&output::format_calibrations(store.records()));
        }
        CalibrationCommand::Delete { id } => {
            let removed = store.delete(&id)?;
            println!(
                "Deleted {} ({} / {})",
                removed.id, removed.device_model, removed.lens_type
            );
        }
        CalibrationCommand::Clear => {
            let count = store.delete_all()?;
            println!("Deleted {} calibration(s)", count);
        }
    }
    Ok(())
}

fn open_store(
    config: &EngineConfig,
    config_dir: &Path,
) -> Result<CalibrationStore<JsonFilePersistence>, Box<dyn std::error::Error>> {
    let path = config.calibration.resolve(config_dir);
    Ok(CalibrationStore::open(JsonFilePersistence::new(path))?)
}

/// Read and validate a JSON film profile.
fn load_film(path: &Path) -> Result<ReciprocityModel, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let model: ReciprocityModel = serde_json::from_str(&content)?;
    model.validate()?;
    Ok(model)
}

fn distance(value: f64, feet: bool) -> FocusDistance {
    if feet {
        units::focus_from_feet(value)
    } else {
        FocusDistance::Finite(value)
    }
}

/// Size rayon's global pool for `dof-table` from `[processing]`.
///
/// A pool that was already built (e.g. by a test harness) is left as is.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let workers = config::effective_threads(processing);
    if rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global()
        .is_err()
    {
        log::debug!("rayon pool already initialized; keeping it");
    }
}
