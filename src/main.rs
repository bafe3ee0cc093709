use std::path::PathBuf;

use clap::{AppSettings, Parser};
use log::{debug, info};

use leda_ms::{
    calibration::load_cal_table,
    constants::OVRO_LWA_POSITION,
    enumerate_baselines, parse_epoch,
    read::{antennas::read_antenna_offsets, ms::MsCalTable},
    to_geocentric_wgs84, zenith, ArrayReference, LedaError, Precession,
};

#[derive(Parser)]
#[clap(global_setting(AppSettings::DeriveDisplayOrder))]
#[clap(disable_help_subcommand = true)]
#[clap(infer_long_args = true)]
struct Args {
    /// A text file of East, North, Up antenna offsets \[metres\], three
    /// numbers per antenna.
    antennas: PathBuf,

    /// The number of antennas to read from the offsets file.
    #[clap(short, long)]
    num_antennas: usize,

    /// The longitude of the array reference point \[degrees\].
    #[clap(long, allow_hyphen_values = true, default_value_t = OVRO_LWA_POSITION.longitude_rad.to_degrees())]
    longitude: f64,

    /// The geodetic latitude of the array reference point \[degrees\].
    #[clap(long, allow_hyphen_values = true, default_value_t = OVRO_LWA_POSITION.latitude_rad.to_degrees())]
    latitude: f64,

    /// The height of the array reference point above the ellipsoid
    /// \[metres\].
    #[clap(long, allow_hyphen_values = true, default_value_t = OVRO_LWA_POSITION.height_metres)]
    altitude: f64,

    /// The UTC observation time, formatted as YYYY-MM-DD-hh:mm:ss.
    #[clap(short, long)]
    time: String,

    /// Seconds to add to the observation time.
    #[clap(long, allow_hyphen_values = true, default_value_t = 0.0)]
    offset: f64,

    /// A casacore calibration table to validate, with one row per antenna.
    #[clap(long)]
    cal: Option<PathBuf>,

    /// The verbosity of the program. Increase by specifying multiple times
    /// (e.g. -vv). The default is to print only high-level information.
    #[clap(short, long, parse(from_occurrences))]
    verbosity: u8,
}

fn main() {
    let args = Args::parse();
    setup_logging(args.verbosity);

    if let Err(e) = try_main(args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn try_main(args: Args) -> Result<(), LedaError> {
    let reference = ArrayReference::new(args.longitude, args.latitude, args.altitude);
    info!(
        "Array reference: {}° lon, {}° lat, {} m",
        reference.longitude_deg, reference.latitude_deg, reference.altitude_m
    );

    let offsets = read_antenna_offsets(&args.antennas, args.num_antennas)?;
    let positions = to_geocentric_wgs84(&offsets, reference)?;
    for (i, pos) in positions.iter().enumerate() {
        println!("{i:4} {:16.4} {:16.4} {:16.4}", pos.x, pos.y, pos.z);
    }

    let baselines = enumerate_baselines(&positions);
    info!(
        "{} antennas, {} baselines (including autos)",
        positions.len(),
        baselines.len()
    );

    let epoch = parse_epoch(&args.time, args.offset)?;
    debug!("Observation epoch: {epoch}");
    let zenith = zenith(reference.to_latlngheight(), epoch, &Precession::default())?;
    let [ra, dec] = zenith.to_vec();
    info!("Zenith (J2000): RA {:.6}°, Dec {:.6}°", ra.to_degrees(), dec.to_degrees());

    if let Some(path) = args.cal {
        let mut store = MsCalTable::open(&path)?;
        let table = load_cal_table(&mut store, args.num_antennas)?;
        let (num_chans, num_pols) = table.cell_shape();
        let total = table.num_antennas() * num_chans * num_pols;
        info!(
            "{}: {} antennas x {num_chans} x {num_pols}; {} of {total} gains flagged",
            path.display(),
            table.num_antennas(),
            table.num_flagged(),
        );
    }

    Ok(())
}

fn setup_logging(verbosity: u8) {
    let mut builder = env_logger::Builder::from_default_env();
    builder.target(env_logger::Target::Stdout);
    builder.format_target(false);
    match verbosity {
        0 => builder.filter_level(log::LevelFilter::Info),
        1 => builder.filter_level(log::LevelFilter::Debug),
        2 => builder.filter_level(log::LevelFilter::Trace),
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
            builder.format(|buf, record| {
                use std::io::Write;

                let timestamp = buf.timestamp();
                let level = record.level();
                let target = record.target();
                let line = record.line().unwrap_or(0);
                let message = record.args();

                writeln!(buf, "[{timestamp} {level} {target}:{line}] {message}")
            })
        }
    };
    builder.init();
}
