use std::{io::Write, num::NonZeroU32, path::PathBuf};

use anyhow::{anyhow, Context, Error};
use clap::{ArgGroup, Parser};
use log::{info, warn, LevelFilter};

use ledstrip_ambilight::capture::screen::PrimaryScreen;
use ledstrip_ambilight::prelude::*;
use ledstrip_ambilight::transport::btle::BtleTransport;

/// Simple tool for LED strip control over Bluetooth LE.
#[derive(Parser, Debug)]
#[command(version, about)]
#[command(group(ArgGroup::new("mode").required(true).args(["set", "ambi_oneframe", "ambilight"])))]
struct Args {
    /// Set the RGB value given with --val
    #[arg(short, long)]
    set: bool,

    /// RGB value to set
    #[arg(long, num_args = 3, value_names = ["R", "G", "B"], default_values_t = [0u8, 0, 0])]
    val: Vec<u8>,

    /// Adapt the color to the screen for one frame
    #[arg(long = "ambi-oneframe", visible_alias = "at")]
    ambi_oneframe: bool,

    /// Adapt the color to the dominant color of the screen until interrupted
    #[arg(short, long)]
    ambilight: bool,

    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Device address, overrides the config file
    #[arg(long)]
    address: Option<DeviceAddress>,

    /// Fade between colors
    #[arg(long, conflicts_with = "no_fade")]
    fade: bool,

    /// Jump straight to each color
    #[arg(long)]
    no_fade: bool,

    /// Number of steps per fade
    #[arg(long)]
    steps: Option<NonZeroU32>,

    /// Verbose output, twice for debug output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn mode(&self) -> Mode {
        if self.set {
            Mode::SetStatic(Color::new(self.val[0], self.val[1], self.val[2]))
        } else if self.ambi_oneframe {
            Mode::OneShotAmbilight
        } else {
            Mode::ContinuousAmbilight
        }
    }
}

fn init_logging(verbose: u8) {
    let mut builder = env_logger::Builder::new();

    match verbose {
        0 => builder.filter_level(LevelFilter::Warn),
        1 => builder.filter_level(LevelFilter::Info),
        _ => builder.filter_level(LevelFilter::Debug).format(|buf, record| {
            writeln!(
                buf,
                "{} [{} {}:{} - {}] {}",
                buf.timestamp(),
                record.level(),
                record.file().unwrap_or("?"),
                record.line().unwrap_or(0),
                record.target(),
                record.args()
            )
        }),
    };

    builder.parse_default_env().init();
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = Config::load(&args.config)?;
    if let Some(address) = args.address {
        config.device.address = Some(address);
    }
    if args.fade {
        config.fade.enabled = true;
    }
    if args.no_fade {
        config.fade.enabled = false;
    }
    if let Some(steps) = args.steps {
        config.fade.steps = steps;
    }

    let address = config.device.address.ok_or_else(|| {
        anyhow!(
            "no device address, set device.address in {} or pass --address",
            args.config.display()
        )
    })?;

    let transport = BtleTransport::first_adapter()
        .await
        .context("opening the Bluetooth adapter")?;
    let session = DeviceSession::new(transport, address)
        .with_write_service(config.device.write_service)
        .with_fade(config.fade.enabled, config.fade.steps);

    let mode = args.mode();
    let controller = if mode.needs_capture() {
        let capture = PrimaryScreen::open().context("opening the screen for capture")?;
        AmbilightController::new(session, capture, &config.ambilight)
    } else {
        AmbilightController::without_capture(session, &config.ambilight)
    };
    let mut controller = controller.with_extractor(ColorExtractor::new(ColorCube::default()));

    let stop = StopFlag::new();
    if mode == Mode::ContinuousAmbilight {
        println!("Hit CTRL+C to interrupt the process");

        let stop = stop.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if stop.stop() {
                    warn!("Second interrupt, exiting without disconnecting");
                    std::process::exit(130);
                }
                info!("Interrupt received, finishing the current frame (CTRL+C again to force exit)");
            }
        });
    }

    controller.run(mode, &stop).await?;

    Ok(())
}
