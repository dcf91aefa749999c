use clap::Parser;
use midi2video::{
    audio::{AudioSink, SilentAudio},
    cli::{select_device, validate_device, Args},
    clock::Pacing,
    config::Settings,
    loader::{load_clips, PatternLoader},
    midi::{list_input_ports, DefaultNoteSource},
    ui::StatusDisplay,
    Error, EventLoop, PlaybackSession,
};

fn main() {
    initialize_logging();
    let args = parse_command_line_arguments();
    let devices = get_available_devices();

    if args.device_list {
        list_available_devices(&devices);
        return;
    }

    if let Err(e) = run(&args, &devices) {
        log::error!("{}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn initialize_logging() {
    // Logging is best effort: playback works without a writable log directory
    if let Err(e) = midi2video::logging::init_logger() {
        eprintln!("Logging disabled: {}", e);
    }
}

fn parse_command_line_arguments() -> Args {
    Args::parse()
}

fn get_available_devices() -> Vec<String> {
    list_input_ports()
}

fn list_available_devices(devices: &[String]) {
    println!("Available MIDI devices:");
    for device in devices {
        println!("  - {}", device);
    }
}

fn choose_device(args: &Args, devices: &[String]) -> Result<Option<String>, Error> {
    if devices.is_empty() {
        return Err(Error::Config("No MIDI controllers found.".to_string()));
    }
    if let Some(device_name) = &args.portname {
        validate_device(device_name, devices).map_err(Error::Config)?;
        return Ok(Some(device_name.clone()));
    }
    if args.select_port {
        return select_device(devices).map(Some).map_err(Error::Config);
    }
    Ok(None)
}

fn run(args: &Args, devices: &[String]) -> Result<(), Error> {
    let settings = Settings::load(args.config.as_deref(), args.overrides())?;
    let device = choose_device(args, devices)?;

    let clips = load_clips(
        &mut PatternLoader::default(),
        &args.indir,
        args.mapfile.as_deref(),
        &args.ext,
    )?;
    let session = PlaybackSession::new(clips, &settings)?;
    let source = DefaultNoteSource::connect(device.as_deref())?;

    println!("Play a note on a midi controller to get started!");
    println!("(To quit, play midi note {})", settings.quit_note);

    let mut event_loop = EventLoop::new(
        session,
        &settings,
        source,
        StatusDisplay::new(),
        Pacing::RealTime,
    )?;
    if settings.audio {
        let audio: Box<dyn AudioSink> = Box::new(SilentAudio::new());
        event_loop = event_loop.with_audio(audio);
    }

    let reason = event_loop.run()?;
    log::info!("Exited: {:?}", reason);
    Ok(())
}
