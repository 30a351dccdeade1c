use std::fs;

const LOG_FILE: &str = "dayrange-current.log";
const PREVIOUS_LOG_FILE: &str = "dayrange-previous.log";

pub fn setup(is_debug: bool) -> Result<(), fern::InitError> {
    let level = if is_debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let mut logger = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}:{} -- {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                message
            ));
        })
        .level(log::LevelFilter::Off)
        .level_for("dayrange", level)
        .level_for("data", level)
        .level_for("exchange", level);

    if is_debug {
        logger = logger.chain(std::io::stdout());
    } else {
        let log_path = data::data_path(Some(LOG_FILE));
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }
        if log_path.exists() {
            fs::rename(&log_path, data::data_path(Some(PREVIOUS_LOG_FILE)))?;
        }

        logger = logger.chain(fern::log_file(log_path)?);
    }

    logger.apply()?;
    Ok(())
}
