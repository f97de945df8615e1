use env_logger::Env;

use hyperveg::{Error, parse_args};

fn main() -> anyhow::Result<()> {
    let config = match parse_args(std::env::args_os()) {
        Ok(config) => config,
        // Help, version and malformed flags are reported the way clap formats them
        Err(Error::Usage(err)) => err.exit(),
        Err(err) => return Err(err.into()),
    };

    let level = if config.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    let report = hyperveg::run(&config)?;

    println!("\n=== Vegetation Mask Results ===");
    println!("Index: {}", config.index);
    println!(
        "Masked pixels: {} of {}",
        report.masked_pixels,
        report.mask.width() as u64 * report.mask.height() as u64
    );
    if let Some(obs) = report
        .outputs
        .observation(hyperveg::outputs::DEFAULT_SAMPLE, &format!("mean_{}", config.index))
    {
        println!("Mean {} inside mask: {}", config.index, obs.value);
    }
    if let Some(preview) = &report.preview {
        println!("Preview: {}", preview.display());
    }

    Ok(())
}
