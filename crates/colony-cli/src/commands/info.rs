use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colony_core::frame::SourceKind;
use colony_core::io::load_sequence;
use colony_core::io::ser::SerReader;

#[derive(Args)]
pub struct InfoArgs {
    /// SER video or image directory
    pub path: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let is_ser = args
        .path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("ser"));

    if is_ser {
        let reader = SerReader::open(&args.path)
            .with_context(|| format!("Failed to open {}", args.path.display()))?;
        let info = reader.source_info(&args.path);
        let header = &reader.header;

        println!("File:        {}", info.path.display());
        println!("Kind:        {}", SourceKind::Video);
        println!("Frames:      {}", info.total_frames);
        println!("Dimensions:  {}x{}", info.width, info.height);
        println!("Bit depth:   {}", info.bit_depth);
        println!("Planes:      {}", header.planes_per_pixel());
        if !header.instrument.is_empty() {
            println!("Instrument:  {}", header.instrument);
        }
        let total_mb =
            (header.frame_byte_size() * info.total_frames) as f64 / (1024.0 * 1024.0);
        println!("Data size:   {:.1} MB", total_mb);
        return Ok(());
    }

    let sequence = load_sequence(&args.path)
        .with_context(|| format!("Failed to load {}", args.path.display()))?;
    let info = &sequence.source;
    println!("Path:         {}", info.path.display());
    println!("Kind:         {}", info.kind);
    println!("Frames:       {}", info.total_frames);
    println!("Dimensions:   {}x{}", info.width, info.height);
    println!("Bit depth:    {}", info.bit_depth);
    println!("Ground truth: {}", info.ground_truth_frames);
    Ok(())
}
