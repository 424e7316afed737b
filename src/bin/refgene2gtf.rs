use clap::Parser;
use log::{error, info};
use simple_logger::init_with_level;

use refgene2gtf::{cli::Args, convert::run};

fn main() {
    let start = std::time::Instant::now();
    let args: Args = Args::parse();

    init_with_level(args.level).unwrap_or_else(|e| {
        eprintln!("ERROR: could not initialize logger: {e}");
        std::process::exit(1);
    });

    args.check().unwrap_or_else(|e| {
        error!("{}", e);
        std::process::exit(1);
    });

    let stats = run(&args.to_config()).unwrap_or_else(|e| {
        error!("{}", e);
        std::process::exit(1);
    });

    info!(
        "{} genes, {} merged exons from {} transcripts",
        stats.genes, stats.merged_exons, stats.transcripts
    );
    info!("Elapsed time: {:?}", start.elapsed());
}
