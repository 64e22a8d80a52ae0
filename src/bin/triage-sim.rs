use triage_sim::config::{self, FormatArg};
use triage_sim::dataset;
use triage_sim::engine::Simulation;
use triage_sim::error::Result;
use triage_sim::output::{
    CompletionLog, Formatter, HumanFormatter, JsonFormatter, RunReport, SummaryFormatter,
};

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = config::parse_args()?;
    let config = config::build_config(args)?;

    let dataset = dataset::load_dataset(&config.dataset)?;
    let mut sim = Simulation::new(dataset)?;
    sim.set_speed(config.speed)?;
    sim.set_burst_mode(config.burst_mode);

    let mut log = CompletionLog::default();
    sim.start();
    let mut now_ms = 0.0;
    while !sim.is_drained() {
        now_ms += config.frame_ms;
        sim.frame(now_ms, &mut log);
    }

    let report = RunReport {
        snapshot: sim.snapshot(),
        histogram: sim.stats().histogram(),
        median_response_secs: sim.stats().median_response_secs(),
        completions: log.completions,
    };

    let formatter = formatter_for(&config.format);
    print!("{}", formatter.write(&report));

    Ok(())
}

fn formatter_for(format: &FormatArg) -> Box<dyn Formatter> {
    match format {
        FormatArg::Human => Box::new(HumanFormatter),
        FormatArg::Summary => Box::new(SummaryFormatter),
        FormatArg::Json => Box::new(JsonFormatter),
    }
}
