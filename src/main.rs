use std::env;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use plangraph::{pddl, GraphConfig, Heuristic, PlanningGraph};

const USAGE: &str =
    "usage: plangraph <domain.pddl> <problem.pddl> [--heuristic NAME] [--no-serialize] [--ignore-mutexes] [--levels]";

struct Args {
    domain: String,
    problem: String,
    heuristics: Vec<Heuristic>,
    config: GraphConfig,
    levels: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut files = Vec::new();
    let mut heuristics = Vec::new();
    let mut config = GraphConfig::default();
    let mut levels = false;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--heuristic" => {
                let name = args.next().ok_or("--heuristic needs a name")?;
                heuristics.push(name.parse::<Heuristic>().map_err(|e| e.to_string())?);
            }
            "--no-serialize" => config = config.serialize(false),
            "--ignore-mutexes" => config = config.ignore_mutexes(true),
            "--levels" => levels = true,
            flag if flag.starts_with('-') => return Err(format!("unknown option {}", flag)),
            file => files.push(file.to_owned()),
        }
    }
    let [domain, problem]: [String; 2] = files.try_into().map_err(|_| USAGE.to_owned())?;
    if heuristics.is_empty() {
        heuristics.extend(Heuristic::ALL);
    }
    Ok(Args { domain, problem, heuristics, config, levels })
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };
    let instance = match pddl::load_files(&args.domain, &args.problem) {
        Ok(instance) => instance,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut graph = match PlanningGraph::new(&instance.problem, &instance.initial_state, args.config) {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut status = ExitCode::SUCCESS;
    for heuristic in args.heuristics {
        match graph.evaluate(heuristic) {
            Ok(estimate) => println!("{}: {}", heuristic, estimate),
            Err(e) => {
                eprintln!("{}: {}", heuristic, e);
                status = ExitCode::FAILURE;
            }
        }
    }
    if args.levels {
        graph.fill(None);
        print!("{:?}", graph);
    }
    status
}
