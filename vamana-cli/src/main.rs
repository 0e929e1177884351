use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use vamana::builder::{FilteredBuildParams, StitchedBuildParams, build_filtered, build_stitched};
use vamana::medoid::find_medoid;
use vamana::serialize::{read_graph, write_graph};
use vamana::store::VectorStore;

#[derive(Parser)]
#[command(name = "vamana", about = "Build and query a Filtered/Stitched Vamana index")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a Filtered-Vamana graph and run a query index (or -1 for a full sweep).
    Filtered {
        #[arg(short = 'b', long)]
        base: PathBuf,
        #[arg(short = 'q', long)]
        query: PathBuf,
        #[arg(short = 'g', long)]
        groundtruth: PathBuf,
        #[arg(short = 'd', long)]
        dim: usize,
        #[arg(short = 'n', long)]
        n_base: u32,
        #[arg(short = 'm', long)]
        n_query: u32,
        #[arg(short = 'a', long)]
        alpha: f32,
        #[arg(short = 'L', long)]
        l: usize,
        #[arg(short = 'R', long)]
        r: usize,
        #[arg(short = 't', long)]
        tau: usize,
        #[arg(short = 'i', long)]
        index: i64,
        #[arg(long)]
        random_graph: bool,
        /// Skip construction and load a previously-saved graph instead.
        #[arg(short = 'v', long)]
        vamana_file: Option<PathBuf>,
        #[arg(short = 's', long)]
        save: Option<PathBuf>,
    },
    /// Build a Stitched-Vamana graph and run a query index (or -1 for a full sweep).
    Stitched {
        #[arg(short = 'b', long)]
        base: PathBuf,
        #[arg(short = 'q', long)]
        query: PathBuf,
        #[arg(short = 'g', long)]
        groundtruth: PathBuf,
        #[arg(short = 'd', long)]
        dim: usize,
        #[arg(short = 'n', long)]
        n_base: u32,
        #[arg(short = 'm', long)]
        n_query: u32,
        #[arg(short = 'a', long)]
        alpha: f32,
        #[arg(short = 'l', long)]
        l_small: usize,
        #[arg(short = 'r', long)]
        r_small: usize,
        #[arg(short = 'R', long)]
        r_stitched: usize,
        #[arg(short = 'i', long)]
        index: i64,
        #[arg(long, default_value_t = 0x5eed)]
        seed: u64,
        #[arg(short = 's', long)]
        save: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Filtered {
            base,
            query,
            groundtruth: _,
            dim,
            n_base,
            n_query,
            alpha,
            l,
            r,
            tau,
            index,
            random_graph,
            vamana_file,
            save,
        } => {
            let mut store = VectorStore::load(File::open(base)?, dim, n_base, n_query)?;
            let read = store.read_queries(File::open(query)?, n_query)?;
            println!("loaded {} base vectors, {read} queries", store.size());

            let mut rng = rand::rng();
            let graph = if let Some(path) = vamana_file {
                println!("loading prebuilt graph from {}", path.display());
                read_graph(File::open(path)?)?
            } else {
                let params = FilteredBuildParams {
                    alpha,
                    l,
                    r,
                    tau,
                    random_init_graph: random_graph,
                };
                let timer = vamana::utils::Timer::new();
                let graph = build_filtered(&store, &params, &mut rng)?;
                println!("{}", timer.elapsed_seconds_for_step("build_filtered"));
                graph
            };
            print_degree_histogram(&graph);

            let medoids = find_medoid(&store, tau, &mut rng);
            run_queries(&graph, &store, &medoids, index, n_query, l)?;

            if let Some(path) = save {
                write_graph(&graph, BufWriter::new(File::create(path)?))?;
            }
        }
        Command::Stitched {
            base,
            query,
            groundtruth: _,
            dim,
            n_base,
            n_query,
            alpha,
            l_small,
            r_small,
            r_stitched,
            index,
            seed,
            save,
        } => {
            let mut store = VectorStore::load(File::open(base)?, dim, n_base, n_query)?;
            let read = store.read_queries(File::open(query)?, n_query)?;
            println!("loaded {} base vectors, {read} queries", store.size());

            let params = StitchedBuildParams {
                alpha,
                l_small,
                r_small,
                r_stitched,
            };

            let timer = vamana::utils::Timer::new();
            let graph = build_stitched(&store, &params, seed)?;
            println!("{}", timer.elapsed_seconds_for_step("build_stitched"));
            print_degree_histogram(&graph);

            let mut rng = rand::rng();
            let medoids = find_medoid(&store, 1, &mut rng);
            run_queries(&graph, &store, &medoids, index, n_query, l_small)?;

            if let Some(path) = save {
                write_graph(&graph, BufWriter::new(File::create(path)?))?;
            }
        }
    }
    Ok(())
}

fn run_queries(
    graph: &vamana::DirectedGraph,
    store: &VectorStore,
    medoids: &vamana::MedoidMap,
    index: i64,
    n_query: u32,
    l: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let base_size = store.size();
    let indices: Vec<u32> = if index == -1 {
        (0..n_query).collect()
    } else {
        vec![index as u32]
    };

    for q in indices {
        let query_vertex = base_size + q;
        match vamana::search(graph, store, medoids, query_vertex, 10, l) {
            Ok(top_k) => println!("query {q}: top-10 = {top_k:?}"),
            Err(err) => println!("query {q}: {err}"),
        }
    }
    Ok(())
}

fn print_degree_histogram(graph: &vamana::DirectedGraph) {
    let mut total = 0u64;
    let mut max = 0u32;
    for v in 0..graph.size() {
        let degree = graph.neighbors(v).map(|n| n.len()).unwrap_or(0) as u32;
        total += degree as u64;
        max = max.max(degree);
    }
    let avg = total as f64 / graph.size().max(1) as f64;
    println!("out-degree: avg={avg:.2} max={max}");
}

