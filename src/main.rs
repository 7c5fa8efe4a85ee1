use clap::Parser;

use dwiflow::utils::logger;
use dwiflow::{
    BundleRegistry, Cli, Command, FetchArgs, FetchFlow, IoInfoArgs, IoInfoFlow, SplitArgs,
    SplitFlow, Workflow,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init_cli_logger(cli.verbose, cli.log_file.as_deref()) {
        eprintln!("❌ Failed to open log file: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = dispatch(cli.command).await {
        tracing::error!("Workflow failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

async fn dispatch(command: Command) -> dwiflow::Result<()> {
    match command {
        Command::Info {
            files,
            b0_threshold,
            bvecs_tol,
            json,
        } => {
            let mut flow = IoInfoFlow::new();
            flow.run(&IoInfoArgs {
                files,
                b0_threshold,
                bvecs_tol,
            })
            .await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&flow.summary)?);
            }
        }
        Command::Fetch {
            bundles,
            out_dir,
            registry,
        } => {
            let mut flow = match registry {
                Some(path) => FetchFlow::with_registry(BundleRegistry::from_path(&path)?),
                None => FetchFlow::new(),
            };
            flow.run(&FetchArgs { bundles, out_dir }).await?;
            for (name, path) in flow.last_generated_outputs() {
                println!("✅ {} -> {}", name, path.display());
            }
        }
        Command::Split {
            input,
            vol_idx,
            all,
            out_dir,
            force,
        } => {
            let mut flow = SplitFlow::new();
            flow.state.force_overwrite = force;
            flow.run(&SplitArgs {
                input,
                vol_idx,
                all,
                out_dir,
            })
            .await?;
            let mut outputs: Vec<_> = flow.last_generated_outputs().iter().collect();
            outputs.sort();
            for (key, path) in outputs {
                println!("✅ {}: {}", key, path.display());
            }
        }
    }
    Ok(())
}
