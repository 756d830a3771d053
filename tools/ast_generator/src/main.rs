use std::path::PathBuf;

use clap::Parser;

use ast_generator::grammar::{EXPR_BASE_NAME, EXPR_RULES, EXPR_USES};

/// Generates the expression node model into `<OUTPUT_DIR>/ast/expr.rs`.
#[derive(clap::Parser)]
struct Args {
    output_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let path =
        ast_generator::generate_file(&args.output_dir, EXPR_BASE_NAME, EXPR_USES, EXPR_RULES)?;
    log::info!("Wrote {}", path.display());

    Ok(())
}
