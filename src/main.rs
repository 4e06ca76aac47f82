use avakit::cli::{Cli, Commands};
use avakit::output::Printer;
use clap::Parser;
use miette::Result;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let printer = Printer::new();

    match cli.command {
        Commands::Render(args) => avakit::cli::render::run(args, &printer)?,
        Commands::Validate(args) => {
            avakit::cli::validate::run(args, &printer)?;
        }
        Commands::Slice(args) => {
            avakit::cli::slice::run(args, &printer)?;
        }
        Commands::Init(args) => {
            avakit::cli::init::run(args, &printer)?;
        }
        Commands::Completions(args) => avakit::cli::completions::run(args)?,
    }

    Ok(())
}
