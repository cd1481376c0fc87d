fn main() -> anyhow::Result<()> {
    cohgeo::cli::run_cli()
}
