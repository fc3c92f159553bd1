use theme_scope::cli::commands::run;

fn main() -> anyhow::Result<()> {
    run()
}
