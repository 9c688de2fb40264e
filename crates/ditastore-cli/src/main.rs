use std::io::Write;

fn main() -> anyhow::Result<()> {
    let matches = ditastore_cli::command().get_matches();
    ditastore_cli::init_logging(matches.get_count("verbose"), matches.get_flag("log-json"))?;

    let output = match ditastore_cli::run(&matches) {
        Ok(output) => output,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "ditastore failed");
            return Err(e);
        }
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
