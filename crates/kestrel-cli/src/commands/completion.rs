use anyhow::Result;
use clap::Command;
use clap_complete::{Shell, generate};
use std::io::{self, Write};

/// Write the completion script for `shell` to `out`
pub fn write_completions(shell: Shell, cmd: &mut Command, out: &mut dyn Write) {
    let bin_name = cmd.get_name().to_string();
    generate(shell, cmd, bin_name, out);
}

/// Print the completion script to stdout
pub fn execute(shell: Shell, cmd: &mut Command) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_completions(shell, cmd, &mut handle);
    handle.flush()?;
    Ok(())
}
