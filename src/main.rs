use clap::{Parser, Subcommand};

use cmdwrap::config::Context;
use cmdwrap::{output, runner, terminate};

#[derive(Parser)]
#[command(
    name = "cmdwrap",
    about = "Diagnostic command wrapper and process control for CLI test harnesses"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a command, capturing output and reporting failures verbosely
    Run {
        /// Wrapper flags (--msg <text>, --no-stdout, --no-stderr, --silent)
        /// followed by the command to execute
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        args: Vec<String>,
    },
    /// Terminate a process: SIGTERM first, SIGKILL if it lingers
    Kill {
        /// Process id to terminate
        pid: i32,
        /// Display name for progress messages (defaults to the pid)
        name: Option<String>,
    },
}

fn cmd_run(ctx: &Context, args: &[String]) -> i32 {
    let (opts, command) = match runner::parse_args(args) {
        Ok(parsed) => parsed,
        Err(e) => output::assertion_failure(ctx, &format!("{e:#}")),
    };
    match runner::run(ctx, &opts, command) {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => {
            output::tool_error(&e);
            1
        }
    }
}

fn cmd_kill(pid: i32, name: Option<&str>) -> i32 {
    match terminate::stop(pid, name) {
        Ok(()) => 0,
        Err(e) => {
            output::tool_error(&e);
            1
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let ctx = Context::from_env();
    let exit_code = match &cli.command {
        Commands::Run { args } => cmd_run(&ctx, args),
        Commands::Kill { pid, name } => cmd_kill(*pid, name.as_deref()),
    };
    std::process::exit(exit_code);
}
