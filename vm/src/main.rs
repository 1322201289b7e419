use std::process::ExitCode;

use clap::Parser;
use lc3os::cli::Cli;
use lc3os::process::{create_proc_from_files, load_proc};
use lc3os::runloop::Vm;

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .init();

    if cli.code.len() != cli.heap.len() {
        eprintln!("--code and --heap must be given the same number of times");
        return ExitCode::FAILURE;
    }

    let mut vm = Vm::new();
    let max_processes = cli.max_processes.unwrap_or(lc3os::constants::MAX_PROCESSES);

    for (code_path, heap_path) in cli.code.iter().zip(cli.heap.iter()) {
        if vm.mem.proc_count() as usize >= max_processes {
            eprintln!("refusing to create more than {max_processes} processes");
            return ExitCode::FAILURE;
        }
        match create_proc_from_files(&mut vm.mem, code_path, heap_path) {
            Ok(true) => {}
            Ok(false) => {
                // createProc already printed the OS-resource diagnostic.
            }
            Err(err) => {
                eprintln!("{err}");
                return ExitCode::FAILURE;
            }
        }
    }

    if vm.mem.proc_count() == 0 {
        eprintln!("no process was successfully created");
        return ExitCode::FAILURE;
    }

    load_proc(&mut vm.mem, &mut vm.reg, 0);

    match vm.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(fault) => {
            println!("{fault}");
            ExitCode::FAILURE
        }
    }
}
